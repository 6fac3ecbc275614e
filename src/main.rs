use bookpilot::api::{serve, AppState};
use bookpilot::booking::SiteProfile;
use bookpilot::browser::ChromeBrowser;
use bookpilot::core::Config;
use bookpilot::errors::Result;
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "bookpilot")]
#[command(about = "Hotel booking automation engine")]
struct Args {
    /// Host to bind the API server on
    #[arg(long)]
    host: Option<String>,

    /// Port to bind the API server on
    #[arg(short, long)]
    port: Option<u16>,

    /// Run the browser with a visible window
    #[arg(long)]
    headed: bool,

    /// Evict sessions idle longer than this many seconds
    #[arg(long)]
    idle_expiry_secs: Option<u64>,

    /// Directory for diagnostic screenshots (disabled when unset)
    #[arg(long)]
    screenshot_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    let mut config = Config::default();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.headed {
        config.browser.headless = false;
    }
    if let Some(secs) = args.idle_expiry_secs {
        config.session.idle_expiry_secs = secs;
    }
    if args.screenshot_dir.is_some() {
        config.session.screenshot_dir = args.screenshot_dir;
    }

    info!(
        host = %config.server.host,
        port = config.server.port,
        headless = config.browser.headless,
        "starting"
    );

    let state = AppState::new(config, SiteProfile::default(), ChromeBrowser::new);
    serve(state).await
}

use crate::api::routes::router;
use crate::api::state::AppState;
use crate::core::BrowserTrait;
use crate::errors::{BookingError, Result};
use std::time::Duration;
use tracing::info;

/// Bind the configured address and serve until the process exits.
///
/// Also spawns the eviction sweep that reclaims browsers from sessions
/// nobody has touched within the idle expiry.
pub async fn serve<B: BrowserTrait>(state: AppState<B>) -> Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);

    let store = state.store.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            let evicted = store.evict_expired().await;
            if evicted > 0 {
                info!(evicted, "idle sessions reclaimed");
            }
        }
    });

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "booking engine listening");
    axum::serve(listener, app)
        .await
        .map_err(|e| BookingError::ResourceFailure(e.to_string()))?;
    Ok(())
}

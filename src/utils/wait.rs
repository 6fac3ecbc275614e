use std::future::Future;
use std::time::{Duration, Instant};

/// How a bounded polling loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Predicate held before the budget ran out.
    Satisfied,
    /// Budget exhausted; the surrounding page may still be usable, so call
    /// sites decide whether this is fatal.
    TimedOut,
}

impl PollOutcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, PollOutcome::Satisfied)
    }
}

/// Poll `probe` every `interval` until it returns true or `timeout` elapses.
///
/// Replaces the fixed-sleep waits scattered through earlier automation code:
/// every "wait for X to appear/disappear" goes through here with an explicit
/// budget. A probe error counts as a failed probe, not an abort.
pub async fn poll_until<F, Fut>(timeout: Duration, interval: Duration, mut probe: F) -> PollOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();
    loop {
        if probe().await {
            return PollOutcome::Satisfied;
        }
        if start.elapsed() >= timeout {
            return PollOutcome::TimedOut;
        }
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn satisfied_on_first_probe() {
        let outcome = poll_until(
            Duration::from_millis(100),
            Duration::from_millis(10),
            || async { true },
        )
        .await;
        assert_eq!(outcome, PollOutcome::Satisfied);
    }

    #[tokio::test]
    async fn satisfied_after_several_probes() {
        let count = AtomicU32::new(0);
        let outcome = poll_until(
            Duration::from_millis(500),
            Duration::from_millis(5),
            || async {
                count.fetch_add(1, Ordering::SeqCst);
                count.load(Ordering::SeqCst) >= 3
            },
        )
        .await;
        assert_eq!(outcome, PollOutcome::Satisfied);
        assert!(count.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn times_out_when_predicate_never_holds() {
        let outcome = poll_until(
            Duration::from_millis(30),
            Duration::from_millis(5),
            || async { false },
        )
        .await;
        assert_eq!(outcome, PollOutcome::TimedOut);
    }
}

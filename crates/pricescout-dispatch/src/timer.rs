use std::future;

use tokio::time::{sleep_until, Duration, Instant};

/// Trailing-edge debounce timer owned by the dispatcher.
///
/// At most one deadline is armed; arming replaces it. [`fired`] never
/// resolves while nothing is armed.
///
/// [`fired`]: DebounceTimer::fired
#[derive(Debug)]
pub struct DebounceTimer {
    delay: Duration,
    armed: Option<(Instant, String)>,
}

impl DebounceTimer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay, armed: None }
    }

    /// Cancels any pending deadline and arms a new one for `query`.
    pub fn arm(&mut self, query: String) {
        self.armed = Some((Instant::now() + self.delay, query));
    }

    pub fn cancel(&mut self) {
        self.armed = None;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Waits for the armed deadline and returns its query, disarming the
    /// timer. Cancel-safe: dropping the future leaves the deadline armed.
    pub async fn fired(&mut self) -> String {
        let Some((deadline, _)) = &self.armed else {
            return future::pending().await;
        };
        sleep_until(*deadline).await;
        self.armed.take().map(|(_, query)| query).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let mut timer = DebounceTimer::new(Duration::from_millis(500));
        let start = Instant::now();
        timer.arm("tv".to_owned());
        assert_eq!(timer.fired().await, "tv");
        assert_eq!(start.elapsed(), Duration::from_millis(500));
        assert!(!timer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn rearm_restarts_the_delay() {
        let mut timer = DebounceTimer::new(Duration::from_millis(500));
        let start = Instant::now();
        timer.arm("tv".to_owned());
        tokio::time::sleep(Duration::from_millis(300)).await;
        timer.arm("tv stand".to_owned());
        assert_eq!(timer.fired().await, "tv stand");
        assert_eq!(start.elapsed(), Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn disarmed_timer_never_fires() {
        let mut timer = DebounceTimer::new(Duration::from_millis(500));
        timer.arm("tv".to_owned());
        timer.cancel();
        let fired = tokio::time::timeout(Duration::from_secs(5), timer.fired()).await;
        assert!(fired.is_err());
    }
}

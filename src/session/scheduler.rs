// Auto-refresh timer.
// A restartable one-shot owned by the session controller. Each arm sleeps
// once and posts a single RefreshTick; the controller decides whether to
// re-arm, so a slow fetch can never pile up overlapping ticks.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use super::events::AppEvent;

pub struct RefreshScheduler {
    tx: UnboundedSender<AppEvent>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn new(tx: UnboundedSender<AppEvent>) -> Self {
        Self { tx, handle: None }
    }

    /// Arm the timer. A zero interval is a no-op. An already-armed timer is
    /// superseded, never duplicated.
    pub fn start(&mut self, interval: Duration) {
        if interval.is_zero() {
            return;
        }
        self.stop();
        let tx = self.tx.clone();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            let _ = tx.send(AppEvent::RefreshTick);
        }));
    }

    /// Cancel the timer if armed. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_zero_interval_is_noop() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scheduler = RefreshScheduler::new(tx);
        scheduler.start(Duration::ZERO);
        assert!(!scheduler.is_active());
    }

    #[tokio::test]
    async fn test_fires_once_then_goes_idle() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = RefreshScheduler::new(tx);
        scheduler.start(Duration::from_millis(10));
        assert!(scheduler.is_active());

        let event = timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert!(matches!(event, Some(AppEvent::RefreshTick)));

        // One-shot: no second tick without a restart.
        let second = timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_restart_supersedes_previous_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = RefreshScheduler::new(tx);
        scheduler.start(Duration::from_millis(30));
        scheduler.start(Duration::from_millis(30));

        let first = timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert!(matches!(first, Some(AppEvent::RefreshTick)));
        // The superseded timer must not also fire.
        let second = timeout(Duration::from_millis(120), rx.recv()).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = RefreshScheduler::new(tx);
        scheduler.start(Duration::from_millis(50));
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_active());

        let tick = timeout(Duration::from_millis(120), rx.recv()).await;
        assert!(tick.is_err());
    }
}

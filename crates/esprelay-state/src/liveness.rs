//! Periodic device liveness expiry.
//!
//! Runs on a fixed period and expires the device push lease. The only
//! transition driven from here is Connected to Disconnected; the link
//! reconnects solely through pushes and handshakes.

use crate::DeviceLink;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Run the liveness monitor until the task is aborted.
pub async fn run_liveness_monitor(
    link: Arc<DeviceLink>,
    check_interval: Duration,
    timeout_window: Duration,
) {
    info!(
        check_interval_ms = check_interval.as_millis() as u64,
        timeout_window_ms = timeout_window.as_millis() as u64,
        "Starting liveness monitor"
    );

    let mut ticker = tokio::time::interval(check_interval);
    loop {
        ticker.tick().await;
        link.expire(timeout_window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_monitor_expires_stale_lease() {
        let link = Arc::new(DeviceLink::new());
        link.record_push();
        assert!(link.is_connected());

        let handle = tokio::spawn(run_liveness_monitor(
            link.clone(),
            Duration::from_millis(10),
            Duration::from_millis(30),
        ));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!link.is_connected());

        handle.abort();
    }

    #[tokio::test]
    async fn test_monitor_keeps_fresh_lease() {
        let link = Arc::new(DeviceLink::new());
        link.record_push();

        let handle = tokio::spawn(run_liveness_monitor(
            link.clone(),
            Duration::from_millis(10),
            Duration::from_secs(60),
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(link.is_connected());

        handle.abort();
    }
}

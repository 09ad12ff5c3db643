//! Repeating dwell-time tick.

use chrono::Utc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::tracker::ActivityTracker;

/// Dwell time is refreshed once a second.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Background task calling `ActivityTracker::tick` every [`TICK_INTERVAL`].
///
/// Must be spawned inside a tokio runtime. Stops on `stop()` or drop.
pub struct DwellTicker {
    handle: JoinHandle<()>,
}

impl DwellTicker {
    pub fn spawn(tracker: Arc<Mutex<ActivityTracker>>) -> Self {
        Self::with_interval(tracker, TICK_INTERVAL)
    }

    fn with_interval(tracker: Arc<Mutex<ActivityTracker>>, interval: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                let Ok(mut tracker) = tracker.lock() else {
                    tracing::warn!("activity tracker lock poisoned, stopping dwell ticker");
                    break;
                };
                if tracker.is_disposed() {
                    break;
                }
                tracker.tick(Utc::now());
            }
        });
        Self { handle }
    }

    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for DwellTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ActivityConfig;

    fn tracker_entered_secs_ago(secs: i64) -> Arc<Mutex<ActivityTracker>> {
        let entered = Utc::now() - chrono::Duration::seconds(secs);
        let mut tracker = ActivityTracker::new(&ActivityConfig::default(), entered);
        tracker.navigate("/curriculum/m1", entered);
        Arc::new(Mutex::new(tracker))
    }

    #[tokio::test]
    async fn ticker_refreshes_dwell_time() {
        let tracker = tracker_entered_secs_ago(30);
        let ticker = DwellTicker::with_interval(Arc::clone(&tracker), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        ticker.stop();

        assert!(tracker.lock().unwrap().snapshot().time_on_current_path_secs >= 30);
    }

    #[tokio::test]
    async fn stopped_ticker_no_longer_ticks() {
        let tracker = tracker_entered_secs_ago(30);
        let ticker = DwellTicker::with_interval(Arc::clone(&tracker), Duration::from_millis(10));
        ticker.stop();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(ticker.is_finished());
        assert_eq!(tracker.lock().unwrap().snapshot().time_on_current_path_secs, 0);
    }

    #[tokio::test]
    async fn default_ticker_ticks_on_start() {
        let tracker = tracker_entered_secs_ago(5);
        let ticker = DwellTicker::spawn(Arc::clone(&tracker));
        tokio::time::sleep(Duration::from_millis(50)).await;
        ticker.stop();

        assert!(tracker.lock().unwrap().snapshot().time_on_current_path_secs >= 5);
    }

    #[tokio::test]
    async fn ticker_exits_once_tracker_is_disposed() {
        let tracker = tracker_entered_secs_ago(1);
        tracker.lock().unwrap().dispose();
        let ticker = DwellTicker::with_interval(Arc::clone(&tracker), Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(ticker.is_finished());
    }
}

use super::sync::lock;
use crate::types::{DEFAULT_HEARTBEAT_CHECK_INTERVAL_MS, DEFAULT_HEARTBEAT_TIMEOUT_MS};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// Detects a channel that is open but no longer delivers heartbeat frames.
pub struct HeartbeatWatchdog {
    timeout: Duration,
    check_interval: Duration,
    last_heartbeat: Arc<Mutex<Option<Instant>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl HeartbeatWatchdog {
    pub fn new(timeout: Duration, check_interval: Duration) -> Self {
        Self {
            timeout,
            check_interval,
            last_heartbeat: Arc::new(Mutex::new(None)),
            task: Mutex::new(None),
        }
    }

    /// Records a heartbeat frame
    pub fn record_heartbeat(&self) {
        *lock(&self.last_heartbeat) = Some(Instant::now());
    }

    pub fn last_heartbeat(&self) -> Option<Instant> {
        *lock(&self.last_heartbeat)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// True once a heartbeat was seen and more than `timeout` has passed since
    pub fn is_stale(&self, now: Instant) -> bool {
        is_stale(&self.last_heartbeat, self.timeout, now)
    }

    /// Starts the periodic check, replacing any running one.
    ///
    /// The last-seen timestamp is set to now, so a channel that never sends a heartbeat
    /// is still caught. `on_stale` runs once, from inside the watchdog task, after which
    /// the task ends; it must not wait on anything that aborts the watchdog.
    pub fn start<F>(&self, on_stale: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.stop();
        self.record_heartbeat();

        let last_heartbeat = Arc::clone(&self.last_heartbeat);
        let timeout = self.timeout;
        let check_interval = self.check_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + check_interval, check_interval);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                if is_stale(&last_heartbeat, timeout, Instant::now()) {
                    tracing::warn!(
                        "No heartbeat for more than {:?}, forcing reconnect",
                        timeout
                    );
                    on_stale();
                    break;
                }
            }
            tracing::debug!("Heartbeat watchdog finished");
        });

        *lock(&self.task) = Some(handle);
    }

    /// Stops the periodic check. Safe to call when not running.
    pub fn stop(&self) {
        if let Some(handle) = lock(&self.task).take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.task)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

fn is_stale(last_heartbeat: &Mutex<Option<Instant>>, timeout: Duration, now: Instant) -> bool {
    match *lock(last_heartbeat) {
        Some(last) => now.saturating_duration_since(last) > timeout,
        None => false,
    }
}

impl Default for HeartbeatWatchdog {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_HEARTBEAT_TIMEOUT_MS),
            Duration::from_millis(DEFAULT_HEARTBEAT_CHECK_INTERVAL_MS),
        )
    }
}

impl Drop for HeartbeatWatchdog {
    fn drop(&mut self) {
        self.stop();
    }
}

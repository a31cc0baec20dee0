/// Named server-push frame types (magic strings layer)
pub mod frame_events {
    pub const MESSAGE: &str = "message";
    pub const NOTIFICATION: &str = "notification";
    pub const HEARTBEAT: &str = "heartbeat";
    pub const LEAD_UPDATE: &str = "lead-update";
}

/// Locally emitted event names
pub mod client_events {
    pub const CONNECTION: &str = "connection";
    pub const MESSAGE: &str = "message";
    pub const NOTIFICATION: &str = "notification";
    pub const LEAD_UPDATE: &str = "lead-update";
    pub const ERROR: &str = "error";
}

/// REST paths, relative to the client endpoint
pub mod api_paths {
    pub const STREAM: &str = "/notifications/stream";
    pub const VAPID_PUBLIC_KEY: &str = "/notifications/vapid-public-key";
    pub const SUBSCRIBE: &str = "/notifications/subscribe";
    pub const SEND: &str = "/notifications/send";
    pub const HISTORY: &str = "/notifications/history";
    pub const READ: &str = "/notifications/read";
}

/// Initial reconnect delay (milliseconds)
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// Reconnect attempts before the client gives up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Silence after which the channel is considered dead (milliseconds)
pub const DEFAULT_HEARTBEAT_TIMEOUT_MS: u64 = 30_000;

/// Watchdog poll period (milliseconds)
pub const DEFAULT_HEARTBEAT_CHECK_INTERVAL_MS: u64 = 10_000;

/// Non-urgent OS notifications are closed after this long (milliseconds)
pub const DEFAULT_AUTO_DISMISS_MS: u64 = 5000;

/// Tag used when a notification carries no id
pub const DEFAULT_NOTIFICATION_TAG: &str = "notification";

/// Shown notifications tracked for clicks; the oldest is closed beyond this
pub const DEFAULT_MAX_VISIBLE_NOTIFICATIONS: usize = 100;

/// Background worker script registered for push delivery
pub const DEFAULT_WORKER_SCRIPT: &str = "/sw.js";

/// Terminal error message once retries are exhausted
pub const MAX_ATTEMPTS_REACHED: &str = "Max reconnection attempts reached";

//! # Realtime Notifications
//!
//! A long-lived client for real-time notification delivery over Server-Sent Events.
//!
//! The client keeps one server-push channel open, restarts it with exponential backoff
//! when it fails, forces a restart when heartbeats stop arriving, shows delivered
//! notifications on the host's notification surface, and fans every event out to
//! registered listeners. Push registration for background delivery runs independently.
//!
//! ## Example
//!
//! ```no_run
//! use realtime_notifications::{
//!     ClientEvent, EventKind, NotificationClient, NotificationClientOptions,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NotificationClient::new(
//!         "https://crm.example.com/api",
//!         NotificationClientOptions {
//!             user_id: Some("u1".to_string()),
//!             ..Default::default()
//!         },
//!     )?;
//!
//!     client.on(EventKind::Notification, |event| {
//!         if let ClientEvent::Notification(n) = event {
//!             println!("{}: {}", n.title, n.message);
//!         }
//!     });
//!
//!     client.initialize().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod infrastructure;
pub mod messaging;
pub mod presenter;
pub mod push;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{
    ConnectReason, ConnectionState, NotificationClient, NotificationClientBuilder,
    NotificationClientOptions,
};
pub use infrastructure::{HeartbeatWatchdog, NotificationApi, ReconnectPolicy};
pub use messaging::{ClientEvent, EventKind, Listener, ListenerRegistry};
pub use presenter::{
    NotificationPresenter, NotificationSurface, OsNotification, Permission, Presentation,
    TracingSurface,
};
pub use push::{PushRegistrar, PushStatus, PushSubscriptionManager, SubscribeOptions};
pub use transport::{EventStreamConnector, FrameStream, ServerFrame, SseConnector};
pub use types::{
    Notification, NotificationAction, NotificationDraft, NotificationError, NotificationType,
    Result, Subscription, SubscriptionKeys,
};

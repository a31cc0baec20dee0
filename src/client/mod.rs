// Module declarations
mod builder;
mod connection;
mod core;
mod state;

// Public API exports
pub use builder::{NotificationClientBuilder, NotificationClientOptions};
pub use connection::{ConnectReason, ConnectionState};
pub use core::NotificationClient;
pub use state::ClientState;

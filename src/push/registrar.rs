use crate::types::{Result, Subscription};
use futures::future::BoxFuture;

/// Options for a push subscription request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// Every push must result in a user-visible notification
    pub user_visible_only: bool,
    /// Decoded application server (VAPID) public key
    pub application_server_key: Vec<u8>,
}

/// Host capability for background-worker registration and push subscription.
pub trait PushRegistrar: Send + Sync {
    /// Registers the background worker script that receives pushes
    fn register_worker<'a>(&'a self, script: &'a str) -> BoxFuture<'a, Result<()>>;

    /// Requests a push subscription from the host's push service
    fn subscribe(&self, options: SubscribeOptions) -> BoxFuture<'_, Result<Subscription>>;
}

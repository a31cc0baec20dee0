// Push module - Out-of-band delivery registration
mod manager;
mod registrar;

pub use manager::{PushStatus, PushSubscriptionManager, decode_application_server_key};
pub use registrar::{PushRegistrar, SubscribeOptions};

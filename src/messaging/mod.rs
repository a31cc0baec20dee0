// Messaging module - Event types, listener registry and frame routing
pub mod event;
pub mod registry;
pub mod router;

pub use event::{ClientEvent, EventKind, FrameKind};
pub use registry::{Listener, ListenerRegistry};
pub use router::MessageRouter;

// Infrastructure module - Background services and REST access
pub mod heartbeat;
pub mod http;
pub(crate) mod sync;
pub mod task_manager;
pub mod timer;

pub use heartbeat::HeartbeatWatchdog;
pub use http::NotificationApi;
pub use task_manager::TaskManager;
pub use timer::ReconnectPolicy;

// Presenter module - OS-level notification display
mod core;
mod surface;

pub use core::{NotificationPresenter, Presentation};
pub use surface::{NotificationSurface, OsNotification, Permission, TracingSurface};

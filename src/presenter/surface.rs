use crate::types::{NotificationAction, Result};

/// Notification permission as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// Never asked
    Default,
}

/// Notification handed to the OS surface
#[derive(Debug, Clone, PartialEq)]
pub struct OsNotification {
    /// Notifications sharing a tag replace each other
    pub tag: String,
    pub title: String,
    pub body: String,
    pub require_interaction: bool,
    pub url: Option<String>,
    pub actions: Vec<NotificationAction>,
}

/// The host's notification surface and window.
pub trait NotificationSurface: Send + Sync {
    fn permission(&self) -> Permission;

    fn show(&self, notification: &OsNotification) -> Result<()>;

    /// Closes the notification with this tag if it is still visible
    fn close(&self, tag: &str);

    fn focus_window(&self);

    fn navigate(&self, url: &str);
}

/// Headless surface that only logs
#[derive(Debug, Clone)]
pub struct TracingSurface {
    permission: Permission,
}

impl TracingSurface {
    pub fn new(permission: Permission) -> Self {
        Self { permission }
    }
}

impl Default for TracingSurface {
    fn default() -> Self {
        Self::new(Permission::Granted)
    }
}

impl NotificationSurface for TracingSurface {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn show(&self, notification: &OsNotification) -> Result<()> {
        tracing::info!(
            tag = %notification.tag,
            require_interaction = notification.require_interaction,
            "{}: {}",
            notification.title,
            notification.body
        );
        Ok(())
    }

    fn close(&self, tag: &str) {
        tracing::debug!("Closed notification {}", tag);
    }

    fn focus_window(&self) {
        tracing::debug!("Focus window requested");
    }

    fn navigate(&self, url: &str) {
        tracing::info!("Navigate to {}", url);
    }
}

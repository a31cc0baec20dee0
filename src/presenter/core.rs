use super::surface::{NotificationSurface, OsNotification, Permission};
use crate::types::{
    DEFAULT_AUTO_DISMISS_MS, DEFAULT_MAX_VISIBLE_NOTIFICATIONS, DEFAULT_NOTIFICATION_TAG,
    Notification,
};
use std::collections::HashMap;
use crate::infrastructure::sync::lock;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Outcome of presenting a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Shown,
    /// Addressed to a different user
    ForeignUser,
    PermissionNotGranted,
    /// The surface refused to show it
    SurfaceFailed,
}

struct Visible {
    serial: u64,
    url: Option<String>,
}

#[derive(Default)]
struct VisibleSet {
    next_serial: u64,
    by_tag: HashMap<String, Visible>,
}

impl VisibleSet {
    /// Drops the oldest entries until at most `max` remain, returning their tags
    fn evict_oldest(&mut self, max: usize) -> Vec<String> {
        let mut evicted = Vec::new();
        while self.by_tag.len() > max {
            let Some(oldest) = self
                .by_tag
                .iter()
                .min_by_key(|(_, entry)| entry.serial)
                .map(|(tag, _)| tag.clone())
            else {
                break;
            };
            self.by_tag.remove(&oldest);
            evicted.push(oldest);
        }
        evicted
    }
}

/// Turns delivered notifications into OS notifications.
///
/// Notifications addressed to another user, or arriving without permission, are not
/// shown. Non-urgent notifications close themselves after the auto-dismiss delay.
/// At most `max_visible` shown notifications are tracked; presenting one more closes
/// the oldest.
pub struct NotificationPresenter {
    surface: Arc<dyn NotificationSurface>,
    current_user: Option<String>,
    auto_dismiss: Duration,
    max_visible: usize,
    visible: Arc<Mutex<VisibleSet>>,
}

impl NotificationPresenter {
    pub fn new(surface: Arc<dyn NotificationSurface>, current_user: Option<String>) -> Self {
        Self {
            surface,
            current_user,
            auto_dismiss: Duration::from_millis(DEFAULT_AUTO_DISMISS_MS),
            max_visible: DEFAULT_MAX_VISIBLE_NOTIFICATIONS,
            visible: Arc::new(Mutex::new(VisibleSet::default())),
        }
    }

    pub fn with_auto_dismiss(mut self, auto_dismiss: Duration) -> Self {
        self.auto_dismiss = auto_dismiss;
        self
    }

    pub fn with_max_visible(mut self, max_visible: usize) -> Self {
        self.max_visible = max_visible.max(1);
        self
    }

    pub fn current_user(&self) -> Option<&str> {
        self.current_user.as_deref()
    }

    pub fn present(&self, notification: &Notification) -> Presentation {
        if let Some(owner) = notification.user_id.as_deref()
            && self.current_user.as_deref() != Some(owner)
        {
            tracing::debug!(
                "Notification {} addressed to another user, not shown",
                notification.id
            );
            return Presentation::ForeignUser;
        }

        if self.surface.permission() != Permission::Granted {
            tracing::debug!(
                "Notification permission not granted, {} not shown",
                notification.id
            );
            return Presentation::PermissionNotGranted;
        }

        let os_notification = build_os_notification(notification);
        if let Err(e) = self.surface.show(&os_notification) {
            tracing::error!("Failed to show notification {}: {}", notification.id, e);
            return Presentation::SurfaceFailed;
        }

        let (serial, evicted) = {
            let mut visible = lock(&self.visible);
            visible.next_serial += 1;
            let serial = visible.next_serial;
            visible.by_tag.insert(
                os_notification.tag.clone(),
                Visible {
                    serial,
                    url: os_notification.url.clone(),
                },
            );
            (serial, visible.evict_oldest(self.max_visible))
        };

        for tag in evicted {
            tracing::debug!("Closing notification {} to make room", tag);
            self.surface.close(&tag);
        }

        if !os_notification.require_interaction {
            self.schedule_dismiss(os_notification.tag, serial);
        }

        Presentation::Shown
    }

    fn schedule_dismiss(&self, tag: String, serial: u64) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No runtime available, notification {} will not auto-close", tag);
            return;
        };

        let surface = Arc::clone(&self.surface);
        let visible = Arc::clone(&self.visible);
        let delay = self.auto_dismiss;

        runtime.spawn(async move {
            tokio::time::sleep(delay).await;

            // A replacement under the same tag keeps its own timer
            let still_current = {
                let mut visible = lock(&visible);
                match visible.by_tag.get(&tag) {
                    Some(entry) if entry.serial == serial => {
                        visible.by_tag.remove(&tag);
                        true
                    }
                    _ => false,
                }
            };

            if still_current {
                tracing::debug!("Auto-closing notification {}", tag);
                surface.close(&tag);
            }
        });
    }

    /// Click on a shown notification: focus the window, follow its url, close it.
    pub fn handle_click(&self, tag: &str) {
        let url = lock(&self.visible)
            .by_tag
            .remove(tag)
            .and_then(|entry| entry.url);

        self.surface.focus_window();
        if let Some(url) = url {
            self.surface.navigate(&url);
        }
        self.surface.close(tag);
    }

    /// The OS closed a notification on its own (user swipe, system timeout).
    ///
    /// Forgets it without calling back into the surface; a pending auto-dismiss for
    /// the tag becomes a no-op.
    pub fn handle_close(&self, tag: &str) {
        if lock(&self.visible).by_tag.remove(tag).is_some() {
            tracing::debug!("Notification {} closed by the system", tag);
        }
    }

    /// Action button pressed on a shown notification
    pub fn handle_action(&self, tag: &str, action: &str) {
        tracing::debug!("Action '{}' on notification {}", action, tag);
        self.handle_click(tag);
    }

    pub fn is_visible(&self, tag: &str) -> bool {
        lock(&self.visible).by_tag.contains_key(tag)
    }

    /// Number of shown notifications still tracked
    pub fn visible_count(&self) -> usize {
        lock(&self.visible).by_tag.len()
    }
}

fn build_os_notification(notification: &Notification) -> OsNotification {
    let tag = if notification.id.is_empty() {
        DEFAULT_NOTIFICATION_TAG.to_string()
    } else {
        notification.id.clone()
    };

    OsNotification {
        tag,
        title: notification.title.clone(),
        body: notification.message.clone(),
        require_interaction: notification.kind.is_urgent(),
        url: notification.url.clone(),
        actions: notification.actions.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingSurface, SurfaceCall};
    use crate::types::NotificationType;

    fn presenter(surface: &Arc<RecordingSurface>) -> NotificationPresenter {
        let surface: Arc<dyn NotificationSurface> = surface.clone();
        NotificationPresenter::new(surface, Some("u1".to_string()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_shows_own_notification_tagged_by_id() {
        let surface = Arc::new(RecordingSurface::granted());
        let presenter = presenter(&surface);

        let notification =
            Notification::new("n1", NotificationType::Info, "T", "M").with_user_id("u1");
        assert_eq!(presenter.present(&notification), Presentation::Shown);

        let shown = surface.shown();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].tag, "n1");
        assert_eq!(shown[0].title, "T");
        assert_eq!(shown[0].body, "M");
        assert!(!shown[0].require_interaction);
    }

    #[tokio::test(start_paused = true)]
    async fn test_foreign_user_is_never_shown() {
        let surface = Arc::new(RecordingSurface::granted());
        let presenter = presenter(&surface);

        let notification =
            Notification::new("n1", NotificationType::Info, "T", "M").with_user_id("u2");
        assert_eq!(presenter.present(&notification), Presentation::ForeignUser);
        assert!(surface.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_without_owner_is_shown() {
        let surface = Arc::new(RecordingSurface::granted());
        let presenter = presenter(&surface);

        let notification = Notification::new("n1", NotificationType::Info, "T", "M");
        assert_eq!(presenter.present(&notification), Presentation::Shown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permission_gate() {
        let surface = Arc::new(RecordingSurface::new(Permission::Denied));
        let presenter = presenter(&surface);

        let notification = Notification::new("n1", NotificationType::Info, "T", "M");
        assert_eq!(
            presenter.present(&notification),
            Presentation::PermissionNotGranted
        );
        assert!(surface.shown().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_urgent_auto_closes_at_five_seconds() {
        let surface = Arc::new(RecordingSurface::granted());
        let presenter = presenter(&surface);

        presenter.present(&Notification::new("n1", NotificationType::Success, "T", "M"));

        tokio::time::sleep(Duration::from_millis(4999)).await;
        assert!(surface.closed().is_empty());
        assert!(presenter.is_visible("n1"));

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(surface.closed(), vec!["n1".to_string()]);
        assert!(!presenter.is_visible("n1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_urgent_requires_interaction_and_stays_open() {
        let surface = Arc::new(RecordingSurface::granted());
        let presenter = presenter(&surface);

        presenter.present(&Notification::new("n1", NotificationType::Urgent, "T", "M"));
        assert!(surface.shown()[0].require_interaction);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(surface.closed().is_empty());
        assert!(presenter.is_visible("n1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replaced_tag_keeps_its_own_timer() {
        let surface = Arc::new(RecordingSurface::granted());
        let presenter = presenter(&surface);

        presenter.present(&Notification::new("", NotificationType::Info, "first", "M"));
        tokio::time::sleep(Duration::from_secs(3)).await;
        presenter.present(&Notification::new("", NotificationType::Info, "second", "M"));

        // First timer expires at 5s but the replacement is still current
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(surface.closed().is_empty());

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(surface.closed(), vec![DEFAULT_NOTIFICATION_TAG.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_focuses_navigates_and_closes() {
        let surface = Arc::new(RecordingSurface::granted());
        let presenter = presenter(&surface);

        presenter.present(
            &Notification::new("n1", NotificationType::Urgent, "T", "M").with_url("/leads/7"),
        );
        presenter.handle_click("n1");

        let calls = surface.calls();
        assert_eq!(
            calls[1..].to_vec(),
            vec![
                SurfaceCall::Focus,
                SurfaceCall::Navigate("/leads/7".to_string()),
                SurfaceCall::Close("n1".to_string()),
            ]
        );
        assert!(!presenter.is_visible("n1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_system_close_forgets_notification() {
        let surface = Arc::new(RecordingSurface::granted());
        let presenter = presenter(&surface);

        presenter.present(&Notification::new("n1", NotificationType::Urgent, "T", "M"));
        presenter.present(&Notification::new("n2", NotificationType::Info, "T", "M"));

        presenter.handle_close("n1");
        presenter.handle_close("n2");
        presenter.handle_close("unknown");
        assert_eq!(presenter.visible_count(), 0);

        // The pending auto-dismiss for n2 no longer touches the surface
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(surface.closed().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_urgent_notifications_are_bounded() {
        let surface = Arc::new(RecordingSurface::granted());
        let presenter = presenter(&surface).with_max_visible(3);

        for i in 0..5 {
            let id = format!("n{}", i);
            presenter.present(&Notification::new(id, NotificationType::Urgent, "T", "M"));
        }

        assert_eq!(presenter.visible_count(), 3);
        assert!(!presenter.is_visible("n0"));
        assert!(!presenter.is_visible("n1"));
        assert!(presenter.is_visible("n4"));
        assert_eq!(surface.closed(), vec!["n0".to_string(), "n1".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_run_of_urgent_notifications_stays_within_default_bound() {
        let surface = Arc::new(RecordingSurface::granted());
        let presenter = presenter(&surface);

        for i in 0..1000 {
            let id = format!("n{}", i);
            presenter.present(&Notification::new(id, NotificationType::Urgent, "T", "M"));
        }
        tokio::time::sleep(Duration::from_secs(3600)).await;

        assert_eq!(presenter.visible_count(), DEFAULT_MAX_VISIBLE_NOTIFICATIONS);
        assert!(presenter.is_visible("n999"));
    }
}

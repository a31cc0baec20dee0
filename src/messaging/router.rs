use super::{ClientEvent, FrameKind, ListenerRegistry};
use crate::infrastructure::HeartbeatWatchdog;
use crate::presenter::NotificationPresenter;
use crate::transport::ServerFrame;
use crate::types::Notification;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Routes inbound frames to the watchdog, the presenter and listeners
pub struct MessageRouter {
    listeners: Arc<ListenerRegistry>,
    watchdog: Arc<HeartbeatWatchdog>,
    presenter: Arc<NotificationPresenter>,
}

impl MessageRouter {
    pub fn new(
        listeners: Arc<ListenerRegistry>,
        watchdog: Arc<HeartbeatWatchdog>,
        presenter: Arc<NotificationPresenter>,
    ) -> Self {
        Self {
            listeners,
            watchdog,
            presenter,
        }
    }

    /// Routes one frame. Malformed payloads are logged and dropped.
    pub fn route(&self, frame: ServerFrame) {
        match FrameKind::classify(frame.event.as_deref()) {
            FrameKind::Heartbeat => {
                tracing::trace!("Heartbeat received");
                self.watchdog.record_heartbeat();
            }
            FrameKind::Message => {
                if let Some(payload) = parse_frame::<Value>(&frame) {
                    self.listeners.emit(&ClientEvent::Message(payload));
                }
            }
            FrameKind::Notification => {
                if let Some(notification) = parse_frame::<Notification>(&frame) {
                    self.handle_notification(notification);
                }
            }
            FrameKind::LeadUpdate => {
                if let Some(payload) = parse_frame::<Value>(&frame) {
                    self.listeners.emit(&ClientEvent::LeadUpdate(payload));
                }
            }
            FrameKind::Unknown(name) => {
                tracing::debug!("Ignoring frame with unknown event '{}'", name);
            }
        }
    }

    /// Shows the notification (subject to presenter policy) and forwards it to listeners
    pub fn handle_notification(&self, notification: Notification) {
        tracing::debug!(
            "Notification {} ({}) received",
            notification.id,
            notification.kind
        );
        let outcome = self.presenter.present(&notification);
        tracing::trace!("Presentation of {}: {:?}", notification.id, outcome);
        self.listeners.emit(&ClientEvent::Notification(notification));
    }
}

fn parse_frame<T: DeserializeOwned>(frame: &ServerFrame) -> Option<T> {
    match serde_json::from_str(&frame.data) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(
                event = frame.event.as_deref().unwrap_or("message"),
                error = %e,
                "Dropping malformed frame: {}",
                frame.data
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::EventKind;
    use crate::presenter::{NotificationSurface, Permission};
    use crate::test_support::RecordingSurface;
    use serde_json::json;

    struct Fixture {
        router: MessageRouter,
        listeners: Arc<ListenerRegistry>,
        watchdog: Arc<HeartbeatWatchdog>,
        surface: Arc<RecordingSurface>,
    }

    fn fixture() -> Fixture {
        fixture_with(Permission::Granted)
    }

    fn fixture_with(permission: Permission) -> Fixture {
        let listeners = Arc::new(ListenerRegistry::new());
        let watchdog = Arc::new(HeartbeatWatchdog::default());
        let surface = Arc::new(RecordingSurface::new(permission));
        let dyn_surface: Arc<dyn NotificationSurface> = surface.clone();
        let presenter = Arc::new(NotificationPresenter::new(
            dyn_surface,
            Some("u1".to_string()),
        ));
        let router = MessageRouter::new(
            Arc::clone(&listeners),
            Arc::clone(&watchdog),
            presenter,
        );
        Fixture {
            router,
            listeners,
            watchdog,
            surface,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_frame_is_emitted_as_message() {
        let f = fixture();
        let mut rx = f.listeners.receiver(EventKind::Message);

        f.router.route(ServerFrame::new(None, r#"{"text":"hi"}"#));
        assert_eq!(
            rx.try_recv().unwrap(),
            ClientEvent::Message(json!({"text": "hi"}))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_lead_update_is_passed_through() {
        let f = fixture();
        let mut rx = f.listeners.receiver(EventKind::LeadUpdate);

        f.router.route(ServerFrame::new(
            Some("lead-update"),
            r#"{"leadId":7,"status":"won"}"#,
        ));
        assert_eq!(
            rx.try_recv().unwrap(),
            ClientEvent::LeadUpdate(json!({"leadId": 7, "status": "won"}))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_updates_watchdog() {
        let f = fixture();
        assert!(f.watchdog.last_heartbeat().is_none());

        f.router.route(ServerFrame::new(Some("heartbeat"), ""));
        assert!(f.watchdog.last_heartbeat().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_frames_are_dropped() {
        let f = fixture();
        let mut messages = f.listeners.receiver(EventKind::Message);
        let mut notifications = f.listeners.receiver(EventKind::Notification);

        f.router.route(ServerFrame::new(None, "{not json"));
        f.router.route(ServerFrame::new(Some("notification"), r#"{"id":"n1"}"#));

        assert!(messages.try_recv().is_err());
        assert!(notifications.try_recv().is_err());
        assert!(f.surface.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_foreign_notification_reaches_listeners_only() {
        let f = fixture();
        let mut rx = f.listeners.receiver(EventKind::Notification);

        f.router.route(ServerFrame::new(
            Some("notification"),
            r#"{"id":"n9","type":"info","title":"T","message":"M","userId":"u2"}"#,
        ));

        match rx.try_recv().unwrap() {
            ClientEvent::Notification(n) => assert_eq!(n.id, "n9"),
            other => panic!("unexpected event {:?}", other),
        }
        assert!(f.surface.shown().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_with_numeric_fields_is_delivered() {
        let f = fixture();
        let mut rx = f.listeners.receiver(EventKind::Notification);

        let epoch_millis = json!({
            "id": "n1",
            "type": "info",
            "title": "T",
            "message": "M",
            "timestamp": 1700000000000u64,
            "userId": "u1",
        });
        f.router.route(ServerFrame::new(
            Some("notification"),
            epoch_millis.to_string(),
        ));
        f.router.route(ServerFrame::new(
            Some("notification"),
            r#"{"id":1700000000000,"type":"info","title":"T","message":"M"}"#,
        ));

        let ids: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|event| match event {
                ClientEvent::Notification(n) => n.id,
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(ids, vec!["n1".to_string(), "1700000000000".to_string()]);
        assert_eq!(f.surface.shown().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_without_permission_still_reaches_listeners() {
        let f = fixture_with(Permission::Denied);
        let mut rx = f.listeners.receiver(EventKind::Notification);

        f.router.route(ServerFrame::new(
            Some("notification"),
            r#"{"id":"n3","type":"urgent","title":"T","message":"M","userId":"u1"}"#,
        ));

        match rx.try_recv().unwrap() {
            ClientEvent::Notification(n) => assert_eq!(n.id, "n3"),
            other => panic!("unexpected event {:?}", other),
        }
        assert!(f.surface.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_frames_are_ignored() {
        let f = fixture();
        let mut rx = f.listeners.receiver(EventKind::Message);
        f.router.route(ServerFrame::new(Some("presence"), "{}"));
        assert!(rx.try_recv().is_err());
    }
}

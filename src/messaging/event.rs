use crate::types::Notification;
use crate::types::constants::{client_events, frame_events};
use serde::Serialize;
use serde_json::Value;

/// Event emitted to in-app consumers.
///
/// Each variant is one event name; consumers match exhaustively instead of probing
/// loosely-typed payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Channel opened or closed
    Connection { connected: bool },

    /// Default (unnamed) frame, parsed JSON
    Message(Value),

    /// Delivered notification
    Notification(Notification),

    /// `lead-update` frame, passed through verbatim
    LeadUpdate(Value),

    /// Transport failure
    Error { error: String },
}

impl ClientEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Connection { .. } => EventKind::Connection,
            Self::Message(_) => EventKind::Message,
            Self::Notification(_) => EventKind::Notification,
            Self::LeadUpdate(_) => EventKind::LeadUpdate,
            Self::Error { .. } => EventKind::Error,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}

/// Discriminant of [`ClientEvent`], used as the listener registry key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Connection,
    Message,
    Notification,
    LeadUpdate,
    Error,
}

impl EventKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            client_events::CONNECTION => Some(Self::Connection),
            client_events::MESSAGE => Some(Self::Message),
            client_events::NOTIFICATION => Some(Self::Notification),
            client_events::LEAD_UPDATE => Some(Self::LeadUpdate),
            client_events::ERROR => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connection => client_events::CONNECTION,
            Self::Message => client_events::MESSAGE,
            Self::Notification => client_events::NOTIFICATION,
            Self::LeadUpdate => client_events::LEAD_UPDATE,
            Self::Error => client_events::ERROR,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of an inbound server-push frame by its event name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameKind {
    Message,
    Notification,
    Heartbeat,
    LeadUpdate,
    Unknown(String),
}

impl FrameKind {
    /// `None` and the SSE default name `message` both map to [`FrameKind::Message`]
    pub fn classify(event: Option<&str>) -> Self {
        match event {
            None | Some("") | Some(frame_events::MESSAGE) => Self::Message,
            Some(frame_events::NOTIFICATION) => Self::Notification,
            Some(frame_events::HEARTBEAT) => Self::Heartbeat,
            Some(frame_events::LEAD_UPDATE) => Self::LeadUpdate,
            Some(other) => Self::Unknown(other.to_string()),
        }
    }
}

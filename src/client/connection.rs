/// Lifecycle state of the server-push channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Waiting for a scheduled retry
    Reconnecting,
    /// Retries exhausted; only an explicit `connect()` leaves this state
    Failed,
}

impl ConnectionState {
    /// Connecting or connected; `connect()` is a no-op in these states
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a connection attempt is being made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectReason {
    /// Application or user request
    Explicit,
    /// Backoff timer fired
    Retry,
    /// Heartbeat watchdog found the channel silent
    Stale,
}

/// How an open channel was lost
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ChannelLoss {
    Closed,
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_states() {
        assert!(ConnectionState::Connecting.is_active());
        assert!(ConnectionState::Connected.is_active());
        assert!(!ConnectionState::Reconnecting.is_active());
        assert!(!ConnectionState::Failed.is_active());
        assert!(!ConnectionState::Disconnected.is_active());
    }
}

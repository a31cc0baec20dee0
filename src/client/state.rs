use super::connection::ConnectionState;
use crate::infrastructure::{ReconnectPolicy, TaskManager};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Consolidated mutable state for NotificationClient
pub struct ClientState {
    /// Current channel state; change only through `set_connection`
    connection: ConnectionState,

    /// Bumped on every open attempt and every disconnect; continuations
    /// from an older generation are discarded
    pub generation: u64,

    pub policy: ReconnectPolicy,

    /// Stream reader for the current channel
    pub readers: TaskManager,

    /// Pending backoff timer
    pub reconnect_task: Option<JoinHandle<()>>,

    /// Push registration started by `initialize()`
    pub push_task: Option<JoinHandle<()>>,

    state_tx: watch::Sender<ConnectionState>,
}

impl ClientState {
    pub fn new(policy: ReconnectPolicy) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            connection: ConnectionState::Disconnected,
            generation: 0,
            policy,
            readers: TaskManager::new(),
            reconnect_task: None,
            push_task: None,
            state_tx,
        }
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// Set connection state and notify watchers
    pub fn set_connection(&mut self, state: ConnectionState) {
        if self.connection != state {
            tracing::debug!("Connection state {} -> {}", self.connection, state);
        }
        self.connection = state;
        self.state_tx.send_replace(state);
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Abort the pending backoff timer, if any
    pub fn cancel_reconnect(&mut self) {
        if let Some(handle) = self.reconnect_task.take() {
            handle.abort();
        }
    }
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new(ReconnectPolicy::default())
    }
}

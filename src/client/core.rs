use super::connection::{ChannelLoss, ConnectReason, ConnectionState};
use super::{ClientState, NotificationClientBuilder, NotificationClientOptions};
use crate::infrastructure::{HeartbeatWatchdog, NotificationApi};
use crate::messaging::{ClientEvent, EventKind, Listener, ListenerRegistry, MessageRouter};
use crate::presenter::NotificationPresenter;
use crate::push::PushSubscriptionManager;
use crate::transport::{EventStreamConnector, FrameStream};
use crate::types::{MAX_ATTEMPTS_REACHED, Notification, NotificationError, Result};
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc, watch};

/// Real-time notification client.
///
/// `NotificationClient` owns one server-push channel at a time, restarts it with
/// exponential backoff when it fails, watches for silent channels via heartbeat
/// frames, and fans delivered events out to listeners and the OS notification surface.
///
/// The client is a cheap handle; clones share the same channel.
///
/// # Example
///
/// ```no_run
/// use realtime_notifications::{EventKind, NotificationClient, NotificationClientOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = NotificationClient::new(
///     "https://crm.example.com/api",
///     NotificationClientOptions {
///         user_id: Some("u1".to_string()),
///         ..Default::default()
///     },
/// )?;
///
/// client.on(EventKind::Notification, |event| println!("{:?}", event));
/// client.initialize().await?;
/// // ...
/// client.dispose().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NotificationClient {
    pub(crate) stream_url: String,
    pub(crate) connector: Arc<dyn EventStreamConnector>,
    pub(crate) api: NotificationApi,
    pub(crate) listeners: Arc<ListenerRegistry>,
    pub(crate) presenter: Arc<NotificationPresenter>,
    pub(crate) watchdog: Arc<HeartbeatWatchdog>,
    pub(crate) router: Arc<MessageRouter>,
    pub(crate) push: Arc<PushSubscriptionManager>,

    // Consolidated mutable state
    pub(crate) state: Arc<RwLock<ClientState>>,
}

impl NotificationClient {
    /// Creates a client with the default SSE connector and logging surface.
    ///
    /// No connection is opened; call [`initialize()`](Self::initialize) or
    /// [`connect()`](Self::connect).
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Base URL of the notification API (e.g. `https://crm.example.com/api`)
    /// * `options` - Current user, retry and heartbeat settings; unset fields use defaults
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::UrlParse`] for a malformed endpoint and
    /// [`NotificationError::Config`] for invalid options.
    pub fn new(endpoint: impl Into<String>, options: NotificationClientOptions) -> Result<Self> {
        NotificationClientBuilder::new(endpoint, options).map(|builder| builder.build())
    }

    /// Returns a builder for replacing the connector, OS surface, push registrar or
    /// HTTP client before the client is assembled.
    ///
    /// # Errors
    ///
    /// Same validation as [`new()`](Self::new).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use realtime_notifications::{NotificationClient, TracingSurface};
    /// use std::sync::Arc;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = NotificationClient::builder("https://crm.example.com/api", Default::default())?
    ///     .surface(Arc::new(TracingSurface::default()))
    ///     .build();
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder(
        endpoint: impl Into<String>,
        options: NotificationClientOptions,
    ) -> Result<NotificationClientBuilder> {
        NotificationClientBuilder::new(endpoint, options)
    }

    /// Starts push registration in the background and opens the channel.
    ///
    /// Push registration never blocks or fails this call; its outcome is logged.
    ///
    /// # Errors
    ///
    /// Returns the channel open failure, as [`connect()`](Self::connect) does.
    pub async fn initialize(&self) -> Result<()> {
        let push = Arc::clone(&self.push);
        let handle = tokio::spawn(async move {
            let status = push.initialize().await;
            tracing::debug!("Push registration finished: {:?}", status);
        });
        if let Some(previous) = self.state.write().await.push_task.replace(handle) {
            previous.abort();
        }

        self.connect().await
    }

    /// Closes the channel and stops all background work.
    ///
    /// Listeners stay registered; the client can be initialized again.
    pub async fn dispose(&self) {
        if let Some(handle) = self.state.write().await.push_task.take() {
            handle.abort();
        }
        self.disconnect().await;
        tracing::info!("Notification client disposed");
    }

    /// Opens the server-push channel.
    ///
    /// No-op while connecting or connected. A call from the `Failed` state starts a
    /// fresh retry budget. On success `connection {connected: true}` is emitted and the
    /// heartbeat watchdog starts.
    ///
    /// # Errors
    ///
    /// Returns the open failure. A retry has already been scheduled when this returns
    /// an error, unless the retry ceiling was reached.
    pub async fn connect(&self) -> Result<()> {
        self.open_channel(ConnectReason::Explicit, None).await
    }

    /// Closes the channel, stops the watchdog and cancels any pending retry.
    ///
    /// Idempotent; never schedules a reconnect and emits no event.
    pub async fn disconnect(&self) {
        let mut state = self.state.write().await;
        state.next_generation();
        state.readers.abort_all();
        state.cancel_reconnect();
        self.watchdog.stop();

        if state.connection() != ConnectionState::Disconnected {
            tracing::info!("Disconnected from {}", self.stream_url);
        }
        state.set_connection(ConnectionState::Disconnected);
    }

    /// Current channel state
    pub async fn state(&self) -> ConnectionState {
        self.state.read().await.connection()
    }

    /// True only in [`ConnectionState::Connected`]
    pub async fn is_connected(&self) -> bool {
        self.state().await == ConnectionState::Connected
    }

    /// Watch channel that follows every state transition
    pub async fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.read().await.subscribe_state()
    }

    /// Failed attempts since the last successful connection
    pub async fn reconnect_attempt(&self) -> u32 {
        self.state.read().await.policy.attempt()
    }

    /// Registers a callback for `kind`.
    ///
    /// Callbacks run synchronously, in registration order, on the task that received
    /// the event. Keep the returned handle to remove it with [`off()`](Self::off).
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use realtime_notifications::{ClientEvent, EventKind, NotificationClient};
    /// # fn example(client: &NotificationClient) {
    /// let handle = client.on(EventKind::Error, |event| {
    ///     if let ClientEvent::Error { error } = event {
    ///         eprintln!("notification client: {}", error);
    ///     }
    /// });
    /// client.off(EventKind::Error, &handle);
    /// # }
    /// ```
    pub fn on<F>(&self, kind: EventKind, f: F) -> Listener
    where
        F: Fn(&ClientEvent) + Send + Sync + 'static,
    {
        self.listeners.on_fn(kind, f)
    }

    /// Removes every registration of `listener` for `kind`; no-op when absent
    pub fn off(&self, kind: EventKind, listener: &Listener) {
        self.listeners.off(kind, listener);
    }

    /// Receiver fed with every subsequent event of `kind`
    pub fn receiver(&self, kind: EventKind) -> mpsc::UnboundedReceiver<ClientEvent> {
        self.listeners.receiver(kind)
    }

    /// Listener registry shared with the router
    pub fn listeners(&self) -> &Arc<ListenerRegistry> {
        &self.listeners
    }

    /// Presents a notification and forwards it to `notification` listeners
    pub fn handle_notification(&self, notification: Notification) {
        self.router.handle_notification(notification);
    }

    /// Presenter, for forwarding clicks and system closes of shown notifications
    pub fn presenter(&self) -> &Arc<NotificationPresenter> {
        &self.presenter
    }

    /// Push registration state; see [`PushSubscriptionManager::resend`]
    pub fn push(&self) -> &Arc<PushSubscriptionManager> {
        &self.push
    }

    /// REST client for history, read receipts and test sends
    pub fn api(&self) -> &NotificationApi {
        &self.api
    }

    /// Full server-push URL, including the `userId` query when a user is configured
    pub fn stream_url(&self) -> &str {
        &self.stream_url
    }

    /// One attempt to open the channel.
    ///
    /// `expected_generation` pins a scheduled retry to the generation it was scheduled in.
    async fn open_channel(
        &self,
        reason: ConnectReason,
        expected_generation: Option<u64>,
    ) -> Result<()> {
        let generation = {
            let mut state = self.state.write().await;
            let current = state.connection();

            if current.is_active() {
                return Ok(());
            }

            match reason {
                ConnectReason::Retry => {
                    if current != ConnectionState::Reconnecting
                        || expected_generation.is_some_and(|g| g != state.generation)
                    {
                        tracing::debug!("Skipping stale reconnect (state {})", current);
                        return Ok(());
                    }
                    // This task is the timer; detach instead of aborting it
                    state.reconnect_task = None;
                }
                ConnectReason::Explicit => {
                    state.cancel_reconnect();
                    if current == ConnectionState::Failed {
                        state.policy.reset();
                    }
                }
                ConnectReason::Stale => state.cancel_reconnect(),
            }

            state.set_connection(ConnectionState::Connecting);
            state.next_generation()
        };

        tracing::info!("Connecting to {} ({:?})", self.stream_url, reason);

        match self.connector.open(&self.stream_url).await {
            Ok(stream) => {
                self.on_open(generation, stream).await;
                Ok(())
            }
            Err(e) => {
                self.on_open_failed(generation, &e).await;
                Err(e)
            }
        }
    }

    async fn on_open(&self, generation: u64, stream: FrameStream) {
        {
            let mut state = self.state.write().await;
            if state.generation != generation {
                tracing::debug!("Discarding channel opened by a superseded attempt");
                return;
            }
            state.set_connection(ConnectionState::Connected);
            state.policy.reset();
        }

        tracing::info!("Connected to event stream");
        self.listeners
            .emit(&ClientEvent::Connection { connected: true });

        let mut state = self.state.write().await;
        if state.generation != generation {
            return;
        }

        let reader = self.clone();
        state.readers.spawn(async move {
            reader.read_frames(generation, stream).await;
        });

        let restart = self.stale_restart(generation);
        self.watchdog.start(move || {
            tokio::spawn(restart);
        });
    }

    // Boxed so the recursive open -> watchdog -> open cycle has a nameable type
    fn stale_restart(&self, generation: u64) -> BoxFuture<'static, ()> {
        let client = self.clone();
        async move {
            client.reconnect_stale(generation).await;
        }
        .boxed()
    }

    async fn read_frames(&self, generation: u64, mut stream: FrameStream) {
        tracing::debug!("Starting read task");
        while let Some(item) = stream.next().await {
            match item {
                Ok(frame) => {
                    tracing::debug!(
                        "Received frame: event={}, {} bytes",
                        frame.event.as_deref().unwrap_or("message"),
                        frame.data.len()
                    );
                    self.router.route(frame);
                }
                Err(e) => {
                    tracing::error!("Event stream error: {}", e);
                    self.spawn_channel_lost(generation, ChannelLoss::Error(e.to_string()));
                    return;
                }
            }
        }

        tracing::warn!("Server closed event stream");
        self.spawn_channel_lost(generation, ChannelLoss::Closed);
    }

    // Runs outside the reader task, which the handler aborts
    fn spawn_channel_lost(&self, generation: u64, loss: ChannelLoss) {
        let client = self.clone();
        tokio::spawn(async move {
            client.on_channel_lost(generation, loss).await;
        });
    }

    async fn on_channel_lost(&self, generation: u64, loss: ChannelLoss) {
        let mut events = Vec::new();
        {
            let mut state = self.state.write().await;
            if state.generation != generation || state.connection() != ConnectionState::Connected
            {
                return;
            }

            state.readers.abort_all();
            self.watchdog.stop();

            events.push(match loss {
                ChannelLoss::Closed => ClientEvent::Connection { connected: false },
                ChannelLoss::Error(error) => ClientEvent::error(error),
            });
            events.extend(self.schedule_reconnect(&mut state));
        }

        for event in &events {
            self.listeners.emit(event);
        }
    }

    async fn on_open_failed(&self, generation: u64, error: &NotificationError) {
        let mut events = Vec::new();
        {
            let mut state = self.state.write().await;
            if state.generation != generation {
                return;
            }

            tracing::error!("Failed to open event stream: {}", error);
            events.push(ClientEvent::error(error.to_string()));
            events.extend(self.schedule_reconnect(&mut state));
        }

        for event in &events {
            self.listeners.emit(event);
        }
    }

    /// Schedules the next retry, or moves to `Failed` and returns the terminal event
    fn schedule_reconnect(&self, state: &mut ClientState) -> Option<ClientEvent> {
        state.cancel_reconnect();

        let Some(delay) = state.policy.next_delay() else {
            tracing::error!(
                "Giving up after {} reconnection attempts",
                state.policy.max_attempts()
            );
            state.set_connection(ConnectionState::Failed);
            return Some(ClientEvent::error(MAX_ATTEMPTS_REACHED));
        };

        state.set_connection(ConnectionState::Reconnecting);
        let generation = state.generation;
        tracing::info!(
            "Reconnecting in {:?} (attempt {}/{})",
            delay,
            state.policy.attempt(),
            state.policy.max_attempts()
        );

        let client = self.clone();
        state.reconnect_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = client
                .open_channel(ConnectReason::Retry, Some(generation))
                .await
            {
                tracing::debug!("Scheduled reconnect failed: {}", e);
            }
        }));

        None
    }

    /// Watchdog recovery: restart the channel without resetting the attempt counter
    async fn reconnect_stale(&self, generation: u64) {
        {
            let state = self.state.read().await;
            if state.generation != generation || state.connection() != ConnectionState::Connected
            {
                return;
            }
        }

        tracing::warn!("Event stream went silent, restarting it");
        self.disconnect().await;
        if let Err(e) = self.open_channel(ConnectReason::Stale, None).await {
            tracing::debug!("Reconnect after heartbeat timeout failed: {}", e);
        }
    }
}

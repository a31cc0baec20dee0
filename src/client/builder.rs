use super::{ClientState, NotificationClient};
use crate::infrastructure::{HeartbeatWatchdog, NotificationApi, ReconnectPolicy};
use crate::messaging::{ListenerRegistry, MessageRouter};
use crate::presenter::{NotificationPresenter, NotificationSurface, TracingSurface};
use crate::push::{PushRegistrar, PushSubscriptionManager};
use crate::transport::{EventStreamConnector, SseConnector};
use crate::types::{
    DEFAULT_AUTO_DISMISS_MS, DEFAULT_BASE_DELAY_MS, DEFAULT_HEARTBEAT_CHECK_INTERVAL_MS,
    DEFAULT_HEARTBEAT_TIMEOUT_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_VISIBLE_NOTIFICATIONS,
    DEFAULT_WORKER_SCRIPT, NotificationError, Result, api_paths,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

#[derive(Debug, Clone, Default)]
pub struct NotificationClientOptions {
    /// Locally authenticated user; notifications addressed to others are not shown
    pub user_id: Option<String>,
    /// Server-push path relative to the endpoint
    pub stream_path: Option<String>,
    /// Initial retry delay
    pub base_delay_ms: Option<u64>,
    /// Retry ceiling
    pub max_attempts: Option<u32>,
    /// Staleness threshold
    pub heartbeat_timeout_ms: Option<u64>,
    /// Watchdog poll period
    pub heartbeat_check_interval_ms: Option<u64>,
    pub auto_dismiss_ms: Option<u64>,
    /// Shown notifications tracked for click handling
    pub max_visible_notifications: Option<usize>,
    pub worker_script: Option<String>,
}

/// Builder for NotificationClient that validates options and wires collaborators
pub struct NotificationClientBuilder {
    endpoint: String,
    stream_url: String,
    options: NotificationClientOptions,
    connector: Option<Arc<dyn EventStreamConnector>>,
    surface: Option<Arc<dyn NotificationSurface>>,
    registrar: Option<Arc<dyn PushRegistrar>>,
    http: Option<reqwest::Client>,
}

impl NotificationClientBuilder {
    /// Create a new builder
    pub fn new(endpoint: impl Into<String>, options: NotificationClientOptions) -> Result<Self> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Url::parse(&endpoint)?;

        if options.user_id.as_deref().is_some_and(str::is_empty) {
            return Err(NotificationError::Config(
                "user_id must not be empty".to_string(),
            ));
        }
        if options.heartbeat_check_interval_ms == Some(0) {
            return Err(NotificationError::Config(
                "heartbeat_check_interval_ms must be positive".to_string(),
            ));
        }

        let stream_path = options.stream_path.as_deref().unwrap_or(api_paths::STREAM);
        let mut stream_url = Url::parse(&format!("{}{}", endpoint, stream_path))?;
        if let Some(user_id) = &options.user_id {
            stream_url.query_pairs_mut().append_pair("userId", user_id);
        }

        Ok(Self {
            endpoint,
            stream_url: stream_url.to_string(),
            options,
            connector: None,
            surface: None,
            registrar: None,
            http: None,
        })
    }

    /// Replaces the default SSE connector
    pub fn connector(mut self, connector: Arc<dyn EventStreamConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Replaces the default logging surface
    pub fn surface(mut self, surface: Arc<dyn NotificationSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Enables push registration
    pub fn push_registrar(mut self, registrar: Arc<dyn PushRegistrar>) -> Self {
        self.registrar = Some(registrar);
        self
    }

    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Wire everything together. No connection is opened.
    pub fn build(self) -> NotificationClient {
        let options = self.options;
        let http = self.http.unwrap_or_default();

        let api = NotificationApi::new(self.endpoint, http.clone());
        let connector = self
            .connector
            .unwrap_or_else(|| Arc::new(SseConnector::new(http)));
        let surface = self
            .surface
            .unwrap_or_else(|| Arc::new(TracingSurface::default()));

        let presenter = Arc::new(
            NotificationPresenter::new(surface, options.user_id.clone())
                .with_auto_dismiss(Duration::from_millis(
                    options.auto_dismiss_ms.unwrap_or(DEFAULT_AUTO_DISMISS_MS),
                ))
                .with_max_visible(
                    options
                        .max_visible_notifications
                        .unwrap_or(DEFAULT_MAX_VISIBLE_NOTIFICATIONS),
                ),
        );
        let watchdog = Arc::new(HeartbeatWatchdog::new(
            Duration::from_millis(
                options
                    .heartbeat_timeout_ms
                    .unwrap_or(DEFAULT_HEARTBEAT_TIMEOUT_MS),
            ),
            Duration::from_millis(
                options
                    .heartbeat_check_interval_ms
                    .unwrap_or(DEFAULT_HEARTBEAT_CHECK_INTERVAL_MS),
            ),
        ));
        let listeners = Arc::new(ListenerRegistry::new());
        let router = Arc::new(MessageRouter::new(
            Arc::clone(&listeners),
            Arc::clone(&watchdog),
            Arc::clone(&presenter),
        ));
        let push = Arc::new(
            PushSubscriptionManager::new(api.clone(), self.registrar, options.user_id.clone())
                .with_worker_script(
                    options
                        .worker_script
                        .clone()
                        .unwrap_or_else(|| DEFAULT_WORKER_SCRIPT.to_string()),
                ),
        );

        let policy = ReconnectPolicy::new(
            Duration::from_millis(options.base_delay_ms.unwrap_or(DEFAULT_BASE_DELAY_MS)),
            options.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
        );

        NotificationClient {
            stream_url: self.stream_url,
            connector,
            api,
            listeners,
            presenter,
            watchdog,
            router,
            push,
            state: Arc::new(RwLock::new(ClientState::new(policy))),
        }
    }
}

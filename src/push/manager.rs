use super::registrar::{PushRegistrar, SubscribeOptions};
use crate::infrastructure::NotificationApi;
use crate::types::{DEFAULT_WORKER_SCRIPT, NotificationError, Result, Subscription};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Result of a registration run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStatus {
    /// No background-worker capability in this runtime
    Unsupported,
    Subscribed,
    /// A step failed; delivery is foreground-only
    Failed,
}

/// Decodes a URL-safe base64 application server key, with or without padding
pub fn decode_application_server_key(key: &str) -> Result<Vec<u8>> {
    let trimmed = key.trim().trim_end_matches('=');
    Ok(URL_SAFE_NO_PAD.decode(trimmed)?)
}

/// Registers for push delivery while the application is not in the foreground.
///
/// Failures are logged and leave the manager unsubscribed; nothing is retried.
pub struct PushSubscriptionManager {
    api: NotificationApi,
    registrar: Option<Arc<dyn PushRegistrar>>,
    user_id: Option<String>,
    worker_script: String,
    subscription: RwLock<Option<Subscription>>,
}

impl PushSubscriptionManager {
    pub fn new(
        api: NotificationApi,
        registrar: Option<Arc<dyn PushRegistrar>>,
        user_id: Option<String>,
    ) -> Self {
        Self {
            api,
            registrar,
            user_id,
            worker_script: DEFAULT_WORKER_SCRIPT.to_string(),
            subscription: RwLock::new(None),
        }
    }

    pub fn with_worker_script(mut self, script: impl Into<String>) -> Self {
        self.worker_script = script.into();
        self
    }

    /// Runs the full registration sequence once.
    pub async fn initialize(&self) -> PushStatus {
        let Some(registrar) = &self.registrar else {
            tracing::warn!("Background worker registration not supported, push disabled");
            return PushStatus::Unsupported;
        };

        match self.register(registrar.as_ref()).await {
            Ok(subscription) => {
                tracing::info!("Push subscription registered: {}", subscription.endpoint);
                *self.subscription.write().await = Some(subscription);
                PushStatus::Subscribed
            }
            Err(e) => {
                tracing::error!("Push subscription failed: {}", e);
                *self.subscription.write().await = None;
                PushStatus::Failed
            }
        }
    }

    async fn register(&self, registrar: &dyn PushRegistrar) -> Result<Subscription> {
        registrar.register_worker(&self.worker_script).await?;
        tracing::debug!("Registered background worker {}", self.worker_script);

        let public_key = self.api.vapid_public_key().await?;
        let application_server_key = decode_application_server_key(&public_key)?;

        let subscription = registrar
            .subscribe(SubscribeOptions {
                user_visible_only: true,
                application_server_key,
            })
            .await?;

        self.api
            .subscribe(&subscription, self.user_id.as_deref())
            .await?;

        Ok(subscription)
    }

    /// Sends the stored subscription to the server again
    pub async fn resend(&self) -> Result<()> {
        let subscription = self.subscription.read().await.clone();
        let Some(subscription) = subscription else {
            return Err(NotificationError::Push("No push subscription".to_string()));
        };

        self.api
            .subscribe(&subscription, self.user_id.as_deref())
            .await
    }

    pub async fn subscription(&self) -> Option<Subscription> {
        self.subscription.read().await.clone()
    }

    pub async fn is_subscribed(&self) -> bool {
        self.subscription.read().await.is_some()
    }
}

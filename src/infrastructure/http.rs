use crate::types::api_paths;
use crate::types::{Notification, NotificationDraft, NotificationError, Result, Subscription};
use reqwest::Response;
use serde::{Deserialize, Serialize};

/// Client for the REST endpoints that accompany the server-push channel
#[derive(Clone)]
pub struct NotificationApi {
    base_endpoint: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VapidKeyResponse {
    public_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscribeBody<'a> {
    subscription: &'a Subscription,
    user_id: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendBody<'a> {
    #[serde(flatten)]
    draft: &'a NotificationDraft,
    user_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReadBody<'a> {
    notification_id: &'a str,
    user_id: &'a str,
}

/// History is served either as a bare array or wrapped in an object
#[derive(Deserialize)]
#[serde(untagged)]
enum HistoryResponse {
    List(Vec<Notification>),
    Wrapped { notifications: Vec<Notification> },
}

impl NotificationApi {
    pub fn new(base_endpoint: impl Into<String>, http: reqwest::Client) -> Self {
        let base_endpoint = base_endpoint.into().trim_end_matches('/').to_string();
        Self {
            base_endpoint,
            http,
        }
    }

    pub fn base_endpoint(&self) -> &str {
        &self.base_endpoint
    }

    /// Absolute URL for a path relative to the endpoint
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_endpoint, path)
    }

    /// Fetches the application server public key (URL-safe base64)
    pub async fn vapid_public_key(&self) -> Result<String> {
        let response = self
            .http
            .get(self.url(api_paths::VAPID_PUBLIC_KEY))
            .send()
            .await?;
        let body: VapidKeyResponse = ensure_success(api_paths::VAPID_PUBLIC_KEY, response)
            .await?
            .json()
            .await?;

        tracing::debug!("Fetched application server key");
        Ok(body.public_key)
    }

    /// Registers a push subscription for the given user
    pub async fn subscribe(
        &self,
        subscription: &Subscription,
        user_id: Option<&str>,
    ) -> Result<()> {
        let response = self
            .http
            .post(self.url(api_paths::SUBSCRIBE))
            .json(&SubscribeBody {
                subscription,
                user_id,
            })
            .send()
            .await?;
        ensure_success(api_paths::SUBSCRIBE, response).await?;

        tracing::debug!("Sent push subscription for {}", subscription.endpoint);
        Ok(())
    }

    /// Asks the server to deliver a notification to `user_id` (development helper)
    pub async fn send(&self, draft: &NotificationDraft, user_id: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url(api_paths::SEND))
            .json(&SendBody { draft, user_id })
            .send()
            .await?;
        ensure_success(api_paths::SEND, response).await?;
        Ok(())
    }

    /// Previously delivered notifications for `user_id`
    pub async fn history(&self, user_id: &str) -> Result<Vec<Notification>> {
        let response = self
            .http
            .get(self.url(api_paths::HISTORY))
            .query(&[("userId", user_id)])
            .send()
            .await?;
        let history: HistoryResponse = ensure_success(api_paths::HISTORY, response)
            .await?
            .json()
            .await?;

        Ok(match history {
            HistoryResponse::List(list) => list,
            HistoryResponse::Wrapped { notifications } => notifications,
        })
    }

    /// Marks a notification as read
    pub async fn mark_read(&self, notification_id: &str, user_id: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url(api_paths::READ))
            .json(&ReadBody {
                notification_id,
                user_id,
            })
            .send()
            .await?;
        ensure_success(api_paths::READ, response).await?;
        Ok(())
    }
}

async fn ensure_success(path: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    tracing::warn!("Request to {} failed with status {}", path, status);
    Err(NotificationError::Status {
        path: path.to_string(),
        status: status.as_u16(),
    })
}

use super::{EventStreamConnector, FrameStream, ServerFrame};
use crate::types::frame_events;
use crate::types::{NotificationError, Result};
use eventsource_stream::Eventsource;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use reqwest::header::{ACCEPT, CACHE_CONTROL};

/// Server-Sent Events over HTTP
#[derive(Clone, Default)]
pub struct SseConnector {
    http: reqwest::Client,
}

impl SseConnector {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn open_stream(&self, url: &str) -> Result<FrameStream> {
        tracing::debug!("Opening event stream at {}", url);

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| {
                NotificationError::Connection(format!("Event stream request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(NotificationError::Connection(format!(
                "Event stream rejected with status: {}",
                response.status()
            )));
        }

        let frames = response
            .bytes_stream()
            .eventsource()
            .map(|item| match item {
                Ok(event) => {
                    let name = if event.event.is_empty() || event.event == frame_events::MESSAGE {
                        None
                    } else {
                        Some(event.event)
                    };
                    Ok(ServerFrame {
                        event: name,
                        data: event.data,
                    })
                }
                Err(e) => Err(NotificationError::Stream(e.to_string())),
            });

        Ok(frames.boxed())
    }
}

impl EventStreamConnector for SseConnector {
    fn open<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FrameStream>> {
        self.open_stream(url).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_named_and_default_frames() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"hello\":1}\n\n",
            "event: heartbeat\ndata: {}\n\n",
            "event: notification\ndata: {\"id\":\"n1\"}\n\n",
        );
        Mock::given(method("GET"))
            .and(path("/notifications/stream"))
            .and(header("accept", "text/event-stream"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let connector = SseConnector::default();
        let url = format!("{}/notifications/stream", server.uri());
        let frames: Vec<ServerFrame> = connector
            .open(&url)
            .await
            .unwrap()
            .map(|frame| frame.unwrap())
            .collect()
            .await;

        assert_eq!(
            frames,
            vec![
                ServerFrame::new(None, "{\"hello\":1}"),
                ServerFrame::new(Some("heartbeat"), "{}"),
                ServerFrame::new(Some("notification"), "{\"id\":\"n1\"}"),
            ]
        );
    }

    #[tokio::test]
    async fn test_error_status_fails_open() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let connector = SseConnector::default();
        let result = connector.open(&server.uri()).await;
        assert!(matches!(result, Err(NotificationError::Connection(_))));
    }
}

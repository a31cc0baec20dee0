//! In-memory doubles for the transport, surface and push seams.

use crate::presenter::{NotificationSurface, OsNotification, Permission};
use crate::push::{PushRegistrar, SubscribeOptions};
use crate::transport::{EventStreamConnector, FrameStream, ServerFrame};
use crate::types::{NotificationError, Result, Subscription, SubscriptionKeys};
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Show(OsNotification),
    Close(String),
    Focus,
    Navigate(String),
}

pub struct RecordingSurface {
    permission: Permission,
    calls: Mutex<Vec<SurfaceCall>>,
}

impl RecordingSurface {
    pub fn new(permission: Permission) -> Self {
        Self {
            permission,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn granted() -> Self {
        Self::new(Permission::Granted)
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn shown(&self) -> Vec<OsNotification> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SurfaceCall::Show(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn closed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SurfaceCall::Close(tag) => Some(tag),
                _ => None,
            })
            .collect()
    }
}

impl NotificationSurface for RecordingSurface {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn show(&self, notification: &OsNotification) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(SurfaceCall::Show(notification.clone()));
        Ok(())
    }

    fn close(&self, tag: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(SurfaceCall::Close(tag.to_string()));
    }

    fn focus_window(&self) {
        self.calls.lock().unwrap().push(SurfaceCall::Focus);
    }

    fn navigate(&self, url: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(SurfaceCall::Navigate(url.to_string()));
    }
}

pub type FrameSender = mpsc::UnboundedSender<Result<ServerFrame>>;

enum Outcome {
    Fail(String),
    Open(mpsc::UnboundedReceiver<Result<ServerFrame>>),
}

/// Connector that replays scripted outcomes; once the script runs out every open fails
#[derive(Default)]
pub struct ScriptedConnector {
    script: Mutex<VecDeque<Outcome>>,
    opened: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next open succeeds; frames sent on the returned sender are delivered,
    /// dropping it closes the channel
    pub fn push_open(&self) -> FrameSender {
        let (tx, rx) = mpsc::unbounded_channel();
        self.script.lock().unwrap().push_back(Outcome::Open(rx));
        tx
    }

    pub fn push_failure(&self, reason: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Outcome::Fail(reason.to_string()));
    }

    pub fn open_count(&self) -> usize {
        self.opened.lock().unwrap().len()
    }

    pub fn opened_urls(&self) -> Vec<String> {
        self.opened
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub fn open_instants(&self) -> Vec<Instant> {
        self.opened.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

impl EventStreamConnector for ScriptedConnector {
    fn open<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FrameStream>> {
        self.opened
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));
        let outcome = self.script.lock().unwrap().pop_front();

        async move {
            match outcome {
                Some(Outcome::Open(rx)) => {
                    let stream = futures::stream::unfold(rx, |mut rx| async move {
                        rx.recv().await.map(|item| (item, rx))
                    });
                    Ok(stream.boxed())
                }
                Some(Outcome::Fail(reason)) => Err(NotificationError::Connection(reason)),
                None => Err(NotificationError::Connection("connection refused".to_string())),
            }
        }
        .boxed()
    }
}

/// Push registrar that records what it was asked to do
#[derive(Default)]
pub struct FakeRegistrar {
    pub fail_registration: bool,
    pub registered: Mutex<Vec<String>>,
    pub subscribe_requests: Mutex<Vec<SubscribeOptions>>,
}

impl FakeRegistrar {
    pub fn subscription() -> Subscription {
        Subscription {
            endpoint: "https://push.example/sub/1".to_string(),
            expiration_time: None,
            keys: SubscriptionKeys {
                p256dh: "p256".to_string(),
                auth: "secret".to_string(),
            },
        }
    }
}

impl PushRegistrar for FakeRegistrar {
    fn register_worker<'a>(&'a self, script: &'a str) -> BoxFuture<'a, Result<()>> {
        async move {
            if self.fail_registration {
                return Err(NotificationError::Push("registration refused".to_string()));
            }
            self.registered.lock().unwrap().push(script.to_string());
            Ok(())
        }
        .boxed()
    }

    fn subscribe(&self, options: SubscribeOptions) -> BoxFuture<'_, Result<Subscription>> {
        async move {
            self.subscribe_requests.lock().unwrap().push(options);
            Ok(Self::subscription())
        }
        .boxed()
    }
}

// Transport module - Opening the server-push channel
mod sse;

pub use sse::SseConnector;

use crate::types::Result;
use futures::future::BoxFuture;
use futures::stream::BoxStream;

/// One frame received on the server-push channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerFrame {
    /// Frame name; `None` for the default frame
    pub event: Option<String>,
    pub data: String,
}

impl ServerFrame {
    pub fn new(event: Option<&str>, data: impl Into<String>) -> Self {
        Self {
            event: event.map(str::to_string),
            data: data.into(),
        }
    }
}

/// Open channel. Ends when the server closes it; an `Err` item is a mid-stream failure.
pub type FrameStream = BoxStream<'static, Result<ServerFrame>>;

/// Opens server-push channels. Dropping the returned stream closes the channel.
pub trait EventStreamConnector: Send + Sync {
    fn open<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FrameStream>>;
}

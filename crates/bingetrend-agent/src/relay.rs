//! Per-query attachment to the agent's WebSocket log stream.
//!
//! [`LogRelay::subscribe`] opens one connection for a correlation id and
//! spawns a reader that buffers parsed [`LogEntry`] frames.
//! [`LogSubscription::close`] releases it and hands back the buffer, after
//! reading every frame the server sent ahead of its close reply.
//! Dropping an unclosed subscription aborts the reader.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use bingetrend_core::{CorrelationId, LogEntry};
use futures::{SinkExt, StreamExt};
use reqwest::Url;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::RelayError;

type LogBuffer = Arc<Mutex<Vec<LogEntry>>>;

/// How long `close` keeps reading while waiting for the server's close reply.
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection factory for the log stream at `{base}/{correlation_id}`.
#[derive(Debug, Clone)]
pub struct LogRelay {
    base_url: Url,
    close_timeout: Duration,
}

impl LogRelay {
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidUrl`] unless `ws_base_url` is a `ws://`
    /// or `wss://` URL.
    pub fn new(ws_base_url: &str) -> Result<Self, RelayError> {
        let invalid = |reason: String| RelayError::InvalidUrl {
            url: ws_base_url.to_owned(),
            reason,
        };
        let base_url =
            Url::parse(ws_base_url.trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "ws" | "wss") {
            return Err(invalid("expected a ws or wss URL".to_owned()));
        }
        Ok(Self {
            base_url,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        })
    }

    /// Bounds how long [`LogSubscription::close`] drains before giving up.
    #[must_use]
    pub fn with_close_timeout(mut self, close_timeout: Duration) -> Self {
        self.close_timeout = close_timeout;
        self
    }

    /// The stream URL for one correlation id.
    #[must_use]
    pub fn url_for(&self, correlation_id: &CorrelationId) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(correlation_id.as_str());
        }
        url
    }

    /// Opens the stream for `correlation_id` and starts buffering entries.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Connect`] if the WebSocket handshake fails.
    pub async fn subscribe(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<LogSubscription, RelayError> {
        let url = self.url_for(correlation_id);
        let (stream, _response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| RelayError::Connect {
                url: url.to_string(),
                source: Box::new(e),
            })?;
        tracing::debug!(%correlation_id, "log stream attached");

        let buffer = LogBuffer::default();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let reader = tokio::spawn(read_frames(
            stream,
            Arc::clone(&buffer),
            shutdown_rx,
            self.close_timeout,
            correlation_id.clone(),
        ));

        Ok(LogSubscription {
            correlation_id: correlation_id.clone(),
            buffer,
            shutdown: Some(shutdown_tx),
            reader: Some(reader),
        })
    }
}

/// An open log stream for one correlation id.
pub struct LogSubscription {
    correlation_id: CorrelationId,
    buffer: LogBuffer,
    shutdown: Option<oneshot::Sender<()>>,
    reader: Option<JoinHandle<()>>,
}

impl LogSubscription {
    #[must_use]
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// Copy of the entries buffered so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sends a close frame, waits for the reader to drain the stream up to the
    /// server's close reply, and returns everything buffered in arrival order.
    pub async fn close(mut self) -> Vec<LogEntry> {
        if let Some(shutdown) = self.shutdown.take() {
            // Err means the reader already stopped on its own.
            let _ = shutdown.send(());
        }
        if let Some(reader) = self.reader.take() {
            if let Err(e) = reader.await {
                tracing::warn!(
                    correlation_id = %self.correlation_id,
                    error = %e,
                    "log reader task failed"
                );
            }
        }
        let entries = std::mem::take(
            &mut *self
                .buffer
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        tracing::debug!(
            correlation_id = %self.correlation_id,
            entries = entries.len(),
            "log stream released"
        );
        entries
    }
}

impl Drop for LogSubscription {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

async fn read_frames(
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    buffer: LogBuffer,
    mut shutdown: oneshot::Receiver<()>,
    close_timeout: Duration,
    correlation_id: CorrelationId,
) {
    let (mut sink, mut source) = stream.split();
    let closing = loop {
        tokio::select! {
            _ = &mut shutdown => break true,
            frame = source.next() => {
                if !handle_frame(frame, &buffer, &correlation_id) {
                    break false;
                }
            }
        }
    };
    if !closing {
        return;
    }

    if let Err(e) = sink.send(Message::Close(None)).await {
        tracing::debug!(%correlation_id, error = %e, "close frame not delivered");
    }
    // Frames already in flight arrive before the server's close reply.
    let drain = async {
        while handle_frame(source.next().await, &buffer, &correlation_id) {}
    };
    if tokio::time::timeout(close_timeout, drain).await.is_err() {
        tracing::warn!(
            %correlation_id,
            timeout_ms = close_timeout.as_millis(),
            "log stream did not acknowledge close"
        );
    }
}

/// Buffers one read result. Returns `false` once the stream has ended.
fn handle_frame(
    frame: Option<Result<Message, tungstenite::Error>>,
    buffer: &Mutex<Vec<LogEntry>>,
    correlation_id: &CorrelationId,
) -> bool {
    match frame {
        Some(Ok(Message::Text(text))) => {
            buffer_frame(buffer, &text, correlation_id);
            true
        }
        Some(Ok(Message::Close(_))) | None => false,
        Some(Ok(_)) => true,
        Some(Err(e)) => {
            tracing::warn!(%correlation_id, error = %e, "log stream read failed");
            false
        }
    }
}

/// Parses one text frame into the buffer. Malformed frames are dropped.
fn buffer_frame(buffer: &Mutex<Vec<LogEntry>>, frame: &str, correlation_id: &CorrelationId) {
    match LogEntry::parse(frame) {
        Ok(entry) => buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry),
        Err(e) => {
            tracing::warn!(%correlation_id, error = %e, "dropping malformed log frame");
        }
    }
}

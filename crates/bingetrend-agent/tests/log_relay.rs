//! Log relay tests against a local WebSocket server.

use std::sync::Arc;
use std::time::Duration;

use bingetrend_agent::{AgentError, AnalysisRequest, BatchRun, LogRelay, TrendAnalyzer};
use bingetrend_core::{AnalysisOutcome, CorrelationId, LogLevel, RowStatus};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Notify};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

const AGENT_FRAME: &str = r#"{"timestamp":"2024-03-01T10:00:00Z","level":"INFO","category":"AGENT","message":"Starting analysis"}"#;
const SEARCH_FRAME: &str = r#"{"timestamp":"2024-03-01T10:00:02Z","level":"DEBUG","category":"SEARCH","message":"Querying web","data":{"hits":3}}"#;

struct LogServer {
    base_url: String,
    path: oneshot::Receiver<String>,
    closed: oneshot::Receiver<()>,
    /// Notified once every frame has been written and flushed.
    sent: Arc<Notify>,
}

/// Accepts one connection, sends `frames`, then waits for the client's close frame.
async fn serve_frames<S: Into<String> + Send + 'static>(frames: Vec<S>) -> LogServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (path_tx, path_rx) = oneshot::channel();
    let (closed_tx, closed_rx) = oneshot::channel();
    let sent = Arc::new(Notify::new());
    let sent_signal = Arc::clone(&sent);

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let record_path =
            move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                let _ = path_tx.send(req.uri().path().to_owned());
                Ok(resp)
            };
        let mut ws = tokio_tungstenite::accept_hdr_async(stream, record_path)
            .await
            .unwrap();
        for frame in frames {
            ws.send(Message::Text(frame.into())).await.unwrap();
        }
        sent_signal.notify_one();

        // Keep polling after the client's close so the reply gets written.
        let mut closed_tx = Some(closed_tx);
        while let Some(Ok(msg)) = ws.next().await {
            if msg.is_close() {
                if let Some(tx) = closed_tx.take() {
                    let _ = tx.send(());
                }
            }
        }
    });

    LogServer {
        base_url: format!("ws://{addr}/ws/logs"),
        path: path_rx,
        closed: closed_rx,
        sent,
    }
}

/// Accepts one connection and sends frames, but never reads or answers a close.
async fn serve_unresponsive(frames: Vec<String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        for frame in frames {
            ws.send(Message::Text(frame)).await.unwrap();
        }
        tokio::time::sleep(Duration::from_secs(60)).await;
        drop(ws);
    });
    format!("ws://{addr}/ws/logs")
}

fn numbered_frames(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            format!(
                r#"{{"timestamp":"2024-03-01T10:00:00Z","level":"INFO","category":"ANALYSIS","message":"step {i}"}}"#
            )
        })
        .collect()
}

#[tokio::test]
async fn subscription_buffers_valid_frames_and_drops_malformed() {
    let server = serve_frames(vec![AGENT_FRAME, "{not json", SEARCH_FRAME]).await;
    let relay = LogRelay::new(&server.base_url).unwrap();
    let id = CorrelationId::from("run-7");

    let subscription = relay.subscribe(&id).await.expect("subscribe");
    tokio::time::timeout(Duration::from_secs(5), async {
        while subscription.len() < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("two entries should arrive");

    assert_eq!(subscription.snapshot().len(), 2);
    let entries = subscription.close().await;

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].message, "Starting analysis");
    assert_eq!(entries[1].level, LogLevel::Debug);
    assert_eq!(entries[1].data, Some(serde_json::json!({ "hits": 3 })));

    assert_eq!(server.path.await.unwrap(), "/ws/logs/run-7");
    tokio::time::timeout(Duration::from_secs(5), server.closed)
        .await
        .expect("server should see a close frame")
        .unwrap();
}

#[tokio::test]
async fn connect_failure_is_an_error_not_a_panic() {
    let relay = LogRelay::new("ws://127.0.0.1:9/ws/logs").unwrap();
    assert!(relay.subscribe(&CorrelationId::from("x")).await.is_err());
}

/// Waits long enough for the relay to deliver frames, then succeeds.
struct SlowAnalyzer;

impl TrendAnalyzer for SlowAnalyzer {
    async fn analyze(&self, _request: &AnalysisRequest<'_>) -> Result<AnalysisOutcome, AgentError> {
        tokio::time::sleep(Duration::from_millis(300)).await;
        Ok(AnalysisOutcome {
            success: true,
            program_is_trending: Some(false),
            program: None,
            message: Some("No matching program".to_owned()),
            error: None,
        })
    }
}

#[tokio::test]
async fn batch_row_keeps_logs_from_its_own_stream() {
    let server = serve_frames(vec![AGENT_FRAME, SEARCH_FRAME]).await;
    let relay = LogRelay::new(&server.base_url).unwrap();

    let mut run = BatchRun::from_block("Wednesday", Vec::new()).unwrap();
    let row = run
        .process_next(&SlowAnalyzer, Some(&relay))
        .await
        .expect("one row")
        .clone();

    assert_eq!(row.status, RowStatus::Completed);
    assert_eq!(row.logs.len(), 2);
    assert_eq!(
        server.path.await.unwrap(),
        format!("/ws/logs/{}", row.correlation_id)
    );
}

/// Returns as soon as the server reports every frame flushed, the way the
/// agent answers only after its last log line.
struct SignalledAnalyzer {
    sent: Arc<Notify>,
}

impl TrendAnalyzer for SignalledAnalyzer {
    async fn analyze(&self, _request: &AnalysisRequest<'_>) -> Result<AnalysisOutcome, AgentError> {
        self.sent.notified().await;
        Ok(AnalysisOutcome {
            success: true,
            program_is_trending: Some(true),
            program: None,
            message: None,
            error: None,
        })
    }
}

#[tokio::test]
async fn row_keeps_every_frame_sent_before_the_reply() {
    const FRAMES: usize = 200;

    for attempt in 0..10 {
        let server = serve_frames(numbered_frames(FRAMES)).await;
        let relay = LogRelay::new(&server.base_url).unwrap();
        let analyzer = SignalledAnalyzer {
            sent: Arc::clone(&server.sent),
        };

        let mut run = BatchRun::from_block("Dune Part Two", Vec::new()).unwrap();
        let row = run
            .process_next(&analyzer, Some(&relay))
            .await
            .expect("one row")
            .clone();

        assert_eq!(row.logs.len(), FRAMES, "attempt {attempt}");
        assert_eq!(row.logs[0].message, "step 0");
        assert_eq!(row.logs[FRAMES - 1].message, format!("step {}", FRAMES - 1));
    }
}

#[tokio::test]
async fn close_gives_up_on_a_silent_server() {
    let base_url = serve_unresponsive(numbered_frames(3)).await;
    let relay = LogRelay::new(&base_url)
        .unwrap()
        .with_close_timeout(Duration::from_millis(200));

    let subscription = relay
        .subscribe(&CorrelationId::from("run-9"))
        .await
        .expect("subscribe");
    let entries = tokio::time::timeout(Duration::from_secs(5), subscription.close())
        .await
        .expect("close should not hang");

    assert_eq!(entries.len(), 3);
}

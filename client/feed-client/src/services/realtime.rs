//! Realtime refresh channel
//!
//! A Centrifugo websocket subscription used only as a "something changed"
//! signal. Publications are never merged into the feed; each one triggers a
//! full reload through the [`FeedStore`].

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::diagnostics::ErrorLog;
use crate::error::ClientError;
use crate::services::feed_store::FeedStore;

const EVENT_BUFFER: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Connected,
    Disconnected,
    /// Publication payload on the feed channel
    Message(Value),
}

#[async_trait]
pub trait RealtimeListener: Send + Sync {
    /// Run until the connection closes or `events` is dropped
    async fn listen(&self, events: mpsc::Sender<FeedEvent>) -> Result<(), ClientError>;
}

/// One decoded server frame
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Empty object; the server expects `{}` back
    Ping,
    ConnectReply,
    Publication(Value),
    ErrorReply(String),
    Other,
}

/// Split a text message into frames. Centrifugo batches replies as
/// newline-delimited JSON objects.
pub fn parse_frames(text: &str) -> Result<Vec<Frame>, ClientError> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_str::<Value>(line).map(classify_frame))
        .collect::<Result<Vec<_>, _>>()
        .map_err(ClientError::from)
}

fn classify_frame(value: Value) -> Frame {
    let Some(object) = value.as_object() else {
        return Frame::Other;
    };

    if object.is_empty() {
        return Frame::Ping;
    }

    if let Some(err) = object.get("error") {
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Frame::ErrorReply(message);
    }

    if object.contains_key("connect") {
        return Frame::ConnectReply;
    }

    match object.get("push").and_then(|push| push.get("pub")) {
        Some(publication) => {
            Frame::Publication(publication.get("data").cloned().unwrap_or(Value::Null))
        }
        None => Frame::Other,
    }
}

pub struct CentrifugoListener {
    url: String,
    channel: String,
}

impl CentrifugoListener {
    pub fn new(url: &str, channel: &str) -> Self {
        Self {
            url: url.to_string(),
            channel: channel.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.realtime_url, &config.realtime_channel)
    }

    fn commands(&self) -> [Value; 2] {
        [
            json!({ "id": 1, "connect": {} }),
            json!({ "id": 2, "subscribe": { "channel": self.channel } }),
        ]
    }
}

#[async_trait]
impl RealtimeListener for CentrifugoListener {
    async fn listen(&self, events: mpsc::Sender<FeedEvent>) -> Result<(), ClientError> {
        let (ws_stream, _) = connect_async(self.url.as_str()).await?;
        let (mut write, mut read) = ws_stream.split();
        info!(url = %self.url, channel = %self.channel, "Realtime socket opened");

        for command in self.commands() {
            write.send(Message::Text(command.to_string().into())).await?;
        }

        while let Some(message) = read.next().await {
            let text = match message {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    let _ = events.send(FeedEvent::Disconnected).await;
                    return Err(e.into());
                }
            };

            let frames = match parse_frames(text.as_str()) {
                Ok(frames) => frames,
                Err(e) => {
                    warn!(error = %e, "Skipping undecodable realtime frame");
                    continue;
                }
            };

            for frame in frames {
                let event = match frame {
                    Frame::Ping => {
                        write.send(Message::Text("{}".into())).await?;
                        continue;
                    }
                    Frame::ConnectReply => FeedEvent::Connected,
                    Frame::Publication(data) => FeedEvent::Message(data),
                    Frame::ErrorReply(message) => {
                        let _ = events.send(FeedEvent::Disconnected).await;
                        return Err(ClientError::Realtime(message));
                    }
                    Frame::Other => continue,
                };

                if events.send(event).await.is_err() {
                    debug!("Realtime receiver dropped, closing socket");
                    let _ = write.close().await;
                    return Ok(());
                }
            }
        }

        info!("Realtime socket closed");
        let _ = events.send(FeedEvent::Disconnected).await;
        Ok(())
    }
}

/// Reload the feed on every connect and publication
pub fn spawn_feed_refresher(
    store: Arc<FeedStore>,
    mut events: mpsc::Receiver<FeedEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                FeedEvent::Connected => {
                    info!("Realtime connected, refreshing feed");
                    store.load().await;
                }
                FeedEvent::Message(_) => {
                    debug!("Feed changed remotely, refreshing");
                    store.load().await;
                }
                FeedEvent::Disconnected => {
                    info!("Realtime disconnected");
                }
            }
        }
    })
}

pub struct RealtimeHandle {
    listener: Option<JoinHandle<Result<(), ClientError>>>,
    refresher: JoinHandle<()>,
}

impl RealtimeHandle {
    /// Resolves when the listener stops, with its outcome.
    ///
    /// Returns `Ok(())` immediately once the outcome has been taken.
    pub async fn closed(&mut self) -> Result<(), ClientError> {
        let Some(listener) = self.listener.as_mut() else {
            return Ok(());
        };

        let outcome = listener.await;
        self.listener = None;
        match outcome {
            Ok(result) => result,
            Err(e) => Err(ClientError::Realtime(e.to_string())),
        }
    }

    /// Wait until the connection ends and every queued event is handled
    pub async fn join(self) {
        if let Some(listener) = self.listener {
            let _ = listener.await;
        }
        let _ = self.refresher.await;
    }

    pub fn shutdown(self) {
        if let Some(listener) = &self.listener {
            listener.abort();
        }
        self.refresher.abort();
    }
}

/// Wire a listener to the store. Listener failures go to the diagnostic log.
pub fn spawn_realtime(
    listener: Arc<dyn RealtimeListener>,
    store: Arc<FeedStore>,
    error_log: ErrorLog,
) -> RealtimeHandle {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let refresher = spawn_feed_refresher(store, rx);

    let listener = tokio::spawn(async move {
        let result = listener.listen(tx).await;
        if let Err(e) = &result {
            warn!(error = %e, "Realtime listener stopped");
            error_log.record(format!("Realtime connection failed: {e}"));
        }
        result
    });

    RealtimeHandle {
        listener: Some(listener),
        refresher,
    }
}

/// Start the Centrifugo subscription when enabled in config
pub fn start_realtime(
    config: &Config,
    store: Arc<FeedStore>,
    error_log: ErrorLog,
) -> Option<RealtimeHandle> {
    if !config.realtime_enabled {
        debug!("Realtime refresh disabled");
        return None;
    }

    let listener = Arc::new(CentrifugoListener::from_config(config));
    Some(spawn_realtime(listener, store, error_log))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncFailure;
    use crate::services::sync_client::MockFeedApi;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedListener {
        events: Vec<FeedEvent>,
    }

    #[async_trait]
    impl RealtimeListener for ScriptedListener {
        async fn listen(&self, tx: mpsc::Sender<FeedEvent>) -> Result<(), ClientError> {
            for event in &self.events {
                if tx.send(event.clone()).await.is_err() {
                    break;
                }
            }
            Ok(())
        }
    }

    fn counting_store(calls: Arc<AtomicUsize>) -> Arc<FeedStore> {
        let mut api = MockFeedApi::new();
        api.expect_fetch_all().returning(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        });
        Arc::new(FeedStore::new(Arc::new(api), "Anonymous"))
    }

    #[test]
    fn test_parse_batched_frames() {
        let text = "{\"id\":1,\"connect\":{\"client\":\"abc\"}}\n{\"id\":2,\"subscribe\":{}}\n";
        let frames = parse_frames(text).unwrap();
        assert_eq!(frames, vec![Frame::ConnectReply, Frame::Other]);
    }

    #[test]
    fn test_parse_ping_and_publication() {
        assert_eq!(parse_frames("{}").unwrap(), vec![Frame::Ping]);

        let push = r#"{"push":{"channel":"feed","pub":{"data":{"id":7}}}}"#;
        assert_eq!(
            parse_frames(push).unwrap(),
            vec![Frame::Publication(json!({ "id": 7 }))]
        );
    }

    #[test]
    fn test_parse_error_reply() {
        let frames = parse_frames(r#"{"id":2,"error":{"code":102,"message":"unknown channel"}}"#)
            .unwrap();
        assert_eq!(frames, vec![Frame::ErrorReply("unknown channel".to_string())]);
        assert!(parse_frames("not json").is_err());
    }

    #[tokio::test]
    async fn test_refresher_reloads_on_connect_and_message_only() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = counting_store(calls.clone());

        let listener = Arc::new(ScriptedListener {
            events: vec![
                FeedEvent::Connected,
                FeedEvent::Message(json!({ "id": 1 })),
                FeedEvent::Disconnected,
            ],
        });

        let handle = spawn_realtime(listener, store, ErrorLog::new("unused-error-log.txt"));
        handle.join().await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    struct UnreachableListener;

    #[async_trait]
    impl RealtimeListener for UnreachableListener {
        async fn listen(&self, _tx: mpsc::Sender<FeedEvent>) -> Result<(), ClientError> {
            Err(ClientError::Realtime("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_closed_reports_listener_failure() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("error-log.txt"));
        let store = counting_store(Arc::new(AtomicUsize::new(0)));

        let mut handle = spawn_realtime(Arc::new(UnreachableListener), store, log);

        let closed = handle.closed().await;
        assert_eq!(
            closed.unwrap_err().to_string(),
            "Realtime channel error: connection refused"
        );
        assert!(handle.closed().await.is_ok());
        handle.shutdown();
    }

    #[tokio::test]
    async fn test_failed_reload_from_event_clears_feed() {
        let mut api = MockFeedApi::new();
        api.expect_fetch_all().returning(|| Err(SyncFailure));
        let store = Arc::new(FeedStore::new(Arc::new(api), "Anonymous"));

        let (tx, rx) = mpsc::channel(4);
        let refresher = spawn_feed_refresher(store.clone(), rx);
        tx.send(FeedEvent::Message(Value::Null)).await.unwrap();
        drop(tx);
        refresher.await.unwrap();

        let snapshot = store.snapshot().await;
        assert!(snapshot.posts.is_empty());
        assert!(!snapshot.loading);
    }

    #[test]
    fn test_subscribe_command_uses_channel() {
        let listener = CentrifugoListener::new("ws://localhost:8000/connection/websocket", "news");
        let [connect, subscribe] = listener.commands();

        assert_eq!(connect, json!({ "id": 1, "connect": {} }));
        assert_eq!(subscribe["subscribe"]["channel"], "news");
    }
}

//! Session driver: owns the websocket lifecycle and wires audio supply,
//! event decoding, transcript assembly, and note flushing together.
//!
//! One `run()` call is one process-lifetime session. Inside it, each
//! connection attempt walks the state machine: token request, socket open,
//! then two duties — transmit (drains the audio queue) and receive (decodes
//! events, mutates the transcript, drives flushes). When a connection dies,
//! both duties are stopped and joined before the next attempt, so two
//! generations never race on the audio queue. Transcript state and the sync
//! cursor live here, outside the per-connection scope, and survive
//! reconnects.

use crate::asr::event::{self, RecognitionEvent};
use crate::asr::token::TokenClient;
use crate::audio::framer::{AudioFrame, FramerHandle};
use crate::defaults;
use crate::error::{LivenoteError, Result};
use crate::note::NotePublisher;
use crate::session::backoff::BackoffPolicy;
use crate::session::state::{ConnectionState, SessionEvent};
use crate::status::{StatusSnapshot, SyncHealth};
use crate::transcript::assembler::TranscriptAssembler;
use crate::transcript::flush::{FlushDecision, FlushScheduler};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, mpsc, watch};
use tokio_tungstenite::tungstenite::Message;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;
type WsSink = futures_util::stream::SplitSink<WsStream, Message>;
type WsSource = futures_util::stream::SplitStream<WsStream>;

/// How one connection ended.
#[derive(Debug)]
enum SessionOutcome {
    /// Peer closed gracefully.
    Closed,
    /// Transport or service failure, with the cause.
    Faulted(String),
}

/// Capture-side handles the driver needs for the status view.
pub struct SessionHandles {
    /// Name of the audio device in use.
    pub device: String,
    /// Handle to the running framer (signal indicator).
    pub framer: FramerHandle,
    /// Where status snapshots are published.
    pub status_tx: watch::Sender<StatusSnapshot>,
}

/// Drives the recognition session for the life of the process.
pub struct SessionDriver {
    ws_url: String,
    token_client: TokenClient,
    publisher: Arc<dyn NotePublisher>,
    backoff: BackoffPolicy,
    flush_interval: Duration,
    handles: SessionHandles,
    state: ConnectionState,
    connection_note: String,
    assembler: TranscriptAssembler,
    scheduler: FlushScheduler,
    sync_health: SyncHealth,
}

impl SessionDriver {
    pub fn new(
        ws_url: String,
        token_client: TokenClient,
        publisher: Arc<dyn NotePublisher>,
        backoff: BackoffPolicy,
        flush_interval: Duration,
        handles: SessionHandles,
    ) -> Self {
        Self {
            ws_url,
            token_client,
            publisher,
            backoff,
            flush_interval,
            handles,
            state: ConnectionState::Disconnected,
            connection_note: "starting".to_string(),
            assembler: TranscriptAssembler::new(),
            scheduler: FlushScheduler::with_interval(Instant::now(), flush_interval),
            sync_health: SyncHealth::Idle,
        }
    }

    /// Run connection attempts until the audio supply ends.
    ///
    /// Recoverable failures (auth, connect, transport, service) resolve into
    /// the backoff loop; the only error this returns is an invalid websocket
    /// URL, which no amount of retrying fixes.
    pub async fn run(mut self, audio_rx: mpsc::Receiver<AudioFrame>) -> Result<()> {
        let audio_rx = Arc::new(Mutex::new(audio_rx));

        loop {
            if audio_rx.lock().await.is_closed() {
                break;
            }

            self.transition(&SessionEvent::AuthStarted, "requesting token");

            let token = match self.token_client.fetch_token().await {
                Ok(token) => token,
                Err(e) => {
                    eprintln!("livenote: {}", e);
                    self.transition(&SessionEvent::AuthFailed, &e.to_string());
                    self.wait_backoff().await;
                    continue;
                }
            };

            let ws_url = build_ws_url(&self.ws_url, &token)?;
            let stream = match tokio_tungstenite::connect_async(ws_url.as_str()).await {
                Ok((stream, _)) => stream,
                Err(e) => {
                    eprintln!("livenote: websocket connect failed: {}", e);
                    self.transition(&SessionEvent::ConnectFailed, &format!("connect failed: {e}"));
                    self.wait_backoff().await;
                    continue;
                }
            };

            self.transition(&SessionEvent::SocketOpened, "connected");
            self.backoff.reset();

            let (ws_tx, ws_rx) = stream.split();
            let (stop_tx, stop_rx) = watch::channel(false);
            let transmit = tokio::spawn(transmit_frames(ws_tx, Arc::clone(&audio_rx), stop_rx));

            let outcome = self.pump_events(ws_rx).await;

            // Stop and join the transmit duty before any reconnect, so the
            // next generation has the queue to itself.
            let _ = stop_tx.send(true);
            let _ = transmit.await;

            match outcome {
                SessionOutcome::Closed => {
                    self.transition(&SessionEvent::PeerClosed, "connection closed by service");
                }
                SessionOutcome::Faulted(cause) => {
                    eprintln!("livenote: session fault: {}", cause);
                    self.transition(&SessionEvent::Fault, &cause);
                }
            }
            self.transition(&SessionEvent::TornDown, "reconnecting");

            if audio_rx.lock().await.is_closed() {
                break;
            }
            self.wait_backoff().await;
        }

        // Capture ended: push whatever settled text the note doesn't have yet.
        self.try_flush(true).await;
        self.publish_status();
        Ok(())
    }

    /// Receive duty: decode inbound messages, mutate the transcript, and run
    /// the flush scheduler. Sole mutator of transcript state and sync cursor.
    async fn pump_events(&mut self, mut ws_rx: WsSource) -> SessionOutcome {
        let mut flush_ticker = tokio::time::interval(self.flush_interval);
        flush_ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        flush_ticker.tick().await; // consume the immediate first tick

        loop {
            tokio::select! {
                message = ws_rx.next() => match message {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(outcome) = self.handle_text(text.as_str()).await {
                            return outcome;
                        }
                    }
                    Some(Ok(Message::Close(_))) => return SessionOutcome::Closed,
                    Some(Ok(_)) => {} // binary/ping/pong are not ours to handle
                    Some(Err(e)) => {
                        return SessionOutcome::Faulted(format!("websocket error: {e}"));
                    }
                    None => {
                        return SessionOutcome::Faulted("socket stream ended".to_string());
                    }
                },
                _ = flush_ticker.tick() => {
                    self.try_flush(false).await;
                    self.publish_status();
                }
            }
        }
    }

    /// Handle one text message. Returns Some when the session must end.
    async fn handle_text(&mut self, text: &str) -> Option<SessionOutcome> {
        let event = match event::decode(text) {
            Ok(event) => event,
            Err(e) => {
                // Malformed message: log, skip, keep the connection
                eprintln!("livenote: {}", e);
                return None;
            }
        };

        match &event {
            RecognitionEvent::ServiceError { detail } => {
                return Some(SessionOutcome::Faulted(format!("service error: {detail}")));
            }
            RecognitionEvent::Ready => {
                self.connection_note = "connected, streaming audio".to_string();
            }
            _ => {}
        }

        use crate::transcript::assembler::AssemblerAction;
        match self.assembler.on_event(event) {
            AssemblerAction::NewSettledText => {
                self.try_flush(true).await;
            }
            AssemblerAction::DisplayUpdate | AssemblerAction::None => {}
        }
        self.publish_status();
        None
    }

    /// One scheduler tick plus the publish it may demand.
    async fn try_flush(&mut self, has_new_settled: bool) {
        let snapshot = self.assembler.snapshot();
        let settled_chars = snapshot.settled_chars();
        let now = Instant::now();

        if self.scheduler.tick(now, settled_chars, has_new_settled) == FlushDecision::Skip {
            return;
        }

        match self.publisher.replace(&snapshot.joined()).await {
            Ok(()) => {
                self.scheduler.record_success(now, settled_chars);
                self.sync_health = SyncHealth::Ok;
            }
            Err(e) => {
                // Cursor untouched: the next tick retries with the full
                // current transcript.
                eprintln!("livenote: {}", e);
                self.sync_health = SyncHealth::Failed(e.to_string());
            }
        }
    }

    fn transition(&mut self, event: &SessionEvent, note: &str) {
        match self.state.advance(event) {
            Some(next) => self.state = next,
            None => {
                eprintln!(
                    "livenote: invalid session transition {} + {:?}",
                    self.state, event
                );
            }
        }
        self.connection_note = format!("{} ({})", self.state, note);
        self.publish_status();
    }

    fn publish_status(&self) {
        let snapshot = self.assembler.snapshot();
        self.handles.status_tx.send_replace(StatusSnapshot {
            connection: self.connection_note.clone(),
            device: self.handles.device.clone(),
            signal_present: self.handles.framer.signal_present(),
            in_flight: snapshot.in_flight.clone(),
            settled_tail: snapshot.tail(defaults::STATUS_TAIL_CHARS),
            sync: self.sync_health.clone(),
        });
    }

    async fn wait_backoff(&mut self) {
        tokio::time::sleep(self.backoff.next_delay()).await;
    }
}

/// Transmit duty: drain queued frames and write them to the socket.
///
/// Waits on the queue with a short timeout so a stop signal or a dead socket
/// is noticed promptly; an empty poll backs off briefly instead of spinning.
async fn transmit_frames(
    mut ws_tx: WsSink,
    audio_rx: Arc<Mutex<mpsc::Receiver<AudioFrame>>>,
    mut stop_rx: watch::Receiver<bool>,
) {
    loop {
        if *stop_rx.borrow() {
            break;
        }

        tokio::select! {
            _ = stop_rx.changed() => break,
            polled = async {
                let mut rx = audio_rx.lock().await;
                tokio::time::timeout(defaults::QUEUE_RECV_TIMEOUT, rx.recv()).await
            } => match polled {
                Ok(Some(frame)) => {
                    if ws_tx
                        .send(Message::Binary(frame.to_le_bytes().into()))
                        .await
                        .is_err()
                    {
                        // Socket is gone; the receive duty reports the fault
                        break;
                    }
                }
                Ok(None) => break, // capture stopped for good
                Err(_elapsed) => {
                    tokio::time::sleep(defaults::QUEUE_IDLE_WAIT).await;
                }
            },
        }
    }

    let _ = ws_tx.close().await;
}

/// Append the session token to the websocket endpoint.
fn build_ws_url(ws_url: &str, token: &str) -> Result<url::Url> {
    let mut url = url::Url::parse(ws_url).map_err(|e| LivenoteError::ConfigInvalidValue {
        key: "asr.ws_url".to_string(),
        message: e.to_string(),
    })?;
    url.query_pairs_mut().append_pair("token", token);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::framer::Framer;
    use crate::audio::source::MockAudioSource;
    use crate::note::mock::MockPublisher;

    fn test_handles() -> (SessionHandles, mpsc::Receiver<AudioFrame>) {
        let framer = Framer::new(MockAudioSource::new().with_single_read());
        let (rx, handle) = framer.start().unwrap();
        let (status_tx, _status_rx) = watch::channel(StatusSnapshot::default());
        (
            SessionHandles {
                device: "mock".to_string(),
                framer: handle,
                status_tx,
            },
            rx,
        )
    }

    fn test_driver(publisher: Arc<dyn NotePublisher>) -> SessionDriver {
        let (handles, _audio_rx) = test_handles();
        let token_client =
            TokenClient::new("https://example.test/v1/token", "key", "asr-zh-en-std").unwrap();
        SessionDriver::new(
            "wss://example.test/ws/v1/".to_string(),
            token_client,
            publisher,
            BackoffPolicy::fixed(Duration::from_millis(1)),
            Duration::from_secs(5),
            handles,
        )
    }

    fn final_event(text: &str) -> RecognitionEvent {
        RecognitionEvent::Final {
            text: text.to_string(),
        }
    }

    #[test]
    fn test_build_ws_url_appends_token() {
        let url = build_ws_url("wss://asr.example.test/ws/v1/", "tok123").unwrap();
        assert_eq!(url.as_str(), "wss://asr.example.test/ws/v1/?token=tok123");
    }

    #[test]
    fn test_build_ws_url_rejects_garbage() {
        match build_ws_url("not a url", "tok") {
            Err(LivenoteError::ConfigInvalidValue { key, .. }) => {
                assert_eq!(key, "asr.ws_url");
            }
            other => panic!("Expected ConfigInvalidValue, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_new_settled_text_flushes_immediately() {
        let publisher = Arc::new(MockPublisher::new());
        let mut driver = test_driver(publisher.clone());

        driver.assembler.on_event(final_event("hello"));
        driver.try_flush(true).await;

        assert_eq!(publisher.call_count(), 1);
        assert_eq!(publisher.last_content().as_deref(), Some("hello"));
        assert_eq!(driver.sync_health, SyncHealth::Ok);
    }

    #[tokio::test]
    async fn test_empty_transcript_never_flushes() {
        let publisher = Arc::new(MockPublisher::new());
        let mut driver = test_driver(publisher.clone());

        driver.try_flush(true).await;
        driver.try_flush(false).await;

        assert_eq!(publisher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_flush_retries_with_full_transcript() {
        let publisher = Arc::new(MockPublisher::new());
        let mut driver = test_driver(publisher.clone());

        publisher.set_failing(true);
        driver.assembler.on_event(final_event("one"));
        driver.try_flush(true).await;
        assert!(matches!(driver.sync_health, SyncHealth::Failed(_)));

        // Cursor did not advance, so even without new text the next
        // new-settled tick re-sends everything
        publisher.set_failing(false);
        driver.assembler.on_event(final_event("two"));
        driver.try_flush(true).await;

        assert_eq!(publisher.call_count(), 2);
        assert_eq!(publisher.last_content().as_deref(), Some("one\ntwo"));
        assert_eq!(driver.sync_health, SyncHealth::Ok);
    }

    #[tokio::test]
    async fn test_reconnect_preserves_settled_transcript() {
        let publisher = Arc::new(MockPublisher::new());
        let mut driver = test_driver(publisher.clone());

        // Connected, one sentence settles but the sync fails
        driver.transition(&SessionEvent::AuthStarted, "t");
        driver.transition(&SessionEvent::SocketOpened, "t");
        publisher.set_failing(true);
        driver.assembler.on_event(final_event("before fault"));
        driver.try_flush(true).await;

        // Fault and reconnect
        driver.transition(&SessionEvent::Fault, "t");
        driver.transition(&SessionEvent::TornDown, "t");
        driver.transition(&SessionEvent::AuthStarted, "t");
        driver.transition(&SessionEvent::SocketOpened, "t");
        assert_eq!(driver.state, ConnectionState::Connected);

        // Settled text survived the fault; next flush carries it plus the new sentence
        publisher.set_failing(false);
        driver.assembler.on_event(final_event("after reconnect"));
        driver.try_flush(true).await;

        assert_eq!(
            publisher.last_content().as_deref(),
            Some("before fault\nafter reconnect")
        );
    }

    #[tokio::test]
    async fn test_handle_text_service_error_faults_session() {
        let publisher = Arc::new(MockPublisher::new());
        let mut driver = test_driver(publisher);

        let outcome = driver
            .handle_text(r#"{"status": "error", "detail": "quota"}"#)
            .await;
        match outcome {
            Some(SessionOutcome::Faulted(cause)) => assert!(cause.contains("quota")),
            other => panic!("Expected fault, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_handle_text_malformed_is_skipped() {
        let publisher = Arc::new(MockPublisher::new());
        let mut driver = test_driver(publisher);

        driver.assembler.on_event(final_event("kept"));
        let outcome = driver.handle_text("{definitely not json").await;

        assert!(outcome.is_none());
        assert_eq!(driver.assembler.settled_count(), 1);
    }

    #[tokio::test]
    async fn test_handle_text_drives_assembler() {
        let publisher = Arc::new(MockPublisher::new());
        let mut driver = test_driver(publisher.clone());

        driver
            .handle_text(r#"{"pipe": {"asr_sentence": "partial text"}}"#)
            .await;
        assert_eq!(driver.assembler.snapshot().in_flight, "partial text");
        assert_eq!(publisher.call_count(), 0);

        driver
            .handle_text(r#"{"pipe": {"asr_sentence": "partial text", "asr_final": true}}"#)
            .await;
        assert_eq!(driver.assembler.settled_count(), 1);
        assert_eq!(publisher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_transition_is_logged_not_fatal() {
        let publisher = Arc::new(MockPublisher::new());
        let mut driver = test_driver(publisher);

        // Fault while disconnected is not a defined transition
        driver.transition(&SessionEvent::Fault, "t");
        assert_eq!(driver.state, ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_run_exits_when_audio_supply_ends() {
        let publisher = Arc::new(MockPublisher::new());
        let mut driver = test_driver(publisher.clone());
        driver.assembler.on_event(final_event("leftover"));

        let (tx, rx) = mpsc::channel::<AudioFrame>(4);
        drop(tx);

        // With the audio channel closed, run() must not attempt a
        // connection; it performs the final flush and returns.
        driver.run(rx).await.unwrap();
        assert_eq!(publisher.last_content().as_deref(), Some("leftover"));
    }
}

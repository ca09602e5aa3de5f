//! Default configuration constants for livenote.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

use std::time::Duration;

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and is the only rate the
/// recognition service accepts for raw PCM input.
pub const SAMPLE_RATE: u32 = 16000;

/// Number of audio channels (mono).
pub const CHANNELS: u16 = 1;

/// Outbound audio frame size in bytes.
///
/// 2000 bytes of 16-bit mono PCM at 16kHz is ~62.5ms of audio per frame,
/// small enough for low-latency recognition without flooding the socket.
pub const FRAME_BYTES: usize = 2000;

/// Outbound audio frame size in samples (16-bit samples, so half the bytes).
pub const FRAME_SAMPLES: usize = FRAME_BYTES / 2;

/// Default interval between periodic transcript flushes to the remote note.
///
/// New settled sentences flush immediately; this timer is the fallback that
/// retries after a failed sync and bounds staleness of the remote note.
pub const FLUSH_INTERVAL: Duration = Duration::from_secs(5);

/// Default delay between reconnection attempts after a session fault.
pub const RECONNECT_BACKOFF: Duration = Duration::from_secs(5);

/// Timeout for token and note HTTP requests.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Cadence of the live terminal status view.
pub const STATUS_REFRESH: Duration = Duration::from_millis(500);

/// How long the transmit duty waits on the audio queue before checking
/// for shutdown. Keeps a closed socket observable promptly.
pub const QUEUE_RECV_TIMEOUT: Duration = Duration::from_millis(1000);

/// Idle wait after a queue-receive timeout, to avoid busy-spinning.
pub const QUEUE_IDLE_WAIT: Duration = Duration::from_millis(10);

/// Audio queue depth in frames (~62 seconds of backlog at FRAME_BYTES).
pub const AUDIO_QUEUE_FRAMES: usize = 1000;

/// Peak amplitude (of i16 full scale) above which the microphone is
/// considered to be picking up signal, for the status view.
pub const SIGNAL_THRESHOLD: i16 = 330;

/// Default recognition pipeline identifier.
///
/// "asr-zh-en-std" is the service's mixed Mandarin/English model. Other
/// pipelines can be selected in the `[asr]` config section.
pub const ASR_PIPELINE: &str = "asr-zh-en-std";

/// Default token endpoint of the recognition service.
pub const ASR_TOKEN_URL: &str = "https://asr.api.yating.tw/v1/token";

/// Default websocket endpoint of the recognition service.
pub const ASR_WS_URL: &str = "wss://asr.api.yating.tw/ws/v1/";

/// Default base URL of the note-hosting API. The note id is appended.
pub const NOTE_API_URL: &str = "https://api.hackmd.io/v1/notes";

/// How many characters of the settled transcript the status view shows.
pub const STATUS_TAIL_CHARS: usize = 500;

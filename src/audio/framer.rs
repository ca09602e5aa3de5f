//! Framer: turns the raw capture stream into fixed-size outbound frames.
//!
//! A dedicated thread polls the `AudioSource`, slices the sample stream into
//! exact [`defaults::FRAME_SAMPLES`]-sample frames, and enqueues them into the
//! session's audio queue. The capture side never does anything else with the
//! samples; the queue is the only shared resource between capture and transmit.

use crate::audio::source::AudioSource;
use crate::defaults;
use crate::error::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;

/// A fixed-size frame of PCM samples ready for transmission.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Sequence number for ordering and gap detection.
    pub sequence: u64,
    /// Exactly FRAME_SAMPLES 16-bit PCM samples.
    pub samples: Vec<i16>,
}

impl AudioFrame {
    pub fn new(sequence: u64, samples: Vec<i16>) -> Self {
        Self { sequence, samples }
    }

    /// Encode as little-endian bytes, the recognition service's wire format.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.samples.len() * 2);
        for sample in &self.samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        bytes
    }

    /// Peak absolute amplitude, for the status view's signal indicator.
    pub fn peak(&self) -> i16 {
        self.samples
            .iter()
            .map(|s| s.saturating_abs())
            .max()
            .unwrap_or(0)
    }
}

/// Configuration for the framer.
#[derive(Debug, Clone)]
pub struct FramerConfig {
    /// Samples per emitted frame.
    pub frame_samples: usize,
    /// Queue depth in frames.
    pub queue_frames: usize,
    /// Polling interval when no samples are available.
    pub poll_interval: Duration,
    /// Peak amplitude above which the signal flag is raised.
    pub signal_threshold: i16,
}

impl Default for FramerConfig {
    fn default() -> Self {
        Self {
            frame_samples: defaults::FRAME_SAMPLES,
            queue_frames: defaults::AUDIO_QUEUE_FRAMES,
            poll_interval: defaults::QUEUE_IDLE_WAIT,
            signal_threshold: defaults::SIGNAL_THRESHOLD,
        }
    }
}

/// Framer that continuously captures audio and emits fixed-size frames.
pub struct Framer<A: AudioSource> {
    audio_source: A,
    config: FramerConfig,
    running: Arc<AtomicBool>,
    signal_present: Arc<AtomicBool>,
}

impl<A: AudioSource + 'static> Framer<A> {
    /// Creates a new framer wrapping the given audio source.
    pub fn new(audio_source: A) -> Self {
        Self::with_config(audio_source, FramerConfig::default())
    }

    /// Creates a new framer with custom configuration.
    pub fn with_config(audio_source: A, config: FramerConfig) -> Self {
        Self {
            audio_source,
            config,
            running: Arc::new(AtomicBool::new(false)),
            signal_present: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Starts continuous capture in a background thread.
    ///
    /// Returns a receiver for audio frames and a handle for stopping the
    /// capture. The thread runs until `stop()` is called or the receiver is
    /// dropped; leftover samples shorter than a frame are discarded on stop.
    pub fn start(mut self) -> Result<(mpsc::Receiver<AudioFrame>, FramerHandle)> {
        let (tx, rx) = mpsc::channel(self.config.queue_frames);
        let running = self.running.clone();
        let signal_present = self.signal_present.clone();

        self.audio_source.start()?;
        running.store(true, Ordering::SeqCst);

        let handle = FramerHandle {
            running: running.clone(),
            signal_present: signal_present.clone(),
        };

        let frame_samples = self.config.frame_samples;
        let poll_interval = self.config.poll_interval;
        let signal_threshold = self.config.signal_threshold;

        thread::spawn(move || {
            let mut pending: Vec<i16> = Vec::with_capacity(frame_samples * 2);
            let mut sequence: u64 = 0;

            while running.load(Ordering::SeqCst) {
                match self.audio_source.read_samples() {
                    Ok(samples) if !samples.is_empty() => {
                        pending.extend_from_slice(&samples);

                        let mut sent_any = false;
                        while pending.len() >= frame_samples {
                            let frame_data: Vec<i16> =
                                pending.drain(..frame_samples).collect();
                            let frame = AudioFrame::new(sequence, frame_data);
                            sequence += 1;

                            signal_present
                                .store(frame.peak() > signal_threshold, Ordering::Relaxed);

                            // Stop if the receiver is gone
                            if tx.blocking_send(frame).is_err() {
                                running.store(false, Ordering::SeqCst);
                                break;
                            }
                            sent_any = true;
                        }

                        if !sent_any && pending.len() < frame_samples {
                            thread::sleep(poll_interval);
                        }
                    }
                    Ok(_) => {
                        thread::sleep(poll_interval);
                    }
                    Err(e) => {
                        eprintln!("Audio capture error: {}", e);
                        break;
                    }
                }
            }

            let _ = self.audio_source.stop();
            signal_present.store(false, Ordering::Relaxed);
        });

        Ok((rx, handle))
    }
}

/// Handle to control a running framer.
#[derive(Clone)]
pub struct FramerHandle {
    running: Arc<AtomicBool>,
    signal_present: Arc<AtomicBool>,
}

impl FramerHandle {
    /// Stops the capture thread.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Returns true if the framer is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// True when the most recent frame's peak crossed the signal threshold.
    pub fn signal_present(&self) -> bool {
        self.signal_present.load(Ordering::Relaxed)
    }
}

//! Composition root: wires capture, session driver, and status display.
//!
//! Everything below this module is built from seams (`AudioSource`,
//! `NotePublisher`, the driver's injected collaborators); this is the one
//! place that knows the concrete types.

use crate::asr::token::TokenClient;
use crate::audio::capture::CpalAudioSource;
use crate::audio::framer::Framer;
use crate::audio::source::AudioSource;
use crate::config::{Config, Secrets};
use crate::error::Result;
use crate::note::hackmd::HackmdPublisher;
use crate::session::backoff::BackoffPolicy;
use crate::session::driver::{SessionDriver, SessionHandles};
use crate::status::{self, StatusSnapshot};
use std::sync::Arc;
use tokio::sync::watch;

/// Run the live transcription session until Ctrl+C or a fatal error.
pub async fn run(config: Config, secrets: Secrets, quiet: bool) -> Result<()> {
    // Fatal path: no device means no session
    let source = CpalAudioSource::new(config.audio.device.as_deref())?;
    let device = source.device_name();

    let framer = Framer::new(source);
    let (audio_rx, framer_handle) = framer.start()?;

    let token_client = TokenClient::new(
        &config.asr.token_url,
        &secrets.asr_key,
        &config.asr.pipeline,
    )?;
    let publisher = Arc::new(HackmdPublisher::new(
        &config.note.api_url,
        &secrets.note_id,
        &secrets.note_token,
    )?);

    let backoff = if config.sync.exponential_backoff {
        BackoffPolicy::exponential(
            config.sync.reconnect_backoff(),
            config.sync.reconnect_backoff() * 8,
        )
    } else {
        BackoffPolicy::fixed(config.sync.reconnect_backoff())
    };

    let (status_tx, status_rx) = watch::channel(StatusSnapshot {
        connection: "starting".to_string(),
        device: device.clone(),
        ..StatusSnapshot::default()
    });

    let driver = SessionDriver::new(
        config.asr.ws_url.clone(),
        token_client,
        publisher,
        backoff,
        config.sync.flush_interval(),
        SessionHandles {
            device,
            framer: framer_handle.clone(),
            status_tx,
        },
    );

    let display = tokio::spawn(status::run_display(status_rx, quiet));
    let session = tokio::spawn(driver.run(audio_rx));

    // Ctrl+C stops capture; the closed audio queue winds the session down,
    // which performs the final flush before returning.
    tokio::signal::ctrl_c().await?;
    eprintln!("\nlivenote: stopping...");
    framer_handle.stop();

    match session.await {
        Ok(result) => result?,
        Err(e) => eprintln!("livenote: session task failed: {}", e),
    }
    display.abort();

    Ok(())
}

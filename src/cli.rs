//! Command-line interface for livenote
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Live voice transcription published to a remote note
#[derive(Parser, Debug)]
#[command(
    name = "livenote",
    version,
    about = "Stream microphone speech to a recognition service and publish the transcript to a remote note"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress the live status view (diagnostics still go to stderr)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Audio input device (run `livenote devices` to list them)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Recognition pipeline (default: asr-zh-en-std)
    #[arg(long, value_name = "PIPELINE")]
    pub pipeline: Option<String>,

    /// Interval between periodic note flushes (default: 5s). Examples: 10s, 1m
    #[arg(long, value_name = "DURATION", value_parser = parse_interval_secs)]
    pub flush_interval: Option<u64>,
}

/// Parse a flush interval string into seconds.
///
/// Supports any duration format accepted by `humantime`: bare numbers
/// (seconds), single-unit (`30s`, `5m`), and compound (`1m30s`).
fn parse_interval_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let secs = if let Ok(secs) = s.parse::<u64>() {
        secs
    } else {
        humantime::parse_duration(s)
            .map(|d| d.as_secs())
            .map_err(|e| e.to_string())?
    };
    if secs == 0 {
        return Err("flush interval must be at least 1 second".to_string());
    }
    Ok(secs)
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available audio input devices
    Devices,

    /// Verify secrets and audio prerequisites
    Check,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval_bare_number() {
        assert_eq!(parse_interval_secs("30"), Ok(30));
    }

    #[test]
    fn test_parse_interval_humantime() {
        assert_eq!(parse_interval_secs("10s"), Ok(10));
        assert_eq!(parse_interval_secs("1m30s"), Ok(90));
    }

    #[test]
    fn test_parse_interval_zero_rejected() {
        assert!(parse_interval_secs("0").is_err());
        assert!(parse_interval_secs("0s").is_err());
    }

    #[test]
    fn test_parse_interval_garbage_rejected() {
        assert!(parse_interval_secs("soon").is_err());
    }

    #[test]
    fn test_cli_parses_run_with_flags() {
        let cli = Cli::try_parse_from([
            "livenote",
            "--device",
            "pipewire",
            "--flush-interval",
            "10s",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.device.as_deref(), Some("pipewire"));
        assert_eq!(cli.flush_interval, Some(10));
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["livenote", "devices"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Devices)));

        let cli = Cli::try_parse_from(["livenote", "check"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Check)));
    }
}

use anyhow::Result;
use clap::{CommandFactory, Parser};
use livenote::audio::capture::list_devices;
use livenote::cli::{Cli, Commands};
use livenote::config::{Config, Secrets};
use livenote::diagnostics::check_prerequisites;
use owo_colors::OwoColorize;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let config = load_config(&cli)?;

            // Missing secrets are fatal before anything else starts
            let secrets = match Secrets::from_env() {
                Ok(secrets) => secrets,
                Err(e) => {
                    eprintln!("{}", format!("Error: {}", e).red());
                    eprintln!("Run `livenote check` to see what is missing.");
                    std::process::exit(1);
                }
            };

            if let Err(e) = livenote::app::run(config, secrets, cli.quiet).await {
                eprintln!("{}", format!("Error: {}", e).red());
                std::process::exit(1);
            }
        }
        Some(Commands::Devices) => {
            list_audio_devices()?;
        }
        Some(Commands::Check) => {
            if !check_prerequisites() {
                std::process::exit(1);
            }
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "livenote",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/livenote/config.toml)
/// 3. Built-in defaults
/// CLI flags override whatever the file and environment provided.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(path) = cli.config.as_deref() {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    }
    .with_env_overrides();

    if let Some(device) = &cli.device {
        config.audio.device = Some(device.clone());
    }
    if let Some(pipeline) = &cli.pipeline {
        config.asr.pipeline = pipeline.clone();
    }
    if let Some(secs) = cli.flush_interval {
        config.sync.flush_interval_secs = secs;
    }

    Ok(config)
}

/// List available audio input devices.
fn list_audio_devices() -> Result<()> {
    let devices = list_devices()?;

    if devices.is_empty() {
        eprintln!("No audio input devices found");
        std::process::exit(1);
    }

    println!("Available audio input devices:");
    for (idx, device) in devices.iter().enumerate() {
        println!("  [{}] {}", idx, device);
    }

    Ok(())
}

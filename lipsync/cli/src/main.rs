//! lipsync-say - Speak Text and Print Lipsync Frames
//!
//! Speaks a line through the configured TTS provider and prints the morph
//! target values the avatar would receive, one line per published frame.
//!
//! # Usage
//!
//! ```bash
//! # Speak with the configured provider
//! lipsync-say "Hello there"
//!
//! # No audio, just the animation
//! lipsync-say --provider silent "Hello there"
//!
//! # Keep the audio
//! lipsync-say --provider google --save-dir ./out "Hello there"
//!
//! # Pick the morph targets to print
//! lipsync-say --channels jawOpen,mouthSmileLeft,viseme_O "Hello"
//!
//! # Verbose logging (logs go to stderr, frames to stdout)
//! RUST_LOG=debug lipsync-say "Hello"
//! ```
//!
//! Ctrl-C stops speech and animation. The exit status is non-zero when the
//! TTS call failed.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::Instant;
use tracing::{error, info, warn};

use lipsync_core::tts::{AudioSink, DiscardSink, FileSink};
use lipsync_core::{
    default_config_path, load_config_from_path, ConfigOverrides, LipsyncConfig, MorphRig,
    ProviderKind, SpeechOrchestrator,
};

/// Speak text and print the lipsync frames driving an avatar's mouth
#[derive(Parser, Debug)]
#[command(name = "lipsync-say")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Text to speak
    #[arg(required = true, value_name = "TEXT")]
    text: Vec<String>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "LIPSYNC_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// TTS provider (silent, piper, coqui, google, elevenlabs)
    #[arg(short = 'p', long, value_name = "NAME")]
    provider: Option<ProviderKind>,

    /// Speaking rate passed to the provider
    #[arg(short = 'r', long, value_name = "RATE")]
    rate: Option<f32>,

    /// Save synthesized audio into this directory
    #[arg(short = 's', long, env = "LIPSYNC_SAVE_DIR", value_name = "DIR")]
    save_dir: Option<PathBuf>,

    /// Comma-separated morph target names to drive and print
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "mouthOpen,mouthSmile,eyeBlinkLeft"
    )]
    channels: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "LIPSYNC_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("lipsync_core={level},lipsync_cli={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Load file and environment settings, then apply command-line overrides
fn load_settings(args: &Args) -> Result<LipsyncConfig> {
    if let Some(ref path) = args.config {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    }

    let path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(path).context("Failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(provider) = args.provider {
        overrides = overrides.with_provider(provider);
    }
    if let Some(rate) = args.rate {
        overrides = overrides.with_rate(rate);
    }
    overrides.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    info!(
        source = %config.source(),
        provider = %config.tts.provider,
        "Configuration loaded"
    );
    Ok(config)
}

/// One output line: elapsed time and every channel's influence
fn format_frame(elapsed_ms: u128, rig: &MorphRig) -> String {
    let values: Vec<String> = rig
        .influences()
        .map(|(name, value)| format!("{name}={value:.3}"))
        .collect();
    format!("{elapsed_ms:>6} ms  {}", values.join("  "))
}

fn build_rig(channels: &[String]) -> MorphRig {
    MorphRig::from_names(
        channels
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = load_settings(&args)?;
    let provider = config
        .provider_config()
        .build()
        .context("Failed to set up TTS provider")?;

    let sink: Arc<dyn AudioSink> = match args.save_dir {
        Some(ref dir) => {
            info!(dir = %dir.display(), "Saving audio");
            Arc::new(FileSink::new(dir))
        }
        None => Arc::new(DiscardSink),
    };

    let orchestrator = SpeechOrchestrator::new(provider, sink, config.orchestrator_config());
    let mut rig = build_rig(&args.channels);
    let mut frames = orchestrator.subscribe();

    let text = args.text.join(" ");
    let Some(utterance) = orchestrator.speak(&text) else {
        warn!("Nothing to say");
        return Ok(());
    };

    let start = Instant::now();
    rig.update(&frames.current());
    println!("{}", format_frame(start.elapsed().as_millis(), &rig));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            changed = frames.changed() => {
                let Some(state) = changed else { break };
                rig.update(&state);
                println!("{}", format_frame(start.elapsed().as_millis(), &rig));
                if !state.is_playing {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                info!("Interrupted, stopping speech");
                orchestrator.stop();
                break;
            }
        }
    }

    // The animation can end before the speech engine does
    let result = tokio::select! {
        result = utterance.finished() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping speech");
            orchestrator.stop();
            return Ok(());
        }
    };

    match result {
        Ok(outcome) => {
            info!(?outcome, "Speech finished");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Speech failed");
            Err(e).context("Speech failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lipsync_core::{AnimationState, MouthShape, StatePublisher};

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "lipsync-say",
            "--provider",
            "silent",
            "--channels",
            "jawOpen, viseme_I",
            "Hello",
            "there",
        ])
        .unwrap();

        assert_eq!(args.text, vec!["Hello", "there"]);
        assert_eq!(args.provider, Some(ProviderKind::Silent));
        assert_eq!(args.channels, vec!["jawOpen", " viseme_I"]);
    }

    #[test]
    fn test_args_reject_unknown_provider() {
        assert!(Args::try_parse_from(["lipsync-say", "--provider", "festival", "hi"]).is_err());
    }

    #[test]
    fn test_args_require_text() {
        assert!(Args::try_parse_from(["lipsync-say"]).is_err());
    }

    #[test]
    fn test_default_channels() {
        let args = Args::try_parse_from(["lipsync-say", "hi"]).unwrap();
        let rig = build_rig(&args.channels);
        let names: Vec<_> = rig.influences().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["mouthOpen", "mouthSmile", "eyeBlinkLeft"]);
    }

    #[test]
    fn test_format_frame() {
        let publisher = StatePublisher::new();
        publisher.begin_cycle(MouthShape::new(1.0, 0.0));
        let state: AnimationState = publisher.snapshot();

        let mut rig = build_rig(&["jawOpen".to_string(), "eyeBlinkLeft".to_string()]);
        rig.update(&state);

        assert_eq!(
            format_frame(48, &rig),
            "    48 ms  jawOpen=0.800  eyeBlinkLeft=0.000"
        );
    }
}

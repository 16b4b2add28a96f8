//! TOML Configuration File Support
//!
//! Loads engine settings from `~/.config/lipsync/lipsync.toml`, the
//! environment and command-line overrides.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [animation]
//! tick_interval_ms = 16
//! smoothing = 0.5
//! grace_ms = 300
//! fade_factor = 0.7
//! fade_threshold = 0.01
//! speaking_pose_open = 0.3
//!
//! [durations]
//! vowel_ms = 130
//! sustained_ms = 100
//! pause_ms = 80
//! consonant_ms = 70
//!
//! [tts]
//! provider = "piper"
//! rate = 1.2
//! stop_animation_on_failure = true
//! piper_url = "http://localhost:5000/tts"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::DriverConfig;
use crate::duration::DurationModel;
use crate::orchestrator::{OrchestratorConfig, TtsFailurePolicy, DEFAULT_SPEAKING_OPEN};
use crate::tts::{
    ProviderConfig, ProviderKind, DEFAULT_COQUI_URL, DEFAULT_GOOGLE_LANGUAGE, DEFAULT_GOOGLE_VOICE,
    DEFAULT_PIPER_URL, DEFAULT_PIPER_VOICE,
};
use crate::viseme::MouthShape;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Animation section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationToml {
    /// Tick period in milliseconds
    pub tick_interval_ms: Option<u64>,

    /// Smoothing factor per tick
    pub smoothing: Option<f32>,

    /// Grace window after the estimated end, in milliseconds
    pub grace_ms: Option<u64>,

    /// Fade-out multiplier per tick
    pub fade_factor: Option<f32>,

    /// Fade-out cut-off for `open`
    pub fade_threshold: Option<f32>,

    /// Mouth opening shown when speech starts
    pub speaking_pose_open: Option<f32>,
}

/// Durations section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationsToml {
    /// Vowel duration
    pub vowel_ms: Option<u32>,

    /// Nasal, liquid and glide duration
    pub sustained_ms: Option<u32>,

    /// Whitespace duration
    pub pause_ms: Option<u32>,

    /// Everything else
    pub consonant_ms: Option<u32>,
}

/// TTS section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsToml {
    /// Provider name
    pub provider: Option<String>,

    /// Speaking rate
    pub rate: Option<f32>,

    /// Clear the animation when TTS fails
    pub stop_animation_on_failure: Option<bool>,

    /// Piper endpoint
    pub piper_url: Option<String>,

    /// Piper voice
    pub piper_voice: Option<String>,

    /// Coqui endpoint
    pub coqui_url: Option<String>,

    /// Google API key
    pub google_api_key: Option<String>,

    /// Google language code
    pub google_language_code: Option<String>,

    /// Google voice
    pub google_voice: Option<String>,

    /// ElevenLabs API key
    pub elevenlabs_api_key: Option<String>,

    /// ElevenLabs voice id
    pub elevenlabs_voice_id: Option<String>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LipsyncToml {
    /// Animation section
    pub animation: AnimationToml,

    /// Durations section
    pub durations: DurationsToml,

    /// TTS section
    pub tts: TtsToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved TTS settings
#[derive(Clone, PartialEq)]
pub struct TtsSettings {
    /// Selected provider
    pub provider: ProviderKind,
    /// Speaking rate
    pub rate: f32,
    /// Clear the animation when TTS fails
    pub stop_animation_on_failure: bool,
    /// Piper endpoint
    pub piper_url: String,
    /// Piper voice
    pub piper_voice: String,
    /// Coqui endpoint
    pub coqui_url: String,
    /// Google API key
    pub google_api_key: Option<String>,
    /// Google language code
    pub google_language_code: String,
    /// Google voice
    pub google_voice: String,
    /// ElevenLabs API key
    pub elevenlabs_api_key: Option<String>,
    /// ElevenLabs voice id
    pub elevenlabs_voice_id: Option<String>,
}

impl std::fmt::Debug for TtsSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtsSettings")
            .field("provider", &self.provider)
            .field("rate", &self.rate)
            .field("stop_animation_on_failure", &self.stop_animation_on_failure)
            .field("piper_url", &self.piper_url)
            .field("coqui_url", &self.coqui_url)
            .field("google_api_key", &self.google_api_key.as_ref().map(|_| "<redacted>"))
            .field(
                "elevenlabs_api_key",
                &self.elevenlabs_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish_non_exhaustive()
    }
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            rate: 1.2,
            stop_animation_on_failure: true,
            piper_url: DEFAULT_PIPER_URL.to_string(),
            piper_voice: DEFAULT_PIPER_VOICE.to_string(),
            coqui_url: DEFAULT_COQUI_URL.to_string(),
            google_api_key: None,
            google_language_code: DEFAULT_GOOGLE_LANGUAGE.to_string(),
            google_voice: DEFAULT_GOOGLE_VOICE.to_string(),
            elevenlabs_api_key: None,
            elevenlabs_voice_id: None,
        }
    }
}

/// Centralized configuration for the lipsync engine
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug)]
pub struct LipsyncConfig {
    /// Animation driver tuning
    pub driver: DriverConfig,

    /// Per-character durations
    pub durations: DurationModel,

    /// Mouth opening shown when speech starts
    pub speaking_pose_open: f32,

    /// TTS settings
    pub tts: TtsSettings,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for LipsyncConfig {
    fn default() -> Self {
        Self {
            driver: DriverConfig::default(),
            durations: DurationModel::default(),
            speaking_pose_open: DEFAULT_SPEAKING_OPEN,
            tts: TtsSettings::default(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl LipsyncConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::ValidationError(msg));

        if self.driver.tick_interval.is_zero() {
            return invalid("animation.tick_interval_ms must be greater than 0".to_string());
        }
        if !(self.driver.smoothing > 0.0 && self.driver.smoothing <= 1.0) {
            return invalid(format!(
                "animation.smoothing must be in (0, 1], got {}",
                self.driver.smoothing
            ));
        }
        if !(self.driver.fade_factor > 0.0 && self.driver.fade_factor < 1.0) {
            return invalid(format!(
                "animation.fade_factor must be in (0, 1), got {}",
                self.driver.fade_factor
            ));
        }
        if !(self.driver.fade_threshold > 0.0 && self.driver.fade_threshold < 1.0) {
            return invalid(format!(
                "animation.fade_threshold must be in (0, 1), got {}",
                self.driver.fade_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.speaking_pose_open) {
            return invalid(format!(
                "animation.speaking_pose_open must be in [0, 1], got {}",
                self.speaking_pose_open
            ));
        }
        if !(self.tts.rate > 0.0 && self.tts.rate.is_finite()) {
            return invalid(format!("tts.rate must be positive, got {}", self.tts.rate));
        }
        Ok(())
    }

    /// Failure policy implied by `tts.stop_animation_on_failure`
    #[must_use]
    pub fn failure_policy(&self) -> TtsFailurePolicy {
        if self.tts.stop_animation_on_failure {
            TtsFailurePolicy::StopAnimation
        } else {
            TtsFailurePolicy::KeepAnimating
        }
    }

    /// Settings for [`SpeechOrchestrator`](crate::SpeechOrchestrator)
    #[must_use]
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            driver: self.driver,
            durations: self.durations,
            speaking_pose: MouthShape::new(self.speaking_pose_open, 0.0),
            speech_rate: self.tts.rate,
            voice: None,
            language_code: None,
            failure_policy: self.failure_policy(),
        }
    }

    /// Settings for the selected provider
    #[must_use]
    pub fn provider_config(&self) -> ProviderConfig {
        let tts = &self.tts;
        match tts.provider {
            ProviderKind::Silent => ProviderConfig::Silent,
            ProviderKind::Piper => ProviderConfig::Piper {
                url: tts.piper_url.clone(),
                voice: tts.piper_voice.clone(),
            },
            ProviderKind::Coqui => ProviderConfig::Coqui {
                url: tts.coqui_url.clone(),
            },
            ProviderKind::Google => ProviderConfig::Google {
                api_key: tts.google_api_key.clone(),
                language_code: tts.google_language_code.clone(),
                voice: tts.google_voice.clone(),
            },
            ProviderKind::ElevenLabs => ProviderConfig::ElevenLabs {
                api_key: tts.elevenlabs_api_key.clone(),
                voice_id: tts.elevenlabs_voice_id.clone(),
            },
        }
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/lipsync/lipsync.toml` or
/// `~/.config/lipsync/lipsync.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lipsync").join("lipsync.toml"))
}

/// Load configuration from the default path, then the environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if a
/// value is out of range. A missing config file is not an error.
pub fn load_config() -> Result<LipsyncConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or if the result does not validate.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<LipsyncConfig, ConfigError> {
    let mut config = LipsyncConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: LipsyncToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, |key| std::env::var(key).ok())?;
    config.validate()?;

    Ok(config)
}

fn parse_provider(name: &str) -> Result<ProviderKind, ConfigError> {
    name.parse().map_err(ConfigError::ValidationError)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut LipsyncConfig, toml: &LipsyncToml) -> Result<(), ConfigError> {
    // Animation
    let animation = &toml.animation;
    if let Some(ms) = animation.tick_interval_ms {
        config.driver.tick_interval = Duration::from_millis(ms);
    }
    if let Some(smoothing) = animation.smoothing {
        config.driver.smoothing = smoothing;
    }
    if let Some(ms) = animation.grace_ms {
        config.driver.grace = Duration::from_millis(ms);
    }
    if let Some(factor) = animation.fade_factor {
        config.driver.fade_factor = factor;
    }
    if let Some(threshold) = animation.fade_threshold {
        config.driver.fade_threshold = threshold;
    }
    if let Some(open) = animation.speaking_pose_open {
        config.speaking_pose_open = open;
    }

    // Durations
    let durations = &toml.durations;
    if let Some(ms) = durations.vowel_ms {
        config.durations.vowel_ms = ms;
    }
    if let Some(ms) = durations.sustained_ms {
        config.durations.sustained_ms = ms;
    }
    if let Some(ms) = durations.pause_ms {
        config.durations.pause_ms = ms;
    }
    if let Some(ms) = durations.consonant_ms {
        config.durations.consonant_ms = ms;
    }

    // TTS
    let tts = &toml.tts;
    if let Some(ref name) = tts.provider {
        config.tts.provider = parse_provider(name)?;
    }
    if let Some(rate) = tts.rate {
        config.tts.rate = rate;
    }
    if let Some(stop) = tts.stop_animation_on_failure {
        config.tts.stop_animation_on_failure = stop;
    }
    if let Some(ref url) = tts.piper_url {
        config.tts.piper_url.clone_from(url);
    }
    if let Some(ref voice) = tts.piper_voice {
        config.tts.piper_voice.clone_from(voice);
    }
    if let Some(ref url) = tts.coqui_url {
        config.tts.coqui_url.clone_from(url);
    }
    if tts.google_api_key.is_some() {
        config.tts.google_api_key.clone_from(&tts.google_api_key);
    }
    if let Some(ref code) = tts.google_language_code {
        config.tts.google_language_code.clone_from(code);
    }
    if let Some(ref voice) = tts.google_voice {
        config.tts.google_voice.clone_from(voice);
    }
    if tts.elevenlabs_api_key.is_some() {
        config.tts.elevenlabs_api_key.clone_from(&tts.elevenlabs_api_key);
    }
    if tts.elevenlabs_voice_id.is_some() {
        config.tts.elevenlabs_voice_id.clone_from(&tts.elevenlabs_voice_id);
    }

    Ok(())
}

/// Apply environment overrides, reading variables through `var`
fn apply_env_config<F>(config: &mut LipsyncConfig, var: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(name) = var("LIPSYNC_TTS_PROVIDER") {
        config.tts.provider = parse_provider(&name)?;
        config.source = ConfigSource::Env;
    }
    if let Some(rate) = var("LIPSYNC_TTS_RATE") {
        if let Ok(rate) = rate.parse::<f32>() {
            config.tts.rate = rate;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(interval) = var("LIPSYNC_TICK_INTERVAL_MS") {
        if let Ok(ms) = interval.parse::<u64>() {
            config.driver.tick_interval = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(stop) = var("LIPSYNC_STOP_ON_TTS_FAILURE") {
        config.tts.stop_animation_on_failure = stop != "0" && stop.to_lowercase() != "false";
        config.source = ConfigSource::Env;
    }
    if let Some(url) = var("PIPER_TTS_URL") {
        config.tts.piper_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(url) = var("COQUI_TTS_URL") {
        config.tts.coqui_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(key) = var("GOOGLE_TTS_API_KEY") {
        config.tts.google_api_key = Some(key);
        config.source = ConfigSource::Env;
    }
    if let Some(key) = var("ELEVENLABS_API_KEY") {
        config.tts.elevenlabs_api_key = Some(key);
        config.source = ConfigSource::Env;
    }
    if let Some(voice) = var("ELEVENLABS_VOICE_ID") {
        config.tts.elevenlabs_voice_id = Some(voice);
        config.source = ConfigSource::Env;
    }
    Ok(())
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides,
/// then call [`LipsyncConfig::validate`] again.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Provider override
    pub provider: Option<ProviderKind>,

    /// Speaking rate override
    pub rate: Option<f32>,

    /// Tick interval override (milliseconds)
    pub tick_interval_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set provider override
    #[must_use]
    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set speaking rate override
    #[must_use]
    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Set tick interval override
    #[must_use]
    pub fn with_tick_interval_ms(mut self, ms: u64) -> Self {
        self.tick_interval_ms = Some(ms);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut LipsyncConfig) {
        if self.provider.is_some() || self.rate.is_some() || self.tick_interval_ms.is_some() {
            config.source = ConfigSource::Cli;
        }

        if let Some(provider) = self.provider {
            config.tts.provider = provider;
        }
        if let Some(rate) = self.rate {
            config.tts.rate = rate;
        }
        if let Some(ms) = self.tick_interval_ms {
            config.driver.tick_interval = Duration::from_millis(ms);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

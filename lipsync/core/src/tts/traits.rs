//! Text-to-Speech Traits
//!
//! The orchestrator talks to speech engines only through these two traits:
//! a [`TextToSpeechProvider`] turns text into encoded audio, and an
//! [`AudioSink`] plays it. Both are opaque to the animation: the only
//! signals that matter are "completed", "stopped" and "failed".

use async_trait::async_trait;
use thiserror::Error;

/// Errors from synthesis or playback
#[derive(Debug, Error)]
pub enum TtsError {
    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("{provider} returned {status}: {body}")]
    Status {
        /// Provider name
        provider: String,
        /// HTTP status code
        status: u16,
        /// Response body (for diagnostics)
        body: String,
    },

    /// Response could not be decoded
    #[error("Failed to decode {provider} response: {reason}")]
    Decode {
        /// Provider name
        provider: String,
        /// What went wrong
        reason: String,
    },

    /// Response decoded but carried no audio
    #[error("{provider} response contained no audio")]
    MissingAudio {
        /// Provider name
        provider: String,
    },

    /// Local I/O failure (e.g. writing audio to disk)
    #[error("Audio I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Audio sink failed to play
    #[error("Playback failed: {0}")]
    Playback(String),

    /// Provider selected without required settings
    #[error("TTS provider not configured: {0}")]
    NotConfigured(String),
}

/// Encoding of synthesized audio
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioFormat {
    /// RIFF WAV
    Wav,
    /// MPEG layer 3
    Mp3,
}

impl AudioFormat {
    /// Conventional file extension
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
        }
    }
}

/// Character timing reported by providers that support it
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterAlignment {
    /// The character
    pub character: String,
    /// Start of the character in the audio
    pub start_ms: f64,
    /// End of the character in the audio
    pub end_ms: f64,
}

/// A synthesis request
#[derive(Clone, Debug)]
pub struct TtsRequest {
    /// Text to speak
    pub text: String,
    /// Speaking rate multiplier (1.0 = provider default)
    pub rate: f32,
    /// Provider-specific voice identifier
    pub voice: Option<String>,
    /// BCP-47 language code, for providers that take one
    pub language_code: Option<String>,
}

impl Default for TtsRequest {
    fn default() -> Self {
        Self {
            text: String::new(),
            rate: 1.2,
            voice: None,
            language_code: None,
        }
    }
}

impl TtsRequest {
    /// Create a request for `text` with default settings
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Set speaking rate
    #[must_use]
    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    /// Set voice
    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    /// Set language code
    #[must_use]
    pub fn with_language_code(mut self, code: impl Into<String>) -> Self {
        self.language_code = Some(code.into());
        self
    }
}

/// Encoded audio returned by a provider
#[derive(Clone, Debug)]
pub struct SynthesizedSpeech {
    /// Encoded audio bytes
    pub audio: Vec<u8>,
    /// Encoding of `audio`
    pub format: AudioFormat,
    /// Per-character timing, empty if the provider does not report it
    pub alignment: Vec<CharacterAlignment>,
}

impl SynthesizedSpeech {
    /// Audio without alignment data
    #[must_use]
    pub fn new(audio: Vec<u8>, format: AudioFormat) -> Self {
        Self {
            audio,
            format,
            alignment: Vec::new(),
        }
    }
}

/// How a playback ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Audio played to the end
    Completed,
    /// The engine stopped playback early
    Stopped,
}

/// Text-to-speech backend
///
/// Implement this trait to add a speech provider.
#[async_trait]
pub trait TextToSpeechProvider: Send + Sync {
    /// Provider name (e.g., "Piper", "Google")
    fn name(&self) -> &str;

    /// Check if the provider is reachable
    async fn health_check(&self) -> bool {
        true
    }

    /// Convert text to encoded audio
    async fn synthesize(&self, request: &TtsRequest) -> Result<SynthesizedSpeech, TtsError>;
}

/// Playback target for synthesized audio
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Play `speech`, resolving when playback ends
    async fn play(&self, speech: SynthesizedSpeech) -> Result<PlaybackOutcome, TtsError>;

    /// Best-effort request to stop current playback
    fn stop(&self) {}
}

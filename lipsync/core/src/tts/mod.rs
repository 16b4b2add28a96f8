//! Text-to-Speech Integration
//!
//! Speech engines behind a common trait, plus sinks that consume the audio.
//!
//! # Available Providers
//!
//! - **Piper**: local server (default)
//! - **Coqui**: local server
//! - **Google**: Google Cloud Text-to-Speech (API key)
//! - **ElevenLabs**: with per-character timing when the key allows it
//! - **Silent**: no audio, for headless runs
//!
//! # Usage
//!
//! ```ignore
//! use lipsync_core::tts::{ProviderConfig, TtsRequest};
//!
//! let provider = ProviderConfig::default().build()?;
//! let speech = provider.synthesize(&TtsRequest::new("Hello!")).await?;
//! ```

mod coqui;
mod elevenlabs;
mod google;
mod piper;
mod provider;
mod silent;
mod sink;
mod traits;

use std::time::Duration;

use base64::Engine as _;

pub use coqui::{CoquiProvider, DEFAULT_COQUI_URL};
pub use elevenlabs::{ElevenLabsProvider, ELEVENLABS_API_URL};
pub use google::{GoogleProvider, DEFAULT_GOOGLE_LANGUAGE, DEFAULT_GOOGLE_VOICE, GOOGLE_TTS_URL};
pub use piper::{PiperProvider, DEFAULT_PIPER_URL, DEFAULT_PIPER_VOICE};
pub use provider::{ProviderConfig, ProviderKind};
pub use silent::SilentProvider;
pub use sink::{DiscardSink, FileSink};
pub use traits::{
    AudioFormat, AudioSink, CharacterAlignment, PlaybackOutcome, SynthesizedSpeech,
    TextToSpeechProvider, TtsError, TtsRequest,
};

/// Request timeout shared by all HTTP providers
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

fn build_http_client() -> Result<reqwest::Client, TtsError> {
    Ok(reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?)
}

/// Map a non-success response to [`TtsError::Status`]
async fn ensure_success(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, TtsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(provider, status = status.as_u16(), %body, "TTS request failed");
    Err(TtsError::Status {
        provider: provider.to_string(),
        status: status.as_u16(),
        body,
    })
}

fn decode_base64_audio(provider: &str, encoded: &str) -> Result<Vec<u8>, TtsError> {
    base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| TtsError::Decode {
            provider: provider.to_string(),
            reason: format!("invalid base64 audio: {e}"),
        })
}

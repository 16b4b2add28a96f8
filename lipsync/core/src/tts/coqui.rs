//! Coqui TTS Provider
//!
//! Local Coqui `tts-server`: `GET /api/tts?text=...` returns WAV bytes.

use async_trait::async_trait;

use super::traits::{AudioFormat, SynthesizedSpeech, TextToSpeechProvider, TtsError, TtsRequest};
use super::{build_http_client, ensure_success};

/// Default Coqui endpoint
pub const DEFAULT_COQUI_URL: &str = "http://localhost:5002/api/tts";

/// Coqui TTS client
#[derive(Clone, Debug)]
pub struct CoquiProvider {
    url: String,
    http_client: reqwest::Client,
}

impl CoquiProvider {
    /// Create a client for the server at `url`
    pub fn new(url: impl Into<String>) -> Result<Self, TtsError> {
        Ok(Self {
            url: url.into(),
            http_client: build_http_client()?,
        })
    }

    /// Endpoint URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TextToSpeechProvider for CoquiProvider {
    fn name(&self) -> &str {
        "Coqui"
    }

    async fn synthesize(&self, request: &TtsRequest) -> Result<SynthesizedSpeech, TtsError> {
        tracing::info!(provider = self.name(), url = %self.url, chars = request.text.chars().count(), "Calling TTS");

        let response = self
            .http_client
            .get(&self.url)
            .query(&[("text", request.text.as_str())])
            .send()
            .await?;

        tracing::debug!(provider = self.name(), status = %response.status(), "TTS response");
        let response = ensure_success(self.name(), response).await?;

        let audio = response.bytes().await?.to_vec();
        if audio.is_empty() {
            return Err(TtsError::MissingAudio {
                provider: self.name().to_string(),
            });
        }
        Ok(SynthesizedSpeech::new(audio, AudioFormat::Wav))
    }
}

//! Piper TTS Provider
//!
//! Local Piper server (e.g. the `serve-piper-tts` container).
//! `POST /tts` with `{ "text", "voice" }`, answers with WAV bytes.

use async_trait::async_trait;

use super::traits::{AudioFormat, SynthesizedSpeech, TextToSpeechProvider, TtsError, TtsRequest};
use super::{build_http_client, ensure_success};

/// Default Piper endpoint
pub const DEFAULT_PIPER_URL: &str = "http://localhost:5000/tts";

/// Default Piper voice
pub const DEFAULT_PIPER_VOICE: &str = "en_US-lessac-medium";

/// Piper TTS client
#[derive(Clone, Debug)]
pub struct PiperProvider {
    url: String,
    voice: String,
    http_client: reqwest::Client,
}

impl PiperProvider {
    /// Create a client for the server at `url`
    pub fn new(url: impl Into<String>, voice: impl Into<String>) -> Result<Self, TtsError> {
        Ok(Self {
            url: url.into(),
            voice: voice.into(),
            http_client: build_http_client()?,
        })
    }

    /// Endpoint URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_body(&self, request: &TtsRequest) -> serde_json::Value {
        let voice = request.voice.as_deref().unwrap_or(&self.voice);
        serde_json::json!({
            "text": request.text,
            "voice": voice,
        })
    }
}

#[async_trait]
impl TextToSpeechProvider for PiperProvider {
    fn name(&self) -> &str {
        "Piper"
    }

    async fn synthesize(&self, request: &TtsRequest) -> Result<SynthesizedSpeech, TtsError> {
        tracing::info!(provider = self.name(), url = %self.url, chars = request.text.chars().count(), "Calling TTS");

        let response = self
            .http_client
            .post(&self.url)
            .json(&self.request_body(request))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_uses_default_voice() {
        let provider = PiperProvider::new(DEFAULT_PIPER_URL, DEFAULT_PIPER_VOICE).unwrap();
        let body = provider.request_body(&TtsRequest::new("Hello"));
        assert_eq!(body["text"], "Hello");
        assert_eq!(body["voice"], DEFAULT_PIPER_VOICE);
    }

    #[test]
    fn test_request_voice_overrides_default() {
        let provider = PiperProvider::new(DEFAULT_PIPER_URL, DEFAULT_PIPER_VOICE).unwrap();
        let body = provider.request_body(&TtsRequest::new("Hi").with_voice("de_DE-thorsten-low"));
        assert_eq!(body["voice"], "de_DE-thorsten-low");
    }

    #[test]
    fn test_name_and_url() {
        let provider = PiperProvider::new("http://10.0.0.5:5000/tts", DEFAULT_PIPER_VOICE).unwrap();
        assert_eq!(provider.name(), "Piper");
        assert_eq!(provider.url(), "http://10.0.0.5:5000/tts");
    }
}

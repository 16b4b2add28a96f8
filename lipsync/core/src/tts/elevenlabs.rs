//! ElevenLabs Provider
//!
//! Tries the `/with-timestamps` endpoint first, which returns base64 audio
//! plus per-character timing. Keys without access to it get 401/403, in
//! which case the plain endpoint (raw MP3, no alignment) is used instead.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::traits::{
    AudioFormat, CharacterAlignment, SynthesizedSpeech, TextToSpeechProvider, TtsError, TtsRequest,
};
use super::{build_http_client, decode_base64_audio, ensure_success};

/// API base
pub const ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io/v1/text-to-speech";

const MODEL_ID: &str = "eleven_multilingual_v2";

#[derive(Debug, Deserialize)]
struct TimestampedResponse {
    audio_base64: Option<String>,
    alignment: Option<AlignmentArrays>,
}

#[derive(Debug, Deserialize)]
struct AlignmentArrays {
    characters: Vec<String>,
    character_start_times_seconds: Vec<f64>,
    character_end_times_seconds: Vec<f64>,
}

impl AlignmentArrays {
    fn into_alignment(self) -> Vec<CharacterAlignment> {
        self.characters
            .into_iter()
            .zip(self.character_start_times_seconds)
            .zip(self.character_end_times_seconds)
            .map(|((character, start), end)| CharacterAlignment {
                character,
                start_ms: start * 1000.0,
                end_ms: end * 1000.0,
            })
            .collect()
    }
}

/// ElevenLabs client
#[derive(Clone)]
pub struct ElevenLabsProvider {
    api_key: String,
    voice_id: String,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for ElevenLabsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsProvider")
            .field("voice_id", &self.voice_id)
            .finish_non_exhaustive()
    }
}

impl ElevenLabsProvider {
    /// Create a client; both the key and the voice are required
    pub fn new(api_key: impl Into<String>, voice_id: impl Into<String>) -> Result<Self, TtsError> {
        let api_key = api_key.into();
        let voice_id = voice_id.into();
        if api_key.trim().is_empty() {
            return Err(TtsError::NotConfigured(
                "ElevenLabs requires an API key (ELEVENLABS_API_KEY)".to_string(),
            ));
        }
        if voice_id.trim().is_empty() {
            return Err(TtsError::NotConfigured(
                "ElevenLabs requires a voice id (ELEVENLABS_VOICE_ID)".to_string(),
            ));
        }
        Ok(Self {
            api_key,
            voice_id,
            http_client: build_http_client()?,
        })
    }

    fn voice<'a>(&'a self, request: &'a TtsRequest) -> &'a str {
        request.voice.as_deref().unwrap_or(&self.voice_id)
    }

    fn basic_url(&self, request: &TtsRequest) -> String {
        format!("{ELEVENLABS_API_URL}/{}", self.voice(request))
    }

    fn timestamps_url(&self, request: &TtsRequest) -> String {
        format!("{}/with-timestamps", self.basic_url(request))
    }

    fn request_body(request: &TtsRequest) -> serde_json::Value {
        serde_json::json!({
            "text": request.text,
            "model_id": MODEL_ID,
            "voice_settings": {
                "stability": 0.5,
                "similarity_boost": 0.75,
            },
        })
    }

    async fn post(
        &self,
        url: &str,
        accept: &str,
        request: &TtsRequest,
    ) -> Result<reqwest::Response, TtsError> {
        let response = self
            .http_client
            .post(url)
            .header("Accept", accept)
            .header("xi-api-key", &self.api_key)
            .json(&Self::request_body(request))
            .send()
            .await?;
        tracing::debug!(provider = self.name(), url, status = %response.status(), "TTS response");
        Ok(response)
    }

    async fn synthesize_basic(&self, request: &TtsRequest) -> Result<SynthesizedSpeech, TtsError> {
        let response = self
            .post(&self.basic_url(request), "audio/mpeg", request)
            .await?;
        let audio = ensure_success(self.name(), response).await?.bytes().await?.to_vec();
        if audio.is_empty() {
            return Err(TtsError::MissingAudio {
                provider: self.name().to_string(),
            });
        }
        Ok(SynthesizedSpeech::new(audio, AudioFormat::Mp3))
    }
}

/// Parse a `/with-timestamps` response body
fn parse_timestamped(body: &str) -> Result<SynthesizedSpeech, TtsError> {
    let parsed: TimestampedResponse =
        serde_json::from_str(body).map_err(|e| TtsError::Decode {
            provider: "ElevenLabs".to_string(),
            reason: e.to_string(),
        })?;

    let audio = match parsed.audio_base64 {
        Some(encoded) if !encoded.is_empty() => decode_base64_audio("ElevenLabs", &encoded)?,
        _ => {
            return Err(TtsError::MissingAudio {
                provider: "ElevenLabs".to_string(),
            })
        }
    };

    Ok(SynthesizedSpeech {
        audio,
        format: AudioFormat::Mp3,
        alignment: parsed
            .alignment
            .map(AlignmentArrays::into_alignment)
            .unwrap_or_default(),
    })
}

#[async_trait]
impl TextToSpeechProvider for ElevenLabsProvider {
    fn name(&self) -> &str {
        "ElevenLabs"
    }

    async fn synthesize(&self, request: &TtsRequest) -> Result<SynthesizedSpeech, TtsError> {
        tracing::info!(provider = self.name(), voice = self.voice(request), "Calling TTS");

        let response = self
            .post(&self.timestamps_url(request), "application/json", request)
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            tracing::warn!(
                provider = self.name(),
                status = %response.status(),
                "Timestamped endpoint refused, falling back to basic endpoint"
            );
            return self.synthesize_basic(request).await;
        }

        let body = ensure_success(self.name(), response).await?.text().await?;
        let speech = parse_timestamped(&body)?;
        tracing::debug!(
            provider = self.name(),
            alignments = speech.alignment.len(),
            "Received character alignment"
        );
        Ok(speech)
    }
}

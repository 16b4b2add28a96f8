//! Google Cloud Text-to-Speech Provider
//!
//! `POST https://texttospeech.googleapis.com/v1/text:synthesize?key=...`
//! with an API key. The response carries base64 MP3 in `audioContent`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::traits::{AudioFormat, SynthesizedSpeech, TextToSpeechProvider, TtsError, TtsRequest};
use super::{build_http_client, decode_base64_audio, ensure_success};

/// Synthesis endpoint
pub const GOOGLE_TTS_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// Default language
pub const DEFAULT_GOOGLE_LANGUAGE: &str = "en-US";

/// Default voice
pub const DEFAULT_GOOGLE_VOICE: &str = "en-US-Neural2-D";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeBody<'a> {
    input: TextInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct TextInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: Option<String>,
}

/// Google Cloud TTS client
#[derive(Clone)]
pub struct GoogleProvider {
    api_key: String,
    language_code: String,
    voice: String,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for GoogleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleProvider")
            .field("language_code", &self.language_code)
            .field("voice", &self.voice)
            .finish_non_exhaustive()
    }
}

impl GoogleProvider {
    /// Create a client; fails if `api_key` is empty
    pub fn new(
        api_key: impl Into<String>,
        language_code: impl Into<String>,
        voice: impl Into<String>,
    ) -> Result<Self, TtsError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(TtsError::NotConfigured(
                "Google TTS requires an API key (GOOGLE_TTS_API_KEY)".to_string(),
            ));
        }
        Ok(Self {
            api_key,
            language_code: language_code.into(),
            voice: voice.into(),
            http_client: build_http_client()?,
        })
    }

    fn request_body<'a>(&'a self, request: &'a TtsRequest) -> SynthesizeBody<'a> {
        SynthesizeBody {
            input: TextInput {
                text: &request.text,
            },
            voice: VoiceSelection {
                language_code: request
                    .language_code
                    .as_deref()
                    .unwrap_or(&self.language_code),
                name: request.voice.as_deref().unwrap_or(&self.voice),
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
                speaking_rate: request.rate,
            },
        }
    }
}

/// Extract MP3 bytes from a synthesize response body
fn parse_response(body: &str) -> Result<Vec<u8>, TtsError> {
    let parsed: SynthesizeResponse = serde_json::from_str(body).map_err(|e| TtsError::Decode {
        provider: "Google".to_string(),
        reason: e.to_string(),
    })?;
    match parsed.audio_content {
        Some(content) if !content.is_empty() => decode_base64_audio("Google", &content),
        _ => Err(TtsError::MissingAudio {
            provider: "Google".to_string(),
        }),
    }
}

#[async_trait]
impl TextToSpeechProvider for GoogleProvider {
    fn name(&self) -> &str {
        "Google"
    }

    async fn synthesize(&self, request: &TtsRequest) -> Result<SynthesizedSpeech, TtsError> {
        tracing::info!(
            provider = self.name(),
            voice = request.voice.as_deref().unwrap_or(&self.voice),
            rate = request.rate,
            "Calling TTS"
        );

        let response = self
            .http_client
            .post(GOOGLE_TTS_URL)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.request_body(request))
            .send()
            .await?;

        tracing::debug!(provider = self.name(), status = %response.status(), "TTS response");
        let body = ensure_success(self.name(), response).await?.text().await?;
        let audio = parse_response(&body)?;
        Ok(SynthesizedSpeech::new(audio, AudioFormat::Mp3))
    }
}

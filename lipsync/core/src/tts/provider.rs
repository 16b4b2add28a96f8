//! Provider selection

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::coqui::{CoquiProvider, DEFAULT_COQUI_URL};
use super::elevenlabs::ElevenLabsProvider;
use super::google::{GoogleProvider, DEFAULT_GOOGLE_LANGUAGE, DEFAULT_GOOGLE_VOICE};
use super::piper::{PiperProvider, DEFAULT_PIPER_URL, DEFAULT_PIPER_VOICE};
use super::silent::SilentProvider;
use super::traits::{TextToSpeechProvider, TtsError};

/// Provider names accepted in configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// [`SilentProvider`]
    Silent,
    /// [`PiperProvider`]
    #[default]
    Piper,
    /// [`CoquiProvider`]
    Coqui,
    /// [`GoogleProvider`]
    Google,
    /// [`ElevenLabsProvider`]
    ElevenLabs,
}

impl ProviderKind {
    /// Every accepted kind
    pub const ALL: [Self; 5] = [
        Self::Silent,
        Self::Piper,
        Self::Coqui,
        Self::Google,
        Self::ElevenLabs,
    ];

    /// Configuration name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Silent => "silent",
            Self::Piper => "piper",
            Self::Coqui => "coqui",
            Self::Google => "google",
            Self::ElevenLabs => "elevenlabs",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown TTS provider '{s}' (expected one of: silent, piper, coqui, google, elevenlabs)"
                )
            })
    }
}

/// Fully resolved provider settings
#[derive(Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    /// No audio
    Silent,
    /// Local Piper server
    Piper {
        /// Endpoint URL
        url: String,
        /// Voice name
        voice: String,
    },
    /// Local Coqui server
    Coqui {
        /// Endpoint URL
        url: String,
    },
    /// Google Cloud TTS
    Google {
        /// API key
        api_key: Option<String>,
        /// Language code
        language_code: String,
        /// Voice name
        voice: String,
    },
    /// ElevenLabs
    ElevenLabs {
        /// API key
        api_key: Option<String>,
        /// Voice id
        voice_id: Option<String>,
    },
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Silent => f.write_str("Silent"),
            Self::Piper { url, voice } => f
                .debug_struct("Piper")
                .field("url", url)
                .field("voice", voice)
                .finish(),
            Self::Coqui { url } => f.debug_struct("Coqui").field("url", url).finish(),
            Self::Google {
                api_key,
                language_code,
                voice,
            } => f
                .debug_struct("Google")
                .field("api_key", &api_key.as_ref().map(|_| "<redacted>"))
                .field("language_code", language_code)
                .field("voice", voice)
                .finish(),
            Self::ElevenLabs { api_key, voice_id } => f
                .debug_struct("ElevenLabs")
                .field("api_key", &api_key.as_ref().map(|_| "<redacted>"))
                .field("voice_id", voice_id)
                .finish(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::piper(DEFAULT_PIPER_URL)
    }
}

impl ProviderConfig {
    /// Piper at `url` with the default voice
    pub fn piper(url: impl Into<String>) -> Self {
        Self::Piper {
            url: url.into(),
            voice: DEFAULT_PIPER_VOICE.to_string(),
        }
    }

    /// Coqui at the default URL
    #[must_use]
    pub fn coqui() -> Self {
        Self::Coqui {
            url: DEFAULT_COQUI_URL.to_string(),
        }
    }

    /// Google with default language and voice
    #[must_use]
    pub fn google(api_key: Option<String>) -> Self {
        Self::Google {
            api_key,
            language_code: DEFAULT_GOOGLE_LANGUAGE.to_string(),
            voice: DEFAULT_GOOGLE_VOICE.to_string(),
        }
    }

    /// Which provider this selects
    #[must_use]
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Silent => ProviderKind::Silent,
            Self::Piper { .. } => ProviderKind::Piper,
            Self::Coqui { .. } => ProviderKind::Coqui,
            Self::Google { .. } => ProviderKind::Google,
            Self::ElevenLabs { .. } => ProviderKind::ElevenLabs,
        }
    }

    /// Construct the provider
    ///
    /// Fails with [`TtsError::NotConfigured`] if a required credential is
    /// missing.
    pub fn build(&self) -> Result<Arc<dyn TextToSpeechProvider>, TtsError> {
        let provider: Arc<dyn TextToSpeechProvider> = match self {
            Self::Silent => Arc::new(SilentProvider),
            Self::Piper { url, voice } => Arc::new(PiperProvider::new(url, voice)?),
            Self::Coqui { url } => Arc::new(CoquiProvider::new(url)?),
            Self::Google {
                api_key,
                language_code,
                voice,
            } => Arc::new(GoogleProvider::new(
                api_key.clone().unwrap_or_default(),
                language_code,
                voice,
            )?),
            Self::ElevenLabs { api_key, voice_id } => Arc::new(ElevenLabsProvider::new(
                api_key.clone().unwrap_or_default(),
                voice_id.clone().unwrap_or_default(),
            )?),
        };
        tracing::debug!(provider = provider.name(), "Built TTS provider");
        Ok(provider)
    }
}

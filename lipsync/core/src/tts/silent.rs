//! Silent provider
//!
//! Returns empty audio at once. Used for headless runs where only the
//! animation matters, and in tests.

use async_trait::async_trait;

use super::traits::{AudioFormat, SynthesizedSpeech, TextToSpeechProvider, TtsError, TtsRequest};

/// Provider that synthesizes nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentProvider;

#[async_trait]
impl TextToSpeechProvider for SilentProvider {
    fn name(&self) -> &str {
        "Silent"
    }

    async fn synthesize(&self, request: &TtsRequest) -> Result<SynthesizedSpeech, TtsError> {
        tracing::debug!(provider = self.name(), chars = request.text.chars().count(), "Skipping synthesis");
        Ok(SynthesizedSpeech::new(Vec::new(), AudioFormat::Wav))
    }
}

//! Audio sinks
//!
//! Neither sink drives a sound device: [`DiscardSink`] drops the audio and
//! [`FileSink`] saves it for an external player.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use super::traits::{AudioSink, PlaybackOutcome, SynthesizedSpeech, TtsError};

/// Sink that drops audio and reports completion immediately
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardSink;

#[async_trait]
impl AudioSink for DiscardSink {
    async fn play(&self, speech: SynthesizedSpeech) -> Result<PlaybackOutcome, TtsError> {
        tracing::trace!(bytes = speech.audio.len(), "Discarding audio");
        Ok(PlaybackOutcome::Completed)
    }
}

/// Sink that writes each utterance to `utterance-<n>.<ext>` in a directory
#[derive(Debug)]
pub struct FileSink {
    dir: PathBuf,
    counter: AtomicU64,
}

impl FileSink {
    /// Write into `dir` (created on first use)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            counter: AtomicU64::new(1),
        }
    }

    /// Target directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl AudioSink for FileSink {
    async fn play(&self, speech: SynthesizedSpeech) -> Result<PlaybackOutcome, TtsError> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let path = self
            .dir
            .join(format!("utterance-{n}.{}", speech.format.extension()));

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, &speech.audio).await?;

        tracing::info!(path = %path.display(), bytes = speech.audio.len(), "Saved utterance audio");
        Ok(PlaybackOutcome::Completed)
    }
}

//! Speech Orchestrator
//!
//! Starts and stops speech and animation together. Each `speak` call runs
//! two independent tasks:
//!
//! - the **TTS task**: synthesize, then hand the audio to the sink
//! - the **tick task**: follow the estimated timeline and publish poses
//!
//! They share no clock. The animation runs on its estimate and is only cut
//! short when the engine reports that playback stopped, or when synthesis
//! fails and [`TtsFailurePolicy::StopAnimation`] is in effect.
//!
//! # Usage
//!
//! ```ignore
//! use lipsync_core::{SpeechOrchestrator, OrchestratorConfig};
//! use lipsync_core::tts::{DiscardSink, ProviderConfig};
//!
//! let provider = ProviderConfig::default().build()?;
//! let orchestrator = SpeechOrchestrator::new(provider, Arc::new(DiscardSink), OrchestratorConfig::default());
//!
//! let mut frames = orchestrator.subscribe();
//! if let Some(utterance) = orchestrator.speak("Hello there") {
//!     utterance.finished().await?;
//! }
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::animation::{
    AnimationState, AnimationStateReceiver, DriverConfig, LipsyncDriver, StatePublisher,
    TickHandle, TickTask,
};
use crate::duration::DurationModel;
use crate::timeline::TimelineBuilder;
use crate::tts::{AudioSink, PlaybackOutcome, TextToSpeechProvider, TtsError, TtsRequest};
use crate::viseme::MouthShape;

/// Mouth opening shown the moment an utterance starts
pub const DEFAULT_SPEAKING_OPEN: f32 = 0.3;

/// What to do with the animation when synthesis or playback fails
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtsFailurePolicy {
    /// Clear the state and stop ticking
    #[default]
    StopAnimation,
    /// Let the animation run its estimated course
    KeepAnimating,
}

/// Orchestrator settings
#[derive(Clone, Debug, PartialEq)]
pub struct OrchestratorConfig {
    /// Animation driver tuning
    pub driver: DriverConfig,
    /// Per-character durations
    pub durations: DurationModel,
    /// Pose published when an utterance begins
    pub speaking_pose: MouthShape,
    /// Speaking rate passed to the provider
    pub speech_rate: f32,
    /// Voice override passed to the provider
    pub voice: Option<String>,
    /// Language override passed to the provider
    pub language_code: Option<String>,
    /// Reaction to TTS failures
    pub failure_policy: TtsFailurePolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            driver: DriverConfig::default(),
            durations: DurationModel::default(),
            speaking_pose: MouthShape::new(DEFAULT_SPEAKING_OPEN, 0.0),
            speech_rate: TtsRequest::default().rate,
            voice: None,
            language_code: None,
            failure_policy: TtsFailurePolicy::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Set the failure policy
    #[must_use]
    pub fn with_failure_policy(mut self, policy: TtsFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Set the driver tuning
    #[must_use]
    pub fn with_driver(mut self, driver: DriverConfig) -> Self {
        self.driver = driver;
        self
    }

    fn request(&self, text: &str) -> TtsRequest {
        TtsRequest {
            text: text.to_string(),
            rate: self.speech_rate,
            voice: self.voice.clone(),
            language_code: self.language_code.clone(),
        }
    }
}

/// How an utterance ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeechOutcome {
    /// Audio played to the end
    Completed,
    /// The engine stopped playback; the animation was cleared
    Stopped,
    /// Superseded by a newer utterance or ended by `stop()`
    Cancelled,
}

/// Errors surfaced through [`Utterance::finished`]
#[derive(Debug, Error)]
pub enum SpeechError {
    /// Synthesis or playback failed
    #[error("Speech failed: {0}")]
    Tts(#[from] TtsError),
}

/// Handle to one `speak` call
#[derive(Debug)]
pub struct Utterance {
    id: u64,
    outcome: oneshot::Receiver<Result<SpeechOutcome, SpeechError>>,
}

impl Utterance {
    /// Animation cycle this utterance owns
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the TTS side to end
    ///
    /// The animation may still be fading out when this resolves.
    pub async fn finished(self) -> Result<SpeechOutcome, SpeechError> {
        self.outcome.await.unwrap_or(Ok(SpeechOutcome::Cancelled))
    }
}

struct ActiveUtterance {
    id: u64,
    ticks: TickHandle,
    speech: JoinHandle<()>,
}

impl ActiveUtterance {
    fn cancel(&self) {
        self.ticks.cancel();
        self.speech.abort();
    }
}

struct Inner {
    provider: Arc<dyn TextToSpeechProvider>,
    sink: Arc<dyn AudioSink>,
    config: OrchestratorConfig,
    publisher: StatePublisher,
    active: Mutex<Option<ActiveUtterance>>,
}

impl Inner {
    async fn run_speech(&self, id: u64, request: TtsRequest) -> Result<SpeechOutcome, SpeechError> {
        match self.synthesize_and_play(&request).await {
            Ok(PlaybackOutcome::Completed) => {
                tracing::info!(utterance = id, provider = self.provider.name(), "Speech completed");
                Ok(SpeechOutcome::Completed)
            }
            Ok(PlaybackOutcome::Stopped) => {
                tracing::info!(utterance = id, "Engine stopped playback, clearing animation");
                self.halt(id);
                Ok(SpeechOutcome::Stopped)
            }
            Err(e) => {
                tracing::warn!(
                    utterance = id,
                    provider = self.provider.name(),
                    error = %e,
                    policy = ?self.config.failure_policy,
                    "Speech failed"
                );
                if self.config.failure_policy == TtsFailurePolicy::StopAnimation {
                    self.halt(id);
                }
                Err(e.into())
            }
        }
    }

    async fn synthesize_and_play(&self, request: &TtsRequest) -> Result<PlaybackOutcome, TtsError> {
        let speech = self.provider.synthesize(request).await?;
        tracing::debug!(
            bytes = speech.audio.len(),
            format = ?speech.format,
            alignments = speech.alignment.len(),
            "Audio synthesized"
        );
        self.sink.play(speech).await
    }

    /// End utterance `id` early, from inside its own TTS task
    fn halt(&self, id: u64) {
        let mut active = self.active.lock();
        if active.as_ref().is_some_and(|a| a.id == id) {
            if let Some(current) = active.take() {
                // Dropping `speech` detaches this very task rather than aborting it
                current.ticks.cancel();
            }
        }
        drop(active);
        self.publisher.finish(id);
    }
}

/// Coordinates TTS and lipsync animation
///
/// Cheap to clone; clones share the same state and active utterance.
#[derive(Clone)]
pub struct SpeechOrchestrator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SpeechOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechOrchestrator")
            .field("provider", &self.inner.provider.name())
            .field("state", &self.inner.publisher.snapshot())
            .finish_non_exhaustive()
    }
}

impl SpeechOrchestrator {
    /// Create an orchestrator over `provider` and `sink`
    pub fn new(
        provider: Arc<dyn TextToSpeechProvider>,
        sink: Arc<dyn AudioSink>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                provider,
                sink,
                config,
                publisher: StatePublisher::new(),
                active: Mutex::new(None),
            }),
        }
    }

    /// Speak `text` and animate the mouth alongside it
    ///
    /// Returns `None` without touching any state if `text` is empty or only
    /// whitespace. Otherwise supersedes any utterance in progress and returns
    /// at once; must be called within a tokio runtime.
    pub fn speak(&self, text: &str) -> Option<Utterance> {
        if text.trim().is_empty() {
            tracing::debug!("Ignoring empty utterance");
            return None;
        }

        let config = &self.inner.config;
        let mut active = self.inner.active.lock();

        if let Some(previous) = active.take() {
            tracing::warn!(utterance = previous.id, "Superseding active utterance");
            previous.cancel();
            self.inner.sink.stop();
        }

        let timeline = TimelineBuilder::new(config.durations).build(text);
        let pose = config.speaking_pose;
        let id = self.inner.publisher.begin_cycle(pose);

        tracing::info!(
            utterance = id,
            provider = self.inner.provider.name(),
            chars = timeline.len(),
            estimated_ms = timeline.total_duration_ms(),
            "Speaking"
        );

        let driver = LipsyncDriver::new(timeline, config.driver).starting_from(pose);
        let ticks = TickTask::new(driver, self.inner.publisher.clone(), id).spawn();

        let (tx, rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);
        let request = config.request(text);
        let speech = tokio::spawn(async move {
            let result = inner.run_speech(id, request).await;
            let _ = tx.send(result);
        });

        *active = Some(ActiveUtterance { id, ticks, speech });
        Some(Utterance { id, outcome: rx })
    }

    /// Stop speech and animation at once
    ///
    /// Safe to call at any time; repeated calls leave the same idle state.
    pub fn stop(&self) {
        let previous = self.inner.active.lock().take();
        if let Some(previous) = previous {
            previous.cancel();
            self.inner.sink.stop();
            tracing::info!(utterance = previous.id, "Speech stopped");
        }
        self.inner.publisher.clear();
    }

    /// Current animation state
    #[must_use]
    pub fn state(&self) -> AnimationState {
        self.inner.publisher.snapshot()
    }

    /// Subscribe to state changes
    #[must_use]
    pub fn subscribe(&self) -> AnimationStateReceiver {
        self.inner.publisher.subscribe()
    }

    /// Whether an utterance (or its fade-out) is in progress
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.state().is_playing
    }

    /// Name of the TTS provider
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.inner.provider.name()
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.inner.config
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::tts::{AudioFormat, DiscardSink, SilentProvider, SynthesizedSpeech};

    /// Provider that waits, then succeeds or fails
    struct ScriptedProvider {
        delay: Duration,
        fail: bool,
    }

    #[async_trait]
    impl TextToSpeechProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "Scripted"
        }

        async fn synthesize(&self, _request: &TtsRequest) -> Result<SynthesizedSpeech, TtsError> {
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(TtsError::Playback("scripted failure".to_string()));
            }
            Ok(SynthesizedSpeech::new(vec![0; 4], AudioFormat::Wav))
        }
    }

    /// Sink that reports the engine stopping playback
    struct StoppingSink;

    #[async_trait]
    impl AudioSink for StoppingSink {
        async fn play(&self, _speech: SynthesizedSpeech) -> Result<PlaybackOutcome, TtsError> {
            Ok(PlaybackOutcome::Stopped)
        }
    }

    fn orchestrator(provider: impl TextToSpeechProvider + 'static) -> SpeechOrchestrator {
        SpeechOrchestrator::new(
            Arc::new(provider),
            Arc::new(DiscardSink),
            OrchestratorConfig::default(),
        )
    }

    fn slow_provider() -> ScriptedProvider {
        ScriptedProvider {
            delay: Duration::from_secs(5),
            fail: false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_text_is_ignored() {
        let orchestrator = orchestrator(SilentProvider);
        let before = orchestrator.state();

        assert!(orchestrator.speak("").is_none());
        assert!(orchestrator.speak("  \n\t").is_none());

        assert_eq!(orchestrator.state(), before);
        assert_eq!(orchestrator.state().cycle(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_speak_shows_speaking_pose() {
        let orchestrator = orchestrator(slow_provider());
        let utterance = orchestrator.speak("hello").unwrap();

        let state = orchestrator.state();
        assert!(state.is_playing);
        assert_eq!(state.cycle(), utterance.id());
        assert_eq!(state.current_shape, MouthShape::new(DEFAULT_SPEAKING_OPEN, 0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let orchestrator = orchestrator(slow_provider());
        let utterance = orchestrator.speak("hello world").unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        orchestrator.stop();
        let once = orchestrator.state();
        orchestrator.stop();
        let twice = orchestrator.state();

        assert!(once.is_idle());
        assert_eq!(once, twice);
        assert_eq!(utterance.finished().await.unwrap(), SpeechOutcome::Cancelled);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(orchestrator.state(), twice);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_when_idle_is_harmless() {
        let orchestrator = orchestrator(SilentProvider);
        orchestrator.stop();
        assert!(orchestrator.state().is_idle());
        assert_eq!(orchestrator.state().cycle(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_speak_supersedes_first() {
        let orchestrator = orchestrator(slow_provider());
        let first = orchestrator.speak("aaaaaaaa").unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let second = orchestrator.speak("ooo").unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(first.finished().await.unwrap(), SpeechOutcome::Cancelled);

        for _ in 0..10 {
            tokio::time::sleep(Duration::from_millis(16)).await;
            assert_eq!(orchestrator.state().cycle(), second.id());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_engine_stop_clears_state() {
        let orchestrator = SpeechOrchestrator::new(
            Arc::new(SilentProvider),
            Arc::new(StoppingSink),
            OrchestratorConfig::default(),
        );
        let utterance = orchestrator.speak("a long sentence to speak").unwrap();

        assert_eq!(utterance.finished().await.unwrap(), SpeechOutcome::Stopped);
        assert!(orchestrator.state().is_idle());
        assert!(!orchestrator.is_speaking());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_stops_animation_by_default() {
        let orchestrator = orchestrator(ScriptedProvider {
            delay: Duration::ZERO,
            fail: true,
        });
        let utterance = orchestrator.speak("hello").unwrap();

        let result = utterance.finished().await;
        assert!(matches!(result, Err(SpeechError::Tts(TtsError::Playback(_)))));
        assert!(orchestrator.state().is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_animating_when_configured() {
        let orchestrator = SpeechOrchestrator::new(
            Arc::new(ScriptedProvider {
                delay: Duration::ZERO,
                fail: true,
            }),
            Arc::new(DiscardSink),
            OrchestratorConfig::default().with_failure_policy(TtsFailurePolicy::KeepAnimating),
        );
        let utterance = orchestrator.speak("hello").unwrap();

        assert!(utterance.finished().await.is_err());
        assert!(orchestrator.is_speaking());
    }

    #[tokio::test(start_paused = true)]
    async fn test_animation_runs_to_idle_after_completion() {
        let orchestrator = orchestrator(SilentProvider);
        let mut rx = orchestrator.subscribe();
        let utterance = orchestrator.speak("hi").unwrap();

        assert_eq!(utterance.finished().await.unwrap(), SpeechOutcome::Completed);

        while let Some(state) = rx.changed().await {
            if !state.is_playing {
                break;
            }
        }
        assert!(orchestrator.state().is_idle());
    }
}

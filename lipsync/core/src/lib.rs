//! Lipsync Core - Text-Driven Mouth Animation for Speaking Avatars
//!
//! Turns a line of text into a stream of mouth poses that a 3D renderer can
//! apply to its morph targets, while a text-to-speech engine speaks the same
//! line. The animation is driven by an estimate built from the text alone:
//! it never inspects the audio and shares no clock with playback.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         Caller / CLI                             │
//! │            speak(text)  stop()       state() / subscribe()       │
//! └──────────────┬────────────────────────────────▲──────────────────┘
//!                │                                │
//! ┌──────────────┼────────────────────────────────┼──────────────────┐
//! │              ▼        SpeechOrchestrator      │                  │
//! │  ┌────────────────────┐            ┌──────────┴──────────┐       │
//! │  │      TTS task      │            │    StatePublisher    │       │
//! │  │ provider → sink    │            │   (watch channel)    │       │
//! │  └────────────────────┘            └──────────▲──────────┘       │
//! │                                               │ every tick       │
//! │  text → classify → duration → Timeline ──► TickTask(LipsyncDriver)│
//! └──────────────────────────────────────────────────────────────────┘
//!                                                 │
//!                                         MorphRig (renderer)
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use lipsync_core::{load_config, MorphRig, SpeechOrchestrator};
//! use lipsync_core::tts::DiscardSink;
//!
//! let config = load_config()?;
//! let provider = config.provider_config().build()?;
//! let orchestrator =
//!     SpeechOrchestrator::new(provider, Arc::new(DiscardSink), config.orchestrator_config());
//!
//! let mut rig = MorphRig::from_names(["mouthOpen", "mouthSmile"]);
//! let mut frames = orchestrator.subscribe();
//! orchestrator.speak("Hello there");
//!
//! while let Some(state) = frames.changed().await {
//!     rig.update(&state);
//!     if !state.is_playing {
//!         break;
//!     }
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`viseme`]: phonetic categories and their mouth shapes
//! - [`grapheme`]: character to phonetic category
//! - [`duration`]: character to estimated duration
//! - [`timeline`]: text to a contiguous, time-indexed timeline
//! - [`animation`]: driver state machine, tick task and published state
//! - [`orchestrator`]: starts and stops speech and animation together
//! - [`tts`]: speech providers (Piper, Coqui, Google, ElevenLabs) and sinks
//! - [`morph`]: fan-out of the published pose onto named morph targets
//! - [`config`]: TOML, environment and CLI configuration

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod config;
pub mod duration;
pub mod grapheme;
pub mod morph;
pub mod orchestrator;
pub mod timeline;
pub mod tts;
pub mod viseme;

pub use animation::{
    AnimationState, AnimationStateReceiver, DriverConfig, DriverPhase, DriverStep, LipsyncDriver,
    StatePublisher, TickHandle, TickTask,
};
pub use duration::DurationModel;
pub use grapheme::classify;
pub use morph::{MorphChannel, MorphRig, MouthAxis};
pub use orchestrator::{
    OrchestratorConfig, SpeechError, SpeechOrchestrator, SpeechOutcome, TtsFailurePolicy,
    Utterance,
};
pub use timeline::{Timeline, TimelineBuilder, TimelineEntry};
pub use tts::{
    AudioSink, ProviderConfig, ProviderKind, TextToSpeechProvider, TtsError, TtsRequest,
};
pub use viseme::{shape_for, MouthShape, PhoneticCategory};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, LipsyncConfig, LipsyncToml, TtsSettings,
};

//! Animation Driver
//!
//! Turns a [`Timeline`](crate::timeline::Timeline) into a stream of mouth
//! poses published at a fixed rate.
//!
//! # Architecture
//!
//! ```text
//! SpeechOrchestrator
//!     │ begin_cycle / clear
//!     ▼
//! StatePublisher ──watch──► AnimationStateReceiver (renderer, status UI)
//!     ▲
//!     │ publish(cycle, shape) every tick
//! TickTask ── owns ──► LipsyncDriver (pure step function)
//!     │
//! TickHandle (cancel)
//! ```
//!
//! The driver never looks at the audio: timing comes entirely from the
//! timeline's estimate.

mod driver;
mod state;
mod tick;

pub use driver::{DriverConfig, DriverPhase, DriverStep, LipsyncDriver};
pub use state::{AnimationState, AnimationStateReceiver, StatePublisher};
pub use tick::{TickHandle, TickTask};

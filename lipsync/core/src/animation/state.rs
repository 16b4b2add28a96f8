//! Published animation state
//!
//! The orchestrator owns one [`StatePublisher`]; renderers hold
//! [`AnimationStateReceiver`]s. Every write names the cycle it belongs to and
//! is checked against the current cycle inside the channel's write lock, so
//! a tick task from a superseded utterance can never overwrite a newer one.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::viseme::MouthShape;

/// Mouth pose and playback flag as seen by the renderer
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct AnimationState {
    /// Current smoothed mouth pose
    pub current_shape: MouthShape,
    /// Whether an utterance (including its fade-out) is in progress
    pub is_playing: bool,
    cycle: u64,
}

impl AnimationState {
    /// Generation counter, bumped whenever a cycle begins or is cleared
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Whether the mouth is at rest and nothing is playing
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.is_playing && self.current_shape.is_silent()
    }

    fn reset(&mut self) {
        self.current_shape = MouthShape::SILENT;
        self.is_playing = false;
        self.cycle += 1;
    }
}

/// Write side of the animation state channel
#[derive(Clone, Debug)]
pub struct StatePublisher {
    tx: Arc<watch::Sender<AnimationState>>,
}

impl Default for StatePublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl StatePublisher {
    /// Create a publisher holding the idle state
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AnimationState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Current state
    #[must_use]
    pub fn snapshot(&self) -> AnimationState {
        *self.tx.borrow()
    }

    /// New read handle that observes every subsequent change
    #[must_use]
    pub fn subscribe(&self) -> AnimationStateReceiver {
        AnimationStateReceiver {
            rx: self.tx.subscribe(),
        }
    }

    /// Start a new cycle showing `pose`, returning its number
    ///
    /// Any writer holding an older cycle number is locked out from here on.
    pub fn begin_cycle(&self, pose: MouthShape) -> u64 {
        let mut cycle = 0;
        self.tx.send_modify(|state| {
            state.cycle += 1;
            state.current_shape = pose;
            state.is_playing = true;
            cycle = state.cycle;
        });
        cycle
    }

    /// Publish `shape` for `cycle`
    ///
    /// Returns `false` (and changes nothing) if `cycle` is no longer the
    /// active playing cycle.
    pub fn publish(&self, cycle: u64, shape: MouthShape) -> bool {
        self.tx.send_if_modified(|state| {
            if state.cycle != cycle || !state.is_playing {
                return false;
            }
            state.current_shape = shape;
            true
        })
    }

    /// Return to idle if `cycle` is still the active one
    pub fn finish(&self, cycle: u64) -> bool {
        self.tx.send_if_modified(|state| {
            if state.cycle != cycle {
                return false;
            }
            state.reset();
            true
        })
    }

    /// Return to idle regardless of cycle
    ///
    /// A no-op when already idle, so repeated calls leave identical state.
    pub fn clear(&self) -> bool {
        self.tx.send_if_modified(|state| {
            if state.is_idle() {
                return false;
            }
            state.reset();
            true
        })
    }
}

/// Read side of the animation state channel
#[derive(Clone, Debug)]
pub struct AnimationStateReceiver {
    rx: watch::Receiver<AnimationState>,
}

impl AnimationStateReceiver {
    /// Latest published state (does not mark it as seen)
    #[must_use]
    pub fn current(&self) -> AnimationState {
        *self.rx.borrow()
    }

    /// Wait for the next change and return it
    ///
    /// Returns `None` once the publisher has been dropped.
    pub async fn changed(&mut self) -> Option<AnimationState> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

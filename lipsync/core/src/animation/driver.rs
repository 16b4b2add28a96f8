//! Lipsync driver state machine
//!
//! Pure, clock-free core of the animation: given the elapsed time since the
//! utterance started, decide the next mouth pose. The periodic task that
//! feeds it real time lives in [`super::tick`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::timeline::Timeline;
use crate::viseme::MouthShape;

/// Tuning for the animation driver
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Period between ticks (16 ms is about 60 Hz)
    pub tick_interval: Duration,
    /// Fraction of the remaining distance to the target covered per tick
    pub smoothing: f32,
    /// How long past the estimated end to keep tracking before fading
    pub grace: Duration,
    /// Per-tick multiplier applied during fade-out
    pub fade_factor: f32,
    /// Fade-out ends once `open` drops below this
    pub fade_threshold: f32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(16),
            smoothing: 0.5,
            grace: Duration::from_millis(300),
            fade_factor: 0.7,
            fade_threshold: 0.01,
        }
    }
}

impl DriverConfig {
    /// Fast ticks for tests
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            tick_interval: Duration::from_millis(1),
            ..Self::default()
        }
    }

    /// Set the tick interval
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set the trailing grace window
    #[must_use]
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }
}

/// Phase of a driver's life
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverPhase {
    /// Tracking timeline targets
    Speaking,
    /// Past the end of the timeline, decaying to rest
    FadingOut,
    /// Done; every further step is idle
    Finished,
}

/// What a single tick decided
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DriverStep {
    /// Publish this pose
    Publish(MouthShape),
    /// The cycle is over; clear the state and stop ticking
    Idle,
}

/// Timeline-following smoother with trailing fade-out
#[derive(Clone, Debug)]
pub struct LipsyncDriver {
    timeline: Timeline,
    config: DriverConfig,
    current: MouthShape,
    phase: DriverPhase,
}

impl LipsyncDriver {
    /// Create a driver starting from a closed mouth
    #[must_use]
    pub fn new(timeline: Timeline, config: DriverConfig) -> Self {
        Self {
            timeline,
            config,
            current: MouthShape::SILENT,
            phase: DriverPhase::Speaking,
        }
    }

    /// Start smoothing from `pose` (the pose already on screen)
    #[must_use]
    pub fn starting_from(mut self, pose: MouthShape) -> Self {
        self.current = pose;
        self
    }

    /// Current smoothed pose
    #[must_use]
    pub fn current(&self) -> MouthShape {
        self.current
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> DriverPhase {
        self.phase
    }

    /// Driver tuning
    #[must_use]
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Timeline being followed
    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Advance to `elapsed_ms` since the utterance began
    pub fn step(&mut self, elapsed_ms: u64) -> DriverStep {
        if self.phase == DriverPhase::Finished {
            return DriverStep::Idle;
        }
        if self.timeline.is_empty() {
            return self.finish();
        }

        let fade_after = self
            .timeline
            .total_duration_ms()
            .saturating_add(duration_ms(self.config.grace));

        if elapsed_ms > fade_after {
            self.phase = DriverPhase::FadingOut;
            self.current = self.current.scaled(self.config.fade_factor);
            if self.current.open < self.config.fade_threshold {
                return self.finish();
            }
            return DriverStep::Publish(self.current);
        }

        let target = self
            .timeline
            .entry_at(elapsed_ms)
            .map_or(MouthShape::SILENT, |entry| entry.target);
        self.current = self.current.approach(target, self.config.smoothing);
        DriverStep::Publish(self.current)
    }

    fn finish(&mut self) -> DriverStep {
        self.phase = DriverPhase::Finished;
        self.current = MouthShape::SILENT;
        DriverStep::Idle
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

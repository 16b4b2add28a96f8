//! Periodic tick task
//!
//! Wraps a [`LipsyncDriver`] in a tokio interval loop that publishes each
//! step to a [`StatePublisher`]. [`TickHandle`] is the one place a running
//! task is cancelled from.
//!
//! ```ignore
//! let cycle = publisher.begin_cycle(pose);
//! let driver = LipsyncDriver::new(Timeline::build("hello"), config).starting_from(pose);
//! let handle = TickTask::new(driver, publisher.clone(), cycle).spawn();
//!
//! // later
//! handle.cancel();
//! ```

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::driver::{DriverStep, LipsyncDriver};
use super::state::StatePublisher;

/// Periodic process driving one animation cycle
pub struct TickTask {
    driver: LipsyncDriver,
    publisher: StatePublisher,
    cycle: u64,
    tick_interval: Duration,
}

impl TickTask {
    /// Create a task that publishes for `cycle`
    #[must_use]
    pub fn new(driver: LipsyncDriver, publisher: StatePublisher, cycle: u64) -> Self {
        let tick_interval = driver_tick_interval(&driver);
        Self {
            driver,
            publisher,
            cycle,
            tick_interval,
        }
    }

    /// Spawn onto the current tokio runtime
    #[must_use]
    pub fn spawn(self) -> TickHandle {
        let cycle = self.cycle;
        TickHandle {
            cycle,
            handle: tokio::spawn(self.run()),
        }
    }

    /// Run until the cycle finishes or is superseded
    pub async fn run(mut self) {
        tracing::debug!(
            cycle = self.cycle,
            entries = self.driver.timeline().len(),
            total_ms = self.driver.timeline().total_duration_ms(),
            tick_ms = self.tick_interval.as_millis() as u64,
            "Starting lipsync ticks"
        );

        let start = Instant::now();
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            let driver = &mut self.driver;
            let step = match catch_unwind(AssertUnwindSafe(|| driver.step(elapsed_ms))) {
                Ok(step) => step,
                Err(_) => {
                    tracing::error!(cycle = self.cycle, elapsed_ms, "Lipsync tick panicked");
                    self.publisher.finish(self.cycle);
                    break;
                }
            };

            match step {
                DriverStep::Publish(shape) => {
                    if !self.publisher.publish(self.cycle, shape) {
                        tracing::debug!(cycle = self.cycle, "Cycle superseded, stopping ticks");
                        break;
                    }
                    tracing::trace!(
                        cycle = self.cycle,
                        elapsed_ms,
                        open = shape.open,
                        smile = shape.smile,
                        "Tick"
                    );
                }
                DriverStep::Idle => {
                    self.publisher.finish(self.cycle);
                    tracing::debug!(cycle = self.cycle, elapsed_ms, "Lipsync cycle finished");
                    break;
                }
            }
        }
    }
}

fn driver_tick_interval(driver: &LipsyncDriver) -> Duration {
    // tokio::time::interval panics on a zero period
    driver.config().tick_interval.max(Duration::from_millis(1))
}

/// Handle to a spawned [`TickTask`]
#[derive(Debug)]
pub struct TickHandle {
    cycle: u64,
    handle: JoinHandle<()>,
}

impl TickHandle {
    /// Cycle this task publishes for
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Stop the task; no further ticks fire. Safe to call repeatedly.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Whether the task has ended (finished, superseded or cancelled)
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::driver::DriverConfig;
    use crate::timeline::Timeline;
    use crate::viseme::MouthShape;

    const POSE: MouthShape = MouthShape::SILENT;

    fn spawn_cycle(publisher: &StatePublisher, text: &str) -> TickHandle {
        let pose = MouthShape::new(0.3, 0.0);
        let cycle = publisher.begin_cycle(pose);
        let driver =
            LipsyncDriver::new(Timeline::build(text), DriverConfig::default()).starting_from(pose);
        TickTask::new(driver, publisher.clone(), cycle).spawn()
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_to_idle() {
        let publisher = StatePublisher::new();
        let handle = spawn_cycle(&publisher, "hello");
        let mut rx = publisher.subscribe();

        while let Some(state) = rx.changed().await {
            if !state.is_playing {
                break;
            }
        }

        assert!(publisher.snapshot().is_idle());
        tokio::task::yield_now().await;
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_publishes_while_speaking() {
        let publisher = StatePublisher::new();
        let _handle = spawn_cycle(&publisher, "aaaa");

        tokio::time::sleep(Duration::from_millis(200)).await;
        let state = publisher.snapshot();
        assert!(state.is_playing);
        assert!(state.current_shape.open > 0.9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let publisher = StatePublisher::new();
        let handle = spawn_cycle(&publisher, "aaaa");

        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
        handle.cancel();
        tokio::task::yield_now().await;

        let frozen = publisher.snapshot();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(publisher.snapshot(), frozen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_task_exits() {
        let publisher = StatePublisher::new();
        let first = spawn_cycle(&publisher, "aaaa");
        tokio::time::sleep(Duration::from_millis(20)).await;

        // A new cycle begins without cancelling the first task
        let second_cycle = publisher.begin_cycle(POSE);
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(first.is_finished());
        let state = publisher.snapshot();
        assert_eq!(state.cycle(), second_cycle);
        assert_eq!(state.current_shape, POSE);
    }
}

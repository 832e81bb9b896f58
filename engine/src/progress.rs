//! Local progress ticker for staged generations.
//!
//! The ticker owns no task and no channel. It is polled from inside the generation future,
//! so dropping that future (or leaving the select loop) cancels every pending stage.

use std::slice;

use tokio::time::{Instant, sleep_until};

use quill_types::{ProgressStage, ScheduledStage, StageSchedule};

#[derive(Debug)]
pub(crate) struct ProgressTicker {
    started: Instant,
    pending: slice::Iter<'static, ScheduledStage>,
}

impl ProgressTicker {
    /// Start the clock for the stages that follow the initial one.
    pub(crate) fn start(schedule: StageSchedule) -> Self {
        Self {
            started: Instant::now(),
            pending: schedule.deferred().iter(),
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.pending.as_slice().is_empty()
    }

    /// Wait for the next stage to come due.
    ///
    /// Cancel-safe: a stage is only consumed once its deadline has passed and this future
    /// completes.
    pub(crate) async fn next_stage(&mut self) -> Option<ProgressStage> {
        let next = *self.pending.as_slice().first()?;
        sleep_until(self.started + next.offset).await;
        self.pending.next();
        Some(next.stage)
    }
}

//! Cosmetic progress stages shown while an advanced generation is in flight.
//!
//! These labels are scheduled locally from submission start. They do not reflect what the
//! remote service is actually doing.

use std::fmt;
use std::time::Duration;

use crate::GenerationMode;

/// Label generic to any in-flight generation, used when no stage applies.
pub const GENERATING_LABEL: &str = "Generating...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressStage {
    Analyzing,
    Planning,
    Writing,
    Reviewing,
}

impl ProgressStage {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Analyzing => "Analyzing...",
            Self::Planning => "Planning...",
            Self::Writing => "Writing...",
            Self::Reviewing => "Reviewing...",
        }
    }
}

impl fmt::Display for ProgressStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A stage and its offset from submission start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledStage {
    pub offset: Duration,
    pub stage: ProgressStage,
}

pub const ADVANCED_SCHEDULE: [ScheduledStage; 4] = [
    ScheduledStage {
        offset: Duration::ZERO,
        stage: ProgressStage::Analyzing,
    },
    ScheduledStage {
        offset: Duration::from_secs(2),
        stage: ProgressStage::Planning,
    },
    ScheduledStage {
        offset: Duration::from_secs(4),
        stage: ProgressStage::Writing,
    },
    ScheduledStage {
        offset: Duration::from_secs(6),
        stage: ProgressStage::Reviewing,
    },
];

/// The ordered stage schedule for one generation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSchedule(&'static [ScheduledStage]);

impl StageSchedule {
    #[must_use]
    pub const fn for_mode(mode: GenerationMode) -> Self {
        match mode {
            GenerationMode::Basic => Self(&[]),
            GenerationMode::Advanced => Self(&ADVANCED_SCHEDULE),
        }
    }

    /// Stage presented on entry to `Submitting`, if it is due immediately.
    #[must_use]
    pub fn initial(self) -> Option<ProgressStage> {
        self.0
            .first()
            .filter(|scheduled| scheduled.offset.is_zero())
            .map(|scheduled| scheduled.stage)
    }

    /// Stages that fire after submission start, in order.
    #[must_use]
    pub fn deferred(self) -> &'static [ScheduledStage] {
        match self.initial() {
            Some(_) => &self.0[1..],
            None => self.0,
        }
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0.is_empty()
    }
}

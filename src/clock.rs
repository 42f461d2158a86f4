use chrono::{DateTime, FixedOffset, TimeDelta};

use crate::error::{PloopError, PloopResult};

/// The simulated capture clock: a start time advanced by a fixed number of whole
/// seconds after each frame accepted into the output.
///
/// The clock never rewinds and performs no timezone conversion beyond what the
/// parsed start time carries.
#[derive(Clone, Debug)]
pub struct TimelapseClock {
    current: DateTime<FixedOffset>,
    step: TimeDelta,
}

impl TimelapseClock {
    /// Parse the run's start time. Strictly RFC 3339; anything else is a setup
    /// error so a malformed start time never silently corrupts every annotation.
    pub fn parse_start(text: &str) -> PloopResult<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(text).map_err(|e| {
            PloopError::setup(format!(
                "start time '{text}' is not RFC 3339 (e.g. 2024-01-01T00:00:00Z): {e}"
            ))
        })
    }

    pub fn new(start: DateTime<FixedOffset>, interval_secs: u32) -> PloopResult<Self> {
        if interval_secs == 0 {
            return Err(PloopError::setup("interval must be at least 1 second"));
        }
        Ok(Self {
            current: start,
            step: TimeDelta::seconds(i64::from(interval_secs)),
        })
    }

    /// Current simulated timestamp rendered for annotation, e.g.
    /// `2024-01-01 00:00:05 +0000`.
    pub fn stamp(&self) -> String {
        self.current.format("%Y-%m-%d %H:%M:%S %z").to_string()
    }

    pub fn current(&self) -> DateTime<FixedOffset> {
        self.current
    }

    /// Advance by exactly one step. Called once per accepted frame, never for
    /// skipped ones.
    pub fn advance(&mut self) {
        self.current += self.step;
    }
}

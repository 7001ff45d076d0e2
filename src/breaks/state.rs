use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const BREAK_DURATION_SECS: u32 = 5 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BreakError {
    #[error("a break is already running")]
    AlreadyRunning,
    #[error("no break is running")]
    NotRunning,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum BreakStatus {
    #[default]
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Counting(u32),
    /// The countdown ran out and the state is back at Idle.
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BreakTimerState {
    pub status: BreakStatus,
    pub duration_secs: u32,
    pub seconds_remaining: u32,
    pub started_at: Option<DateTime<Utc>>,
    /// Identifies the countdown a tick belongs to; ticks from an older run
    /// must not touch the state.
    #[serde(skip)]
    pub run_id: Option<Uuid>,
}

impl Default for BreakTimerState {
    fn default() -> Self {
        Self::new(BREAK_DURATION_SECS)
    }
}

impl BreakTimerState {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            status: BreakStatus::Idle,
            duration_secs,
            seconds_remaining: duration_secs,
            started_at: None,
            run_id: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == BreakStatus::Running
    }

    pub fn begin(&mut self, run_id: Uuid, started_at: DateTime<Utc>) -> Result<(), BreakError> {
        if self.is_running() {
            return Err(BreakError::AlreadyRunning);
        }
        self.status = BreakStatus::Running;
        self.seconds_remaining = self.duration_secs;
        self.started_at = Some(started_at);
        self.run_id = Some(run_id);
        Ok(())
    }

    /// One elapsed second. Returns `None` when idle.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if !self.is_running() {
            return None;
        }
        if self.seconds_remaining <= 1 {
            self.reset();
            return Some(TickOutcome::Completed);
        }
        self.seconds_remaining -= 1;
        Some(TickOutcome::Counting(self.seconds_remaining))
    }

    /// Back to Idle with a full countdown. Stopping does not pause.
    pub fn reset(&mut self) {
        *self = Self::new(self.duration_secs);
    }

    /// `m:ss`, e.g. `5:00` or `0:09`.
    pub fn display(&self) -> String {
        format!(
            "{}:{:02}",
            self.seconds_remaining / 60,
            self.seconds_remaining % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running() -> BreakTimerState {
        let mut state = BreakTimerState::default();
        state.begin(Uuid::new_v4(), Utc::now()).unwrap();
        state
    }

    #[test]
    fn full_countdown_returns_to_idle() {
        let mut state = running();
        for expected in (1..BREAK_DURATION_SECS).rev() {
            assert_eq!(state.tick(), Some(TickOutcome::Counting(expected)));
        }
        assert_eq!(state.tick(), Some(TickOutcome::Completed));
        assert_eq!(state.status, BreakStatus::Idle);
        assert_eq!(state.seconds_remaining, BREAK_DURATION_SECS);
        assert!(state.run_id.is_none());
    }

    #[test]
    fn reset_after_hundred_ticks_restores_full_duration() {
        let mut state = running();
        for _ in 0..100 {
            state.tick();
        }
        assert_eq!(state.seconds_remaining, 200);
        state.reset();
        assert_eq!(state, BreakTimerState::default());
    }

    #[test]
    fn begin_twice_is_rejected() {
        let mut state = running();
        state.tick();
        assert_eq!(state.begin(Uuid::new_v4(), Utc::now()), Err(BreakError::AlreadyRunning));
        assert_eq!(state.seconds_remaining, BREAK_DURATION_SECS - 1);
    }

    #[test]
    fn idle_ignores_ticks() {
        let mut state = BreakTimerState::default();
        assert_eq!(state.tick(), None);
        assert_eq!(state.seconds_remaining, BREAK_DURATION_SECS);
    }

    #[test]
    fn display_pads_seconds() {
        let mut state = BreakTimerState::default();
        assert_eq!(state.display(), "5:00");
        state.seconds_remaining = 299;
        assert_eq!(state.display(), "4:59");
        state.seconds_remaining = 9;
        assert_eq!(state.display(), "0:09");
    }
}

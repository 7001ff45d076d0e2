pub mod controller;
pub mod state;

pub use controller::{BreakEvent, BreakSnapshot, BreakTimerScheduler};
pub use state::{BreakError, BreakStatus, BreakTimerState, TickOutcome, BREAK_DURATION_SECS};

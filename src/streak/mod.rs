//! Consecutive-day logging streak.
//!
//! The counter is advanced only by the meal insert path, one local calendar
//! date at a time, and read back by the dashboard.

mod handlers;

use serde::Serialize;
use sqlx::FromRow;
use time::{Date, Duration};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::streak_routes()
}

/// Per-user streak state, as persisted in `streak_counter`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, FromRow)]
pub struct StreakCounter {
    pub current_streak_days: i32,
    #[serde(with = "crate::timezone::calendar_date::option")]
    pub last_logged_date: Option<Date>,
}

impl StreakCounter {
    /// Applies a meal logged on local date `day`.
    ///
    /// A same-day log is a no-op, the following day extends the run, and any
    /// other date (a gap, or a back-dated log) starts a new run of one.
    pub fn record(self, day: Date) -> Self {
        match self.last_logged_date {
            Some(last) if last == day => self,
            Some(last) if last.next_day() == Some(day) => Self {
                current_streak_days: self.current_streak_days + 1,
                last_logged_date: Some(day),
            },
            _ => Self {
                current_streak_days: 1,
                last_logged_date: Some(day),
            },
        }
    }

    /// Streak as it should be displayed on `today`.
    ///
    /// The stored counter is only rewritten on the next log, so a run whose
    /// last date is before yesterday already counts as broken.
    pub fn effective_days(&self, today: Date) -> u32 {
        match self.last_logged_date {
            Some(last) if last >= today - Duration::days(1) => {
                self.current_streak_days.max(0) as u32
            }
            _ => 0,
        }
    }
}

use chrono::{Local, TimeZone};
use serde::Serialize;

use crate::models::{Task, Timestamp};

const DAY_MS: i64 = 86_400_000;
const STREAK_LOOKBACK_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TodayStats {
    pub done: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub today: TodayStats,
    pub streak: u32,
}

/// Derived, read-only computation over `created_at`/`completed`; recomputed
/// from scratch on every mutation, never persisted.
///
/// `day_start` is local midnight in epoch milliseconds; day windows walk
/// backward in fixed 24-hour steps from there. A day counts toward the streak
/// when at least one task created in its window is completed; the walk stops at
/// the first day without one, today included.
pub fn compute(tasks: &[Task], day_start: Timestamp) -> Stats {
    let end = day_start + DAY_MS;
    let todays = tasks
        .iter()
        .filter(|t| t.created_at >= day_start && t.created_at < end);
    let mut total = 0;
    let mut done = 0;
    for task in todays {
        total += 1;
        if task.completed {
            done += 1;
        }
    }

    let mut streak = 0;
    for i in 0..STREAK_LOOKBACK_DAYS {
        let window_start = day_start - i * DAY_MS;
        let window_end = window_start + DAY_MS;
        let any_done = tasks.iter().any(|t| {
            t.completed && t.created_at >= window_start && t.created_at < window_end
        });
        if !any_done {
            break;
        }
        streak += 1;
    }

    Stats {
        today: TodayStats { done, total },
        streak,
    }
}

/// Local midnight for the day containing `now`, in epoch milliseconds. Falls
/// back to a UTC day boundary when the local timezone cannot resolve the
/// instant (DST gaps and the like).
pub fn local_day_start_ms(now: Timestamp) -> Timestamp {
    let utc_fallback = now - now.rem_euclid(DAY_MS);
    let Some(local_now) = Local.timestamp_millis_opt(now).single() else {
        return utc_fallback;
    };
    let Some(midnight) = local_now.date_naive().and_hms_opt(0, 0, 0) else {
        return utc_fallback;
    };
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(utc_fallback)
}

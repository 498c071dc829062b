//! Date synchronization for grid edits: keep start date, end date, and
//! duration consistent whenever any one of the three changes.
//!
//! Pure functions, no I/O. Raw values come straight from grid cells, so
//! malformed dates must never panic; they are treated as absent.
//!
//! The invariant maintained: `duration_days = (end - start in days) + 1`
//! whenever both dates are set, and `start <= end`.

use chrono::{Days, NaiveDate};

use baseline_db::models::ScheduleUpdate;

/// Which schedule field the user edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleField {
    StartDate,
    EndDate,
    DurationDays,
}

/// Current schedule values of the item being edited.
#[derive(Debug, Clone, Copy, Default)]
pub struct Schedule {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub duration_days: Option<i32>,
}

/// Lenient ISO date parse; anything malformed is `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Inclusive day count between two dates (same day = 1).
pub fn duration_between(start: NaiveDate, end: NaiveDate) -> i32 {
    (end - start).num_days() as i32 + 1
}

/// Compute the schedule patch for a single field edit.
///
/// `raw` is the new cell value as entered; empty or malformed input is
/// treated as clearing the field (dates) or coerced to 1 (duration).
/// Deterministic and panic-free for all inputs.
pub fn schedule_update(field: ScheduleField, raw: &str, current: &Schedule) -> ScheduleUpdate {
    match field {
        ScheduleField::StartDate => start_date_update(parse_date(raw), current),
        ScheduleField::EndDate => end_date_update(parse_date(raw), current),
        ScheduleField::DurationDays => {
            let duration = raw.trim().parse::<i32>().ok().filter(|d| *d >= 1).unwrap_or(1);
            duration_update(duration, current)
        }
    }
}

fn start_date_update(new_start: Option<NaiveDate>, current: &Schedule) -> ScheduleUpdate {
    let Some(start) = new_start else {
        // Cleared start: duration is meaningless, end stays as-is.
        return ScheduleUpdate {
            start_date: Some(None),
            duration_days: Some(None),
            ..ScheduleUpdate::default()
        };
    };

    match current.end_date {
        Some(end) if end >= start => ScheduleUpdate {
            start_date: Some(Some(start)),
            duration_days: Some(Some(duration_between(start, end))),
            ..ScheduleUpdate::default()
        },
        // End absent or now earlier than the new start: collapse to a
        // one-day window at the new start.
        _ => ScheduleUpdate {
            start_date: Some(Some(start)),
            end_date: Some(Some(start)),
            duration_days: Some(Some(1)),
        },
    }
}

fn end_date_update(new_end: Option<NaiveDate>, current: &Schedule) -> ScheduleUpdate {
    let Some(end) = new_end else {
        return ScheduleUpdate {
            end_date: Some(None),
            duration_days: Some(None),
            ..ScheduleUpdate::default()
        };
    };

    match current.start_date {
        // No start to compute against: record the raw field change only.
        None => ScheduleUpdate {
            end_date: Some(Some(end)),
            ..ScheduleUpdate::default()
        },
        // End before start: clamp to the start date.
        Some(start) if end < start => ScheduleUpdate {
            end_date: Some(Some(start)),
            duration_days: Some(Some(1)),
            ..ScheduleUpdate::default()
        },
        Some(start) => ScheduleUpdate {
            end_date: Some(Some(end)),
            duration_days: Some(Some(duration_between(start, end))),
            ..ScheduleUpdate::default()
        },
    }
}

fn duration_update(duration: i32, current: &Schedule) -> ScheduleUpdate {
    let Some(start) = current.start_date else {
        return ScheduleUpdate {
            duration_days: Some(Some(duration)),
            ..ScheduleUpdate::default()
        };
    };

    // duration >= 1, so the offset is non-negative. An out-of-range date
    // (duration near i32::MAX) falls back to the duration-only patch.
    match start.checked_add_days(Days::new(duration as u64 - 1)) {
        Some(end) => ScheduleUpdate {
            duration_days: Some(Some(duration)),
            end_date: Some(Some(end)),
            ..ScheduleUpdate::default()
        },
        None => ScheduleUpdate {
            duration_days: Some(Some(duration)),
            ..ScheduleUpdate::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("valid test date")
    }

    fn schedule(start: Option<&str>, end: Option<&str>) -> Schedule {
        Schedule {
            start_date: start.map(date),
            end_date: end.map(date),
            duration_days: None,
        }
    }

    #[test]
    fn start_moved_past_end_collapses_window() {
        let current = schedule(Some("2026-03-01"), Some("2026-03-05"));
        let update = schedule_update(ScheduleField::StartDate, "2026-03-10", &current);
        assert_eq!(
            update,
            ScheduleUpdate {
                start_date: Some(Some(date("2026-03-10"))),
                end_date: Some(Some(date("2026-03-10"))),
                duration_days: Some(Some(1)),
            }
        );
    }

    #[test]
    fn start_moved_within_window_recomputes_duration() {
        let current = schedule(Some("2026-03-01"), Some("2026-03-05"));
        let update = schedule_update(ScheduleField::StartDate, "2026-03-03", &current);
        assert_eq!(
            update,
            ScheduleUpdate {
                start_date: Some(Some(date("2026-03-03"))),
                end_date: None,
                duration_days: Some(Some(3)),
            }
        );
    }

    #[test]
    fn cleared_start_clears_duration_only() {
        let current = schedule(Some("2026-03-01"), Some("2026-03-05"));
        let update = schedule_update(ScheduleField::StartDate, "", &current);
        assert_eq!(
            update,
            ScheduleUpdate {
                start_date: Some(None),
                end_date: None,
                duration_days: Some(None),
            }
        );
    }

    #[test]
    fn malformed_start_treated_as_cleared() {
        let current = schedule(Some("2026-03-01"), Some("2026-03-05"));
        let update = schedule_update(ScheduleField::StartDate, "not-a-date", &current);
        assert_eq!(update.start_date, Some(None));
        assert_eq!(update.duration_days, Some(None));
    }

    #[test]
    fn end_before_start_clamps_to_start() {
        let current = schedule(Some("2026-03-10"), Some("2026-03-15"));
        let update = schedule_update(ScheduleField::EndDate, "2026-03-05", &current);
        assert_eq!(
            update,
            ScheduleUpdate {
                start_date: None,
                end_date: Some(Some(date("2026-03-10"))),
                duration_days: Some(Some(1)),
            }
        );
    }

    #[test]
    fn end_after_start_recomputes_duration() {
        let current = schedule(Some("2026-03-01"), None);
        let update = schedule_update(ScheduleField::EndDate, "2026-03-07", &current);
        assert_eq!(
            update,
            ScheduleUpdate {
                start_date: None,
                end_date: Some(Some(date("2026-03-07"))),
                duration_days: Some(Some(7)),
            }
        );
    }

    #[test]
    fn end_without_start_is_raw_change_only() {
        let current = schedule(None, None);
        let update = schedule_update(ScheduleField::EndDate, "2026-03-07", &current);
        assert_eq!(
            update,
            ScheduleUpdate {
                start_date: None,
                end_date: Some(Some(date("2026-03-07"))),
                duration_days: None,
            }
        );
    }

    #[test]
    fn cleared_end_clears_duration() {
        let current = schedule(Some("2026-03-01"), Some("2026-03-05"));
        let update = schedule_update(ScheduleField::EndDate, "", &current);
        assert_eq!(
            update,
            ScheduleUpdate {
                start_date: None,
                end_date: Some(None),
                duration_days: Some(None),
            }
        );
    }

    #[test]
    fn duration_edit_recomputes_end() {
        let current = schedule(Some("2026-01-01"), None);
        let update = schedule_update(ScheduleField::DurationDays, "5", &current);
        assert_eq!(
            update,
            ScheduleUpdate {
                start_date: None,
                end_date: Some(Some(date("2026-01-05"))),
                duration_days: Some(Some(5)),
            }
        );
    }

    #[test]
    fn duration_below_one_coerces_to_one() {
        let current = schedule(Some("2026-01-01"), None);
        let update = schedule_update(ScheduleField::DurationDays, "0", &current);
        assert_eq!(update.duration_days, Some(Some(1)));
        assert_eq!(update.end_date, Some(Some(date("2026-01-01"))));
    }

    #[test]
    fn duration_garbage_coerces_to_one() {
        let current = schedule(None, None);
        let update = schedule_update(ScheduleField::DurationDays, "lots", &current);
        assert_eq!(
            update,
            ScheduleUpdate {
                start_date: None,
                end_date: None,
                duration_days: Some(Some(1)),
            }
        );
    }

    #[test]
    fn duration_without_start_is_duration_only() {
        let current = schedule(None, Some("2026-03-05"));
        let update = schedule_update(ScheduleField::DurationDays, "4", &current);
        assert_eq!(
            update,
            ScheduleUpdate {
                start_date: None,
                end_date: None,
                duration_days: Some(Some(4)),
            }
        );
    }

    #[test]
    fn inclusive_duration() {
        assert_eq!(duration_between(date("2026-03-01"), date("2026-03-01")), 1);
        assert_eq!(duration_between(date("2026-03-01"), date("2026-03-05")), 5);
    }
}

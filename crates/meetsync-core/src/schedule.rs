//! Compiles a "minutes between runs" interval into a five-field cron
//! expression, always expressed in the coarsest unit that fits.
//!
//! The mapping rounds **up** (ceiling division), so a 100-minute interval
//! compiles to `0 */2 * * *` — every 2 hours, less frequent than requested.
//! Callers get the nearest coarser-unit approximation, never a finer one.

/// Interval applied when the configured value is below 1 minute: once a day.
pub const DEFAULT_INTERVAL_MINUTES: i64 = 1440;

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 1440;

/// A compiled sync schedule: the five-field cron expression plus a
/// human-readable summary for logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSchedule {
    /// Five-field cron expression (`minute hour day-of-month month day-of-week`).
    pub expr: String,
    /// Human-readable cadence, e.g. `every 2 hour(s)`.
    pub label: String,
}

impl CompiledSchedule {
    /// The six-field form (leading seconds field pinned to `0`) expected by
    /// the in-process scheduler.
    #[must_use]
    pub fn cron_with_seconds(&self) -> String {
        format!("0 {}", self.expr)
    }
}

impl std::fmt::Display for CompiledSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.expr, self.label)
    }
}

/// Compile a sync interval in minutes into a [`CompiledSchedule`].
///
/// Pure with respect to its input: the same interval always yields the same
/// expression and label. Intervals below 1 (including negative values from a
/// misconfigured environment) are coerced to [`DEFAULT_INTERVAL_MINUTES`].
///
/// Intervals above 44 640 minutes (31 days) produce a `*/d` day divisor with
/// `d > 31`; cron tolerates the expression but it never matches inside a
/// calendar month, so the job effectively never fires. The value is emitted
/// as computed rather than clamped.
#[must_use]
pub fn compile_interval(minutes: i64) -> CompiledSchedule {
    let minutes = if minutes < 1 {
        DEFAULT_INTERVAL_MINUTES
    } else {
        minutes
    };

    if minutes >= MINUTES_PER_DAY {
        let days = ceil_div(minutes, MINUTES_PER_DAY);
        CompiledSchedule {
            expr: format!("0 0 */{days} * *"),
            label: format!("every {days} day(s)"),
        }
    } else if minutes >= MINUTES_PER_HOUR {
        let hours = ceil_div(minutes, MINUTES_PER_HOUR);
        CompiledSchedule {
            expr: format!("0 */{hours} * * *"),
            label: format!("every {hours} hour(s)"),
        }
    } else {
        CompiledSchedule {
            expr: format!("*/{minutes} * * * *"),
            label: format!("every {minutes} minute(s)"),
        }
    }
}

/// Ceiling division for the positive intervals this module deals in.
fn ceil_div(value: i64, unit: i64) -> i64 {
    (value + unit - 1) / unit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_day_compiles_to_daily() {
        let s = compile_interval(1440);
        assert_eq!(s.expr, "0 0 */1 * *");
        assert_eq!(s.label, "every 1 day(s)");
    }

    #[test]
    fn ninety_minutes_rounds_up_to_two_hours() {
        let s = compile_interval(90);
        assert_eq!(s.expr, "0 */2 * * *");
        assert_eq!(s.label, "every 2 hour(s)");
    }

    #[test]
    fn sub_hour_interval_stays_in_minutes() {
        let s = compile_interval(45);
        assert_eq!(s.expr, "*/45 * * * *");
        assert_eq!(s.label, "every 45 minute(s)");
    }

    #[test]
    fn zero_is_coerced_to_daily_default() {
        assert_eq!(compile_interval(0), compile_interval(1440));
        assert_eq!(compile_interval(0).expr, "0 0 */1 * *");
    }

    #[test]
    fn negative_is_coerced_to_daily_default() {
        assert_eq!(compile_interval(-5), compile_interval(1440));
    }

    #[test]
    fn two_days_exact() {
        let s = compile_interval(2880);
        assert_eq!(s.expr, "0 0 */2 * *");
        assert_eq!(s.label, "every 2 day(s)");
    }

    #[test]
    fn partial_second_day_rounds_up() {
        // 1441 minutes is just over a day; ceil(1441/1440) = 2.
        assert_eq!(compile_interval(1441).expr, "0 0 */2 * *");
    }

    #[test]
    fn exactly_one_hour() {
        let s = compile_interval(60);
        assert_eq!(s.expr, "0 */1 * * *");
        assert_eq!(s.label, "every 1 hour(s)");
    }

    #[test]
    fn one_minute_floor() {
        assert_eq!(compile_interval(1).expr, "*/1 * * * *");
    }

    #[test]
    fn hour_divisor_boundaries() {
        assert_eq!(compile_interval(1380).expr, "0 */23 * * *");
        // Intervals in 1381..=1439 round up to a 24-hour divisor; cron reduces
        // */24 over the 0-23 range to hour 0, so the schedule still fires daily.
        assert_eq!(compile_interval(1439).expr, "0 */24 * * *");
    }

    #[test]
    fn hundred_minutes_runs_less_frequently_than_requested() {
        // Coarser-unit approximation: 100 minutes becomes every 2 hours.
        assert_eq!(compile_interval(100).expr, "0 */2 * * *");
    }

    #[test]
    fn very_large_interval_is_not_clamped() {
        // 50 days' worth of minutes: the */50 day field never matches inside
        // a month. Degenerate but deliberate; see the function docs.
        let s = compile_interval(50 * 1440);
        assert_eq!(s.expr, "0 0 */50 * *");
        assert_eq!(s.label, "every 50 day(s)");
    }

    #[test]
    fn compiling_twice_is_idempotent() {
        for m in [-1, 0, 1, 45, 60, 90, 100, 1440, 2880, 100_000] {
            assert_eq!(compile_interval(m), compile_interval(m));
        }
    }

    #[test]
    fn seconds_form_prepends_zero_field() {
        assert_eq!(compile_interval(90).cron_with_seconds(), "0 0 */2 * * *");
        assert_eq!(
            compile_interval(45).cron_with_seconds(),
            "0 */45 * * * *"
        );
    }

    #[test]
    fn display_includes_expression_and_label() {
        let s = compile_interval(1440);
        assert_eq!(format!("{s}"), "0 0 */1 * * (every 1 day(s))");
    }
}

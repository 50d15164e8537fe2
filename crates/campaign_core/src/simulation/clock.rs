//! Clock and calendar rollover.

use crate::model::tracking::{CalendarSettings, Tracking};

/// Which calendar boundaries one clock step crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockStep {
    pub new_day: bool,
    pub new_month: bool,
    pub new_year: bool,
}

/// Moves `tracking` one time-of-day step forward.
///
/// Rollover thresholds come from `calendar`; a day past `days_per_month`
/// resets to 1 and bumps the month, a month past `months_per_year` resets
/// to 1 and bumps the year. Counters are compared before they move, so the
/// step is total even at the integer limits.
pub fn advance_clock(tracking: &mut Tracking, calendar: &CalendarSettings) -> ClockStep {
    let previous = tracking.current_time_of_day;
    tracking.current_time_of_day = previous.next();

    let mut step = ClockStep::default();
    if !previous.wraps_day() {
        return step;
    }

    let date = &mut tracking.current_date;
    step.new_day = true;
    if date.day < calendar.days_per_month {
        date.day += 1;
        return step;
    }

    date.day = 1;
    step.new_month = true;
    if date.month < calendar.months_per_year {
        date.month += 1;
        return step;
    }

    date.month = 1;
    date.year = date.year.saturating_add(1);
    step.new_year = true;
    step
}

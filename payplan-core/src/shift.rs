//! Business-day shifting for due dates.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::holidays::HolidayCalendar;

/// Why a due date moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftReason {
    #[serde(rename = "WEEKEND")]
    Weekend,
    #[serde(rename = "US_FEDERAL_HOLIDAY")]
    UsFederalHoliday,
    #[serde(rename = "CUSTOM")]
    Custom,
}

impl ShiftReason {
    /// Short human-readable phrase for messages and calendar notes.
    pub fn label(&self) -> &'static str {
        match self {
            ShiftReason::Weekend => "weekend",
            ShiftReason::UsFederalHoliday => "US federal holiday",
            ShiftReason::Custom => "custom skip date",
        }
    }
}

/// Result of shifting a single due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftOutcome {
    pub date: NaiveDate,
    pub was_shifted: bool,
    pub reason: Option<ShiftReason>,
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// True when the date is neither a weekend nor in the calendar's tables.
pub fn is_business_day(date: NaiveDate, calendar: &HolidayCalendar) -> bool {
    !is_weekend(date) && !calendar.is_holiday(date) && !calendar.is_skip_date(date)
}

/// Move a due date forward to the next business day.
///
/// The recorded reason describes the original date only, attributed in the
/// order weekend > holiday > custom skip date. Consecutive non-business runs
/// (a holiday touching a weekend) resolve in the same loop, so a Saturday
/// holiday lands on Monday in one call.
pub fn shift_due_date(date: NaiveDate, calendar: &HolidayCalendar) -> ShiftOutcome {
    if is_business_day(date, calendar) {
        return ShiftOutcome {
            date,
            was_shifted: false,
            reason: None,
        };
    }

    let reason = if is_weekend(date) {
        ShiftReason::Weekend
    } else if calendar.is_holiday(date) {
        ShiftReason::UsFederalHoliday
    } else {
        ShiftReason::Custom
    };

    // Every week contains business days, so this terminates within a few
    // iterations for any real calendar.
    let mut day = date;
    while !is_business_day(day, calendar) {
        day = day.succ_opt().expect("calendar overflow");
    }

    ShiftOutcome {
        date: day,
        was_shifted: true,
        reason: Some(reason),
    }
}

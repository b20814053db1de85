//! Holiday and skip-date calendar.
//!
//! The calendar is plain injected data: a date -> holiday-name table plus
//! caller-supplied skip dates. It is built once per request and passed by
//! reference; nothing here reads global state.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{PlanError, Result};

/// US federal holidays for 2025-2027, observed dates (a Saturday holiday
/// appears as the preceding Friday, a Sunday holiday as the following Monday).
const US_FEDERAL_TABLE: &str = include_str!("../data/us_federal_holidays.json");

/// Read-only lookup table of non-business dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HolidayCalendar {
    holidays: BTreeMap<NaiveDate, String>,
    skip_dates: Vec<NaiveDate>,
}

impl HolidayCalendar {
    /// Empty calendar. Weekends and custom skip dates still apply; holiday
    /// lookups always miss. Used for `country = "None"` and synthetic tests.
    pub fn none() -> Self {
        Self::default()
    }

    /// The built-in US federal table.
    pub fn us_federal() -> Self {
        Self::from_json(US_FEDERAL_TABLE).expect("embedded holiday table is valid")
    }

    /// Parse a `{"YYYY-MM-DD": "Holiday Name", ...}` table.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)
            .map_err(|e| PlanError::Configuration(format!("holiday table: {e}")))?;

        let mut holidays = BTreeMap::new();
        for (date, name) in raw {
            let parsed = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|_| {
                PlanError::Configuration(format!("holiday table: invalid date `{date}`"))
            })?;
            holidays.insert(parsed, name);
        }

        Ok(Self {
            holidays,
            skip_dates: Vec::new(),
        })
    }

    /// Attach caller-supplied skip dates (sorted and deduplicated).
    pub fn with_skip_dates(mut self, mut dates: Vec<NaiveDate>) -> Self {
        dates.sort();
        dates.dedup();
        self.skip_dates = dates;
        self
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains_key(&date)
    }

    pub fn holiday_name(&self, date: NaiveDate) -> Option<&str> {
        self.holidays.get(&date).map(String::as_str)
    }

    pub fn is_skip_date(&self, date: NaiveDate) -> bool {
        self.skip_dates.binary_search(&date).is_ok()
    }
}

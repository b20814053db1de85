//! Paycheck schedule expansion.
//!
//! Cash-crunch detection works over paycheck-to-paycheck intervals. Callers
//! either hand us the dates outright or a cadence plus the next payday, which
//! we project forward far enough to cover the whole schedule.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayCadence {
    Weekly,
    Biweekly,
    Monthly,
}

impl PayCadence {
    fn advance(&self, from: NaiveDate) -> Option<NaiveDate> {
        match self {
            PayCadence::Weekly => from.checked_add_days(Days::new(7)),
            PayCadence::Biweekly => from.checked_add_days(Days::new(14)),
            // Real month arithmetic: Jan 31 + 1 month = Feb 28/29.
            PayCadence::Monthly => from.checked_add_months(Months::new(1)),
        }
    }
}

/// Project paydays from `next_payday` until the series covers `horizon` plus
/// one full period, so the last installment falls inside a closed interval.
pub fn expand_paydays(
    cadence: PayCadence,
    next_payday: NaiveDate,
    horizon: NaiveDate,
) -> Vec<NaiveDate> {
    let mut series = vec![next_payday];
    let mut cursor = next_payday;
    while cursor <= horizon {
        match cadence.advance(cursor) {
            Some(next) => {
                series.push(next);
                cursor = next;
            }
            None => break,
        }
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn biweekly_series_covers_horizon() {
        let series = expand_paydays(PayCadence::Biweekly, d("2025-10-03"), d("2025-11-01"));
        assert_eq!(
            series,
            vec![
                d("2025-10-03"),
                d("2025-10-17"),
                d("2025-10-31"),
                d("2025-11-14"),
            ]
        );
        assert!(*series.last().unwrap() > d("2025-11-01"));
    }

    #[test]
    fn weekly_series_steps_seven_days() {
        let series = expand_paydays(PayCadence::Weekly, d("2025-10-03"), d("2025-10-10"));
        assert_eq!(series, vec![d("2025-10-03"), d("2025-10-10"), d("2025-10-17")]);
    }

    #[test]
    fn monthly_series_clamps_end_of_month() {
        let series = expand_paydays(PayCadence::Monthly, d("2026-01-31"), d("2026-03-01"));
        assert_eq!(
            series,
            vec![d("2026-01-31"), d("2026-02-28"), d("2026-03-28")]
        );
    }

    #[test]
    fn horizon_before_next_payday_yields_single_date() {
        let series = expand_paydays(PayCadence::Weekly, d("2025-12-01"), d("2025-11-01"));
        assert_eq!(series, vec![d("2025-12-01")]);
    }
}

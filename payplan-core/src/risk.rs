//! Schedule risk detection.
//!
//! Flags come back in a fixed group order (collision, cash crunch, weekend
//! autopay, shift notes), each group sorted by date then first affected
//! index, so identical input always serializes identically.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::holidays::HolidayCalendar;
use crate::installment::NormalizedInstallment;
use crate::shift::is_weekend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Transparency annotation, not a problem.
    Info,
    /// Genuine scheduling risk.
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskKind {
    Collision,
    CashCrunch,
    WeekendAutopay,
    ShiftedNextBusinessDay,
}

/// One derived annotation about the schedule. `kind` discriminates, so
/// handling is exhaustive at the match site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskFlag {
    #[serde(rename = "type")]
    pub kind: RiskKind,
    pub date: NaiveDate,
    pub message: String,
    pub severity: Severity,
    #[serde(rename = "affectedInstallments")]
    pub affected_installments: Vec<usize>,
}

/// Config subset risk detection needs.
#[derive(Debug, Clone)]
pub struct RiskConfig<'a> {
    /// Consecutive paydays; adjacent pairs form half-open intervals.
    pub paydays: &'a [NaiveDate],
    pub min_buffer: f64,
    /// Income per pay period when the caller supplied it.
    pub pay_period_income: Option<f64>,
    pub business_day_mode: bool,
}

pub fn detect_risks(
    normalized: &[NormalizedInstallment],
    calendar: &HolidayCalendar,
    cfg: &RiskConfig,
) -> Vec<RiskFlag> {
    let mut flags = Vec::new();
    flags.extend(collisions(normalized));
    flags.extend(cash_crunches(normalized, cfg));
    // When shifting is on, every due date is already a business day, so the
    // weekend-autopay condition cannot occur.
    if !cfg.business_day_mode {
        flags.extend(weekend_autopay(normalized, calendar));
    }
    flags.extend(shift_notes(normalized));

    debug!(flags = flags.len(), "risk detection complete");
    flags
}

fn collisions(normalized: &[NormalizedInstallment]) -> Vec<RiskFlag> {
    let mut by_date: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
    for (i, n) in normalized.iter().enumerate() {
        by_date.entry(n.due_date).or_default().push(i);
    }

    by_date
        .into_iter()
        .filter(|(_, members)| members.len() >= 2)
        .map(|(date, affected)| RiskFlag {
            kind: RiskKind::Collision,
            date,
            message: format!("{} payments due on {date}", affected.len()),
            severity: Severity::Warning,
            affected_installments: affected,
        })
        .collect()
}

fn cash_crunches(normalized: &[NormalizedInstallment], cfg: &RiskConfig) -> Vec<RiskFlag> {
    let mut out = Vec::new();
    for window in cfg.paydays.windows(2) {
        let (start, end) = (window[0], window[1]);
        let affected: Vec<usize> = normalized
            .iter()
            .enumerate()
            .filter(|(_, n)| n.due_date >= start && n.due_date < end)
            .map(|(i, _)| i)
            .collect();
        if affected.is_empty() {
            continue;
        }

        let total: f64 = affected.iter().map(|&i| normalized[i].amount).sum();
        // With income supplied: flag when what's left after payments dips
        // under the buffer. Without it, the buffer doubles as the per-period
        // payment budget; a zero buffer disables the check.
        let shortfall = match cfg.pay_period_income {
            Some(income) => cfg.min_buffer - (income - total),
            None if cfg.min_buffer > 0.0 => total - cfg.min_buffer,
            None => continue,
        };
        if shortfall <= 0.0 {
            continue;
        }

        out.push(RiskFlag {
            kind: RiskKind::CashCrunch,
            date: start,
            message: format!(
                "{} payments totaling ${total:.2} between {start} and {end} \
                 leave less than the ${:.2} buffer (short ${shortfall:.2})",
                affected.len(),
                cfg.min_buffer,
            ),
            severity: Severity::Warning,
            affected_installments: affected,
        });
    }
    out
}

fn weekend_autopay(
    normalized: &[NormalizedInstallment],
    calendar: &HolidayCalendar,
) -> Vec<RiskFlag> {
    let mut out: Vec<RiskFlag> = normalized
        .iter()
        .enumerate()
        .filter_map(|(i, n)| {
            if !n.autopay {
                return None;
            }
            let cause = if is_weekend(n.due_date) {
                "a weekend".to_string()
            } else if let Some(name) = calendar.holiday_name(n.due_date) {
                format!("a holiday ({name})")
            } else if calendar.is_skip_date(n.due_date) {
                "a skipped date".to_string()
            } else {
                return None;
            };
            Some(RiskFlag {
                kind: RiskKind::WeekendAutopay,
                date: n.due_date,
                message: format!(
                    "{} autopay on {} lands on {cause}; the charge may not process \
                     until the next business day",
                    n.provider, n.due_date,
                ),
                severity: Severity::Warning,
                affected_installments: vec![i],
            })
        })
        .collect();
    out.sort_by_key(|f| (f.date, f.affected_installments[0]));
    out
}

fn shift_notes(normalized: &[NormalizedInstallment]) -> Vec<RiskFlag> {
    let mut out: Vec<RiskFlag> = normalized
        .iter()
        .enumerate()
        .filter(|(_, n)| n.was_shifted)
        .map(|(i, n)| {
            let from = n.original_due_date.unwrap_or(n.due_date);
            let reason = n
                .shift_reason
                .map(|r| r.label())
                .unwrap_or("non-business day");
            RiskFlag {
                kind: RiskKind::ShiftedNextBusinessDay,
                date: n.due_date,
                message: format!(
                    "{} payment moved from {from} to {} ({reason})",
                    n.provider, n.due_date,
                ),
                severity: Severity::Info,
                affected_installments: vec![i],
            }
        })
        .collect();
    out.sort_by_key(|f| (f.date, f.affected_installments[0]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize, NormalizeOptions};
    use crate::installment::InstallmentInput;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn item(provider: &str, due: &str, amount: f64, autopay: bool) -> InstallmentInput {
        InstallmentInput {
            provider: provider.to_string(),
            installment_no: None,
            due_date: due.to_string(),
            amount,
            currency: "USD".to_string(),
            autopay,
            late_fee: 0.0,
            confidence: None,
        }
    }

    fn normalized(
        items: &[InstallmentInput],
        business_day_mode: bool,
    ) -> Vec<NormalizedInstallment> {
        normalize(
            items,
            &HolidayCalendar::us_federal(),
            NormalizeOptions {
                business_day_mode,
                allow_negative_amounts: false,
            },
        )
        .unwrap()
    }

    fn cfg<'a>(paydays: &'a [NaiveDate], business_day_mode: bool) -> RiskConfig<'a> {
        RiskConfig {
            paydays,
            min_buffer: 0.0,
            pay_period_income: None,
            business_day_mode,
        }
    }

    #[test]
    fn collision_lists_exactly_the_shared_indices() {
        let items = vec![
            item("Klarna", "2025-10-02", 45.0, false),
            item("Affirm", "2025-10-02", 58.0, false),
            item("Afterpay", "2025-10-09", 25.0, false),
        ];
        let flags = detect_risks(&normalized(&items, true), &HolidayCalendar::us_federal(), &cfg(&[], true));
        let collisions: Vec<_> = flags
            .iter()
            .filter(|f| f.kind == RiskKind::Collision)
            .collect();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].date, d("2025-10-02"));
        assert_eq!(collisions[0].affected_installments, vec![0, 1]);
        assert_eq!(collisions[0].severity, Severity::Warning);
        assert!(collisions[0].message.contains("2 payments"));
    }

    #[test]
    fn weekend_autopay_only_fires_with_shifting_off() {
        let items = vec![item("Klarna", "2025-10-04", 45.0, true)];
        let cal = HolidayCalendar::us_federal();

        let with_shifting = detect_risks(&normalized(&items, true), &cal, &cfg(&[], true));
        assert!(
            with_shifting
                .iter()
                .all(|f| f.kind != RiskKind::WeekendAutopay)
        );
        // The shift itself is reported as an info note instead.
        assert!(
            with_shifting
                .iter()
                .any(|f| f.kind == RiskKind::ShiftedNextBusinessDay
                    && f.severity == Severity::Info)
        );

        let without = detect_risks(&normalized(&items, false), &cal, &cfg(&[], false));
        let autopay: Vec<_> = without
            .iter()
            .filter(|f| f.kind == RiskKind::WeekendAutopay)
            .collect();
        assert_eq!(autopay.len(), 1);
        assert_eq!(autopay[0].date, d("2025-10-04"));
        assert!(autopay[0].message.contains("weekend"));
    }

    #[test]
    fn holiday_autopay_names_the_holiday() {
        let items = vec![item("Affirm", "2025-11-27", 30.0, true)];
        let cal = HolidayCalendar::us_federal();
        let flags = detect_risks(&normalized(&items, false), &cal, &cfg(&[], false));
        let autopay = flags
            .iter()
            .find(|f| f.kind == RiskKind::WeekendAutopay)
            .unwrap();
        assert!(autopay.message.contains("Thanksgiving Day"));
    }

    #[test]
    fn non_autopay_weekend_item_is_not_flagged() {
        let items = vec![item("Klarna", "2025-10-04", 45.0, false)];
        let cal = HolidayCalendar::us_federal();
        let flags = detect_risks(&normalized(&items, false), &cal, &cfg(&[], false));
        assert!(flags.iter().all(|f| f.kind != RiskKind::WeekendAutopay));
    }

    #[test]
    fn cash_crunch_budget_mode_reports_shortfall() {
        let items = vec![
            item("Klarna", "2025-10-06", 90.0, false),
            item("Affirm", "2025-10-08", 60.0, false),
        ];
        let paydays = [d("2025-10-03"), d("2025-10-17"), d("2025-10-31")];
        let cfg = RiskConfig {
            paydays: &paydays,
            min_buffer: 100.0,
            pay_period_income: None,
            business_day_mode: true,
        };
        let flags = detect_risks(&normalized(&items, true), &HolidayCalendar::us_federal(), &cfg);
        let crunch = flags
            .iter()
            .find(|f| f.kind == RiskKind::CashCrunch)
            .unwrap();
        assert_eq!(crunch.date, d("2025-10-03"));
        assert_eq!(crunch.affected_installments, vec![0, 1]);
        assert!(crunch.message.contains("short $50.00"));
    }

    #[test]
    fn cash_crunch_income_mode_uses_remaining_balance() {
        let items = vec![item("Klarna", "2025-10-06", 150.0, false)];
        let paydays = [d("2025-10-03"), d("2025-10-17")];
        let cfg = RiskConfig {
            paydays: &paydays,
            min_buffer: 100.0,
            pay_period_income: Some(200.0),
            business_day_mode: true,
        };
        // 200 income - 150 due = 50 left, under the 100 buffer by 50.
        let flags = detect_risks(&normalized(&items, true), &HolidayCalendar::us_federal(), &cfg);
        let crunch = flags
            .iter()
            .find(|f| f.kind == RiskKind::CashCrunch)
            .unwrap();
        assert!(crunch.message.contains("short $50.00"));
    }

    #[test]
    fn cash_crunch_silent_by_default() {
        let items = vec![item("Klarna", "2025-10-06", 500.0, false)];
        let paydays = [d("2025-10-03"), d("2025-10-17")];
        let flags = detect_risks(
            &normalized(&items, true),
            &HolidayCalendar::us_federal(),
            &cfg(&paydays, true),
        );
        assert!(flags.iter().all(|f| f.kind != RiskKind::CashCrunch));
    }

    #[test]
    fn groups_come_back_in_fixed_order() {
        let items = vec![
            item("Klarna", "2025-10-04", 45.0, true),  // shifts to Oct 6
            item("Affirm", "2025-10-06", 58.0, false), // collides with shifted Klarna
            item("Afterpay", "2025-10-07", 500.0, false),
        ];
        let paydays = [d("2025-10-03"), d("2025-10-17")];
        let cfg = RiskConfig {
            paydays: &paydays,
            min_buffer: 100.0,
            pay_period_income: None,
            business_day_mode: true,
        };
        let flags = detect_risks(&normalized(&items, true), &HolidayCalendar::us_federal(), &cfg);
        let kinds: Vec<RiskKind> = flags.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RiskKind::Collision,
                RiskKind::CashCrunch,
                RiskKind::ShiftedNextBusinessDay,
            ]
        );
    }
}

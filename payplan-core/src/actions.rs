//! "This week" action list and weekly summary.

use chrono::{Days, NaiveDate};

use crate::installment::NormalizedInstallment;

/// Ordered action lines for the current week plus a one-sentence summary.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyActions {
    pub actions: Vec<String>,
    pub summary: String,
}

/// Select payments due in the 7-day window starting at `reference` (both ends
/// inclusive) and order them by late fee descending, then amount ascending.
///
/// Highest-penalty payments surface first; on equal penalty the smaller
/// amount wins as the quicker payoff. Input index breaks full ties so the
/// output order is total.
pub fn prioritize(normalized: &[NormalizedInstallment], reference: NaiveDate) -> WeeklyActions {
    let end = reference
        .checked_add_days(Days::new(6))
        .unwrap_or(NaiveDate::MAX);

    let mut due: Vec<(usize, &NormalizedInstallment)> = normalized
        .iter()
        .enumerate()
        .filter(|(_, n)| n.due_date >= reference && n.due_date <= end)
        .collect();

    due.sort_by(|(ia, a), (ib, b)| {
        b.late_fee
            .total_cmp(&a.late_fee)
            .then(a.amount.total_cmp(&b.amount))
            .then(ia.cmp(ib))
    });

    let actions: Vec<String> = due.iter().map(|(_, n)| action_line(n)).collect();

    let total: f64 = due.iter().map(|(_, n)| n.amount).sum();
    let summary = match due.len() {
        0 => "No payments due this week.".to_string(),
        1 => format!("1 payment totaling ${total:.2} due this week."),
        count => format!("{count} payments totaling ${total:.2} due this week."),
    };

    WeeklyActions { actions, summary }
}

fn action_line(n: &NormalizedInstallment) -> String {
    let mut line = format!(
        "{}: {} ${:.2}",
        n.due_date.format("%A %b %-d"),
        n.provider,
        n.amount
    );
    if n.was_shifted {
        if let (Some(original), Some(reason)) = (n.original_due_date, n.shift_reason) {
            line.push_str(&format!(" (shifted from {original}: {})", reason.label()));
        }
    }
    line
}

//! Input validation and normalization.
//!
//! Any failure rejects the whole request: downstream risk detection assumes
//! a fully-normalized, consistent list, and indices must keep their meaning.

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use crate::error::{PlanError, Result};
use crate::holidays::HolidayCalendar;
use crate::installment::{InstallmentInput, NormalizedInstallment};
use crate::shift::shift_due_date;

/// Options the normalizer needs from the request.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    pub business_day_mode: bool,
    pub allow_negative_amounts: bool,
}

/// Validate and normalize the raw items, preserving input order.
pub fn normalize(
    items: &[InstallmentInput],
    calendar: &HolidayCalendar,
    opts: NormalizeOptions,
) -> Result<Vec<NormalizedInstallment>> {
    let currency_re = Regex::new(r"^[A-Z]{3}$").expect("valid pattern");

    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        out.push(normalize_item(index, item, calendar, opts, &currency_re)?);
    }

    let shifted = out.iter().filter(|n| n.was_shifted).count();
    debug!(items = out.len(), shifted, "normalized installments");
    Ok(out)
}

fn normalize_item(
    index: usize,
    item: &InstallmentInput,
    calendar: &HolidayCalendar,
    opts: NormalizeOptions,
    currency_re: &Regex,
) -> Result<NormalizedInstallment> {
    let invalid = |field: &'static str, message: String| PlanError::Item {
        index,
        field,
        message,
    };

    if item.provider.trim().is_empty() {
        return Err(invalid("provider", "must not be empty".to_string()));
    }

    let parsed_due = NaiveDate::parse_from_str(&item.due_date, "%Y-%m-%d").map_err(|_| {
        invalid(
            "due_date",
            format!("`{}` is not a valid YYYY-MM-DD date", item.due_date),
        )
    })?;

    if !item.amount.is_finite() {
        return Err(invalid("amount", "must be a finite number".to_string()));
    }
    if item.amount < 0.0 && !opts.allow_negative_amounts {
        return Err(invalid(
            "amount",
            format!(
                "{} is negative; set allowNegativeAmounts to accept it",
                item.amount
            ),
        ));
    }

    if !currency_re.is_match(&item.currency) {
        return Err(invalid(
            "currency",
            format!("`{}` must be a 3-letter uppercase code", item.currency),
        ));
    }

    if !item.late_fee.is_finite() || item.late_fee < 0.0 {
        return Err(invalid(
            "late_fee",
            "must be a non-negative finite number".to_string(),
        ));
    }

    if item.installment_no == Some(0) {
        return Err(invalid("installment_no", "must be at least 1".to_string()));
    }

    let (due_date, was_shifted, original_due_date, shift_reason) = if opts.business_day_mode {
        let outcome = shift_due_date(parsed_due, calendar);
        if outcome.was_shifted {
            (outcome.date, true, Some(parsed_due), outcome.reason)
        } else {
            (parsed_due, false, None, None)
        }
    } else {
        (parsed_due, false, None, None)
    };

    Ok(NormalizedInstallment {
        provider: item.provider.trim().to_string(),
        installment_no: item.installment_no,
        due_date,
        amount: item.amount,
        currency: item.currency.clone(),
        autopay: item.autopay,
        late_fee: item.late_fee,
        was_shifted,
        original_due_date,
        shift_reason,
        confidence: item.confidence,
    })
}

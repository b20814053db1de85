//! Installment records: raw input, normalized form, and the moved-date view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::shift::ShiftReason;

/// One raw BNPL installment as supplied by the caller. Untrusted until it
/// passes normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstallmentInput {
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_no: Option<u32>,
    /// Calendar date string, `YYYY-MM-DD`.
    pub due_date: String,
    pub amount: f64,
    /// 3-letter uppercase code (ISO 4217).
    pub currency: String,
    #[serde(default)]
    pub autopay: bool,
    #[serde(default)]
    pub late_fee: f64,
    /// Carried through from upstream extraction when present; never computed
    /// by this engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// A validated, timezone-resolved, possibly date-shifted installment.
///
/// Built once per request and read-only afterwards; every downstream stage
/// works off the same list, and indices into it are the contract for
/// `affectedInstallments`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedInstallment {
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_no: Option<u32>,
    /// The date every scheduling decision uses (post-shift when business-day
    /// mode is on).
    #[serde(rename = "dueDate")]
    pub due_date: NaiveDate,
    pub amount: f64,
    pub currency: String,
    pub autopay: bool,
    pub late_fee: f64,
    #[serde(rename = "wasShifted")]
    pub was_shifted: bool,
    /// Set iff the date moved.
    #[serde(
        rename = "originalDueDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub original_due_date: Option<NaiveDate>,
    /// Set iff the date moved.
    #[serde(rename = "shiftReason", default, skip_serializing_if = "Option::is_none")]
    pub shift_reason: Option<ShiftReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Flattened view of one shift, reported alongside the normalized list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovedDate {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub reason: ShiftReason,
}

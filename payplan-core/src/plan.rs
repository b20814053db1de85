//! Request/response contract and the end-to-end pipeline.
//!
//! `build_plan` wires the engine stages together: validate config, normalize,
//! detect risks, prioritize the week, export the calendar. The reference date
//! is a parameter rather than a clock read, so the whole pipeline is a pure
//! function of its inputs.

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actions::prioritize;
use crate::error::{PlanError, Result};
use crate::holidays::HolidayCalendar;
use crate::ics::build_calendar;
use crate::installment::{InstallmentInput, MovedDate, NormalizedInstallment};
use crate::normalize::{normalize, NormalizeOptions};
use crate::paydays::{expand_paydays, PayCadence};
use crate::risk::{detect_risks, RiskConfig, RiskFlag};

/// Country switch for the holiday table. `None` keeps weekend and custom
/// skip-date handling but disables holiday lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Country {
    #[default]
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "None")]
    None,
}

fn default_true() -> bool {
    true
}

/// The JSON request body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub items: Vec<InstallmentInput>,
    /// IANA timezone name, e.g. `America/New_York`.
    pub time_zone: String,
    /// Explicit paydays (at least 3) -- the alternative to cadence mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paycheck_dates: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pay_cadence: Option<PayCadence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_payday: Option<String>,
    #[serde(default)]
    pub min_buffer: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pay_period_income: Option<f64>,
    #[serde(default = "default_true")]
    pub business_day_mode: bool,
    #[serde(default)]
    pub country: Country,
    #[serde(default)]
    pub custom_skip_dates: Vec<String>,
    #[serde(default)]
    pub allow_negative_amounts: bool,
}

/// The JSON response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub summary: String,
    pub actions_this_week: Vec<String>,
    pub risk_flags: Vec<RiskFlag>,
    /// Base64-encoded ICS bytes.
    pub ics: String,
    pub normalized: Vec<NormalizedInstallment>,
    pub moved_dates: Vec<MovedDate>,
}

/// Run the full pipeline. `reference` is "today" in the caller's timezone.
pub fn build_plan(req: &PlanRequest, reference: NaiveDate) -> Result<PlanResponse> {
    if req.items.is_empty() {
        return Err(PlanError::Request {
            field: "items",
            message: "at least one installment is required".to_string(),
        });
    }

    let tz: Tz = req.time_zone.parse().map_err(|_| PlanError::Request {
        field: "timeZone",
        message: format!("unknown IANA timezone `{}`", req.time_zone),
    })?;

    let skip_dates = parse_skip_dates(&req.custom_skip_dates)?;
    let calendar = match req.country {
        Country::Us => HolidayCalendar::us_federal(),
        Country::None => HolidayCalendar::none(),
    }
    .with_skip_dates(skip_dates);

    let normalized = normalize(
        &req.items,
        &calendar,
        NormalizeOptions {
            business_day_mode: req.business_day_mode,
            allow_negative_amounts: req.allow_negative_amounts,
        },
    )?;

    let paydays = resolve_paydays(req, &normalized)?;

    let risk_flags = detect_risks(
        &normalized,
        &calendar,
        &RiskConfig {
            paydays: &paydays,
            min_buffer: req.min_buffer,
            pay_period_income: req.pay_period_income,
            business_day_mode: req.business_day_mode,
        },
    );

    let weekly = prioritize(&normalized, reference);
    let ics = build_calendar(&normalized, tz, &calendar)?;
    let moved_dates = collect_moved_dates(&normalized);

    debug!(
        items = normalized.len(),
        flags = risk_flags.len(),
        actions = weekly.actions.len(),
        "plan built"
    );

    Ok(PlanResponse {
        summary: weekly.summary,
        actions_this_week: weekly.actions,
        risk_flags,
        ics,
        normalized,
        moved_dates,
    })
}

fn parse_skip_dates(raw: &[String]) -> Result<Vec<NaiveDate>> {
    raw.iter()
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
                PlanError::Configuration(format!("customSkipDates: invalid date `{s}`"))
            })
        })
        .collect()
}

/// Resolve the payday series: explicit dates win, cadence mode projects
/// forward to cover the latest due date.
fn resolve_paydays(
    req: &PlanRequest,
    normalized: &[NormalizedInstallment],
) -> Result<Vec<NaiveDate>> {
    if let Some(dates) = &req.paycheck_dates {
        if dates.len() < 3 {
            return Err(PlanError::Request {
                field: "paycheckDates",
                message: format!("requires at least 3 dates, got {}", dates.len()),
            });
        }
        let mut parsed = dates
            .iter()
            .map(|s| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| PlanError::Request {
                    field: "paycheckDates",
                    message: format!("invalid date `{s}`"),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        parsed.sort();
        return Ok(parsed);
    }

    match (req.pay_cadence, &req.next_payday) {
        (Some(cadence), Some(next)) => {
            let next_payday =
                NaiveDate::parse_from_str(next, "%Y-%m-%d").map_err(|_| PlanError::Request {
                    field: "nextPayday",
                    message: format!("invalid date `{next}`"),
                })?;
            let horizon = normalized
                .iter()
                .map(|n| n.due_date)
                .max()
                .unwrap_or(next_payday);
            Ok(expand_paydays(cadence, next_payday, horizon))
        }
        _ => Err(PlanError::Request {
            field: "paycheckDates",
            message: "either paycheckDates or payCadence + nextPayday is required".to_string(),
        }),
    }
}

fn collect_moved_dates(normalized: &[NormalizedInstallment]) -> Vec<MovedDate> {
    normalized
        .iter()
        .filter(|n| n.was_shifted)
        .filter_map(|n| {
            Some(MovedDate {
                from: n.original_due_date?,
                to: n.due_date,
                reason: n.shift_reason?,
            })
        })
        .collect()
}

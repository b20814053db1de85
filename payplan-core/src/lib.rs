//! payplan-core: BNPL payment-plan engine.
//!
//! Normalizes raw installment input into timezone-resolved, business-day
//! shifted records, detects scheduling risks, prioritizes the week's
//! payments, and exports an ICS calendar. The whole pipeline is a pure
//! function of the request plus an injected holiday calendar: no clock
//! reads, no global state, identical input yields byte-identical output.

pub mod actions;
pub mod error;
pub mod holidays;
pub mod ics;
pub mod installment;
pub mod normalize;
pub mod paydays;
pub mod plan;
pub mod risk;
pub mod shift;

pub use actions::{prioritize, WeeklyActions};
pub use error::{PlanError, ProblemDetails, Result};
pub use holidays::HolidayCalendar;
pub use ics::build_calendar;
pub use installment::{InstallmentInput, MovedDate, NormalizedInstallment};
pub use normalize::{normalize, NormalizeOptions};
pub use paydays::{expand_paydays, PayCadence};
pub use plan::{build_plan, Country, PlanRequest, PlanResponse};
pub use risk::{detect_risks, RiskConfig, RiskFlag, RiskKind, Severity};
pub use shift::{is_business_day, is_weekend, shift_due_date, ShiftOutcome, ShiftReason};

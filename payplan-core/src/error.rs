//! Engine error taxonomy.
//!
//! Every variant rejects the whole request: the engine never partially
//! processes an installment list.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for request validation and configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    /// A request-level field is missing or malformed.
    #[error("invalid request field `{field}`: {message}")]
    Request { field: &'static str, message: String },

    /// A single installment failed validation. `index` points into the
    /// request's `items` array.
    #[error("invalid item {index}, field `{field}`: {message}")]
    Item {
        index: usize,
        field: &'static str,
        message: String,
    },

    /// Unsupported country code, malformed skip date, or a bad holiday table.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Structurally-impossible condition. Surfaced without detail; the
    /// payload stays in the Debug form for logs only.
    #[error("internal error")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, PlanError>;

/// RFC 9457 Problem Details payload. The engine only supplies the `detail`
/// string; rendering the envelope belongs to the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub instance: String,
}

impl PlanError {
    /// Render this error as a Problem Details object. The `detail` string is
    /// the error's display form: field name and item index included, no
    /// internal state.
    pub fn to_problem(&self, instance: &str) -> ProblemDetails {
        let (title, status) = match self {
            PlanError::Request { .. } | PlanError::Item { .. } => ("Invalid request", 400),
            PlanError::Configuration(_) => ("Invalid configuration", 400),
            PlanError::Internal(_) => ("Internal error", 500),
        };
        ProblemDetails {
            problem_type: "about:blank".to_string(),
            title: title.to_string(),
            status,
            detail: self.to_string(),
            instance: instance.to_string(),
        }
    }
}

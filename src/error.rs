//! Error types for the calibration loop.
//!
//! Two families matter to the controller: round-fatal failures of an
//! external collaborator (`Training`, `Evaluation`) and contract violations
//! (everything else), which halt the campaign.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the loop and its stage adapters.
#[derive(Error, Debug)]
pub enum Error {
    /// Corpus fields mismatched in name or length.
    #[error("schema error on field `{field}`: {reason}")]
    Schema {
        /// Offending field.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The surrogate could not be trained from the current corpus.
    #[error("surrogate training failed: {0}")]
    Training(String),

    /// The high-fidelity oracle crashed, did not converge or ran out of budget.
    #[error("high-fidelity evaluation failed: {0}")]
    Evaluation(String),

    /// A response field expected by feature extraction is absent.
    #[error("missing field `{field}` in high-fidelity result")]
    MissingField {
        /// Name of the absent field.
        field: String,
    },

    /// A parameter value outside the schema's declared range reached evaluation.
    #[error("parameter `{name}` = {value} lies outside [{lower}, {upper}]")]
    BoundsViolation {
        /// Parameter name.
        name: String,
        /// Offending value.
        value: f64,
        /// Declared lower bound.
        lower: f64,
        /// Declared upper bound.
        upper: f64,
    },

    /// Input data is present but unusable (empty curves, unparsable cells, ...).
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Campaign configuration rejected at load time.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (configuration) error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for [`Error::Schema`].
    pub fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema { field: field.into(), reason: reason.into() }
    }

    /// Shorthand for [`Error::MissingField`].
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField { field: field.into() }
    }

    /// True for failures that abort only the current round.
    ///
    /// Everything else is a data or programming contract violation and stops
    /// the campaign regardless of the configured failure policy.
    #[must_use]
    pub const fn is_round_fatal(&self) -> bool {
        matches!(self, Self::Training(_) | Self::Evaluation(_))
    }
}

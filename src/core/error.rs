//! Error type shared by every analysis entry point.

use thiserror::Error;

/// Broad classification of a [`ProbeError`].
///
/// None of these are transient: the analysis is pure computation, so the
/// caller is expected to fix the input rather than retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested analysis does not match the fitted model or the options conflict.
    Config,
    /// The observed data are degenerate for the requested analysis.
    Data,
    /// A numerical precondition failed (non-PSD covariance, non-finite solve).
    Numerical,
}

/// Errors raised while probing an interaction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbeError {
    /// A required coefficient is absent from the fitted model.
    #[error("term `{term}` is not present in the fitted model")]
    MissingTerm { term: String },

    /// A variable name does not appear in the model frame.
    #[error("variable `{name}` is not present in the model frame")]
    UnknownVariable { name: String },

    /// A coefficient name contains a component that cannot be resolved to a column.
    #[error("coefficient `{coefficient}` references unknown component `{component}`")]
    UnknownTermComponent {
        coefficient: String,
        component: String,
    },

    /// Options that cannot be combined, or out-of-range option values.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// Model summary pieces have inconsistent shapes.
    #[error("dimension mismatch in {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// The moderator (or another variable) cannot produce meaningful values.
    #[error("degenerate variable `{variable}`: {reason}")]
    DegenerateVariable { variable: String, reason: String },

    /// Not enough observations for the stated degrees of freedom.
    #[error("insufficient observations: {observations} rows cannot support {df} residual degrees of freedom")]
    InsufficientObservations { observations: usize, df: usize },

    /// A linear combination produced a negative variance.
    #[error("covariance is not positive semi-definite: variance {variance:e} for {context}")]
    NotPositiveSemidefinite { variance: f64, context: String },

    /// A computation produced NaN or infinity where a finite value is required.
    #[error("non-finite result in {0}")]
    NonFinite(String),

    /// The false-discovery-rate adjusted critical value cannot be computed.
    #[error("false discovery rate correction failed: {0}")]
    FdrCorrection(String),
}

impl ProbeError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingTerm { .. }
            | Self::UnknownVariable { .. }
            | Self::UnknownTermComponent { .. }
            | Self::InvalidOptions(_)
            | Self::DimensionMismatch { .. }
            | Self::FdrCorrection(_) => ErrorKind::Config,
            Self::DegenerateVariable { .. } | Self::InsufficientObservations { .. } => {
                ErrorKind::Data
            }
            Self::NotPositiveSemidefinite { .. } | Self::NonFinite(_) => ErrorKind::Numerical,
        }
    }

    pub(crate) fn degenerate(variable: &str, reason: impl Into<String>) -> Self {
        Self::DegenerateVariable {
            variable: variable.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type ProbeResult<T> = Result<T, ProbeError>;

//! Error types for scoring, question banks, persistence, and analytics.
//!
//! Every variant is recoverable by the caller: a rejected answer set can be
//! re-prompted, an empty cohort reported as "no data", and an I/O failure
//! surfaced without dropping the submission silently.

use std::path::PathBuf;

use thiserror::Error;

/// An answer set that does not fit the question bank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The number of rating groups differs from the number of dimensions.
    #[error("expected answers for {expected} dimensions, got {actual}")]
    DimensionCount { expected: usize, actual: usize },

    /// A dimension was answered with the wrong number of ratings.
    #[error("dimension {dimension} is incomplete: expected {expected} ratings, got {actual}")]
    CountMismatch {
        dimension: String,
        expected: usize,
        actual: usize,
    },

    /// A rating outside the closed 1..=6 scale.
    #[error("dimension {dimension}, question {index}: rating {rating} is outside 1..=6")]
    RatingOutOfRange {
        dimension: String,
        index: usize,
        rating: u8,
    },

    /// An answer sheet referenced a dimension code the bank does not define.
    #[error("unknown dimension code: {0}")]
    UnknownDimension(String),
}

impl ValidationError {
    /// The dimension code the error is about, if it concerns a single one.
    pub fn dimension(&self) -> Option<&str> {
        match self {
            ValidationError::CountMismatch { dimension, .. }
            | ValidationError::RatingOutOfRange { dimension, .. } => Some(dimension),
            ValidationError::UnknownDimension(code) => Some(code),
            ValidationError::DimensionCount { .. } => None,
        }
    }
}

/// A question bank that cannot be used for scoring.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BankError {
    #[error("question bank has no dimensions")]
    Empty,

    #[error("duplicate dimension code: {0}")]
    DuplicateDimension(String),

    #[error("dimension {code} has non-positive weight {weight}")]
    NonPositiveWeight { code: String, weight: f64 },

    #[error("dimension {0} has no questions")]
    NoQuestions(String),

    #[error("dimension {code}, question {index}: max score must be positive, got {max_score}")]
    NonPositiveMaxScore {
        code: String,
        index: usize,
        max_score: f64,
    },
}

/// Failures reading or writing the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access record store {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("record store {} is corrupt: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Score or rate vectors that do not line up with the live bank.
    #[error("record has {actual} dimension values, question bank has {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// NaN or infinite values serialize as `null` and would corrupt the file.
    #[error("record field {field} is not a finite number")]
    NonFinite { field: &'static str },

    #[error("record store lock poisoned")]
    Poisoned,
}

/// Cohort statistics that cannot be computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    /// No stored records to compare against.
    #[error("no data: the cohort is empty")]
    EmptyPopulation,
}

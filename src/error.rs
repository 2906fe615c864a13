//! Typed failure kinds shared across the crate.
//!
//! Internal numerical clamping (e.g. a rating update that would push below
//! the floor) is never an error; it's a defined policy. These variants only
//! cover values a caller supplied directly: construction, assignment, and
//! deserialization.

use crate::competitor::CompetitorKind;

/// Errors produced by the rating primitives, competitors, state codec, arena,
/// and history.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum EloteError {
    /// A construction-time value was outside its legal range, e.g.
    /// `initial_rating` below `minimum_rating`.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Human-readable reason the value was rejected.
        reason: String,
    },

    /// A state field was assigned a value below the floor, the document's
    /// `type` didn't match the receiving variant, or a required field was
    /// missing.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// An operation was attempted between competitors (or ensemble members)
    /// of different variants.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The variant the operation expected.
        expected: CompetitorKind,
        /// The variant that was actually supplied.
        found: CompetitorKind,
    },

    /// `confusion_matrix`/`random_search` thresholds were out of order or
    /// out of `[0, 1]`.
    #[error("invalid thresholds: lo={lo}, hi={hi} (require 0 <= lo <= hi <= 1)")]
    InvalidThresholds {
        /// The lower threshold supplied.
        lo: f64,
        /// The upper threshold supplied.
        hi: f64,
    },
}

/// Convenience alias used throughout the crate's fallible APIs.
pub type Result<T> = std::result::Result<T, EloteError>;

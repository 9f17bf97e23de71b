//! Group operation errors.

use crate::config::ConfigError;
use crate::interfaces::ConstructionError;

/// Result type for group operations.
pub type Result<T> = std::result::Result<T, GroupError>;

/// Errors raised by the group layer itself.
///
/// Individual member failures are not among them: one-way calls collect
/// those in an `ExceptionList` and value-returning calls only log them.
#[derive(Debug, thiserror::Error)]
pub enum GroupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Worker pool unavailable: {0}")]
    Pool(String),

    #[error("Scatter argument at position {position} has no members")]
    EmptyScatterSource { position: usize },

    #[error("No placement targets given for member construction")]
    NoPlacementTargets,

    #[error("Member construction failed: {0}")]
    Construction(#[from] ConstructionError),

    #[error("Group of '{found}' is not compatible with group of '{expected}'")]
    IncompatibleGroups { expected: String, found: String },

    #[error("Invalid range {begin}..{end}")]
    InvalidRange { begin: usize, end: usize },

    #[error("{count} member call(s) failed")]
    MemberFailures { count: usize },
}

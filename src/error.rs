//! Error types for pagediff.
//!
//! Malformed input (tokens without a box, change indices past the end of a
//! sequence) is skipped, never reported. Errors are reserved for conditions
//! that would silently corrupt a comparison if ignored.

use thiserror::Error;

/// Failure reported by an external oracle (similarity or global alignment).
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    /// The backend could not be reached or is not loaded.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered but the call did not finish in time.
    #[error("timed out after {millis}ms")]
    Timeout {
        /// Elapsed time before giving up
        millis: u64,
    },

    /// The backend returned something the engine cannot use.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl OracleError {
    /// Create an unavailability error with a message.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create an invalid-response error with a message.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}

/// Errors that can occur while comparing two documents.
#[derive(Debug, Clone, Error)]
pub enum DiffError {
    /// An oracle failed; the comparison it guarded was not performed.
    #[error("{oracle} oracle unavailable: {source}")]
    OracleUnavailable {
        /// Which oracle failed (`similarity` or `global-align`)
        oracle: &'static str,
        /// Underlying oracle failure
        #[source]
        source: OracleError,
    },

    /// A strategy name that does not match any known strategy
    #[error("unknown comparison strategy: {0:?}")]
    UnknownStrategy(String),

    /// Configuration values out of range
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type alias for comparison operations.
pub type DiffResult<T> = Result<T, DiffError>;

impl DiffError {
    /// Wrap a similarity oracle failure.
    pub fn similarity(source: OracleError) -> Self {
        Self::OracleUnavailable {
            oracle: "similarity",
            source,
        }
    }

    /// Wrap a global aligner failure.
    pub fn global_align(source: OracleError) -> Self {
        Self::OracleUnavailable {
            oracle: "global-align",
            source,
        }
    }

    /// Create a config error with a message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True if this error came from an oracle.
    pub fn is_oracle(&self) -> bool {
        matches!(self, Self::OracleUnavailable { .. })
    }
}

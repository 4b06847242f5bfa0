//! Error types for the logging facade

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the facade's configuration and registration APIs.
///
/// Nothing on the dispatch path returns these; probe and construction
/// failures are recorded in the resolution report instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A backend probe panicked
    #[error("probe for backend '{backend}' panicked: {reason}")]
    ProbePanicked {
        /// Candidate name
        backend: String,
        /// Panic payload, if it was a string
        reason: String,
    },

    /// A backend constructor panicked
    #[error("constructing backend '{backend}' panicked: {reason}")]
    ConstructionPanicked {
        /// Candidate name
        backend: String,
        /// Panic payload, if it was a string
        reason: String,
    },

    /// Configuration or registration attempted after the backend was selected
    #[error("logging backend already resolved")]
    AlreadyResolved,

    /// A candidate with the same name is already registered
    #[error("backend candidate '{0}' already registered")]
    DuplicateCandidate(String),

    /// Unrecognised level name
    #[error("invalid log level: {0}")]
    InvalidLevel(String),

    /// Unrecognised console stream name
    #[error("invalid console stream: {0}")]
    InvalidStream(String),

    /// Unrecognised boolean flag value
    #[error("invalid flag value: {0}")]
    InvalidFlag(String),
}

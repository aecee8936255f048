//! Error types for the cardinality index

use thiserror::Error;

/// Main error type for the crate
///
/// Index operations themselves are total: ingest and queries cannot fail
/// short of allocation failure, which aborts. The only fallible surface is
/// matcher construction, where a regex pattern may not compile.
#[derive(Error, Debug)]
pub enum Error {
    /// A matcher pattern failed to compile
    #[error("invalid regex pattern {pattern:?}: {source}")]
    InvalidRegex {
        /// The pattern as supplied by the caller, before anchoring
        pattern: String,
        /// The underlying regex compile error
        #[source]
        source: regex::Error,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

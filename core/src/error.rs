use thiserror::Error;

/// Errors raised while constructing descriptors and reducers.
///
/// Construction is the only fallible step. Transport failures never show up
/// here; they reach the reducer as FAILURE lifecycle actions, and applying a
/// reducer never fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// A required argument was missing or empty.
    #[error("{0}")]
    InvalidArgument(&'static str),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, FetchError>;

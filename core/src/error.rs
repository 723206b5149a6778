//! Crate-level error type.
//!
//! Follows the same shape as the teacher's `GroupError`
//! (`hypershape::group::common::GroupError`): a flat `thiserror` enum with
//! one variant per precondition the public API can violate, plus a couple of
//! variants that wrap errors bubbling up from the typed-index layer.

use smgrp_util::error::{IndexOutOfRange, IndexOverflow};
use thiserror::Error;

/// Result type returned by fallible `smgrp` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error produced by a public `smgrp` entry point.
#[allow(missing_docs)]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Precondition on arguments violated: empty generator set, degree
    /// mismatch, a letter/element index out of the valid range, and so on.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The object is in a state that does not permit the requested
    /// operation (e.g. adding generators to an immutable/enumerated
    /// [`crate::froidure_pin::FroidurePin`], or prefilling a
    /// [`crate::todd_coxeter::ToddCoxeter`] after enumeration began).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A typed-index table could not grow to hold a new element, coset, or
    /// rule. The Rust analogue of the source's out-of-memory path during
    /// table growth.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// The computation was cancelled before completion (external `killed`
    /// flag, or a configured cap such as `max_rules`/`max_time` was hit).
    /// The owning engine's state remains internally consistent and can be
    /// inspected or resumed; see `is_done` on each engine.
    #[error("cancelled before completion")]
    Cancelled,
}

impl From<IndexOverflow> for Error {
    fn from(e: IndexOverflow) -> Self {
        Error::ResourceExhausted(e.to_string())
    }
}

impl From<IndexOutOfRange> for Error {
    fn from(e: IndexOutOfRange) -> Self {
        Error::InvalidArgument(e.to_string())
    }
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
    /// Shorthand for [`Error::InvalidState`].
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Error::InvalidState(msg.into())
    }
}

//! Defines [`TermError`], the unified error type for term store operations.
//!
//! Provides descriptive error variants for stale or foreign handles,
//! kind or arity mismatches, and list positions that do not exist.

use crate::{StoreID, Term};
use thiserror::Error;

/// Represents all recoverable errors that can occur when reading terms.
///
/// Construction never fails: a well-formed intern request either finds the
/// canonical node or creates it.  Contract violations such as a wrong number
/// of arguments for a symbol are programmer errors and panic instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermError {
    #[error("Invalid term {0:?}")]
    InvalidTerm(Term),

    #[error("Type mismatch: expected {expected}, found {found}")]
    UnexpectedKind {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Arity mismatch: expected {expected}, found {found}")]
    UnexpectedArity { expected: usize, found: usize },

    #[error("Empty list has no elements")]
    EmptyList,

    #[error("Index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Term {0:?} is not a protected root")]
    NotProtected(Term),
}

/// Internal errors raised by slot lookup before they are mapped to
/// [`TermError::InvalidTerm`] at the public surface.
#[derive(Debug, Clone, Error)]
pub(crate) enum InternalTermError {
    /// The handle was issued by a different store.
    #[error("foreign store: expected {expected:?}, found {found:?}")]
    ForeignStore { expected: StoreID, found: StoreID },

    /// The slot was reclaimed (or never existed) since the handle was issued.
    #[error("stale handle: slot {index} generation {generation}")]
    StaleHandle { index: u32, generation: u32 },
}

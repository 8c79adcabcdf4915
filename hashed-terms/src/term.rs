//! Defines the core [`Term`] handle and the [`IntoTerm`] conversion trait.
//!
//! A `Term` is a copyable reference to a canonical node in a
//! [`TermStore`].  Because every node is hash-consed, two handles are
//! structurally equal exactly when they are identical, so equality,
//! ordering and hashing all work on the handle bits alone.

use crate::{TermAppl, TermInt, TermList, TermLike, TermStore};
use core::fmt;

/// Randomly generated identifier of a [`TermStore`].
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoreID(pub(crate) u32);

/// Slot index of the empty-list sentinel in every store.
pub(crate) const NIL_INDEX: u32 = 0;

/// A compact, copyable handle referencing a canonical node in a [`TermStore`].
///
/// The handle carries the id of the issuing store, the slot index of the
/// node and the generation of that slot.  When the node is reclaimed by
/// [`TermStore::collect`] the slot generation changes and the handle is
/// rejected by every read path with [`TermError::InvalidTerm`].
///
/// [`TermError::InvalidTerm`]: crate::TermError::InvalidTerm
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Term {
    pub(crate) store: StoreID,
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl Term {
    #[inline]
    pub(crate) fn new(store: StoreID, index: u32, generation: u32) -> Self {
        Self {
            store,
            index,
            generation,
        }
    }

    /// Returns the id of the store that issued this handle.
    #[inline]
    pub fn store_id(&self) -> StoreID {
        self.store
    }

    /// Returns `true` if this handle is the empty-list sentinel.
    #[inline]
    pub fn is_nil(&self) -> bool {
        self.index == NIL_INDEX
    }

    /// Identity hash folded into the hash of every parent node.
    #[inline]
    pub(crate) fn identity_hash(&self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }
}

impl AsRef<Term> for Term {
    fn as_ref(&self) -> &Self {
        self
    }
}

/// Prints the handle bits.  The output is meant for diagnostics only.
impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            return f.debug_tuple("Nil").field(&self.store.0).finish();
        }
        f.debug_struct("Term")
            .field("store", &self.store.0)
            .field("index", &self.index)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Converts a value into a canonical term of the given store.
///
/// Implemented for integers (producing [`TermInt`]) and for every typed
/// handle (returning itself), so that bulk constructors such as
/// [`TermStore::list`] accept plain Rust values and terms alike.
pub trait IntoTerm {
    type Output: TermLike;

    fn into_term(self, store: &mut TermStore) -> Self::Output;
}

macro_rules! impl_intoterm_for_integers {
    ($($t:ty),* $(,)?) => {$(
        impl IntoTerm for $t {
            type Output = TermInt;

            #[inline]
            fn into_term(self, store: &mut TermStore) -> TermInt { store.int(self as i64) }
        }
    )*};
}
impl_intoterm_for_integers!(i8, i16, i32, i64, u8, u16, u32);

impl IntoTerm for Term {
    type Output = Term;

    #[inline]
    fn into_term(self, _store: &mut TermStore) -> Term {
        self
    }
}

impl IntoTerm for &Term {
    type Output = Term;

    #[inline]
    fn into_term(self, _store: &mut TermStore) -> Term {
        *self
    }
}

impl IntoTerm for TermInt {
    type Output = TermInt;

    #[inline]
    fn into_term(self, _store: &mut TermStore) -> TermInt {
        self
    }
}

impl<T: TermLike> IntoTerm for TermAppl<T> {
    type Output = TermAppl<T>;

    #[inline]
    fn into_term(self, _store: &mut TermStore) -> Self {
        self
    }
}

impl<T: TermLike> IntoTerm for TermList<T> {
    type Output = TermList<T>;

    #[inline]
    fn into_term(self, _store: &mut TermStore) -> Self {
        self
    }
}

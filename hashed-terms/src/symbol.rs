//! Function symbols: interned `(name, arity)` pairs.
//!
//! Symbols are owned by the [`SymbolTable`] embedded in every
//! [`TermStore`](crate::TermStore).  They are never reclaimed, so a
//! [`Symbol`] handle stays valid for the lifetime of its store.

use indexmap::IndexSet;
use smartstring::alias::String;

/// Name of the reserved binary symbol used for cons cells.
pub const LIST_SYMBOL_NAME: &str = "[|]";

/// A compact, copyable handle to an interned function symbol.
///
/// The arity is carried inline so that the constructors can check argument
/// counts without a table lookup.  Two symbols are equal iff they were
/// interned from the same `(name, arity)` pair in the same table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    pub(crate) id: u32,
    pub(crate) arity: u32,
}

impl Symbol {
    /// The reserved `[|]/2` symbol of cons cells.  It has id 0 in every table.
    pub const LIST: Symbol = Symbol { id: 0, arity: 2 };

    /// Returns the number of arguments applications of this symbol take.
    #[inline]
    pub fn arity(&self) -> usize {
        self.arity as usize
    }

    /// Returns `true` for the reserved cons-cell symbol.
    #[inline]
    pub fn is_list(&self) -> bool {
        *self == Self::LIST
    }

    /// Identity hash folded into every application hash.
    #[inline]
    pub(crate) fn identity_hash(&self) -> u64 {
        ((self.id as u64) << 32) | self.arity as u64
    }
}

/// Interns function symbols by `(name, arity)`.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    entries: IndexSet<(String, u32)>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Creates a table holding only the reserved list symbol.
    pub fn new() -> Self {
        let mut entries = IndexSet::new();
        entries.insert((String::from(LIST_SYMBOL_NAME), 2));
        Self { entries }
    }

    /// Returns the symbol for `(name, arity)`, interning it on first use.
    pub fn intern(&mut self, name: impl AsRef<str>, arity: usize) -> Symbol {
        let arity = u32::try_from(arity).unwrap_or_else(|_| panic!("arity {arity} too large"));
        let (index, _) = self
            .entries
            .insert_full((String::from(name.as_ref()), arity));
        Symbol {
            id: index as u32,
            arity,
        }
    }

    /// Looks a symbol up without interning it.
    pub fn find(&self, name: impl AsRef<str>, arity: usize) -> Option<Symbol> {
        let arity = u32::try_from(arity).ok()?;
        self.entries
            .get_index_of(&(String::from(name.as_ref()), arity))
            .map(|index| Symbol {
                id: index as u32,
                arity,
            })
    }

    /// Returns the name of `symbol`, or `None` if it was not issued here.
    pub fn name(&self, symbol: Symbol) -> Option<&str> {
        self.entries
            .get_index(symbol.id as usize)
            .filter(|(_, arity)| *arity == symbol.arity)
            .map(|(name, _)| name.as_str())
    }

    /// Number of interned symbols, including the reserved list symbol.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

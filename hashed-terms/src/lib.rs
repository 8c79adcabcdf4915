//! # Hashed Terms
//!
//! A hash-consed store of immutable first-order terms.
//!
//! Every term lives as exactly one canonical node in a [`TermStore`]:
//! constructing a term that already exists returns the existing node.
//! Structural equality therefore reduces to comparing [`Term`] handles,
//! which are 12-byte `Copy` values usable as keys in any hash map.
//!
//! Terms are built bottom-up from integers, function applications over
//! interned [`Symbol`]s, and lists.  A list is either the empty-list
//! sentinel or a cons cell, which is itself an application of the
//! reserved [`Symbol::LIST`].  Lists share their suffixes, and the list
//! algorithms ([`concat`](TermStore::concat),
//! [`remove_one_element`](TermStore::remove_one_element), ...) rebuild only
//! the cells in front of the position they change.
//!
//! Typed views ([`TermAppl`], [`TermList`], [`TermInt`]) wrap handles with
//! their expected shape and expose the shape-specific accessors; a
//! [`View`] decodes a handle for pattern matching.
//!
//! Nodes are reclaimed by an explicit mark-and-sweep over protected roots,
//! see [`TermStore::collect`].
//!
//! ## Example
//! ```rust
//! # use hashed_terms::{Term, TermStore, View};
//! let mut store = TermStore::new();
//!
//! let f = store.symbol("f", 2);
//! let a = store.int(1);
//! let b = store.int(2);
//!
//! // Interning the same application twice yields the same handle.
//! let ab = store.appl2(f, a, b);
//! assert_eq!(ab, store.appl2(f, a, b));
//! assert_ne!(ab, store.appl2(f, b, a));
//!
//! // Lists are built in bulk or cell by cell and share suffixes.
//! let xs = store.list([1, 2]);
//! let ys = store.list([3, 4]);
//! let zs = store.concat(xs, ys).unwrap();
//! assert_eq!(zs, store.list([1, 2, 3, 4]));
//! assert_eq!(zs.tail_from(&store, 2).unwrap(), ys);
//!
//! // Terms can be decoded for matching.
//! let t = store.appl2(f, Term::from(a), Term::from(zs));
//! match t.term().view(&store).unwrap() {
//!     View::Appl(_, symbol, args) => {
//!         assert_eq!(store.symbol_name(symbol), Some("f"));
//!         assert_eq!(args.len(), 2);
//!     }
//!     _ => unreachable!(),
//! }
//! ```
//!
//! ## License
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0 or
//! (at your option) any later version (LGPL-3.0-or-later).

mod appl;
mod builder;
mod derived;
mod error;
mod list;
mod store;
mod symbol;
mod table;
mod term;
mod typed;
mod view;

pub use builder::LIST_SCRATCH_THRESHOLD;
pub(crate) use error::InternalTermError;
pub use error::TermError;
pub use store::{CreationHook, StoreConfig, StoreStats, TermStore};
pub use symbol::{LIST_SYMBOL_NAME, Symbol, SymbolTable};
pub use term::{IntoTerm, StoreID, Term};
pub use typed::{ApplIter, ListIter, TermAppl, TermInt, TermLike, TermList};
pub use view::View;

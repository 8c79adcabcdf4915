//! Defines the [`TermStore`] type, which owns every canonical node and the
//! intern table that keeps them unique.
//!
//! Provides slot allocation, handle validation, the shared probe/insert
//! sequence used by all constructors, the root set, and mark-and-sweep
//! reclamation.

use crate::table::{InternTable, Slot};
use crate::term::NIL_INDEX;
use crate::{
    InternalTermError, StoreID, Symbol, SymbolTable, Term, TermError, TermInt, TermLike,
    TermList,
};
use bit_set::BitSet;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::fmt;

/// Inline capacity of a node's argument array.  Cons cells fit inline.
pub(crate) type Args = SmallVec<[Term; 2]>;

/// Payload of a canonical node.  Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Payload {
    /// The empty list.  Exactly one per store, at slot 0.
    Nil,
    Int(i64),
    /// Function application.  Cons cells use [`Symbol::LIST`].
    Appl { symbol: Symbol, args: Args },
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) payload: Payload,
}

impl Node {
    pub(crate) fn kind_name(&self) -> &'static str {
        match &self.payload {
            Payload::Nil => "nil",
            Payload::Int(_) => "int",
            Payload::Appl { symbol, .. } if symbol.is_list() => "list",
            Payload::Appl { .. } => "appl",
        }
    }

    #[inline]
    pub(crate) fn is_appl(&self, symbol: Symbol, args: &[Term]) -> bool {
        matches!(&self.payload, Payload::Appl { symbol: s, args: a } if *s == symbol && a.as_slice() == args)
    }
}

/// Callback invoked once for every newly created node.
pub type CreationHook = Box<dyn FnMut(Term) + Send>;

/// Tuning knobs of a [`TermStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoreConfig {
    /// The intern table starts with `1 << table_class` buckets.
    pub table_class: u32,
    /// The table doubles once entries exceed this percentage of its buckets.
    pub max_load_pct: u8,
    /// Number of node slots reserved up front.
    pub node_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table_class: 12,
            max_load_pct: 80,
            node_capacity: 1024,
        }
    }
}

/// Snapshot of store occupancy and intern-table behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoreStats {
    pub store_id: StoreID,
    /// Nodes currently alive, including the empty list.
    pub live_nodes: usize,
    /// Reclaimed slots waiting for reuse.
    pub free_slots: usize,
    pub buckets: usize,
    pub max_chain: usize,
    /// Number of times the intern table was doubled.
    pub growths: u64,
    /// Intern requests answered by an existing node.
    pub hits: u64,
    /// Intern requests that created a node.
    pub misses: u64,
    pub collections: u64,
}

/// Owns all canonical nodes of a term universe.
///
/// Every construction takes `&mut TermStore`, every read takes
/// `&TermStore`.  The exclusive borrow makes each intern request
/// (probe, allocate, read mask, insert) indivisible, so a store is safe to
/// move between threads but never mutated by two of them at once.  Use one
/// store per worker when concurrent construction is needed.
///
/// ### Reclamation
/// Nodes are reclaimed by an explicit mark-and-sweep:
/// - [`protect`](Self::protect) registers a root (counted),
/// - [`collect`](Self::collect) frees every node not reachable from a root.
///
/// Construction never collects.  Handles obtained since the last
/// `collect()` stay valid until the next one; afterwards only protected
/// terms and their subterms are guaranteed to be alive.  Reads through a
/// reclaimed handle fail with [`TermError::InvalidTerm`].
///
/// ```
/// # use hashed_terms::TermStore;
/// let mut store = TermStore::new();
/// let kept = store.list([1, 2, 3]);
/// let _dropped = store.list([4, 5]);
/// store.protect(kept);
/// assert!(store.collect() >= 2);
/// assert_eq!(kept.size(&store).unwrap(), 3);
/// ```
pub struct TermStore {
    pub(crate) store_id: StoreID,
    pub(crate) symbols: SymbolTable,
    pub(crate) slots: Vec<Slot>,
    pub(crate) free: Vec<u32>,
    pub(crate) table: InternTable,
    pub(crate) roots: IndexMap<Term, usize>,
    /// Reusable buffer for materialising short lists; see [`crate::LIST_SCRATCH_THRESHOLD`].
    pub(crate) scratch: Vec<Term>,
    hook: Option<CreationHook>,
    hits: u64,
    misses: u64,
    collections: u64,
}

impl fmt::Debug for TermStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TermStore")
            .field("store_id", &self.store_id)
            .field("symbols", &self.symbols.len())
            .field("slots", &self.slots.len())
            .field("free", &self.free.len())
            .field("roots", &self.roots.len())
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl Default for TermStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TermStore {
    /// Create a new, empty store with the given configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        let mut slots = Vec::with_capacity(config.node_capacity.max(1));
        slots.push(Slot {
            node: Some(Node {
                payload: Payload::Nil,
            }),
            ..Slot::vacant(0)
        });
        Self {
            store_id: StoreID(rand::random()),
            symbols: SymbolTable::new(),
            slots,
            free: Vec::new(),
            table: InternTable::with_class(config.table_class, config.max_load_pct),
            roots: IndexMap::new(),
            scratch: Vec::new(),
            hook: None,
            hits: 0,
            misses: 0,
            collections: 0,
        }
    }

    /// Create a new, empty store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    #[inline]
    pub fn store_id(&self) -> StoreID {
        self.store_id
    }

    /// Returns stats.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            store_id: self.store_id,
            live_nodes: self.slots.len() - self.free.len(),
            free_slots: self.free.len(),
            buckets: self.table.buckets(),
            max_chain: self.table.max_chain(&self.slots),
            growths: self.table.growths,
            hits: self.hits,
            misses: self.misses,
            collections: self.collections,
        }
    }

    /// Returns the symbol `name/arity`, interning it on first use.
    #[inline]
    pub fn symbol(&mut self, name: impl AsRef<str>, arity: usize) -> Symbol {
        self.symbols.intern(name, arity)
    }

    #[inline]
    pub fn symbol_name(&self, symbol: Symbol) -> Option<&str> {
        self.symbols.name(symbol)
    }

    #[inline]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The empty list of this store, viewed with element type `T`.
    #[inline]
    pub fn nil<T: TermLike>(&self) -> TermList<T> {
        TermList::from_term_unchecked(Term::new(self.store_id, NIL_INDEX, 0))
    }

    /// Construct or find the integer term `value`.
    pub fn int(&mut self, value: impl Into<i64>) -> TermInt {
        let value = value.into();
        let hash = crate::table::fold_hash(INT_SEED, value as u64);
        let term = match self.find_canonical(hash, |node| node.payload == Payload::Int(value)) {
            Some(term) => term,
            None => self.insert_canonical(hash, Payload::Int(value)),
        };
        TermInt::from_term_unchecked(term)
    }

    /// Registers `f` to be called once for every node created from now on.
    pub fn set_creation_hook(&mut self, f: CreationHook) {
        self.hook = Some(f);
    }

    pub fn clear_creation_hook(&mut self) -> Option<CreationHook> {
        self.hook.take()
    }

    /// Returns `true` if `term` was issued by this store and is still alive.
    #[inline]
    pub fn is_live(&self, term: impl Into<Term>) -> bool {
        self.node(term.into()).is_ok()
    }

    /// Resolves a handle to its node.
    #[inline]
    pub(crate) fn node(&self, term: Term) -> Result<&Node, InternalTermError> {
        if term.store != self.store_id {
            return Err(InternalTermError::ForeignStore {
                expected: self.store_id,
                found: term.store,
            });
        }
        match self.slots.get(term.index as usize) {
            Some(Slot {
                generation,
                node: Some(node),
                ..
            }) if *generation == term.generation => Ok(node),
            _ => Err(InternalTermError::StaleHandle {
                index: term.index,
                generation: term.generation,
            }),
        }
    }

    /// Resolves a handle, mapping lookup failures to [`TermError::InvalidTerm`].
    #[inline]
    pub(crate) fn resolve(&self, term: Term) -> Result<&Node, TermError> {
        self.node(term).map_err(|_| TermError::InvalidTerm(term))
    }

    /// Probes the intern table.  On a hit the node is promoted to the front
    /// of its chain.
    pub(crate) fn find_canonical(
        &mut self,
        hash: u64,
        matches: impl FnMut(&Node) -> bool,
    ) -> Option<Term> {
        let hit = self.table.probe(&self.slots, hash, matches)?;
        self.table.move_to_front(&mut self.slots, hit);
        self.hits += 1;
        let generation = self.slots[hit.index as usize].generation;
        Some(Term::new(self.store_id, hit.index, generation))
    }

    /// Stores `payload` as a new canonical node.  The caller must have probed
    /// for it first.
    pub(crate) fn insert_canonical(&mut self, hash: u64, payload: Payload) -> Term {
        let index = self.allocate();
        // Allocation may have grown the table; the bucket is taken from the
        // mask in force now.
        let bucket = self.table.bucket_of(hash);
        let slot = &mut self.slots[index as usize];
        slot.hash = hash;
        slot.node = Some(Node { payload });
        let term = Term::new(self.store_id, index, slot.generation);
        self.table.link(&mut self.slots, bucket, index);
        self.misses += 1;
        log::trace!("created node {term:?} in bucket {bucket}");
        if let Some(hook) = self.hook.as_mut() {
            hook(term);
        }
        term
    }

    /// Reserves a slot for a new node, growing the intern table first if the
    /// new entry would exceed the load limit.
    fn allocate(&mut self) -> u32 {
        if self.table.needs_growth() {
            self.table.grow(&mut self.slots);
        }
        if let Some(index) = self.free.pop() {
            return index;
        }
        let index = u32::try_from(self.slots.len())
            .unwrap_or_else(|_| panic!("term store exhausted: {} slots", self.slots.len()));
        self.slots.push(Slot::vacant(0));
        index
    }

    /// Registers `term` as a root.  Roots are counted: a term protected `n`
    /// times needs `n` calls to [`unprotect`](Self::unprotect).
    pub fn protect(&mut self, term: impl Into<Term>) {
        *self.roots.entry(term.into()).or_insert(0) += 1;
    }

    /// Drops one registration of `term` as a root.
    pub fn unprotect(&mut self, term: impl Into<Term>) -> Result<(), TermError> {
        let term = term.into();
        let Some(count) = self.roots.get_mut(&term) else {
            return Err(TermError::NotProtected(term));
        };
        *count -= 1;
        if *count == 0 {
            self.roots.swap_remove(&term);
        }
        Ok(())
    }

    pub fn is_protected(&self, term: impl Into<Term>) -> bool {
        self.roots.contains_key(&term.into())
    }

    /// Frees every node not reachable from a protected root.
    ///
    /// Freed nodes are unlinked from the intern table and their slots are
    /// recycled with a new generation.  Returns the number of freed nodes.
    pub fn collect(&mut self) -> usize {
        let mut marked = BitSet::with_capacity(self.slots.len());
        marked.insert(NIL_INDEX as usize);
        let mut stack: Vec<u32> = self
            .roots
            .keys()
            .filter(|root| self.node(**root).is_ok())
            .map(|root| root.index)
            .collect();
        while let Some(index) = stack.pop() {
            if !marked.insert(index as usize) {
                continue;
            }
            if let Some(Node {
                payload: Payload::Appl { args, .. },
            }) = &self.slots[index as usize].node
            {
                stack.extend(
                    args.iter()
                        .filter(|arg| !marked.contains(arg.index as usize))
                        .map(|arg| arg.index),
                );
            }
        }

        let mut freed = 0;
        for index in 0..self.slots.len() as u32 {
            if marked.contains(index as usize) || self.slots[index as usize].node.is_none() {
                continue;
            }
            self.table.unlink(&mut self.slots, index);
            let slot = &mut self.slots[index as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(index);
            freed += 1;
        }
        self.collections += 1;
        log::debug!(
            "collection {} freed {} nodes, {} alive, {} interned",
            self.collections,
            freed,
            self.slots.len() - self.free.len(),
            self.table.entries()
        );
        freed
    }
}

/// Seed of integer hashes; keeps them apart from application hashes.
const INT_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn integers_are_hash_consed() {
        let mut store = TermStore::new();
        let a = store.int(42);
        let b = store.int(42i32);
        let c = store.int(-42);
        assert_eq!(a, b);
        assert_ne!(a, c);
        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.live_nodes, 3);
    }

    #[test]
    fn nil_is_a_singleton_per_store() {
        let s1 = TermStore::new();
        let s2 = TermStore::new();
        assert_eq!(s1.nil::<Term>(), s1.nil::<Term>());
        assert!(s1.nil::<Term>().is_empty());
        assert_ne!(Term::from(s1.nil::<Term>()), Term::from(s2.nil::<Term>()));
    }

    #[test]
    fn foreign_handles_are_rejected() {
        let mut s1 = TermStore::new();
        let s2 = TermStore::new();
        let x = s1.int(1);
        assert!(s1.is_live(x));
        assert!(!s2.is_live(x));
        assert_eq!(x.value(&s2), Err(TermError::InvalidTerm(x.into())));
    }

    #[test]
    fn table_grows_and_keeps_terms_canonical() {
        let mut store = TermStore::with_config(StoreConfig {
            table_class: 2,
            max_load_pct: 75,
            node_capacity: 4,
        });
        let first: Vec<TermInt> = (0..1000).map(|i| store.int(i)).collect();
        let stats = store.stats();
        assert!(stats.growths >= 8);
        assert!(stats.buckets >= 1024);
        let second: Vec<TermInt> = (0..1000).map(|i| store.int(i)).collect();
        assert_eq!(first, second);
        assert_eq!(store.stats().misses, 1000);
    }

    #[test]
    fn creation_hook_fires_once_per_new_node() {
        let mut store = TermStore::new();
        let seen = Arc::new(Mutex::new(Vec::<Term>::new()));
        let sink = Arc::clone(&seen);
        store.set_creation_hook(Box::new(move |t: Term| sink.lock().unwrap().push(t)));
        let a = store.int(1);
        let _ = store.int(1);
        let f = store.symbol("f", 1);
        let fa = store.appl1(f, a);
        let _ = store.appl1(f, a);
        assert!(store.clear_creation_hook().is_some());
        let _ = store.int(2);
        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![Term::from(a), Term::from(fa)]);
    }

    #[test]
    fn collect_frees_unreachable_and_invalidates_handles() {
        let mut store = TermStore::new();
        let f = store.symbol("f", 2);
        let a = store.int(1);
        let b = store.int(2);
        let kept = store.appl2(f, a, b);
        let dropped = store.appl2(f, b, a);
        let orphan = store.int(3);
        store.protect(kept);

        assert_eq!(store.collect(), 2);
        assert!(store.is_live(kept));
        assert!(store.is_live(a) && store.is_live(b));
        assert!(!store.is_live(dropped));
        assert!(!store.is_live(orphan));
        assert_eq!(orphan.value(&store), Err(TermError::InvalidTerm(orphan.into())));

        // Recreated terms get recycled slots with a fresh generation.
        let again = store.appl2(f, b, a);
        assert_ne!(again, dropped);
        assert_eq!(store.stats().free_slots, 1);
        assert_eq!(store.appl2(f, a, b), kept);
    }

    #[test]
    fn protect_is_counted() {
        let mut store = TermStore::new();
        let x = store.int(5);
        store.protect(x);
        store.protect(x);
        store.unprotect(x).unwrap();
        assert!(store.is_protected(x));
        assert_eq!(store.collect(), 0);
        store.unprotect(x).unwrap();
        assert!(!store.is_protected(x));
        assert_eq!(store.unprotect(x), Err(TermError::NotProtected(x.into())));
        assert_eq!(store.collect(), 1);
    }

    #[test]
    fn nil_survives_collection() {
        let mut store = TermStore::new();
        let nil = store.nil::<Term>();
        store.collect();
        assert!(store.is_live(nil));
        assert_eq!(nil.size(&store).unwrap(), 0);
    }

    #[test]
    fn debug_does_not_need_the_hook() {
        let mut store = TermStore::new();
        store.set_creation_hook(Box::new(|_| {}));
        let s = format!("{store:?}");
        assert!(s.contains("hook: true"));
    }
}

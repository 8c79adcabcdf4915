//! The list-term constructor.
//!
//! A cons cell is a binary application of [`Symbol::LIST`] to a head and a
//! tail, interned like any other application.  Pushing the same element
//! onto the same tail twice therefore yields the same cell.

use crate::{Symbol, Term, TermError, TermLike, TermList, TermStore};

impl TermStore {
    /// Interns the cons cell `head : tail`.
    #[inline]
    pub(crate) fn cons(&mut self, head: Term, tail: Term) -> Term {
        self.intern_fixed::<2>(Symbol::LIST, [head, tail])
    }

    /// Returns the list `x : list`.  O(1).
    ///
    /// ```
    /// # use hashed_terms::TermStore;
    /// let mut store = TermStore::new();
    /// let nil = store.nil();
    /// let x = store.int(1);
    /// let a = store.push_front(nil, x);
    /// let b = store.push_front(nil, x);
    /// assert_eq!(a, b);
    /// assert_eq!(store.pop_front(a).unwrap(), nil);
    /// ```
    #[inline]
    pub fn push_front<T: TermLike>(&mut self, list: TermList<T>, x: T) -> TermList<T> {
        TermList::wrap(self.cons(x.into(), list.into()))
    }

    /// Returns `list` without its first element.  O(1), no allocation.
    #[inline]
    pub fn pop_front<T: TermLike>(&self, list: TermList<T>) -> Result<TermList<T>, TermError> {
        list.tail(self)
    }

    /// Returns the one-element list `[x]`.
    #[inline]
    pub fn singleton<T: TermLike>(&mut self, x: T) -> TermList<T> {
        let nil = self.nil();
        self.push_front(nil, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TermInt;

    #[test]
    fn nil_is_empty() {
        let store = TermStore::new();
        let nil = store.nil::<TermInt>();
        assert!(nil.is_empty());
        assert_eq!(nil.size(&store).unwrap(), 0);
        assert_eq!(store.pop_front(nil), Err(TermError::EmptyList));
    }

    #[test]
    fn pop_front_undoes_push_front() {
        let mut store = TermStore::new();
        let list = store.list([5, 6, 7]);
        let x = store.int(4);
        let pushed = store.push_front(list, x);
        assert!(!pushed.is_empty());
        assert_eq!(store.pop_front(pushed).unwrap(), list);
        assert_eq!(pushed.front(&store).unwrap(), x);
        assert_eq!(pushed.size(&store).unwrap(), 4);
    }

    #[test]
    fn push_front_builds_the_same_list_as_bulk() {
        let mut store = TermStore::new();
        let mut list = store.nil();
        for v in [3, 2, 1] {
            let x = store.int(v);
            list = store.push_front(list, x);
        }
        assert_eq!(list, store.list([1, 2, 3]));
    }

    #[test]
    fn push_front_dedups_cells() {
        let mut store = TermStore::new();
        let nil = store.nil();
        let x = store.int(1);
        store.push_front(nil, x);
        let live = store.stats().live_nodes;
        store.push_front(nil, x);
        assert_eq!(store.stats().live_nodes, live);
    }

    #[test]
    fn shared_suffixes() {
        let mut store = TermStore::new();
        let suffix = store.list([2, 3]);
        let a = store.int(1);
        let b = store.int(9);
        let l1 = store.push_front(suffix, a);
        let l2 = store.push_front(suffix, b);
        assert_ne!(l1, l2);
        assert_eq!(l1.tail(&store).unwrap(), l2.tail(&store).unwrap());
    }

    #[test]
    fn singleton_has_nil_tail() {
        let mut store = TermStore::new();
        let x = store.int(3);
        let one = store.singleton(x);
        assert_eq!(one.size(&store).unwrap(), 1);
        assert!(one.tail(&store).unwrap().is_empty());
        assert_eq!(Term::from(one), Term::from(store.list([3])));
    }
}

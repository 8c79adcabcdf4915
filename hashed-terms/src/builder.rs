//! Bulk construction of lists from Rust iterators.
//!
//! Lists are assembled tail-first.  A [`DoubleEndedIterator`] source is
//! walked from the back and consed directly; any other source is first
//! materialised into a buffer and then consed in reverse.
//!
//! The buffer is the store's scratch vector as long as the list is
//! expected to stay below [`LIST_SCRATCH_THRESHOLD`] elements; larger
//! lists get a dedicated heap buffer so the scratch vector never grows
//! past the threshold.

use crate::{IntoTerm, Term, TermLike, TermList, TermStore};
use std::mem;

/// Element count at which bulk builders stop reusing the store's scratch
/// buffer and allocate a dedicated one.
pub const LIST_SCRATCH_THRESHOLD: usize = 10_000;

impl TermStore {
    /// Takes a cleared buffer for about `hint` elements.
    ///
    /// The scratch vector is moved out of the store, so converters that
    /// build terms while the buffer is in use still find a valid (empty)
    /// one.
    pub(crate) fn take_scratch(&mut self, hint: usize) -> Vec<Term> {
        if hint >= LIST_SCRATCH_THRESHOLD {
            return Vec::with_capacity(hint);
        }
        let mut buf = mem::take(&mut self.scratch);
        buf.clear();
        buf
    }

    /// Returns a buffer obtained from [`take_scratch`](Self::take_scratch).
    /// Buffers that reached the threshold are dropped.
    pub(crate) fn give_back_scratch(&mut self, mut buf: Vec<Term>) {
        if buf.capacity() < LIST_SCRATCH_THRESHOLD && buf.capacity() >= self.scratch.capacity() {
            buf.clear();
            self.scratch = buf;
        }
    }

    /// Conses `elems` onto `tail`, last element first, so that `elems[0]`
    /// ends up at the front.
    pub(crate) fn cons_all(&mut self, elems: &[Term], tail: Term) -> Term {
        elems
            .iter()
            .rev()
            .fold(tail, |tail, head| self.cons(*head, tail))
    }

    /// Builds a list from `items`, converting plain values with [`IntoTerm`].
    ///
    /// ```
    /// # use hashed_terms::TermStore;
    /// let mut store = TermStore::new();
    /// let list = store.list([1, 2, 3]);
    /// assert_eq!(list.size(&store).unwrap(), 3);
    /// assert_eq!(list, store.list(vec![1, 2, 3]));
    /// ```
    pub fn list<I>(&mut self, items: I) -> TermList<<I::Item as IntoTerm>::Output>
    where
        I: IntoIterator,
        I::Item: IntoTerm,
    {
        self.list_filtered(items, |store, x| x.into_term(store), |_| true)
    }

    /// Builds the list of `convert(x)` for every `x` in `src`.  The converter
    /// runs once per element, front to back.
    pub fn list_with<I, T, F>(&mut self, src: I, convert: F) -> TermList<T>
    where
        I: IntoIterator,
        T: TermLike,
        F: FnMut(&mut TermStore, I::Item) -> T,
    {
        self.list_filtered(src, convert, |_| true)
    }

    /// Builds the list of `convert(x)` for every `x` in `src` accepted by
    /// `keep`.  Rejected elements are never converted.
    pub fn list_filtered<I, T, F, P>(&mut self, src: I, mut convert: F, mut keep: P) -> TermList<T>
    where
        I: IntoIterator,
        T: TermLike,
        F: FnMut(&mut TermStore, I::Item) -> T,
        P: FnMut(&I::Item) -> bool,
    {
        let iter = src.into_iter();
        let mut buf = self.take_scratch(iter.size_hint().0);
        for x in iter {
            if keep(&x) {
                let elem = convert(self, x);
                buf.push(elem.into());
            }
        }
        let nil = self.nil::<T>().into();
        let list = self.cons_all(&buf, nil);
        if buf.len() >= LIST_SCRATCH_THRESHOLD {
            log::debug!("built list of {} elements through a heap buffer", buf.len());
        }
        self.give_back_scratch(buf);
        TermList::wrap(list)
    }

    /// Builds a list by walking `items` from the back.  No buffer is used;
    /// conversions run back to front.
    pub fn list_from_back<I>(&mut self, items: I) -> TermList<<I::Item as IntoTerm>::Output>
    where
        I: IntoIterator,
        I::IntoIter: DoubleEndedIterator,
        I::Item: IntoTerm,
    {
        self.list_from_back_filtered(items, |store, x| x.into_term(store), |_| true)
    }

    /// Like [`list_with`](Self::list_with) for a source that can be walked
    /// from the back.  The converter runs back to front.
    pub fn list_from_back_with<I, T, F>(&mut self, src: I, convert: F) -> TermList<T>
    where
        I: IntoIterator,
        I::IntoIter: DoubleEndedIterator,
        T: TermLike,
        F: FnMut(&mut TermStore, I::Item) -> T,
    {
        self.list_from_back_filtered(src, convert, |_| true)
    }

    /// Like [`list_filtered`](Self::list_filtered) for a source that can be
    /// walked from the back.
    pub fn list_from_back_filtered<I, T, F, P>(&mut self, src: I, mut convert: F, mut keep: P) -> TermList<T>
    where
        I: IntoIterator,
        I::IntoIter: DoubleEndedIterator,
        T: TermLike,
        F: FnMut(&mut TermStore, I::Item) -> T,
        P: FnMut(&I::Item) -> bool,
    {
        let mut list: Term = self.nil::<T>().into();
        for x in src.into_iter().rev() {
            if keep(&x) {
                let head = convert(self, x).into();
                list = self.cons(head, list);
            }
        }
        TermList::wrap(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TermInt;

    fn values(store: &TermStore, list: TermList<TermInt>) -> Vec<i64> {
        list.iter(store)
            .unwrap()
            .map(|x| x.value(store).unwrap())
            .collect()
    }

    #[test]
    fn empty_source_gives_nil() {
        let mut store = TermStore::new();
        let list = store.list(Vec::<i64>::new());
        assert!(list.is_empty());
        let list = store.list_from_back(Vec::<i64>::new());
        assert!(list.is_empty());
    }

    #[test]
    fn bulk_equals_repeated_push_front() {
        let mut store = TermStore::new();
        let mut pushed = store.nil();
        for v in [3, 2, 1] {
            let x = store.int(v);
            pushed = store.push_front(pushed, x);
        }
        let forward_only = std::iter::successors(Some(1i64), |v| (*v < 3).then_some(v + 1));
        let bulk = store.list(forward_only);
        assert_eq!(bulk, pushed);
        assert_eq!(values(&store, bulk), vec![1, 2, 3]);
    }

    #[test]
    fn large_forward_only_list_uses_heap_buffer() {
        const N: i64 = 20_000;
        let mut store = TermStore::new();
        let mut pushed = store.nil();
        for v in (0..N).rev() {
            let x = store.int(v);
            pushed = store.push_front(pushed, x);
        }
        let mut next = 0;
        let forward_only = std::iter::from_fn(|| {
            let v = next;
            next += 1;
            (v < N).then_some(v)
        });
        let bulk = store.list(forward_only);
        assert_eq!(bulk, pushed);
        assert_eq!(bulk.size(&store).unwrap(), N as usize);
        assert!(store.scratch.capacity() <= LIST_SCRATCH_THRESHOLD);
    }

    #[test]
    fn size_hint_above_threshold_skips_scratch() {
        let mut store = TermStore::new();
        store.list(0..10);
        let cap = store.scratch.capacity();
        assert!(cap > 0);
        let list = store.list(0..LIST_SCRATCH_THRESHOLD as i32);
        assert_eq!(list.size(&store).unwrap(), LIST_SCRATCH_THRESHOLD);
        assert_eq!(store.scratch.capacity(), cap);
    }

    #[test]
    fn backward_and_forward_builders_agree() {
        let mut store = TermStore::new();
        let data: Vec<i64> = (0..100).map(|i| i * i).collect();
        let a = store.list(data.iter().copied());
        let b = store.list_from_back(data.iter().copied());
        assert_eq!(a, b);
        assert_eq!(values(&store, a), data);
    }

    #[test]
    fn converter_order() {
        let mut store = TermStore::new();
        let mut seen = Vec::new();
        store.list_with(1..=3, |s, v: i64| {
            seen.push(v);
            s.int(v)
        });
        assert_eq!(seen, vec![1, 2, 3]);
        seen.clear();
        store.list_from_back_with(1..=3, |s, v: i64| {
            seen.push(v);
            s.int(v)
        });
        assert_eq!(seen, vec![3, 2, 1]);
    }

    #[test]
    fn filtered_builders() {
        let mut store = TermStore::new();
        let mut converted = 0;
        let evens = store.list_filtered(
            1..=10,
            |s, v: i64| {
                converted += 1;
                s.int(v)
            },
            |v| v % 2 == 0,
        );
        assert_eq!(converted, 5);
        assert_eq!(values(&store, evens), vec![2, 4, 6, 8, 10]);
        let back = store.list_from_back_filtered(1..=10, |s, v: i64| s.int(v), |v| v % 2 == 0);
        assert_eq!(back, evens);
    }

    #[test]
    fn converters_may_build_nested_lists() {
        let mut store = TermStore::new();
        let nested = store.list_with(0..3, |s, n: i32| s.list(0..n));
        let sizes: Vec<usize> = nested
            .iter(&store)
            .unwrap()
            .map(|l| l.size(&store).unwrap())
            .collect();
        assert_eq!(sizes, vec![0, 1, 2]);
        assert_eq!(nested, store.list_from_back_with(0..3, |s, n: i32| s.list(0..n)));
    }
}

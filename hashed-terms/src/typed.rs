//! Statically typed views over [`Term`] handles.
//!
//! [`TermAppl<T>`] asserts that a handle is a function application whose
//! arguments are `T`s; [`TermList<T>`] asserts that it is a list of `T`s;
//! [`TermInt`] that it is an integer.  The views are plain wrappers around
//! the handle: converting between them never touches the store, and
//! checked conversions go through [`TermLike::try_from_term`].

use crate::store::{Node, Payload};
use crate::{Symbol, Term, TermError, TermStore};
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use std::cmp::Ordering;

/// Common interface of every handle type.
pub trait TermLike: Copy + Eq + Hash + fmt::Debug + Into<Term> {
    /// Kind name reported in [`TermError::UnexpectedKind`].
    const KIND: &'static str;

    /// Returns `true` if `term` is alive in `store` and has the shape of `Self`.
    fn matches(store: &TermStore, term: Term) -> bool;

    /// Wraps `term` without checking its shape.  Accessors of a wrongly
    /// wrapped handle report [`TermError::UnexpectedKind`] instead of
    /// misbehaving.
    fn from_term_unchecked(term: Term) -> Self;

    /// Wraps `term` after checking its shape.
    fn try_from_term(store: &TermStore, term: Term) -> Result<Self, TermError> {
        let node = store.resolve(term)?;
        if Self::matches(store, term) {
            Ok(Self::from_term_unchecked(term))
        } else {
            Err(TermError::UnexpectedKind {
                expected: Self::KIND,
                found: node.kind_name(),
            })
        }
    }
}

impl TermLike for Term {
    const KIND: &'static str = "term";

    #[inline]
    fn matches(store: &TermStore, term: Term) -> bool {
        store.node(term).is_ok()
    }

    #[inline]
    fn from_term_unchecked(term: Term) -> Self {
        term
    }
}

impl Term {
    /// Checked conversion into a typed view.
    #[inline]
    pub fn downcast<V: TermLike>(self, store: &TermStore) -> Result<V, TermError> {
        V::try_from_term(store, self)
    }
}

/// An integer term.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermInt(Term);

impl TermLike for TermInt {
    const KIND: &'static str = "int";

    fn matches(store: &TermStore, term: Term) -> bool {
        matches!(
            store.node(term),
            Ok(Node {
                payload: Payload::Int(_)
            })
        )
    }

    #[inline]
    fn from_term_unchecked(term: Term) -> Self {
        Self(term)
    }
}

impl TermInt {
    /// Returns the integer value.
    pub fn value(&self, store: &TermStore) -> Result<i64, TermError> {
        match &store.resolve(self.0)?.payload {
            Payload::Int(v) => Ok(*v),
            _ => Err(unexpected_kind(store, self.0, Self::KIND)),
        }
    }
}

impl From<TermInt> for Term {
    #[inline]
    fn from(t: TermInt) -> Term {
        t.0
    }
}

impl fmt::Debug for TermInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TermInt").field(&self.0).finish()
    }
}

/// Implements the handle traits of a generic view without putting bounds on
/// its element type.
macro_rules! impl_view_traits {
    ($view:ident) => {
        impl<T> Clone for $view<T> {
            #[inline]
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T> Copy for $view<T> {}

        impl<T> PartialEq for $view<T> {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                self.term == other.term
            }
        }

        impl<T> Eq for $view<T> {}

        impl<T> Hash for $view<T> {
            #[inline]
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.term.hash(state)
            }
        }

        impl<T> PartialOrd for $view<T> {
            #[inline]
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl<T> Ord for $view<T> {
            #[inline]
            fn cmp(&self, other: &Self) -> Ordering {
                self.term.cmp(&other.term)
            }
        }

        impl<T> fmt::Debug for $view<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($view)).field(&self.term).finish()
            }
        }

        impl<T> From<$view<T>> for Term {
            #[inline]
            fn from(v: $view<T>) -> Term {
                v.term
            }
        }

        impl<T> $view<T> {
            #[inline]
            pub(crate) fn wrap(term: Term) -> Self {
                Self {
                    term,
                    _elem: PhantomData,
                }
            }

            /// Returns the untyped handle.
            #[inline]
            pub fn term(&self) -> Term {
                self.term
            }

            /// Reinterprets the element type.  Free: no node is touched.
            #[inline]
            pub fn upcast<U>(self) -> $view<U>
            where
                T: Into<U>,
            {
                $view::wrap(self.term)
            }
        }
    };
}

/// A function application whose arguments are `T`s.
pub struct TermAppl<T = Term> {
    term: Term,
    _elem: PhantomData<fn() -> T>,
}

impl_view_traits!(TermAppl);

impl<T: TermLike> TermLike for TermAppl<T> {
    const KIND: &'static str = "appl";

    fn matches(store: &TermStore, term: Term) -> bool {
        match store.node(term) {
            Ok(Node {
                payload: Payload::Appl { args, .. },
            }) => args.iter().all(|arg| T::matches(store, *arg)),
            _ => false,
        }
    }

    #[inline]
    fn from_term_unchecked(term: Term) -> Self {
        Self::wrap(term)
    }
}

impl<T: TermLike> TermAppl<T> {
    fn parts<'a>(&self, store: &'a TermStore) -> Result<(Symbol, &'a [Term]), TermError> {
        match &store.resolve(self.term)?.payload {
            Payload::Appl { symbol, args } => Ok((*symbol, args.as_slice())),
            _ => Err(unexpected_kind(store, self.term, Self::KIND)),
        }
    }

    /// Returns the function symbol.
    pub fn function(&self, store: &TermStore) -> Result<Symbol, TermError> {
        Ok(self.parts(store)?.0)
    }

    /// Returns the number of arguments.
    pub fn size(&self, store: &TermStore) -> Result<usize, TermError> {
        Ok(self.parts(store)?.1.len())
    }

    /// Same as [`size`](Self::size).
    #[inline]
    pub fn arity(&self, store: &TermStore) -> Result<usize, TermError> {
        self.size(store)
    }

    /// Returns the raw argument handles.
    pub fn args<'a>(&self, store: &'a TermStore) -> Result<&'a [Term], TermError> {
        Ok(self.parts(store)?.1)
    }

    /// Returns argument `index`.
    pub fn arg(&self, store: &TermStore, index: usize) -> Result<T, TermError> {
        let args = self.parts(store)?.1;
        args.get(index)
            .map(|arg| T::from_term_unchecked(*arg))
            .ok_or(TermError::IndexOutOfBounds {
                index,
                len: args.len(),
            })
    }

    /// Returns the arguments as an array if there are exactly `ARITY` of them.
    pub fn unpack<const ARITY: usize>(&self, store: &TermStore) -> Result<[T; ARITY], TermError> {
        let args = self.parts(store)?.1;
        if args.len() != ARITY {
            return Err(TermError::UnexpectedArity {
                expected: ARITY,
                found: args.len(),
            });
        }
        Ok(core::array::from_fn(|i| T::from_term_unchecked(args[i])))
    }

    /// Random-access iterator over the arguments.
    pub fn iter<'a>(&self, store: &'a TermStore) -> Result<ApplIter<'a, T>, TermError> {
        Ok(ApplIter {
            inner: self.parts(store)?.1.iter(),
            _elem: PhantomData,
        })
    }
}

/// Iterator over the arguments of a [`TermAppl`].
pub struct ApplIter<'a, T> {
    inner: core::slice::Iter<'a, Term>,
    _elem: PhantomData<fn() -> T>,
}

impl<T: TermLike> Iterator for ApplIter<'_, T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.inner.next().map(|t| T::from_term_unchecked(*t))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<T> {
        self.inner.nth(n).map(|t| T::from_term_unchecked(*t))
    }
}

impl<T: TermLike> DoubleEndedIterator for ApplIter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back().map(|t| T::from_term_unchecked(*t))
    }
}

impl<T: TermLike> ExactSizeIterator for ApplIter<'_, T> {}

/// A list of `T`s: either the empty-list sentinel or a cons cell.
///
/// Lists share suffixes.  Their length is not stored anywhere since a
/// node may be the tail of many lists; [`size`](Self::size) walks it.
pub struct TermList<T = Term> {
    term: Term,
    _elem: PhantomData<fn() -> T>,
}

impl_view_traits!(TermList);

impl<T: TermLike> TermLike for TermList<T> {
    const KIND: &'static str = "list";

    /// Checks the list shape and the type of the first element only.
    fn matches(store: &TermStore, term: Term) -> bool {
        match store.node(term) {
            Ok(Node {
                payload: Payload::Nil,
            }) => true,
            Ok(Node {
                payload: Payload::Appl { symbol, args },
            }) if symbol.is_list() => T::matches(store, args[0]),
            _ => false,
        }
    }

    #[inline]
    fn from_term_unchecked(term: Term) -> Self {
        Self::wrap(term)
    }
}

impl<T: TermLike> TermList<T> {
    /// Returns `true` iff this is the empty-list sentinel.  O(1), no lookup,
    /// so the issuing store is not checked: the sentinel of any store
    /// answers `true`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.term.is_nil()
    }

    /// Splits a cons cell into head and tail; `None` for the empty list.
    #[inline]
    pub(crate) fn uncons(&self, store: &TermStore) -> Result<Option<(T, TermList<T>)>, TermError> {
        match &store.resolve(self.term)?.payload {
            Payload::Nil => Ok(None),
            Payload::Appl { symbol, args } if symbol.is_list() => Ok(Some((
                T::from_term_unchecked(args[0]),
                TermList::wrap(args[1]),
            ))),
            _ => Err(unexpected_kind(store, self.term, Self::KIND)),
        }
    }

    /// Returns the first element.
    pub fn front(&self, store: &TermStore) -> Result<T, TermError> {
        self.uncons(store)?
            .map(|(head, _)| head)
            .ok_or(TermError::EmptyList)
    }

    /// Returns the list without its first element.  O(1), no allocation.
    pub fn tail(&self, store: &TermStore) -> Result<TermList<T>, TermError> {
        self.uncons(store)?
            .map(|(_, tail)| tail)
            .ok_or(TermError::EmptyList)
    }

    /// Counts the elements by walking to the empty list.  O(n).
    pub fn size(&self, store: &TermStore) -> Result<usize, TermError> {
        Ok(self.walk(store, |_, _| None::<()>)?.0)
    }

    /// Visits the elements in order until `visit` returns `Some`.  Returns
    /// the position reached and the value that stopped the walk, if any.
    /// Every cell is resolved, so a tail that is not a list is reported.
    pub(crate) fn walk<B>(
        &self,
        store: &TermStore,
        mut visit: impl FnMut(usize, T) -> Option<B>,
    ) -> Result<(usize, Option<B>), TermError> {
        let mut rest = *self;
        let mut pos = 0;
        while let Some((head, tail)) = rest.uncons(store)? {
            if let Some(found) = visit(pos, head) {
                return Ok((pos, Some(found)));
            }
            rest = tail;
            pos += 1;
        }
        Ok((pos, None))
    }

    /// Forward iterator over the elements.
    pub fn iter<'a>(&self, store: &'a TermStore) -> Result<ListIter<'a, T>, TermError> {
        self.uncons(store)?;
        Ok(ListIter {
            store,
            cur: *self,
        })
    }
}

/// Forward iterator over a [`TermList`], ending at the empty list.
pub struct ListIter<'a, T> {
    store: &'a TermStore,
    cur: TermList<T>,
}

impl<'a, T: TermLike> ListIter<'a, T> {
    /// The part of the list not yet yielded.
    #[inline]
    pub fn rest(&self) -> TermList<T> {
        self.cur
    }
}

impl<T: TermLike> Iterator for ListIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        // Tails of a live list are live lists: the store is borrowed, so no
        // collection can run while iterating, and cons cells are only
        // interned over list tails.
        let (head, tail) = self.cur.uncons(self.store).ok()??;
        self.cur = tail;
        Some(head)
    }
}

impl<T: TermLike> core::iter::FusedIterator for ListIter<'_, T> {}

fn unexpected_kind(store: &TermStore, term: Term, expected: &'static str) -> TermError {
    match store.resolve(term) {
        Ok(node) => TermError::UnexpectedKind {
            expected,
            found: node.kind_name(),
        },
        Err(e) => e,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_are_handle_sized() {
        assert_eq!(core::mem::size_of::<TermList<TermInt>>(), 12);
        assert_eq!(core::mem::size_of::<TermAppl<Term>>(), 12);
        assert_eq!(core::mem::size_of::<Option<TermInt>>(), 16);
    }

    #[test]
    fn checked_conversions() {
        let mut store = TermStore::new();
        let f = store.symbol("f", 2);
        let one = store.int(1);
        let two = store.int(2);
        let app = store.appl2(f, one, two);
        let list = store.list([1, 2]);
        let nil = store.nil::<Term>();

        assert!(Term::from(app).downcast::<TermAppl<TermInt>>(&store).is_ok());
        assert!(Term::from(one).downcast::<TermInt>(&store).is_ok());
        assert!(Term::from(list).downcast::<TermList<TermInt>>(&store).is_ok());
        assert!(Term::from(nil).downcast::<TermList<TermInt>>(&store).is_ok());

        assert_eq!(
            Term::from(one).downcast::<TermList<Term>>(&store),
            Err(TermError::UnexpectedKind {
                expected: "list",
                found: "int"
            })
        );
        assert_eq!(
            Term::from(app).downcast::<TermAppl<TermList<Term>>>(&store),
            Err(TermError::UnexpectedKind {
                expected: "appl",
                found: "appl"
            })
        );
        assert!(Term::from(list).downcast::<TermList<TermAppl>>(&store).is_err());
    }

    #[test]
    fn cons_cells_are_applications() {
        let mut store = TermStore::new();
        let list = store.list([7]);
        let as_appl = Term::from(list).downcast::<TermAppl>(&store).unwrap();
        assert_eq!(as_appl.function(&store).unwrap(), Symbol::LIST);
        assert_eq!(as_appl.size(&store).unwrap(), 2);
        assert_eq!(as_appl.arg(&store, 1).unwrap(), Term::from(store.nil::<Term>()));
    }

    #[test]
    fn appl_accessors() {
        let mut store = TermStore::new();
        let g = store.symbol("g", 3);
        let xs: Vec<TermInt> = (1..=3).map(|i| store.int(i)).collect();
        let app = store.appl3(g, xs[0], xs[1], xs[2]);

        assert_eq!(app.function(&store).unwrap(), g);
        assert_eq!(app.size(&store).unwrap(), 3);
        assert_eq!(app.arg(&store, 2).unwrap(), xs[2]);
        assert_eq!(
            app.arg(&store, 3),
            Err(TermError::IndexOutOfBounds { index: 3, len: 3 })
        );
        let forward: Vec<TermInt> = app.iter(&store).unwrap().collect();
        assert_eq!(forward, xs);
        let backward: Vec<TermInt> = app.iter(&store).unwrap().rev().collect();
        assert_eq!(backward, vec![xs[2], xs[1], xs[0]]);
        assert_eq!(app.iter(&store).unwrap().len(), 3);
        assert_eq!(app.iter(&store).unwrap().nth(1), Some(xs[1]));

        let [a, b, c] = app.unpack::<3>(&store).unwrap();
        assert_eq!([a, b, c], [xs[0], xs[1], xs[2]]);
        assert_eq!(
            app.unpack::<2>(&store),
            Err(TermError::UnexpectedArity {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn list_accessors_on_nil() {
        let store = TermStore::new();
        let nil = store.nil::<TermInt>();
        assert!(nil.is_empty());
        assert_eq!(nil.size(&store).unwrap(), 0);
        assert_eq!(nil.front(&store), Err(TermError::EmptyList));
        assert_eq!(nil.tail(&store), Err(TermError::EmptyList));
        assert_eq!(nil.iter(&store).unwrap().next(), None);
    }

    #[test]
    fn wrongly_wrapped_handles_report_kind() {
        let mut store = TermStore::new();
        let one = store.int(1);
        let bogus = TermList::<Term>::from_term_unchecked(one.into());
        assert_eq!(
            bogus.size(&store),
            Err(TermError::UnexpectedKind {
                expected: "list",
                found: "int"
            })
        );
        let bogus = TermInt::from_term_unchecked(store.nil::<Term>().into());
        assert_eq!(
            bogus.value(&store),
            Err(TermError::UnexpectedKind {
                expected: "int",
                found: "nil"
            })
        );
    }

    #[test]
    fn list_iter_rest_tracks_position() {
        let mut store = TermStore::new();
        let list = store.list([1, 2, 3]);
        let mut it = list.iter(&store).unwrap();
        it.next();
        let rest = it.rest();
        assert_eq!(rest, list.tail(&store).unwrap());
        assert_eq!(it.map(|x: TermInt| x.value(&store).unwrap()).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn upcast_is_free() {
        let mut store = TermStore::new();
        let list = store.list([1, 2]);
        let general: TermList<Term> = list.upcast();
        assert_eq!(Term::from(general), Term::from(list));
        assert_eq!(general.front(&store).unwrap(), Term::from(store.int(1)));
    }
}

//! Defines [`View`], a borrowed read-only representation of a [`Term`].
//!
//! Handles compare by identity, which only makes sense within one store.
//! Views compare by structure, so terms of different stores can be
//! compared and sorted independently of allocation order.

use crate::store::Payload;
use crate::{Symbol, Term, TermError, TermStore};
use core::fmt;
use std::cmp::Ordering;

/// A borrowed view into the node behind a [`Term`].
///
/// Use [`Term::view`] or [`TermStore::view`] to obtain one.  Constructing a
/// view performs no allocation; argument slices borrow directly from the
/// store.
#[derive(Clone, Copy)]
pub enum View<'a> {
    /// An integer value.
    Int(i64),
    /// The empty list.
    Nil,
    /// A cons cell: head and tail.  The tail is always a list.
    Cons(&'a TermStore, Term, Term),
    /// A function application other than a cons cell.
    Appl(&'a TermStore, Symbol, &'a [Term]),
}

impl Term {
    /// Produce a [`View`] of this term that borrows from `store`.
    #[inline]
    pub fn view<'a>(&self, store: &'a TermStore) -> Result<View<'a>, TermError> {
        Ok(match &store.resolve(*self)?.payload {
            Payload::Nil => View::Nil,
            Payload::Int(i) => View::Int(*i),
            Payload::Appl { symbol, args } if symbol.is_list() => View::Cons(store, args[0], args[1]),
            Payload::Appl { symbol, args } => View::Appl(store, *symbol, args),
        })
    }
}

impl TermStore {
    /// Produce a [`View`] of `term`.  See [`Term::view`].
    #[inline]
    pub fn view(&self, term: impl Into<Term>) -> Result<View<'_>, TermError> {
        term.into().view(self)
    }
}

impl fmt::Debug for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Int(i) => f.debug_tuple("Int").field(i).finish(),
            View::Nil => f.write_str("Nil"),
            View::Cons(store, head, tail) => {
                let mut elems = vec![head.view(store)];
                let mut rest = tail.view(store);
                while let Ok(View::Cons(_, h, t)) = rest {
                    elems.push(h.view(store));
                    rest = t.view(store);
                }
                if rest.is_err() {
                    elems.push(rest);
                }
                f.debug_tuple("List").field(&elems).finish()
            }
            View::Appl(store, symbol, args) => f
                .debug_tuple("Appl")
                .field(&store.symbol_name(*symbol).unwrap_or("?"))
                .field(&args.iter().map(|t| t.view(store)).collect::<Vec<_>>())
                .finish(),
        }
    }
}

impl PartialEq for View<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for View<'_> {}

impl PartialOrd for View<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Structural order: integers by value, then the empty list, then lists
/// element-wise (shorter prefix first), then applications by arity, symbol
/// name and arguments.
impl Ord for View<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        let ord = kind_order(self).cmp(&kind_order(other));
        if ord != Ordering::Equal {
            return ord;
        }
        match (self, other) {
            (View::Int(a), View::Int(b)) => a.cmp(b),
            (View::Nil, View::Nil) => Ordering::Equal,
            (View::Cons(sa, ha, ta), View::Cons(sb, hb, tb)) => {
                // Lists are compared iteratively: their length is unbounded.
                let (mut ha, mut ta, mut hb, mut tb) = (*ha, *ta, *hb, *tb);
                loop {
                    if !(same_store(sa, sb) && ha == hb) {
                        let ord = cmp_children(sa, ha, sb, hb);
                        if ord != Ordering::Equal {
                            return ord;
                        }
                    }
                    if same_store(sa, sb) && ta == tb {
                        return Ordering::Equal;
                    }
                    match (ta.view(sa), tb.view(sb)) {
                        (Ok(View::Cons(_, h1, t1)), Ok(View::Cons(_, h2, t2))) => {
                            (ha, ta, hb, tb) = (h1, t1, h2, t2);
                        }
                        (Ok(a), Ok(b)) => return kind_order(&a).cmp(&kind_order(&b)),
                        (a, b) => return a.is_err().cmp(&b.is_err()),
                    }
                }
            }
            (View::Appl(sa, fa, aa), View::Appl(sb, fb, ab)) => {
                let ord = aa.len().cmp(&ab.len());
                if ord != Ordering::Equal {
                    return ord;
                }
                let ord = sa.symbol_name(*fa).cmp(&sb.symbol_name(*fb));
                if ord != Ordering::Equal {
                    return ord;
                }
                for (a, b) in aa.iter().zip(ab.iter()) {
                    if same_store(sa, sb) && a == b {
                        continue;
                    }
                    let ord = cmp_children(sa, *a, sb, *b);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            }
            _ => unreachable!(),
        }
    }
}

/// Compares two children structurally.  A child without a view sorts
/// after every child that has one.
fn cmp_children(sa: &TermStore, a: Term, sb: &TermStore, b: Term) -> Ordering {
    match (a.view(sa), b.view(sb)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (a, b) => a.is_err().cmp(&b.is_err()),
    }
}

#[inline]
fn same_store(a: &TermStore, b: &TermStore) -> bool {
    core::ptr::eq(a, b)
}

fn kind_order(v: &View) -> u8 {
    match v {
        View::Int(_) => 0,
        View::Nil => 1,
        View::Cons(..) => 2,
        View::Appl(..) => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_of_each_kind() {
        let mut store = TermStore::new();
        let f = store.symbol("f", 2);
        let one = store.int(1);
        let list = store.list([2, 3]);
        let app = store.appl2(f, Term::from(one), Term::from(list));

        assert!(matches!(store.view(one).unwrap(), View::Int(1)));
        assert!(matches!(store.view(store.nil::<Term>()).unwrap(), View::Nil));
        assert!(matches!(store.view(list).unwrap(), View::Cons(..)));
        match store.view(app).unwrap() {
            View::Appl(_, symbol, args) => {
                assert_eq!(symbol, f);
                assert_eq!(args, &[Term::from(one), Term::from(list)]);
            }
            v => panic!("unexpected view {v:?}"),
        }
    }

    #[test]
    fn debug_prints_structure() {
        let mut store = TermStore::new();
        let f = store.symbol("f", 2);
        let one = store.int(1);
        let list = store.list([2, 3]);
        let app = store.appl2(f, Term::from(one), Term::from(list));
        assert_eq!(
            format!("{:?}", store.view(app).unwrap()),
            r#"Appl("f", [Ok(Int(1)), Ok(List([Ok(Int(2)), Ok(Int(3))]))])"#
        );
    }

    #[test]
    fn structural_equality_across_stores() {
        let mut s1 = TermStore::new();
        let mut s2 = TermStore::new();
        // Different allocation order in each store.
        s2.int(99);
        let g1 = s1.symbol("g", 1);
        let g2 = s2.symbol("g", 1);
        let l1 = s1.list([1, 2, 3]);
        let l2 = s2.list([1, 2, 3]);
        let a1 = s1.appl1(g1, l1);
        let a2 = s2.appl1(g2, l2);
        assert_ne!(Term::from(a1), Term::from(a2));
        assert_eq!(s1.view(a1).unwrap(), s2.view(a2).unwrap());

        let l3 = s2.list([1, 2, 4]);
        assert!(s1.view(l1).unwrap() < s2.view(l3).unwrap());
    }

    #[test]
    fn structural_order() {
        let mut store = TermStore::new();
        let short = store.list([1, 2]);
        let long = store.list([1, 2, 0]);
        let c = store.symbol("c", 0);
        let c = store.appl0(c);
        let two = store.int(2);
        let nil = store.nil::<Term>();

        let mut views = vec![
            store.view(c).unwrap(),
            store.view(long).unwrap(),
            store.view(nil).unwrap(),
            store.view(short).unwrap(),
            store.view(two).unwrap(),
        ];
        views.sort();
        let expected = vec![
            store.view(two).unwrap(),
            store.view(nil).unwrap(),
            store.view(short).unwrap(),
            store.view(long).unwrap(),
            store.view(c).unwrap(),
        ];
        assert_eq!(views, expected);
    }

    #[test]
    fn long_lists_compare_without_recursion() {
        let mut s1 = TermStore::new();
        let mut s2 = TermStore::new();
        let a = s1.list(0..50_000);
        let b = s2.list(0..50_000);
        assert_eq!(s1.view(a).unwrap(), s2.view(b).unwrap());
    }

    #[test]
    fn stale_handles_have_no_view() {
        let mut store = TermStore::new();
        let x = store.int(1);
        store.collect();
        assert_eq!(store.view(x).unwrap_err(), TermError::InvalidTerm(x.into()));
    }

    #[test]
    fn dead_children_do_not_panic() {
        let mut store = TermStore::new();
        let f = store.symbol("f", 1);
        let x: Term = store.int(1).into();
        store.collect();
        let y = store.int(2);
        let dead = [x];
        let live = [Term::from(y)];
        let with_dead = View::Appl(&store, f, &dead);
        let with_live = View::Appl(&store, f, &live);
        assert_eq!(
            format!("{with_dead:?}"),
            format!("Appl(\"f\", [Err({:?})])", TermError::InvalidTerm(x))
        );
        assert!(with_live < with_dead);
        assert_eq!(with_dead.cmp(&with_dead), Ordering::Equal);

        let nil = store.nil::<Term>().into();
        let cons = View::Cons(&store, y.into(), x);
        assert!(format!("{cons:?}").starts_with("List([Ok(Int(2)), Err("));
        let proper = View::Cons(&store, y.into(), nil);
        assert!(proper < cons);
    }
}

//! Constructors of function-application terms.
//!
//! Every other construction in the crate ends here: integers aside, a node
//! is always an application, and a cons cell is an application of
//! [`Symbol::LIST`].  The fixed-arity constructors `appl0`..`appl7` probe
//! with an array on the stack and only copy it into the node on a miss; the
//! general constructors collect their children into an [`Args`] buffer first.
//! Both kinds compute the same hash and therefore find each other's nodes.

use crate::store::{Args, Payload};
use crate::table::fold_hash;
use crate::{Symbol, Term, TermAppl, TermError, TermLike, TermStore};

/// Hash of an application: the symbol hash folded with each child's
/// identity hash, in order.
#[inline]
pub(crate) fn appl_hash(symbol: Symbol, args: &[Term]) -> u64 {
    args.iter()
        .fold(symbol.identity_hash(), |hash, arg| fold_hash(hash, arg.identity_hash()))
}

#[track_caller]
#[inline]
fn check_arity(symbol: Symbol, found: usize) {
    assert_eq!(
        symbol.arity(),
        found,
        "symbol of arity {} applied to {} arguments",
        symbol.arity(),
        found
    );
}

macro_rules! fixed_appl {
    ($(#[$doc:meta])* $name:ident, $n:literal, $($arg:ident),+) => {
        $(#[$doc])*
        #[track_caller]
        #[inline]
        pub fn $name<T: TermLike>(&mut self, symbol: Symbol, $($arg: T),+) -> TermAppl<T> {
            TermAppl::wrap(self.intern_fixed::<$n>(symbol, [$($arg.into()),+]))
        }
    };
}

impl TermStore {
    /// Interns `symbol` applied to a fixed-size array of children.  Nothing is
    /// allocated when the application already exists.
    #[track_caller]
    pub(crate) fn intern_fixed<const N: usize>(&mut self, symbol: Symbol, args: [Term; N]) -> Term {
        check_arity(symbol, N);
        self.check_children(symbol, &args);
        let hash = appl_hash(symbol, &args);
        match self.find_canonical(hash, |node| node.is_appl(symbol, &args)) {
            Some(term) => term,
            None => self.insert_canonical(
                hash,
                Payload::Appl {
                    symbol,
                    args: Args::from_slice(&args),
                },
            ),
        }
    }

    /// Interns `symbol` applied to already collected children.  On a hit the
    /// buffer is dropped, on a miss it is moved into the new node.
    #[track_caller]
    pub(crate) fn intern_appl(&mut self, symbol: Symbol, args: Args) -> Term {
        check_arity(symbol, args.len());
        self.check_children(symbol, &args);
        let hash = appl_hash(symbol, &args);
        match self.find_canonical(hash, |node| node.is_appl(symbol, &args)) {
            Some(term) => term,
            None => self.insert_canonical(hash, Payload::Appl { symbol, args }),
        }
    }

    /// Every child must be live in this store, and the tail of a cons cell
    /// must itself be a list.
    #[track_caller]
    fn check_children(&self, symbol: Symbol, args: &[Term]) {
        for arg in args {
            if let Err(e) = self.node(*arg) {
                panic!("application built from a stale or foreign term {arg:?}: {e}");
            }
        }
        if symbol.is_list() {
            if let Ok(node) = self.node(args[1]) {
                let kind = node.kind_name();
                assert!(
                    matches!(kind, "nil" | "list"),
                    "cons cell built over a tail of kind {kind}"
                );
            }
        }
    }

    /// Constructs or finds the constant `symbol`.
    ///
    /// # Panics
    /// If `symbol` does not have arity 0.
    #[track_caller]
    #[inline]
    pub fn appl0(&mut self, symbol: Symbol) -> TermAppl<Term> {
        TermAppl::wrap(self.intern_fixed::<0>(symbol, []))
    }

    fixed_appl!(
        /// Constructs or finds `symbol(a)`.
        ///
        /// # Panics
        /// If `symbol` does not have arity 1.
        appl1, 1, a
    );
    fixed_appl!(
        /// Constructs or finds `symbol(a, b)`.
        ///
        /// # Panics
        /// If `symbol` does not have arity 2.
        appl2, 2, a, b
    );
    fixed_appl!(appl3, 3, a, b, c);
    fixed_appl!(appl4, 4, a, b, c, d);
    fixed_appl!(appl5, 5, a, b, c, d, e);
    fixed_appl!(appl6, 6, a, b, c, d, e, f);
    fixed_appl!(appl7, 7, a, b, c, d, e, f, g);

    /// Constructs or finds `symbol` applied to `args`, for any arity.
    ///
    /// # Panics
    /// If `args` does not yield exactly `symbol.arity()` terms.
    ///
    /// ```
    /// # use hashed_terms::TermStore;
    /// let mut store = TermStore::new();
    /// let f = store.symbol("f", 3);
    /// let xs: Vec<_> = (1..=3).map(|i| store.int(i)).collect();
    /// let a = store.appl(f, xs.iter().copied());
    /// let b = store.appl3(f, xs[0], xs[1], xs[2]);
    /// assert_eq!(a, b);
    /// ```
    #[track_caller]
    pub fn appl<T: TermLike>(&mut self, symbol: Symbol, args: impl IntoIterator<Item = T>) -> TermAppl<T> {
        let args: Args = args.into_iter().map(Into::into).collect();
        TermAppl::wrap(self.intern_appl(symbol, args))
    }

    /// Constructs or finds `symbol` applied to `convert(x)` for every `x` in
    /// `src`.  `convert` runs exactly once per element, in order, and may
    /// itself construct terms.
    ///
    /// # Panics
    /// If `src` does not yield exactly `symbol.arity()` elements.
    #[track_caller]
    pub fn appl_with<I, T, F>(&mut self, symbol: Symbol, src: impl IntoIterator<Item = I>, convert: F) -> TermAppl<T>
    where
        T: TermLike,
        F: FnMut(&mut TermStore, I) -> T,
    {
        self.appl_filtered(symbol, src, convert, |_| true)
    }

    /// Like [`appl_with`](Self::appl_with), keeping only the elements
    /// accepted by `keep`.  The kept elements must number exactly
    /// `symbol.arity()`.
    #[track_caller]
    pub(crate) fn appl_filtered<I, T, F, P>(
        &mut self,
        symbol: Symbol,
        src: impl IntoIterator<Item = I>,
        mut convert: F,
        mut keep: P,
    ) -> TermAppl<T>
    where
        T: TermLike,
        F: FnMut(&mut TermStore, I) -> T,
        P: FnMut(&I) -> bool,
    {
        let mut args = Args::with_capacity(symbol.arity());
        for x in src {
            if keep(&x) {
                let arg = convert(self, x);
                args.push(arg.into());
            }
        }
        TermAppl::wrap(self.intern_appl(symbol, args))
    }

    /// Returns the application equal to `appl` except for argument `index`,
    /// which is replaced by `arg`.
    pub fn set_argument<T: TermLike>(&mut self, appl: TermAppl<T>, index: usize, arg: T) -> Result<TermAppl<T>, TermError> {
        let old = appl.args(self)?;
        if index >= old.len() {
            return Err(TermError::IndexOutOfBounds {
                index,
                len: old.len(),
            });
        }
        let arg: Term = arg.into();
        if old[index] == arg {
            return Ok(appl);
        }
        let symbol = appl.function(self)?;
        let mut args = Args::from_slice(old);
        args[index] = arg;
        Ok(TermAppl::wrap(self.intern_appl(symbol, args)))
    }
}

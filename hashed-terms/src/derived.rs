//! List algorithms built from the bulk builder and the cons constructor.
//!
//! Lists are immutable and share suffixes, so an operation that changes
//! position `i` only rebuilds the `i` cells in front of it.  The rebuilt
//! prefix goes through the same scratch buffer as the bulk builder; the
//! suffix after the change is reused as is.

use crate::{Term, TermError, TermLike, TermList, TermStore};

impl TermStore {
    /// Copies elements of `list` into a scratch buffer until `stop` accepts
    /// one.  Returns the buffer and the rest of the list, which starts with
    /// the accepted element, or is empty if none was accepted.
    fn take_prefix<T: TermLike>(
        &mut self,
        list: TermList<T>,
        mut stop: impl FnMut(usize, T) -> bool,
    ) -> Result<(Vec<Term>, TermList<T>), TermError> {
        let mut buf = self.take_scratch(0);
        let mut rest = list;
        loop {
            match rest.uncons(self) {
                Ok(Some((head, tail))) => {
                    if stop(buf.len(), head) {
                        break;
                    }
                    buf.push(head.into());
                    rest = tail;
                }
                Ok(None) => break,
                Err(e) => {
                    self.give_back_scratch(buf);
                    return Err(e);
                }
            }
        }
        Ok((buf, rest))
    }

    /// Conses the buffered prefix back onto `tail` and releases the buffer.
    fn rebuild<T>(&mut self, buf: Vec<Term>, tail: Term) -> TermList<T> {
        let list = self.cons_all(&buf, tail);
        self.give_back_scratch(buf);
        TermList::wrap(list)
    }

    /// Returns `list` with `x` appended.  O(n): every cell is rebuilt.
    /// Prefer [`push_front`](Self::push_front) when the construction order
    /// can be chosen.
    pub fn push_back<T: TermLike>(&mut self, list: TermList<T>, x: T) -> Result<TermList<T>, TermError> {
        let (buf, _) = self.take_prefix(list, |_, _| false)?;
        let last = self.singleton(x);
        Ok(self.rebuild(buf, last.into()))
    }

    /// Returns the elements of `l` followed by those of `m`.
    ///
    /// O(|l|): the cells of `m` are shared, not copied.  If either operand
    /// is empty the other one is returned without any work.  The element
    /// type of `l` must convert into that of `m`; use
    /// [`TermList::upcast`] on `m` for the opposite direction.
    ///
    /// ```
    /// # use hashed_terms::TermStore;
    /// let mut store = TermStore::new();
    /// let l = store.list([1, 2]);
    /// let m = store.list([3, 4]);
    /// let lm = store.concat(l, m).unwrap();
    /// assert_eq!(lm, store.list([1, 2, 3, 4]));
    /// assert_eq!(lm.tail_from(&store, 2).unwrap(), m);
    /// ```
    pub fn concat<T, U>(&mut self, l: TermList<T>, m: TermList<U>) -> Result<TermList<U>, TermError>
    where
        T: TermLike + Into<U>,
        U: TermLike,
    {
        // Emptiness is an index comparison; both handles must belong here.
        self.resolve(l.term())?;
        self.resolve(m.term())?;
        if m.is_empty() {
            return Ok(l.upcast());
        }
        if l.is_empty() {
            return Ok(m);
        }
        let (buf, _) = self.take_prefix(l, |_, _| false)?;
        Ok(self.rebuild(buf, m.into()))
    }

    /// Returns the elements of `list` in reverse order.  O(n).
    pub fn reverse<T: TermLike>(&mut self, list: TermList<T>) -> Result<TermList<T>, TermError> {
        let mut reversed: Term = self.nil::<T>().into();
        let mut rest = list;
        while let Some((head, tail)) = rest.uncons(self)? {
            reversed = self.cons(head.into(), reversed);
            rest = tail;
        }
        Ok(TermList::wrap(reversed))
    }

    /// Removes the first occurrence of `x`.
    ///
    /// If `x` does not occur, `list` itself is returned and nothing is
    /// allocated.  Otherwise only the cells in front of `x` are rebuilt,
    /// on top of the unchanged cells that follow it.
    pub fn remove_one_element<T: TermLike>(&mut self, list: TermList<T>, x: T) -> Result<TermList<T>, TermError> {
        let (buf, rest) = self.take_prefix(list, |_, head| head == x)?;
        match rest.uncons(self)? {
            None => {
                self.give_back_scratch(buf);
                Ok(list)
            }
            Some((_, after)) => Ok(self.rebuild(buf, after.into())),
        }
    }

    /// Removes every occurrence of `x`.  The cells after the last
    /// occurrence are shared.
    pub fn remove_all<T: TermLike>(&mut self, list: TermList<T>, x: T) -> Result<TermList<T>, TermError> {
        let Some(last) = list.last_index_of(self, x)? else {
            return Ok(list);
        };
        let (mut buf, rest) = self.take_prefix(list, |i, _| i == last)?;
        let x: Term = x.into();
        buf.retain(|t| *t != x);
        let after = rest.tail(self)?;
        Ok(self.rebuild(buf, after.into()))
    }

    /// Returns `list` without its last element.
    pub fn prefix<T: TermLike>(&mut self, list: TermList<T>) -> Result<TermList<T>, TermError> {
        let (mut buf, _) = self.take_prefix(list, |_, _| false)?;
        if buf.pop().is_none() {
            self.give_back_scratch(buf);
            return Err(TermError::EmptyList);
        }
        let nil = self.nil::<T>().into();
        Ok(self.rebuild(buf, nil))
    }

    /// Returns elements `start..end` of `list`.  A slice that reaches the
    /// end of `list` shares its cells.
    ///
    /// Fails with [`TermError::IndexOutOfBounds`] if `end` exceeds the
    /// length of `list` or `start` exceeds `end`.
    pub fn slice<T: TermLike>(&mut self, list: TermList<T>, start: usize, end: usize) -> Result<TermList<T>, TermError> {
        if start > end {
            return Err(TermError::IndexOutOfBounds { index: start, len: end });
        }
        let (buf, rest) = self.take_prefix(list, |i, _| i == end)?;
        if buf.len() < end {
            let len = buf.len();
            self.give_back_scratch(buf);
            return Err(TermError::IndexOutOfBounds { index: end, len });
        }
        if rest.is_empty() {
            self.give_back_scratch(buf);
            return list.tail_from(self, start);
        }
        let nil = self.nil::<T>().into();
        let list = self.cons_all(&buf[start..], nil);
        self.give_back_scratch(buf);
        Ok(TermList::wrap(list))
    }

    /// Inserts `x` so that it ends up at position `index`.  `index` may
    /// equal the length of `list`.
    pub fn insert_at<T: TermLike>(&mut self, list: TermList<T>, index: usize, x: T) -> Result<TermList<T>, TermError> {
        let (buf, rest) = self.take_prefix(list, |i, _| i == index)?;
        if buf.len() < index {
            let len = buf.len();
            self.give_back_scratch(buf);
            return Err(TermError::IndexOutOfBounds { index, len });
        }
        let tail = self.cons(x.into(), rest.into());
        Ok(self.rebuild(buf, tail))
    }

    /// Replaces the element at `index` by `x`.
    pub fn replace_at<T: TermLike>(&mut self, list: TermList<T>, index: usize, x: T) -> Result<TermList<T>, TermError> {
        let (buf, rest) = self.take_prefix(list, |i, _| i == index)?;
        let Some((old, after)) = rest.uncons(self)? else {
            let len = buf.len();
            self.give_back_scratch(buf);
            return Err(TermError::IndexOutOfBounds { index, len });
        };
        if old == x {
            self.give_back_scratch(buf);
            return Ok(list);
        }
        let tail = self.cons(x.into(), after.into());
        Ok(self.rebuild(buf, tail))
    }

    /// Removes the element at `index`.
    pub fn remove_at<T: TermLike>(&mut self, list: TermList<T>, index: usize) -> Result<TermList<T>, TermError> {
        let (buf, rest) = self.take_prefix(list, |i, _| i == index)?;
        let Some((_, after)) = rest.uncons(self)? else {
            let len = buf.len();
            self.give_back_scratch(buf);
            return Err(TermError::IndexOutOfBounds { index, len });
        };
        Ok(self.rebuild(buf, after.into()))
    }
}

impl<T: TermLike> TermList<T> {
    /// Returns the last element.
    pub fn last(&self, store: &TermStore) -> Result<T, TermError> {
        let mut last = None;
        self.walk(store, |_, x| {
            last = Some(x);
            None::<()>
        })?;
        last.ok_or(TermError::EmptyList)
    }

    /// Returns the element at `index`.
    pub fn element_at(&self, store: &TermStore, index: usize) -> Result<T, TermError> {
        match self.walk(store, |i, x| (i == index).then_some(x))? {
            (_, Some(x)) => Ok(x),
            (len, None) => Err(TermError::IndexOutOfBounds { index, len }),
        }
    }

    /// Position of the first occurrence of `x` at or after `from`.
    pub fn index_of(&self, store: &TermStore, x: T, from: usize) -> Result<Option<usize>, TermError> {
        Ok(self.walk(store, |i, y| (i >= from && y == x).then_some(i))?.1)
    }

    /// Position of the last occurrence of `x`.
    pub fn last_index_of(&self, store: &TermStore, x: T) -> Result<Option<usize>, TermError> {
        let mut found = None;
        self.walk(store, |i, y| {
            if y == x {
                found = Some(i);
            }
            None::<()>
        })?;
        Ok(found)
    }

    /// Returns the list without its first `start` elements.  Shares all
    /// remaining cells; allocates nothing.
    pub fn tail_from(&self, store: &TermStore, start: usize) -> Result<TermList<T>, TermError> {
        let mut rest = *self;
        for i in 0..start {
            match rest.uncons(store)? {
                Some((_, tail)) => rest = tail,
                None => return Err(TermError::IndexOutOfBounds { index: start, len: i }),
            }
        }
        Ok(rest)
    }
}

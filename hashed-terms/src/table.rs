//! The intern table: open hashing with chains threaded through the slots.
//!
//! Buckets hold the index of the first slot of their chain; each slot holds
//! the index of the next one.  The table never looks at node payloads
//! itself, callers hand in a predicate when probing.

use crate::store::Node;
use crate::term::NIL_INDEX;

/// Folds `value` into `hash`.  Not commutative: argument order matters.
#[inline]
pub(crate) fn fold_hash(hash: u64, value: u64) -> u64 {
    (hash.rotate_left(5) ^ value).wrapping_mul(0x517c_c1b7_2722_0a95)
}

/// A storage cell of the node arena.
///
/// `generation` is bumped every time the node is reclaimed so that stale
/// handles can be detected.  `hash` and `next` are table bookkeeping and are
/// only meaningful while `node` is `Some` and the slot is not the sentinel.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) generation: u32,
    pub(crate) hash: u64,
    pub(crate) next: Option<u32>,
    pub(crate) node: Option<Node>,
}

impl Slot {
    pub(crate) fn vacant(generation: u32) -> Self {
        Self {
            generation,
            hash: 0,
            next: None,
            node: None,
        }
    }
}

/// Result of a successful probe.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Hit {
    pub(crate) bucket: usize,
    pub(crate) prev: Option<u32>,
    pub(crate) index: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct InternTable {
    buckets: Vec<Option<u32>>,
    mask: usize,
    entries: usize,
    max_load_pct: usize,
    pub(crate) growths: u64,
}

impl InternTable {
    /// Creates a table with `1 << class` buckets.
    pub(crate) fn with_class(class: u32, max_load_pct: u8) -> Self {
        let len = 1usize << class.clamp(1, 30);
        Self {
            buckets: vec![None; len],
            mask: len - 1,
            entries: 0,
            max_load_pct: max_load_pct.clamp(10, 100) as usize,
            growths: 0,
        }
    }

    #[inline]
    pub(crate) fn bucket_of(&self, hash: u64) -> usize {
        hash as usize & self.mask
    }

    pub(crate) fn buckets(&self) -> usize {
        self.buckets.len()
    }

    pub(crate) fn entries(&self) -> usize {
        self.entries
    }

    /// Returns `true` if one more entry would push the load over the limit.
    #[inline]
    pub(crate) fn needs_growth(&self) -> bool {
        (self.entries + 1) * 100 > self.buckets.len() * self.max_load_pct
    }

    /// Walks the chain of `hash` and returns the first slot accepted by `matches`.
    pub(crate) fn probe(
        &self,
        slots: &[Slot],
        hash: u64,
        mut matches: impl FnMut(&Node) -> bool,
    ) -> Option<Hit> {
        let bucket = self.bucket_of(hash);
        let mut prev = None;
        let mut cur = self.buckets[bucket];
        while let Some(index) = cur {
            let slot = &slots[index as usize];
            if slot.hash == hash && slot.node.as_ref().is_some_and(&mut matches) {
                return Some(Hit {
                    bucket,
                    prev,
                    index,
                });
            }
            prev = cur;
            cur = slot.next;
        }
        None
    }

    /// Moves a probed entry to the head of its chain.
    pub(crate) fn move_to_front(&mut self, slots: &mut [Slot], hit: Hit) {
        if let Some(prev) = hit.prev {
            let next = slots[hit.index as usize].next;
            slots[prev as usize].next = next;
            slots[hit.index as usize].next = self.buckets[hit.bucket];
            self.buckets[hit.bucket] = Some(hit.index);
        }
    }

    /// Pushes slot `index` onto the front of `bucket`.
    ///
    /// `bucket` must have been computed with the current mask, i.e. after any
    /// growth the caller may have triggered.
    pub(crate) fn link(&mut self, slots: &mut [Slot], bucket: usize, index: u32) {
        slots[index as usize].next = self.buckets[bucket];
        self.buckets[bucket] = Some(index);
        self.entries += 1;
    }

    /// Removes slot `index` from its chain.  Returns `false` if it was not linked.
    pub(crate) fn unlink(&mut self, slots: &mut [Slot], index: u32) -> bool {
        let bucket = self.bucket_of(slots[index as usize].hash);
        let mut prev: Option<u32> = None;
        let mut cur = self.buckets[bucket];
        while let Some(i) = cur {
            if i == index {
                let next = slots[i as usize].next.take();
                match prev {
                    None => self.buckets[bucket] = next,
                    Some(p) => slots[p as usize].next = next,
                }
                self.entries -= 1;
                return true;
            }
            prev = cur;
            cur = slots[i as usize].next;
        }
        false
    }

    /// Doubles the bucket array and redistributes every linked slot.
    pub(crate) fn grow(&mut self, slots: &mut [Slot]) {
        let len = self.buckets.len() * 2;
        log::debug!(
            "growing intern table from {} to {} buckets ({} entries)",
            self.buckets.len(),
            len,
            self.entries
        );
        self.buckets = vec![None; len];
        self.mask = len - 1;
        self.growths += 1;
        for (index, slot) in slots.iter_mut().enumerate() {
            if index as u32 == NIL_INDEX || slot.node.is_none() {
                continue;
            }
            let bucket = slot.hash as usize & self.mask;
            slot.next = self.buckets[bucket];
            self.buckets[bucket] = Some(index as u32);
        }
    }

    /// Length of the longest chain.
    pub(crate) fn max_chain(&self, slots: &[Slot]) -> usize {
        self.buckets
            .iter()
            .map(|head| {
                let mut len = 0;
                let mut cur = *head;
                while let Some(i) = cur {
                    len += 1;
                    cur = slots[i as usize].next;
                }
                len
            })
            .max()
            .unwrap_or(0)
    }
}

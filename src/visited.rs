//! Visited-pairs ledger for cycle detection.
//!
//! Records the `(value, pattern)` object pairs currently being compared
//! above the current call frame. Entries compare by reference identity.
//! A ledger lives for exactly one top-level match call.

use crate::value::Identity;

#[derive(Debug, Default)]
pub(crate) struct VisitedPairs {
    pairs: Vec<(Identity, Identity)>,
}

impl VisitedPairs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn contains(&self, value: Identity, pattern: Identity) -> bool {
        self.pairs.iter().rev().any(|&(v, p)| v == value && p == pattern)
    }

    pub(crate) fn push(&mut self, value: Identity, pattern: Identity) {
        self.pairs.push((value, pattern));
    }

    pub(crate) fn pop(&mut self) {
        self.pairs.pop();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pairs.len()
    }
}

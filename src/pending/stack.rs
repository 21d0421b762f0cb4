// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The pending stack: the spine of the prefix tree, encoded as a flat
//! stack of entries plus, for every depth, the index where the current
//! run of entries sharing that depth's prefix began (spec.md §3, §9).

use super::entry::PendingEntry;

/// Ordered stack of pending entries for the field currently being
/// written, plus the `prefixStarts[]` bookkeeping `push_term` needs to
/// find the runs that have just been "abandoned" by a new term.
#[derive(Default)]
pub struct PendingStack {
    entries: Vec<PendingEntry>,
    /// `prefix_starts[d]` = index into `entries` where the run of
    /// entries sharing `last_term[0..d]` began. Grown lazily as deeper
    /// prefixes are seen.
    prefix_starts: Vec<usize>,
}

impl PendingStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: PendingEntry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn as_slice(&self) -> &[PendingEntry] {
        &self.entries
    }

    /// Replaces `entries[start..end]` with `replacement` (a single
    /// `PendingBlock` entry, per spec.md §4.2: "replaces the consumed
    /// slice in the pending stack with the first block of the sibling
    /// group").
    pub fn replace_range(&mut self, start: usize, end: usize, replacement: PendingEntry) {
        self.entries.splice(start..end, std::iter::once(replacement));
    }

    /// Ensures `prefix_starts` has an entry for `depth`, extending with
    /// the current stack length (the conservative "run starts here"
    /// default) as needed.
    fn ensure_depth(&mut self, depth: usize) {
        if self.prefix_starts.len() <= depth {
            self.prefix_starts.resize(depth + 1, self.entries.len());
        }
    }

    #[must_use]
    pub fn prefix_start(&self, depth: usize) -> usize {
        self.prefix_starts.get(depth).copied().unwrap_or(0)
    }

    pub fn set_prefix_start(&mut self, depth: usize, value: usize) {
        self.ensure_depth(depth);
        self.prefix_starts[depth] = value;
    }

    /// Shifts `prefix_starts[depth]` by `delta` (spec.md §4.1: "adjusted
    /// by `-(N-1)` to account for the collapse").
    pub fn shift_prefix_start(&mut self, depth: usize, delta: i64) {
        self.ensure_depth(depth);
        let current = self.prefix_starts[depth] as i64;
        self.prefix_starts[depth] = (current + delta).max(0) as usize;
    }

    /// Resets `prefix_starts[depth]` to the current stack length — the
    /// start of a fresh run (spec.md §4.1, final step of `push_term`).
    pub fn reset_prefix_start(&mut self, depth: usize) {
        self.ensure_depth(depth);
        self.prefix_starts[depth] = self.entries.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pending::term::PendingTerm;
    use crate::postings::TermState;

    fn term(bytes: &[u8]) -> PendingEntry {
        PendingEntry::Term(PendingTerm::new(bytes.to_vec(), TermState::default()))
    }

    #[test]
    fn push_and_len() {
        let mut stack = PendingStack::new();
        assert!(stack.is_empty());
        stack.push(term(b"a"));
        stack.push(term(b"b"));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn replace_range_collapses_entries() {
        let mut stack = PendingStack::new();
        stack.push(term(b"a"));
        stack.push(term(b"ab"));
        stack.push(term(b"ac"));
        stack.push(term(b"b"));

        stack.replace_range(0, 3, term(b"a-block"));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.as_slice()[0].sort_bytes(), b"a-block");
        assert_eq!(stack.as_slice()[1].sort_bytes(), b"b");
    }

    #[test]
    fn prefix_start_defaults_to_zero_then_tracks_sets() {
        let mut stack = PendingStack::new();
        assert_eq!(stack.prefix_start(3), 0);
        stack.push(term(b"a"));
        stack.reset_prefix_start(2);
        assert_eq!(stack.prefix_start(2), 1);
        stack.shift_prefix_start(2, -1);
        assert_eq!(stack.prefix_start(2), 0);
    }
}

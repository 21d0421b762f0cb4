// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::{block::PendingBlock, term::PendingTerm};

/// One slot on the pending stack: either a term awaiting block
/// placement, or a previously-built block awaiting inclusion as a child
/// of some higher block (spec.md §3).
#[derive(Clone, Debug)]
pub enum PendingEntry {
    Term(PendingTerm),
    Block(PendingBlock),
}

impl PendingEntry {
    /// The bytes this entry sorts by: the term's own bytes, or the
    /// block's prefix (which may include a trailing floor-lead byte).
    #[must_use]
    pub fn sort_bytes(&self) -> &[u8] {
        match self {
            Self::Term(t) => &t.term,
            Self::Block(b) => &b.prefix,
        }
    }

    /// The "suffix lead label" at `prefix_length` used by `write_blocks`
    /// to detect where sibling groups split (spec.md §4.2): the byte at
    /// that position, or `-1` (`None`) for a term exactly `prefix_length`
    /// bytes long. Sub-blocks are always strictly longer than
    /// `prefix_length`, so they always yield `Some`.
    #[must_use]
    pub fn lead_label(&self, prefix_length: usize) -> Option<u8> {
        self.sort_bytes().get(prefix_length).copied()
    }

    #[must_use]
    pub fn as_term(&self) -> Option<&PendingTerm> {
        match self {
            Self::Term(t) => Some(t),
            Self::Block(_) => None,
        }
    }

    #[must_use]
    pub fn as_block(&self) -> Option<&PendingBlock> {
        match self {
            Self::Block(b) => Some(b),
            Self::Term(_) => None,
        }
    }

    #[must_use]
    pub fn is_block(&self) -> bool {
        matches!(self, Self::Block(_))
    }
}

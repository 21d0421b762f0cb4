// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A finished term awaiting placement into a dictionary block (spec.md §3).

use crate::postings::TermState;

/// A term that has been pushed onto the pending stack but not yet
/// serialized into a block.
#[derive(Clone, Debug)]
pub struct PendingTerm {
    /// Owned copy of the term bytes.
    pub term: Vec<u8>,
    /// Opaque per-term statistics and postings metadata.
    pub state: TermState,
}

impl PendingTerm {
    #[must_use]
    pub fn new(term: Vec<u8>, state: TermState) -> Self {
        Self { term, state }
    }
}

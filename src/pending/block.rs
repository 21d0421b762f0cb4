// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A previously-serialized dictionary block, awaiting inclusion as a
//! child of a higher block (spec.md §3).

use crate::fst_index::Fst;

/// A dictionary block that has already been written to `.tim`.
#[derive(Clone, Debug)]
pub struct PendingBlock {
    /// Prefix bytes shared by every entry in the block. For a floor
    /// block this includes the trailing `floor_lead_byte`.
    pub prefix: Vec<u8>,
    /// File offset of the block's header in `.tim`.
    pub fp: u64,
    pub has_terms: bool,
    pub is_floor: bool,
    pub floor_lead_byte: Option<u8>,
    /// The compiled index for this (sub)tree, present once
    /// `compile_index` has run for the sibling group this block heads.
    pub index: Option<Fst>,
    /// Child FSTs collected while serializing this block's sub-block
    /// entries, still awaiting fold-in at the next `compile_index` call.
    /// Cleared once folded (spec.md §4.3 step 3).
    pub sub_indices: Vec<Fst>,
}

impl PendingBlock {
    #[must_use]
    pub fn new(prefix: Vec<u8>, fp: u64, has_terms: bool, is_floor: bool) -> Self {
        Self {
            prefix,
            fp,
            has_terms,
            is_floor,
            floor_lead_byte: None,
            index: None,
            sub_indices: Vec::new(),
        }
    }

    /// The byte a reader routes on to pick this sibling within a floor
    /// group, i.e. the byte at the prefix's last position when this is a
    /// floor block.
    #[must_use]
    pub fn floor_lead_byte(&self) -> Option<u8> {
        self.floor_lead_byte
    }
}

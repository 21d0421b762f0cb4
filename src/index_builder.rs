// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! `compileIndex` (spec.md §4.3): folds a sibling group of just-written
//! blocks into a single FST, recursively absorbing any child FSTs those
//! blocks were carrying.

use crate::error::Result;
use crate::fst_index::{Fst, FstBuilder};
use crate::output::{ByteBuffer, OutputSink};
use crate::pending::PendingBlock;

/// `encodeOutput(fp, hasTerms, isFloor) = (fp << 2) | (hasTerms?2:0) |
/// (isFloor?1:0)`, spec.md §6. `fp` must be `< 2^62`.
#[must_use]
pub fn encode_output(fp: u64, has_terms: bool, is_floor: bool) -> u64 {
    debug_assert!(fp < (1u64 << 62), "file pointer overflowed root encoding");
    (fp << 2) | (u64::from(has_terms) << 1) | u64::from(is_floor)
}

/// Inverse of [`encode_output`].
#[must_use]
pub fn decode_output(output: u64) -> (u64, bool, bool) {
    let fp = output >> 2;
    let has_terms = (output & 0b10) != 0;
    let is_floor = (output & 0b01) != 0;
    (fp, has_terms, is_floor)
}

/// Folds `siblings` (the first is `self`, the rest are its floor
/// siblings in ascending `floor_lead_byte` order) into a single FST,
/// stores it on `siblings[0]`, and clears every sibling's `sub_indices`.
///
/// Returns the compiled FST (also reachable afterwards via
/// `siblings[0].index`).
pub fn compile_index(siblings: &mut [PendingBlock]) -> Result<Fst> {
    let (head, rest) = siblings
        .split_first()
        .ok_or(crate::error::Error::Invariant("sibling group must be non-empty"))?;
    let is_floor = head.is_floor;

    let mut scratch = ByteBuffer::new();
    scratch.write_vlong(encode_output(head.fp, head.has_terms, is_floor))?;

    if is_floor {
        scratch.write_vint(rest.len() as u32)?;
        for sub in rest {
            let lead_byte = sub.floor_lead_byte.ok_or(crate::error::Error::Invariant(
                "non-first floor sibling missing floor_lead_byte",
            ))?;
            scratch.write_byte(lead_byte)?;

            let fp_delta = sub
                .fp
                .checked_sub(head.fp)
                .ok_or(crate::error::Error::Invariant(
                    "floor sibling fp must follow self.fp",
                ))?;
            scratch.write_vlong((fp_delta << 1) | u64::from(sub.has_terms))?;
        }
    }

    let mut builder = FstBuilder::new();
    builder.add(head.prefix.clone(), scratch.as_slice().to_vec());

    for block in siblings.iter() {
        for child in &block.sub_indices {
            builder.fold_in(child);
        }
    }

    let fst = builder.finish();

    for block in siblings.iter_mut() {
        block.sub_indices.clear();
    }
    siblings[0].index = Some(fst.clone());

    Ok(fst)
}

// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! `writeBlocks` / `writeBlock` (spec.md §4.2): given a contiguous run of
//! the pending stack sharing a common prefix, decides how many dictionary
//! blocks to cut (splitting into floor blocks when the run overflows
//! `max_items_in_block`), serializes them to `.tim`, and replaces the
//! run in the pending stack with the first (head) block of the group.

use crate::config::BlockTreeOptions;
use crate::error::{Error, Result};
use crate::index_builder::compile_index;
use crate::output::{ByteBuffer, OutputSink};
use crate::pending::{PendingBlock, PendingEntry, PendingStack};
use crate::postings::{FieldInfo, PostingsWriter};

/// Scratch buffers reused across every block and term in a field,
/// mirroring the teacher's `chunk`/`write_buffer` reuse discipline
/// (spec.md §5, §9 "Shared scratch buffers").
#[derive(Default)]
pub struct BlockEmitter {
    suffix_buf: ByteBuffer,
    stats_buf: ByteBuffer,
    meta_buf: ByteBuffer,
    term_bytes_buf: ByteBuffer,
}

impl BlockEmitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits the top `count` entries of `stack` (all sharing a
    /// `prefix_length`-byte prefix) into one or more blocks, writes them
    /// to `out`, folds their FSTs, and collapses the run into a single
    /// `PendingBlock` entry.
    #[allow(clippy::too_many_arguments)]
    pub fn write_blocks<P: PostingsWriter>(
        &mut self,
        stack: &mut PendingStack,
        prefix_length: usize,
        count: usize,
        opts: &BlockTreeOptions,
        out: &mut dyn OutputSink,
        postings: &mut P,
        field: FieldInfo,
        longs_size: u32,
    ) -> Result<()> {
        let total = stack.len();
        let slice_start = total
            .checked_sub(count)
            .ok_or(Error::Invariant("write_blocks count exceeds stack size"))?;

        let segments = segment_floor_groups(
            &stack.as_slice()[slice_start..total],
            prefix_length,
            opts.min_items_in_block() as usize,
            opts.max_items_in_block() as usize,
        );
        let is_floor = segments.len() > 1;

        let mut blocks = Vec::with_capacity(segments.len());
        for (seg_index, (seg_start, seg_end, has_terms, has_sub_blocks)) in
            segments.into_iter().enumerate()
        {
            let start = slice_start + seg_start;
            let end = slice_start + seg_end;

            // The head floor block's lead label is always `-1`/`None`
            // (Lucene's `nextFloorLeadLabel`); only non-first siblings in
            // the floor group are routed on a real byte (spec.md §4.3
            // step 1: "for each non-first sibling write one byte").
            let floor_lead_label = if is_floor && seg_index > 0 {
                stack.as_slice()[start].lead_label(prefix_length)
            } else {
                None
            };

            let block = self.write_block(
                stack,
                prefix_length,
                is_floor,
                floor_lead_label,
                start,
                end,
                total,
                has_terms,
                has_sub_blocks,
                out,
                postings,
                field,
                longs_size,
            )?;
            blocks.push(block);
        }

        compile_index(&mut blocks)?;

        let head = blocks.remove(0);
        stack.replace_range(slice_start, total, PendingEntry::Block(head));

        log::trace!(
            "wrote {} block(s) at prefix_length={prefix_length}, floor={is_floor}",
            blocks.len() + 1
        );

        Ok(())
    }

    /// Serializes one block covering `stack[start..end]` (spec.md §4.2
    /// "writeBlock").
    #[allow(clippy::too_many_arguments)]
    fn write_block<P: PostingsWriter>(
        &mut self,
        stack: &PendingStack,
        prefix_length: usize,
        is_floor: bool,
        floor_lead_label: Option<u8>,
        start: usize,
        end: usize,
        stack_size_at_capture: usize,
        has_terms: bool,
        has_sub_blocks: bool,
        out: &mut dyn OutputSink,
        postings: &mut P,
        field: FieldInfo,
        longs_size: u32,
    ) -> Result<PendingBlock> {
        let entries = &stack.as_slice()[start..end];
        if entries.is_empty() {
            return Err(Error::Invariant("attempted to write an empty block"));
        }

        let start_fp = out.file_pointer();

        let mut prefix = entries[0].sort_bytes()[..prefix_length].to_vec();
        if is_floor {
            if let Some(label) = floor_lead_label {
                prefix.push(label);
            }
        }

        let is_leaf_block = !has_sub_blocks;

        self.suffix_buf.reset();
        self.stats_buf.reset();
        self.meta_buf.reset();

        let mut sub_indices = Vec::new();
        let mut first_term_in_block = true;
        let mut longs = vec![0u64; longs_size as usize];

        for entry in entries {
            match entry {
                PendingEntry::Term(term) => {
                    let suffix = &term.term[prefix_length..];

                    if is_leaf_block {
                        self.suffix_buf.write_vint(suffix.len() as u32)?;
                    } else {
                        self.suffix_buf.write_vint((suffix.len() as u32) << 1)?;
                    }
                    self.suffix_buf.write_bytes(suffix)?;

                    self.stats_buf.write_vint(
                        u32::try_from(term.state.doc_freq)
                            .map_err(|_| Error::Invariant("doc_freq overflowed u32"))?,
                    )?;
                    if field.has_freqs {
                        let ttf = term.state.total_term_freq.ok_or(Error::Invariant(
                            "field records frequencies but total_term_freq is absent",
                        ))?;
                        self.stats_buf.write_vlong(ttf - term.state.doc_freq)?;
                    }

                    longs.iter_mut().for_each(|l| *l = 0);
                    self.term_bytes_buf.reset();
                    postings.encode_term(
                        &mut longs,
                        &mut self.term_bytes_buf,
                        field,
                        &term.state,
                        first_term_in_block,
                    )?;
                    for l in &longs {
                        self.meta_buf.write_vlong(*l)?;
                    }
                    self.term_bytes_buf.write_to(&mut self.meta_buf)?;

                    first_term_in_block = false;
                }
                PendingEntry::Block(sub) => {
                    let suffix = &sub.prefix[prefix_length..];

                    self.suffix_buf
                        .write_vint(((suffix.len() as u32) << 1) | 1)?;
                    self.suffix_buf.write_bytes(suffix)?;

                    let fp_delta = start_fp
                        .checked_sub(sub.fp)
                        .ok_or(Error::Invariant("sub-block fp must precede parent fp"))?;
                    self.suffix_buf.write_vlong(fp_delta)?;

                    if let Some(index) = &sub.index {
                        sub_indices.push(index.clone());
                    }
                }
            }
        }

        let code = ((end - start) as u32) << 1
            | u32::from(end == stack_size_at_capture);
        out.write_vint(code)?;

        out.write_vint(((self.suffix_buf.len() as u32) << 1) | u32::from(is_leaf_block))?;
        self.suffix_buf.write_to(out)?;

        out.write_vint(self.stats_buf.len() as u32)?;
        self.stats_buf.write_to(out)?;

        out.write_vint(self.meta_buf.len() as u32)?;
        self.meta_buf.write_to(out)?;

        let mut block = PendingBlock::new(prefix, start_fp, has_terms, is_floor);
        block.floor_lead_byte = floor_lead_label;
        block.sub_indices = sub_indices;

        Ok(block)
    }
}

/// Splits `entries` (all sharing `prefix_length` bytes of prefix) into
/// one or more `(start, end, has_terms, has_sub_blocks)` floor segments,
/// per the greedy algorithm in spec.md §4.2.
fn segment_floor_groups(
    entries: &[PendingEntry],
    prefix_length: usize,
    min_items_in_block: usize,
    max_items_in_block: usize,
) -> Vec<(usize, usize, bool, bool)> {
    let mut segments = Vec::new();
    let mut next_block_start = 0usize;
    let mut has_terms = false;
    let mut has_sub_blocks = false;
    let mut prev_label: Option<Option<u8>> = None;

    for (i, entry) in entries.iter().enumerate() {
        let label = entry.lead_label(prefix_length);

        if let Some(prev) = prev_label {
            if prev != label {
                let count_since_start = i - next_block_start;
                let remaining = entries.len() - next_block_start;

                if count_since_start >= min_items_in_block && remaining > max_items_in_block {
                    segments.push((next_block_start, i, has_terms, has_sub_blocks));
                    next_block_start = i;
                    has_terms = false;
                    has_sub_blocks = false;
                }
            }
        }

        match entry {
            PendingEntry::Term(_) => has_terms = true,
            PendingEntry::Block(_) => has_sub_blocks = true,
        }
        prev_label = Some(label);
    }

    segments.push((next_block_start, entries.len(), has_terms, has_sub_blocks));
    segments
}

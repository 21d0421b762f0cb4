// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The field writer / finalizer (spec.md §4.1): drives one field at a
//! time, maintaining the pending stack and triggering block formation as
//! the abandoned suffix of the previous term closes.

use crate::block_emitter::BlockEmitter;
use crate::config::BlockTreeOptions;
use crate::error::{Error, Result, ValidationError};
use crate::output::OutputSink;
use crate::pending::{PendingEntry, PendingStack, PendingTerm};
use crate::postings::{FieldInfo, PostingsWriter, TermState};

/// Per-field summary recorded once a field finishes (spec.md §3
/// `FieldMeta`, §4.4 `FieldSummary`).
#[derive(Clone, Debug)]
pub struct FieldMeta {
    pub field_info: FieldInfo,
    pub root_code: Vec<u8>,
    pub num_terms: u64,
    pub index_start_fp: u64,
    pub sum_total_term_freq: Option<u64>,
    pub sum_doc_freq: u64,
    pub doc_count: u32,
    pub longs_size: u32,
    pub min_term: Vec<u8>,
    pub max_term: Vec<u8>,
}

/// Drives a single field through `startTerm → finishTerm* → finish`
/// (spec.md §4.1).
pub struct FieldWriter {
    field: FieldInfo,
    opts: BlockTreeOptions,
    longs_size: u32,
    stack: PendingStack,
    emitter: BlockEmitter,
    last_term: Vec<u8>,
    num_terms: u64,
    min_term: Option<Vec<u8>>,
    max_term: Option<Vec<u8>>,
}

impl FieldWriter {
    #[must_use]
    pub fn new(field: FieldInfo, opts: BlockTreeOptions, longs_size: u32) -> Self {
        Self {
            field,
            opts,
            longs_size,
            stack: PendingStack::new(),
            emitter: BlockEmitter::new(),
            last_term: Vec::new(),
            num_terms: 0,
            min_term: None,
            max_term: None,
        }
    }

    #[must_use]
    pub fn num_terms(&self) -> u64 {
        self.num_terms
    }

    /// Validates ordering against the previously finished term
    /// (spec.md §4.1: "term bytes must be strictly greater than the
    /// previous term's bytes in this field").
    pub fn start_term(&self, term: &[u8]) -> Result<()> {
        if self.num_terms > 0 && term <= self.last_term.as_slice() {
            return Err(ValidationError::TermsOutOfOrder {
                prev: self.last_term.clone(),
                next: term.to_vec(),
            }
            .into());
        }
        Ok(())
    }

    /// `finishTerm(term, stats)` (spec.md §4.1): validates stats, lets
    /// the postings codec finalize its own per-term state, pushes a
    /// `PendingTerm`, then runs the prefix walk that may trigger block
    /// formation.
    pub fn finish_term<P: PostingsWriter>(
        &mut self,
        term: Vec<u8>,
        mut state: TermState,
        out: &mut dyn OutputSink,
        postings: &mut P,
    ) -> Result<()> {
        if state.doc_freq == 0 {
            return Err(ValidationError::NonPositiveDocFreq(state.doc_freq).into());
        }
        if self.field.has_freqs {
            let ttf = state
                .total_term_freq
                .ok_or(Error::Invariant("has_freqs field missing total_term_freq"))?;
            if ttf < state.doc_freq {
                return Err(ValidationError::TotalTermFreqBelowDocFreq {
                    ttf,
                    df: state.doc_freq,
                }
                .into());
            }
        }

        postings.finish_term(&mut state)?;

        // `push_term` must run against the stack *before* the new term is
        // added to it, so the abandoned-suffix slice it closes covers only
        // terms strictly before this one (spec.md §4.1 "pushTerm").
        self.push_term(&term, out, postings)?;

        self.stack
            .push(PendingEntry::Term(PendingTerm::new(term.clone(), state)));

        if self.min_term.is_none() {
            self.min_term = Some(term.clone());
        }
        self.max_term = Some(term.clone());
        self.num_terms += 1;
        self.last_term = term;

        Ok(())
    }

    /// The prefix walk that closes abandoned suffixes (spec.md §4.1
    /// "pushTerm"): for every depth the new term no longer shares with
    /// the last one, close a block if the run there is big enough, then
    /// start fresh runs for the new term's own depths.
    fn push_term<P: PostingsWriter>(
        &mut self,
        text: &[u8],
        out: &mut dyn OutputSink,
        postings: &mut P,
    ) -> Result<()> {
        let shared = common_prefix_len(&self.last_term, text);

        if !self.last_term.is_empty() {
            for d in (shared..self.last_term.len()).rev() {
                let n = self.stack.len() - self.stack.prefix_start(d);
                if n >= self.opts.min_items_in_block() as usize {
                    self.emitter.write_blocks(
                        &mut self.stack,
                        d + 1,
                        n,
                        &self.opts,
                        out,
                        postings,
                        self.field,
                        self.longs_size,
                    )?;
                    self.stack
                        .shift_prefix_start(d, -(i64::try_from(n - 1).unwrap_or(i64::MAX)));
                }
            }
        }

        for d in shared..text.len() {
            self.stack.reset_prefix_start(d);
        }

        Ok(())
    }

    /// `finish(sumTotalTermFreq, sumDocFreq, docCount)` (spec.md §4.1):
    /// forces closure of every remaining suffix, collapses the pending
    /// stack to a single root block, compiles and writes its FST, and
    /// returns the field's summary — or `None` for an empty field
    /// (spec.md §8 "Empty field").
    pub fn finish<P: PostingsWriter>(
        mut self,
        sum_total_term_freq: Option<u64>,
        sum_doc_freq: u64,
        doc_count: u32,
        tim_out: &mut dyn OutputSink,
        tip_out: &mut dyn OutputSink,
        postings: &mut P,
    ) -> Result<Option<FieldMeta>> {
        if self.num_terms == 0 {
            return Ok(None);
        }

        // Force-close every still-open suffix run by walking against an
        // empty term (spec.md §4.1: "appends an empty term sentinel").
        self.push_term(&[], tim_out, postings)?;

        self.emitter.write_blocks(
            &mut self.stack,
            0,
            self.stack.len(),
            &self.opts,
            tim_out,
            postings,
            self.field,
            self.longs_size,
        )?;

        if self.stack.len() != 1 {
            return Err(Error::Invariant(
                "field finish did not collapse to a single root block",
            ));
        }
        let root = self.stack.as_slice()[0]
            .as_block()
            .ok_or(Error::Invariant("root pending entry is not a block"))?;
        if !root.prefix.is_empty() {
            return Err(Error::Invariant("root block has a non-empty prefix"));
        }
        let fst = root
            .index
            .as_ref()
            .ok_or(Error::Invariant("root block has no compiled index"))?;

        let index_start_fp = tip_out.file_pointer();
        fst.encode_into(tip_out)?;

        let root_code = fst
            .get(&[])
            .ok_or(Error::Invariant("root FST missing empty-input root code"))?
            .to_vec();

        log::debug!(
            "field {} finished: {} terms, index_start_fp={index_start_fp}",
            self.field.field_number,
            self.num_terms
        );

        Ok(Some(FieldMeta {
            field_info: self.field,
            root_code,
            num_terms: self.num_terms,
            index_start_fp,
            sum_total_term_freq,
            sum_doc_freq,
            doc_count,
            longs_size: self.longs_size,
            min_term: self.min_term.unwrap_or_default(),
            max_term: self.max_term.unwrap_or_default(),
        }))
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::common_prefix_len;

    #[test]
    fn common_prefix_len_handles_disjoint_and_equal_inputs() {
        assert_eq!(common_prefix_len(b"apple", b"apricot"), 2);
        assert_eq!(common_prefix_len(b"abc", b"abc"), 3);
        assert_eq!(common_prefix_len(b"", b"abc"), 0);
        assert_eq!(common_prefix_len(b"abc", b""), 0);
    }
}

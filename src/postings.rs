// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The postings codec interface (spec.md §6): a narrow boundary the core
//! invokes through, never implements. The codec owns its own output
//! stream(s) and produces opaque per-term metadata; the writer only knows
//! how many `u64` longs and how many trailing bytes that metadata is.

use crate::error::Result;
use crate::output::OutputSink;

/// Per-term statistics and opaque postings metadata, as handed to
/// `finish_term` (spec.md §3, §4.1).
#[derive(Clone, Debug, Default)]
pub struct TermState {
    /// Number of documents this term appears in. Must be `> 0`.
    pub doc_freq: u64,
    /// Total number of occurrences across all documents, if the field
    /// records frequencies.
    pub total_term_freq: Option<u64>,
    /// The fixed number of small integers the postings codec asked for
    /// via `set_field`'s `longs_size`, one per entry in `longs`.
    pub longs: Vec<u64>,
    /// Variable-length payload the postings codec appended to its own
    /// per-term sink during `encode_term`.
    pub payload: Vec<u8>,
}

/// Declares, per field, whether the field records term frequencies —
/// controls whether the `ttf - df` delta is present in the stats buffer
/// (spec.md §4.2 step 5, §8 scenario 6).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FieldInfo {
    pub field_number: u32,
    pub has_freqs: bool,
}

/// A handle returned from `start_term`, used by the caller to append
/// per-document postings between `start_term` and `finish_term`. The
/// concrete shape is entirely up to the postings codec; the core writer
/// never inspects it.
pub trait PostingsConsumer {
    /// Signals that all postings for the current term have been pushed.
    fn finish(&mut self) -> Result<()>;
}

/// The pluggable postings codec the core writer drives (spec.md §6).
///
/// Implementations write their own output stream(s) independently of
/// `.tim`/`.tip`; the core only ever sees the opaque `longs`/`payload` a
/// [`TermState`] carries after `finish_term`.
pub trait PostingsWriter {
    type Consumer: PostingsConsumer;

    /// Writes the postings-format header immediately after the terms
    /// dictionary header.
    fn init(&mut self, out: &mut dyn OutputSink) -> Result<()>;

    /// Declares how many longs per term this codec requires. Called once
    /// per field; the writer stores the result as `longsSize` in the
    /// field summary.
    fn set_field(&mut self, field: FieldInfo) -> Result<u32>;

    /// Begins a new term, returning a postings-consumer handle for the
    /// caller to push per-document postings into.
    fn start_term(&mut self) -> Result<Self::Consumer>;

    fn new_term_state(&self) -> TermState;

    /// Called once the consumer handle for the current term has
    /// finished; lets the codec do any per-term bookkeeping before
    /// `encode_term` is asked to serialize it.
    fn finish_term(&mut self, state: &mut TermState) -> Result<()>;

    /// Serializes `state.longs` and appends any codec-owned bytes to
    /// `bytes_sink`. `absolute` is `true` for the first term in a block
    /// and `false` thereafter, letting the codec delta-encode internal
    /// file pointers within a block (spec.md §4.2 step 5).
    fn encode_term(
        &mut self,
        longs: &mut [u64],
        bytes_sink: &mut dyn OutputSink,
        field: FieldInfo,
        state: &TermState,
        absolute: bool,
    ) -> Result<()>;

    /// Called during segment close.
    fn close(&mut self) -> Result<()>;
}

// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The top-level segment writer (spec.md §4.4 "Segment Close"): sequences
//! fields one at a time, frames `.tim`/`.tip` with header/footer, and
//! writes the trailing field directory.

use crate::checksum::ChecksummedWriter;
use crate::config::BlockTreeOptions;
use crate::error::{Error, Result};
use crate::field_writer::{FieldMeta, FieldWriter};
use crate::output::{FileSink, OutputSink};
use crate::postings::{FieldInfo, PostingsWriter, TermState};
use crate::trailer;
use std::io::Write;

/// The codec name stamped into both file headers (spec.md §4.4: "Headers
/// at the top of each file carry codec name and version").
pub const CODEC_NAME: &str = "BlockTreeTerms";

/// Drives an entire segment's term dictionary and term index across all
/// of its fields.
pub struct Writer<P: PostingsWriter, Wt: Write, Wp: Write> {
    tim: FileSink<ChecksummedWriter<Wt>>,
    tip: FileSink<ChecksummedWriter<Wp>>,
    postings: P,
    opts: BlockTreeOptions,
    field_metas: Vec<FieldMeta>,
    current: Option<FieldWriter>,
}

impl<P: PostingsWriter, Wt: Write, Wp: Write> Writer<P, Wt, Wp> {
    /// Opens a new segment: writes both file headers and the
    /// postings-format header immediately after the terms-dict header
    /// (spec.md §6 `init(out)`).
    pub fn new(tim_writer: Wt, tip_writer: Wp, mut postings: P, opts: BlockTreeOptions) -> Result<Self> {
        let mut tim = FileSink::new(ChecksummedWriter::new(tim_writer));
        let mut tip = FileSink::new(ChecksummedWriter::new(tip_writer));

        trailer::write_header(&mut tim, CODEC_NAME)?;
        trailer::write_header(&mut tip, CODEC_NAME)?;
        postings.init(&mut tim)?;

        Ok(Self {
            tim,
            tip,
            postings,
            opts,
            field_metas: Vec::new(),
            current: None,
        })
    }

    /// Begins a new field. Calls the postings codec's `setField` to
    /// learn `longsSize` (spec.md §6).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invariant`] if a previous field was never
    /// finished.
    pub fn add_field(&mut self, field: FieldInfo) -> Result<()> {
        if self.current.is_some() {
            return Err(Error::Invariant(
                "add_field called while a previous field is still open",
            ));
        }
        let longs_size = self.postings.set_field(field)?;
        self.current = Some(FieldWriter::new(field, self.opts, longs_size));
        Ok(())
    }

    /// `startTerm(term)`: validates ordering and begins a postings
    /// consumer handle for `term` (spec.md §4.1).
    pub fn start_term(&mut self, term: &[u8]) -> Result<P::Consumer> {
        let field_writer = self
            .current
            .as_ref()
            .ok_or(Error::Invariant("start_term called with no open field"))?;
        field_writer.start_term(term)?;
        self.postings.start_term()
    }

    /// Returns a fresh, codec-owned [`TermState`] for the caller to fill
    /// in while driving the postings consumer returned by
    /// [`Self::start_term`].
    pub fn new_term_state(&self) -> TermState {
        self.postings.new_term_state()
    }

    /// `finishTerm(term, stats)` (spec.md §4.1).
    pub fn finish_term(&mut self, term: Vec<u8>, state: TermState) -> Result<()> {
        let field_writer = self
            .current
            .as_mut()
            .ok_or(Error::Invariant("finish_term called with no open field"))?;
        field_writer.finish_term(term, state, &mut self.tim, &mut self.postings)
    }

    /// `finish(sumTotalTermFreq, sumDocFreq, docCount)` (spec.md §4.1):
    /// closes the current field and, if it had any terms, registers its
    /// [`FieldMeta`].
    pub fn finish_field(
        &mut self,
        sum_total_term_freq: Option<u64>,
        sum_doc_freq: u64,
        doc_count: u32,
    ) -> Result<()> {
        let field_writer = self
            .current
            .take()
            .ok_or(Error::Invariant("finish_field called with no open field"))?;

        if let Some(meta) = field_writer.finish(
            sum_total_term_freq,
            sum_doc_freq,
            doc_count,
            &mut self.tim,
            &mut self.tip,
            &mut self.postings,
        )? {
            self.field_metas.push(meta);
        }

        Ok(())
    }

    /// Closes the segment: writes the `.tim` field directory, the
    /// `.tip` `indexStartFP` list, and both files' `dirStart` + checksum
    /// footers (spec.md §4.4).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invariant`] if a field was left unfinished.
    pub fn close(mut self) -> Result<(Wt, Wp)> {
        if self.current.is_some() {
            return Err(Error::Invariant(
                "close called while a field is still open",
            ));
        }

        self.postings.close()?;

        let tim_dir_start = self.tim.file_pointer();
        self.tim.write_vint(self.field_metas.len() as u32)?;
        for meta in &self.field_metas {
            self.tim.write_vint(meta.field_info.field_number)?;
            self.tim.write_vlong(meta.num_terms)?;
            self.tim.write_vint(meta.root_code.len() as u32)?;
            self.tim.write_bytes(&meta.root_code)?;
            if meta.field_info.has_freqs {
                let ttf = meta.sum_total_term_freq.ok_or(Error::Invariant(
                    "has_freqs field summary missing sum_total_term_freq",
                ))?;
                self.tim.write_vlong(ttf)?;
            }
            self.tim.write_vlong(meta.sum_doc_freq)?;
            self.tim.write_vint(meta.doc_count)?;
            self.tim.write_vint(meta.longs_size)?;
            self.tim.write_vint(meta.min_term.len() as u32)?;
            self.tim.write_bytes(&meta.min_term)?;
            self.tim.write_vint(meta.max_term.len() as u32)?;
            self.tim.write_bytes(&meta.max_term)?;
        }
        trailer::write_dir_start(&mut self.tim, tim_dir_start)?;
        let tim_checksum = self.tim.inner().checksum();
        trailer::write_checksum(&mut self.tim, tim_checksum)?;

        let tip_dir_start = self.tip.file_pointer();
        for meta in &self.field_metas {
            self.tip.write_vlong(meta.index_start_fp)?;
        }
        trailer::write_dir_start(&mut self.tip, tip_dir_start)?;
        let tip_checksum = self.tip.inner().checksum();
        trailer::write_checksum(&mut self.tip, tip_checksum)?;

        log::debug!(
            "segment closed: {} field(s), tim bytes={}, tip bytes={}",
            self.field_metas.len(),
            self.tim.file_pointer(),
            self.tip.file_pointer()
        );

        self.tim.inner_mut().flush()?;
        self.tip.inner_mut().flush()?;

        Ok((
            self.tim.into_inner().into_inner(),
            self.tip.into_inner().into_inner(),
        ))
    }

    /// The field summaries registered so far, in finish order.
    #[must_use]
    pub fn field_metas(&self) -> &[FieldMeta] {
        &self.field_metas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postings::{FieldInfo, PostingsConsumer};

    #[derive(Default)]
    struct NoopConsumer;
    impl PostingsConsumer for NoopConsumer {
        fn finish(&mut self) -> Result<()> {
            Ok(())
        }
    }

    /// Minimal fixture codec: zero longs per term, no bytes written.
    #[derive(Default)]
    struct NoopPostingsWriter;
    impl PostingsWriter for NoopPostingsWriter {
        type Consumer = NoopConsumer;

        fn init(&mut self, _out: &mut dyn OutputSink) -> Result<()> {
            Ok(())
        }
        fn set_field(&mut self, _field: FieldInfo) -> Result<u32> {
            Ok(0)
        }
        fn start_term(&mut self) -> Result<Self::Consumer> {
            Ok(NoopConsumer)
        }
        fn new_term_state(&self) -> TermState {
            TermState::default()
        }
        fn finish_term(&mut self, _state: &mut TermState) -> Result<()> {
            Ok(())
        }
        fn encode_term(
            &mut self,
            _longs: &mut [u64],
            _bytes_sink: &mut dyn OutputSink,
            _field: FieldInfo,
            _state: &TermState,
            _absolute: bool,
        ) -> Result<()> {
            Ok(())
        }
        fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn single_tiny_field_round_trips_through_close() {
        let opts = BlockTreeOptions::builder().build().unwrap();
        let mut writer =
            Writer::new(Vec::new(), Vec::new(), NoopPostingsWriter, opts).unwrap();

        writer
            .add_field(FieldInfo {
                field_number: 0,
                has_freqs: false,
            })
            .unwrap();

        for term in [&b"a"[..], b"b", b"c"] {
            writer.start_term(term).unwrap();
            let state = TermState {
                doc_freq: 1,
                ..Default::default()
            };
            writer.finish_term(term.to_vec(), state).unwrap();
        }
        writer.finish_field(None, 3, 3).unwrap();

        assert_eq!(writer.field_metas().len(), 1);
        assert_eq!(writer.field_metas()[0].num_terms, 3);
        assert_eq!(writer.field_metas()[0].min_term, b"a");
        assert_eq!(writer.field_metas()[0].max_term, b"c");

        let (tim_bytes, tip_bytes) = writer.close().unwrap();
        assert!(!tim_bytes.is_empty());
        assert!(!tip_bytes.is_empty());
    }

    #[test]
    fn empty_field_registers_no_meta() {
        let opts = BlockTreeOptions::builder().build().unwrap();
        let mut writer =
            Writer::new(Vec::new(), Vec::new(), NoopPostingsWriter, opts).unwrap();

        writer
            .add_field(FieldInfo {
                field_number: 0,
                has_freqs: false,
            })
            .unwrap();
        writer.finish_field(None, 0, 0).unwrap();

        assert!(writer.field_metas().is_empty());
    }
}

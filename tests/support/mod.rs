// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A minimal postings codec fixture shared by the integration tests,
//! standing in for the real postings format the block-tree writer is
//! designed to be agnostic to (spec.md §6).

use block_tree_terms::{FieldInfo, OutputSink, PostingsConsumer, PostingsWriter, TermState};

pub struct FixtureConsumer;
impl PostingsConsumer for FixtureConsumer {
    fn finish(&mut self) -> block_tree_terms::Result<()> {
        Ok(())
    }
}

/// Declares one long per term (the term's own `doc_freq`, echoed back
/// through `encode_term` so the meta buffer is non-trivially exercised)
/// and appends a fixed two-byte marker to its per-term byte sink.
#[derive(Default)]
pub struct FixturePostingsWriter;

impl PostingsWriter for FixturePostingsWriter {
    type Consumer = FixtureConsumer;

    fn init(&mut self, _out: &mut dyn OutputSink) -> block_tree_terms::Result<()> {
        Ok(())
    }

    fn set_field(&mut self, _field: FieldInfo) -> block_tree_terms::Result<u32> {
        Ok(1)
    }

    fn start_term(&mut self) -> block_tree_terms::Result<Self::Consumer> {
        Ok(FixtureConsumer)
    }

    fn new_term_state(&self) -> TermState {
        TermState::default()
    }

    fn finish_term(&mut self, _state: &mut TermState) -> block_tree_terms::Result<()> {
        Ok(())
    }

    fn encode_term(
        &mut self,
        longs: &mut [u64],
        bytes_sink: &mut dyn OutputSink,
        _field: FieldInfo,
        state: &TermState,
        _absolute: bool,
    ) -> block_tree_terms::Result<()> {
        longs[0] = state.doc_freq;
        bytes_sink.write_bytes(b"po")?;
        Ok(())
    }

    fn close(&mut self) -> block_tree_terms::Result<()> {
        Ok(())
    }
}

pub fn term_state(doc_freq: u64, total_term_freq: Option<u64>) -> TermState {
    TermState {
        doc_freq,
        total_term_freq,
        ..Default::default()
    }
}

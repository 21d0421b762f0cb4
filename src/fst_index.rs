// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A minimal finite-state-transducer-shaped index: a sorted map from byte
//! inputs to byte-sequence outputs (spec.md §4.3, GLOSSARY "FST").
//!
//! The ecosystem's `fst` crate only supports `u64`-valued outputs
//! (`fst::Map`); this format's root entries carry a variable-length
//! floor routing table, which doesn't fit that shape. See SPEC_FULL.md
//! §9 and DESIGN.md for why this is a small hand-written transducer
//! builder rather than a dependency on that crate.
//!
//! Inputs are the *absolute* term-prefix bytes a block or term owns
//! (never stripped relative to a parent), which keeps folding trivial at
//! the cost of not sharing common arc prefixes across siblings on disk —
//! a compression opportunity this implementation forgoes, not a
//! semantic difference a reader would observe.

use crate::error::Result;
use crate::output::OutputSink;
use varint_rs::VarintReader;

/// A compiled, read-only transducer: inputs sorted ascending, each
/// mapped to its output byte sequence.
#[derive(Clone, Debug, Default)]
pub struct Fst {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
}

impl Fst {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[(Vec<u8>, Vec<u8>)] {
        &self.entries
    }

    /// Looks up the output for an exact input match (used to recover
    /// the root code: `get(&[])`).
    #[must_use]
    pub fn get(&self, input: &[u8]) -> Option<&[u8]> {
        self.entries
            .binary_search_by(|(k, _)| k.as_slice().cmp(input))
            .ok()
            .map(|idx| self.entries[idx].1.as_slice())
    }

    /// Serializes this transducer: `vInt(numEntries)` then, per entry,
    /// `vInt(inputLen) ‖ input ‖ vInt(outputLen) ‖ output`, in sorted
    /// input order. This is the byte sequence the spec calls "written by
    /// the FST library's serializer" in §6.
    pub fn encode_into(&self, sink: &mut dyn OutputSink) -> Result<()> {
        sink.write_vint(self.entries.len() as u32)?;
        for (input, output) in &self.entries {
            sink.write_vint(input.len() as u32)?;
            sink.write_bytes(input)?;
            sink.write_vint(output.len() as u32)?;
            sink.write_bytes(output)?;
        }
        Ok(())
    }

    /// Decodes a transducer previously written by [`Self::encode_into`].
    /// Used by this crate's own tests to check the FST-output-decoding
    /// testable property without a full reader implementation (out of
    /// scope per spec.md).
    pub fn decode_from(mut bytes: &[u8]) -> std::io::Result<Self> {
        let count = bytes.read_u32_varint()?;
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let input_len = bytes.read_u32_varint()? as usize;
            let mut input = vec![0u8; input_len];
            std::io::Read::read_exact(&mut bytes, &mut input)?;

            let output_len = bytes.read_u32_varint()? as usize;
            let mut output = vec![0u8; output_len];
            std::io::Read::read_exact(&mut bytes, &mut output)?;

            entries.push((input, output));
        }
        Ok(Self { entries })
    }
}

/// Accumulates `(input, output)` pairs for one `compile_index` call,
/// then sorts and freezes them into an [`Fst`] (spec.md §4.3 step 2-4).
#[derive(Default)]
pub struct FstBuilder {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
}

impl FstBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single `(input, output)` entry (spec.md §4.3 step 2: "Add
    /// `(prefix -> scratchBytes)` as a single entry").
    pub fn add(&mut self, input: Vec<u8>, output: Vec<u8>) {
        self.entries.push((input, output));
    }

    /// Re-adds every entry of a child FST "by enumerating `(input,
    /// output)` pairs" (spec.md §4.3 step 3, §9 "Recursive FST folding").
    pub fn fold_in(&mut self, child: &Fst) {
        self.entries.extend(child.entries.iter().cloned());
    }

    /// Finishes the builder (spec.md §4.3 step 4).
    #[must_use]
    pub fn finish(mut self) -> Fst {
        self.entries.sort_by(|a, b| a.0.cmp(&b.0));
        self.entries.dedup_by(|a, b| a.0 == b.0);
        Fst {
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::ByteBuffer;

    #[test]
    fn builder_sorts_entries_by_input() {
        let mut builder = FstBuilder::new();
        builder.add(b"banana".to_vec(), b"2".to_vec());
        builder.add(b"apple".to_vec(), b"1".to_vec());
        let fst = builder.finish();

        let inputs: Vec<_> = fst.entries().iter().map(|(i, _)| i.clone()).collect();
        assert_eq!(inputs, vec![b"apple".to_vec(), b"banana".to_vec()]);
    }

    #[test]
    fn get_finds_exact_match_including_empty_input() {
        let mut builder = FstBuilder::new();
        builder.add(Vec::new(), b"root".to_vec());
        builder.add(b"a".to_vec(), b"child".to_vec());
        let fst = builder.finish();

        assert_eq!(fst.get(&[]), Some(b"root".as_slice()));
        assert_eq!(fst.get(b"a"), Some(b"child".as_slice()));
        assert_eq!(fst.get(b"z"), None);
    }

    #[test]
    fn fold_in_merges_child_entries() {
        let mut child_builder = FstBuilder::new();
        child_builder.add(b"apple".to_vec(), b"1".to_vec());
        child_builder.add(b"apricot".to_vec(), b"2".to_vec());
        let child = child_builder.finish();

        let mut parent_builder = FstBuilder::new();
        parent_builder.add(b"a".to_vec(), b"self".to_vec());
        parent_builder.fold_in(&child);
        let parent = parent_builder.finish();

        assert_eq!(parent.len(), 3);
        assert_eq!(parent.get(b"apple"), Some(b"1".as_slice()));
        assert_eq!(parent.get(b"apricot"), Some(b"2".as_slice()));
        assert_eq!(parent.get(b"a"), Some(b"self".as_slice()));
    }

    #[test]
    fn encode_then_decode_round_trips() {
        let mut builder = FstBuilder::new();
        builder.add(Vec::new(), vec![1, 2, 3]);
        builder.add(b"x".to_vec(), vec![4, 5]);
        let fst = builder.finish();

        let mut buf = ByteBuffer::new();
        fst.encode_into(&mut buf).unwrap();

        let decoded = Fst::decode_from(buf.as_slice()).unwrap();
        assert_eq!(decoded.entries(), fst.entries());
    }
}

// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The output sink interface (spec.md §6): a sequential byte writer with a
//! known current file offset, plus the `ByteBuffer` scratch sink used for
//! the suffix/stats/meta/FST buffers that are reused across blocks.

use crate::error::Result;
use byteorder::{BigEndian, WriteBytesExt};
use std::io::Write;
use varint_rs::VarintWriter as _;

/// A sequential write sink with a known current file offset.
///
/// Implemented both by the real `.tim`/`.tip` file writers and by the
/// in-memory [`ByteBuffer`] scratch sink, so the block emitter and index
/// builder can be written once against the trait.
pub trait OutputSink: Write {
    /// Current byte offset the next write will land at.
    fn file_pointer(&self) -> u64;

    fn write_byte(&mut self, b: u8) -> Result<()> {
        self.write_all(&[b])?;
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_all(bytes)?;
        Ok(())
    }

    /// Unsigned variable-length 32-bit integer (7-bit groups, MSB
    /// continuation).
    fn write_vint(&mut self, value: u32) -> Result<()> {
        self.write_u32_varint(value)?;
        Ok(())
    }

    /// Unsigned variable-length 64-bit integer.
    fn write_vlong(&mut self, value: u64) -> Result<()> {
        self.write_u64_varint(value)?;
        Ok(())
    }

    /// Fixed-width 8-byte big-endian integer, used only for the trailer's
    /// `dirStart` field (spec.md §4.4).
    fn write_long(&mut self, value: u64) -> Result<()> {
        WriteBytesExt::write_u64::<BigEndian>(self, value)?;
        Ok(())
    }
}

/// An in-memory scratch buffer. Reused across terms and blocks, reset
/// after each flush (spec.md §5, §9).
#[derive(Default, Debug)]
pub struct ByteBuffer {
    buf: Vec<u8>,
}

impl ByteBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Flushes this buffer's contents into `other`, without resetting
    /// `self` (callers reset explicitly once all three scratch buffers
    /// for a block have been flushed).
    pub fn write_to<W: Write>(&self, other: &mut W) -> Result<()> {
        other.write_all(&self.buf)?;
        Ok(())
    }
}

impl Write for ByteBuffer {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
        self.buf.write(bytes)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl OutputSink for ByteBuffer {
    fn file_pointer(&self) -> u64 {
        self.buf.len() as u64
    }
}

/// A file-backed output sink tracking its own byte offset, mirroring the
/// teacher's `BufWriter<File>`-backed segment writer.
pub struct FileSink<W> {
    inner: W,
    pos: u64,
}

impl<W: Write> FileSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, pos: 0 }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn inner_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn inner(&self) -> &W {
        &self.inner
    }
}

impl<W: Write> Write for FileSink<W> {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(bytes)?;
        self.pos += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write> OutputSink for FileSink<W> {
    fn file_pointer(&self) -> u64 {
        self.pos
    }
}

// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Shared header/footer framing for `.tim` and `.tip` (spec.md §4.4, §6:
//! "Header/footer framing ... is specified only as a boundary contract").
//!
//! Mirrors the teacher's segment file framing: a fixed magic + codec name
//! + version header, and a footer carrying a whole-file checksum.

use crate::checksum::Checksum;
use crate::error::Result;
use crate::output::OutputSink;

/// Leading magic shared by both output files, so a reader can fail fast
/// on a file that isn't one of ours.
pub const MAGIC: u32 = 0x3142_5442; // "1BTB"

/// Current on-disk format version: "the one that records min/max terms
/// (and checksums, longsSize, append-only format)" (spec.md §4.4).
pub const FORMAT_VERSION: u32 = 1;

/// Writes the shared file header: magic, codec name, format version.
pub fn write_header(out: &mut dyn OutputSink, codec_name: &str) -> Result<()> {
    out.write_long(u64::from(MAGIC))?;
    out.write_vint(codec_name.len() as u32)?;
    out.write_bytes(codec_name.as_bytes())?;
    out.write_vint(FORMAT_VERSION)?;
    Ok(())
}

/// Writes the trailing `dirStart` pointer.
///
/// Callers must snapshot the whole-file checksum *after* this call, not
/// before, so `dirStart`'s own bytes are covered by the checksum they
/// then pass to [`write_checksum`] (spec.md §4.4: "Both files are then
/// closed with ... `dirStart` ... followed by a codec footer").
pub fn write_dir_start(out: &mut dyn OutputSink, dir_start: u64) -> Result<()> {
    out.write_long(dir_start)
}

/// Writes the trailing checksum footer. `checksum` must be snapshotted
/// after [`write_dir_start`] runs on the same sink.
pub fn write_checksum(out: &mut dyn OutputSink, checksum: Checksum) -> Result<()> {
    let raw = checksum.into_u128();
    out.write_long(raw as u64)?;
    out.write_long((raw >> 64) as u64)?;
    Ok(())
}

// Error handling for the block-tree terms writer.

use thiserror::Error;

/// A bad-parameter or out-of-order-input error, surfaced to the caller
/// immediately without touching either output sink.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// `min_items_in_block` / `max_items_in_block` violate the constraint
    /// in spec.md §4.2 / §6.
    #[error(
        "invalid block size config: min_items_in_block={min}, max_items_in_block={max} \
         (require 2 <= min <= max and 2*(min-1) <= max)"
    )]
    BadBlockSizeConfig { min: u32, max: u32 },

    /// `start_term` / `finish_term` received a term that does not sort
    /// strictly after the previous term pushed for this field.
    #[error("terms out of order: {prev:?} was followed by {next:?}")]
    TermsOutOfOrder { prev: Vec<u8>, next: Vec<u8> },

    /// A term's `doc_freq` was zero (or, conceptually, negative).
    #[error("doc_freq must be > 0, got {0}")]
    NonPositiveDocFreq(u64),

    /// `total_term_freq < doc_freq` while the field records frequencies.
    #[error("total_term_freq ({ttf}) must be >= doc_freq ({df})")]
    TotalTermFreqBelowDocFreq { ttf: u64, df: u64 },
}

/// Errors that can occur while writing a block-tree term dictionary.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error writing to `.tim`, `.tip`, or a scratch buffer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A constructor or call-site contract was violated.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// An internal invariant was violated — a programming bug, not a
    /// caller error. The writer must be abandoned.
    #[error("internal invariant violated: {0}")]
    Invariant(&'static str),

    /// An error surfaced by the pluggable postings codec.
    #[error("postings codec error: {0}")]
    Postings(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

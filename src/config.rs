// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Block size policy for the block-tree terms writer (spec.md §4.2, §6).

use crate::error::{Error, ValidationError};

/// Default minimum entries per dictionary block.
pub const DEFAULT_MIN_ITEMS_IN_BLOCK: u32 = 25;

/// Default maximum entries per dictionary block.
pub const DEFAULT_MAX_ITEMS_IN_BLOCK: u32 = 48;

/// Validated block-size configuration.
///
/// Constructed only through [`BlockTreeOptions::build`], so an invalid
/// combination of `min`/`max` can never reach the writer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BlockTreeOptions {
    min_items_in_block: u32,
    max_items_in_block: u32,
}

impl Default for BlockTreeOptions {
    fn default() -> Self {
        Self {
            min_items_in_block: DEFAULT_MIN_ITEMS_IN_BLOCK,
            max_items_in_block: DEFAULT_MAX_ITEMS_IN_BLOCK,
        }
    }
}

/// Builder for [`BlockTreeOptions`].
#[derive(Copy, Clone, Debug)]
pub struct BlockTreeOptionsBuilder {
    min_items_in_block: u32,
    max_items_in_block: u32,
}

impl Default for BlockTreeOptionsBuilder {
    fn default() -> Self {
        let defaults = BlockTreeOptions::default();
        Self {
            min_items_in_block: defaults.min_items_in_block,
            max_items_in_block: defaults.max_items_in_block,
        }
    }
}

impl BlockTreeOptionsBuilder {
    #[must_use]
    pub fn with_min_items_in_block(mut self, min: u32) -> Self {
        self.min_items_in_block = min;
        self
    }

    #[must_use]
    pub fn with_max_items_in_block(mut self, max: u32) -> Self {
        self.max_items_in_block = max;
        self
    }

    /// Validates and finalizes the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::BadBlockSizeConfig`] unless
    /// `2 <= min <= max`, `1 <= max`, and `2*(min-1) <= max`.
    pub fn build(self) -> Result<BlockTreeOptions, Error> {
        let min = self.min_items_in_block;
        let max = self.max_items_in_block;

        let valid = min >= 2
            && max >= 1
            && min <= max
            && 2u64.saturating_mul(u64::from(min.saturating_sub(1))) <= u64::from(max);

        if !valid {
            return Err(ValidationError::BadBlockSizeConfig { min, max }.into());
        }

        Ok(BlockTreeOptions {
            min_items_in_block: min,
            max_items_in_block: max,
        })
    }
}

impl BlockTreeOptions {
    #[must_use]
    pub fn builder() -> BlockTreeOptionsBuilder {
        BlockTreeOptionsBuilder::default()
    }

    #[must_use]
    pub fn min_items_in_block(&self) -> u32 {
        self.min_items_in_block
    }

    #[must_use]
    pub fn max_items_in_block(&self) -> u32 {
        self.max_items_in_block
    }
}

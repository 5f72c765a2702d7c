//! Index configuration
//!
//! Controls the starting directory size, the fill ratio that triggers a
//! split, how much of the directory a split rescans, and write durability.

use crate::{IndexError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of distinct hash values (`hash(id) = id mod 256`).
pub const HASH_SPACE: u32 = 256;

/// Buckets visited by the rehash pass of a split.
///
/// Both scopes leave every record in the same bucket; they differ only in
/// how many page chains are read per split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RehashScope {
    /// Rescan every active bucket (O(n) pages per split)
    #[default]
    AllBuckets,

    /// Rescan only the bucket whose records can move to the new address
    SplitSource,
}

/// Linear hash index configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Primary buckets created up front (power of two, at most 256)
    pub initial_buckets: u32,

    /// Primary-page fill ratio at or above which one bucket is split
    pub expand_threshold: f64,

    /// Buckets visited when relocating records after a split
    pub rehash_scope: RehashScope,

    /// Call `sync_data` after every page write
    pub sync_on_write: bool,

    /// Field separator for bulk-load input
    pub delimiter: char,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            initial_buckets: 4,
            expand_threshold: 0.7,
            rehash_scope: RehashScope::AllBuckets,
            sync_on_write: false,
            delimiter: ',',
        }
    }
}

impl IndexConfig {
    /// Small directory, no fsync: splits happen early in tests
    pub fn for_testing() -> Self {
        Self {
            initial_buckets: 4,
            sync_on_write: false,
            ..Default::default()
        }
    }

    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Number of hash bits needed to address the initial directory
    pub fn initial_address_bits(&self) -> u32 {
        self.initial_buckets.trailing_zeros()
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_buckets == 0
            || !self.initial_buckets.is_power_of_two()
            || self.initial_buckets > HASH_SPACE
        {
            return Err(IndexError::InvalidConfig(format!(
                "initial_buckets must be a power of two in 1..={}, got {}",
                HASH_SPACE, self.initial_buckets
            )));
        }

        if !(self.expand_threshold > 0.0 && self.expand_threshold <= 1.0) {
            return Err(IndexError::InvalidConfig(format!(
                "expand_threshold must be in (0, 1], got {}",
                self.expand_threshold
            )));
        }

        if self.delimiter == '\n' || self.delimiter == '\r' {
            return Err(IndexError::InvalidConfig(
                "delimiter cannot be a line terminator".into(),
            ));
        }

        Ok(())
    }
}

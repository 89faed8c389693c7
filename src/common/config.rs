//! Configuration constants and the cache configuration value.

use crate::common::{Error, Result};

/// Size of a page in bytes (8KB).
///
/// Matches the block size of the storage engine whose cache we administer.
/// Every slot holds exactly one page of this size.
pub const PAGE_SIZE: usize = 8192;

/// Number of slots in a default-sized pool (128MB of pages).
pub const DEFAULT_POOL_SIZE: usize = 16384;

/// Number of hash index partitions, each with its own shard lock.
pub const NUM_HASH_PARTITIONS: usize = 128;

/// Ceiling for the usage counter kept in the slot state word.
pub const MAX_USAGE_COUNT: u32 = 5;

/// Ceiling for the pin count kept in the slot state word (18 bits).
pub const MAX_PIN_COUNT: u32 = (1 << 18) - 1;

/// Sizing of a [`SharedCache`](crate::buffer::SharedCache).
///
/// Both values are fixed once the cache is built: slots are never added or
/// removed, and the partition count decides which shard a tag hashes into.
///
/// # Example
/// ```
/// use bufctl::common::config::CacheConfig;
///
/// let config = CacheConfig::default().with_pool_size(64);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.pool_size, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Number of shared slots.
    pub pool_size: usize,

    /// Number of hash index shards. Must be a power of two.
    pub hash_partitions: usize,
}

impl CacheConfig {
    /// Set the number of shared slots.
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Set the number of hash index shards.
    pub fn with_hash_partitions(mut self, hash_partitions: usize) -> Self {
        self.hash_partitions = hash_partitions;
        self
    }

    /// Check that the configuration describes a buildable cache.
    ///
    /// Slot numbers are exposed as positive `i32`, so the pool cannot be
    /// larger than `i32::MAX` slots.
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(Error::InvalidConfig("pool_size must be > 0".into()));
        }
        if self.pool_size > i32::MAX as usize {
            return Err(Error::InvalidConfig(format!(
                "pool_size {} exceeds the addressable slot range",
                self.pool_size
            )));
        }
        if self.hash_partitions == 0 || !self.hash_partitions.is_power_of_two() {
            return Err(Error::InvalidConfig(format!(
                "hash_partitions must be a power of two, got {}",
                self.hash_partitions
            )));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            hash_partitions: NUM_HASH_PARTITIONS,
        }
    }
}

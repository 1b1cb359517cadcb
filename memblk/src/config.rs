//! Startup configuration for a memblk device.
//! These values come from whatever parameter surface the host provides;
//! the core only consumes them as plain numbers.

use crate::device::block::DEFAULT_SECTOR_SIZE;
use crate::errors::DiskError;

/// Default number of sectors (1 MiB at 512-byte sectors)
pub const DEFAULT_SECTOR_COUNT: u64 = 2048;

/// Default number of minor slots reserved for partitions
pub const DEFAULT_PARTITION_COUNT: usize = 16;

/// Size parameters for a device, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskConfig {
    /// Total number of logical sectors
    pub sector_count: u64,
    /// Bytes per logical sector
    pub sector_size: usize,
    /// Partition slots to reserve on registration (not used by transfers)
    pub partition_count: usize,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            sector_count: DEFAULT_SECTOR_COUNT,
            sector_size: DEFAULT_SECTOR_SIZE,
            partition_count: DEFAULT_PARTITION_COUNT,
        }
    }
}

impl DiskConfig {
    /// Create a config with the given geometry and the default partition count
    pub fn new(sector_count: u64, sector_size: usize) -> Self {
        Self {
            sector_count,
            sector_size,
            partition_count: DEFAULT_PARTITION_COUNT,
        }
    }

    /// Check that the configuration describes a usable device
    pub fn validate(&self) -> Result<(), DiskError> {
        if self.sector_count == 0 || self.sector_size == 0 {
            return Err(DiskError::InvalidConfig);
        }
        self.capacity_bytes()?;
        Ok(())
    }

    /// Total addressable size in bytes
    pub fn capacity_bytes(&self) -> Result<u64, DiskError> {
        self.sector_count
            .checked_mul(self.sector_size as u64)
            .ok_or(DiskError::InvalidConfig)
    }
}

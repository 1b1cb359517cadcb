use crate::errors::DiskError;
use crate::geometry::Geometry;

/// A marker trait for BlockDevice, ensures Send+Sync for all block devices
pub trait BlockDeviceMarker: Send + Sync {}

/// Interface for sector-addressed storage devices
pub trait BlockDevice: BlockDeviceMarker {
    /// Return a human-readable name for the device
    fn name(&self) -> &str;

    /// Return the sector size in bytes
    fn sector_size(&self) -> usize;

    /// Return the total number of sectors
    fn sector_count(&self) -> u64;

    /// Return the total capacity in bytes
    fn capacity_bytes(&self) -> u64 {
        self.sector_count() * (self.sector_size() as u64)
    }

    /// Return the geometry reported for this device
    fn geometry(&self) -> Geometry {
        Geometry::from_capacity(self.capacity_bytes())
    }

    /// Read `nr_sectors` sectors starting at `sector` into the provided buffer.
    /// The buffer length must be exactly `nr_sectors * sector_size`.
    fn read_sectors(&self, sector: u64, nr_sectors: u32, buffer: &mut [u8])
        -> Result<(), DiskError>;

    /// Write `nr_sectors` sectors starting at `sector` from the provided buffer.
    /// The buffer length must be exactly `nr_sectors * sector_size`.
    fn write_sectors(&self, sector: u64, nr_sectors: u32, buffer: &[u8])
        -> Result<(), DiskError>;
}

// A common default; hosts that speak 4K sectors can override it in DiskConfig.
pub const DEFAULT_SECTOR_SIZE: usize = 512;

use super::block::{BlockDevice, BlockDeviceMarker};
use crate::config::DiskConfig;
use crate::errors::DiskError;
use crate::logger;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use spin::Mutex;

/// A fixed-capacity block device backed entirely by process memory.
///
/// The backing store is owned exclusively by the disk and is only
/// reachable through the bounds-checked sector transfer methods. A
/// single lock serializes every transfer; the bounds check and the copy
/// happen under the same acquisition, so no request can ever observe a
/// partially-copied range.
pub struct RamDisk {
    name: String,
    sector_size: usize,
    sector_count: u64,
    data: Mutex<Vec<u8>>,
}

impl RamDisk {
    /// Allocate a new zero-filled disk described by `config`.
    ///
    /// Fails with `InvalidConfig` for unusable size parameters and with
    /// `AllocationFailed` if the backing store cannot be reserved. On
    /// failure nothing is left behind to release.
    pub fn new(name: &str, config: DiskConfig) -> Result<Self, DiskError> {
        config.validate()?;
        let capacity = config.capacity_bytes()?;
        let capacity: usize = capacity
            .try_into()
            .map_err(|_| DiskError::AllocationFailed)?;

        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| DiskError::AllocationFailed)?;
        data.resize(capacity, 0);

        logger::info(
            "ramdisk",
            &format!(
                "{}: allocated {} bytes ({} sectors of {} bytes)",
                name, capacity, config.sector_count, config.sector_size
            ),
        );

        Ok(RamDisk {
            name: name.to_string(),
            sector_size: config.sector_size,
            sector_count: config.sector_count,
            data: Mutex::new(data),
        })
    }

    /// Translate a sector range to a byte range, refusing any range that
    /// is not fully inside the store. `store_len` is the locked store's
    /// length, so the check and the copy agree on the capacity.
    fn byte_range(
        &self,
        sector: u64,
        nr_sectors: u32,
        store_len: usize,
    ) -> Result<(usize, usize), DiskError> {
        let sector_size = self.sector_size as u64;
        let offset = sector
            .checked_mul(sector_size)
            .ok_or(DiskError::OutOfBounds)?;
        let length = (nr_sectors as u64)
            .checked_mul(sector_size)
            .ok_or(DiskError::OutOfBounds)?;
        let end = offset.checked_add(length).ok_or(DiskError::OutOfBounds)?;

        if end > store_len as u64 {
            return Err(DiskError::OutOfBounds);
        }

        Ok((offset as usize, end as usize))
    }

    /// Check that a caller buffer matches the requested sector count
    fn check_buffer(&self, nr_sectors: u32, buffer_len: usize) -> Result<(), DiskError> {
        let expected = (nr_sectors as usize)
            .checked_mul(self.sector_size)
            .ok_or(DiskError::BufferSizeMismatch)?;
        if buffer_len != expected {
            return Err(DiskError::BufferSizeMismatch);
        }
        Ok(())
    }
}

impl BlockDevice for RamDisk {
    fn name(&self) -> &str {
        &self.name
    }

    fn sector_size(&self) -> usize {
        self.sector_size
    }

    fn sector_count(&self) -> u64 {
        self.sector_count
    }

    fn read_sectors(
        &self,
        sector: u64,
        nr_sectors: u32,
        buffer: &mut [u8],
    ) -> Result<(), DiskError> {
        self.check_buffer(nr_sectors, buffer.len())?;

        let data = self.data.lock();
        let (start, end) = self.byte_range(sector, nr_sectors, data.len())?;
        buffer.copy_from_slice(&data[start..end]);
        Ok(())
    }

    fn write_sectors(
        &self,
        sector: u64,
        nr_sectors: u32,
        buffer: &[u8],
    ) -> Result<(), DiskError> {
        self.check_buffer(nr_sectors, buffer.len())?;

        let mut data = self.data.lock();
        let (start, end) = self.byte_range(sector, nr_sectors, data.len())?;
        data[start..end].copy_from_slice(buffer);
        Ok(())
    }
}

impl BlockDeviceMarker for RamDisk {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use alloc::vec;

    fn test_disk() -> RamDisk {
        RamDisk::new("utest-ramdisk", DiskConfig::default()).expect("allocation failed")
    }

    #[test]
    fn write_then_read_roundtrip() {
        let disk = test_disk();
        let pattern = [0xABu8; 512];

        disk.write_sectors(0, 1, &pattern).expect("write failed");

        let mut out = [0u8; 512];
        disk.read_sectors(0, 1, &mut out).expect("read failed");
        assert_eq!(out, pattern);
    }

    #[test]
    fn fresh_disk_reads_zero() {
        let disk = test_disk();
        let mut out = [0xFFu8; 512];
        disk.read_sectors(17, 1, &mut out).expect("read failed");
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn last_sector_is_writable() {
        let disk = test_disk();
        let pattern = [0x5Au8; 512];
        disk.write_sectors(2047, 1, &pattern).expect("write failed");

        let mut out = [0u8; 512];
        disk.read_sectors(2047, 1, &mut out).expect("read failed");
        assert_eq!(out, pattern);
    }

    #[test]
    fn one_past_last_sector_is_rejected() {
        let disk = test_disk();
        let buf = [0u8; 512];
        assert_eq!(
            disk.write_sectors(2048, 1, &buf),
            Err(DiskError::OutOfBounds)
        );
    }

    #[test]
    fn straddling_the_end_is_rejected_without_partial_copy() {
        let disk = test_disk();

        // A two-sector write at the last sector would stick out by one.
        let buf = [0xEEu8; 1024];
        assert_eq!(
            disk.write_sectors(2047, 2, &buf),
            Err(DiskError::OutOfBounds)
        );

        // The in-bounds half must be untouched.
        let mut out = [0xFFu8; 512];
        disk.read_sectors(2047, 1, &mut out).expect("read failed");
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn sector_arithmetic_overflow_is_rejected() {
        let disk = test_disk();
        let buf = [0u8; 512];
        assert_eq!(
            disk.write_sectors(u64::MAX, 1, &buf),
            Err(DiskError::OutOfBounds)
        );
    }

    #[test]
    fn buffer_length_must_match_sector_count() {
        let disk = test_disk();

        let short = [0u8; 256];
        assert_eq!(
            disk.write_sectors(0, 1, &short),
            Err(DiskError::BufferSizeMismatch)
        );

        let mut long = [0u8; 1024];
        assert_eq!(
            disk.read_sectors(0, 1, &mut long),
            Err(DiskError::BufferSizeMismatch)
        );
    }

    #[test]
    fn multi_sector_transfers() {
        let disk = test_disk();

        let mut pattern = vec![0u8; 4 * 512];
        for (i, chunk) in pattern.chunks_mut(512).enumerate() {
            chunk.fill(i as u8 + 1);
        }
        disk.write_sectors(10, 4, &pattern).expect("write failed");

        // Read the same range back in one transfer and per sector.
        let mut out = vec![0u8; 4 * 512];
        disk.read_sectors(10, 4, &mut out).expect("read failed");
        assert_eq!(out, pattern);

        for i in 0..4u64 {
            let mut one = [0u8; 512];
            disk.read_sectors(10 + i, 1, &mut one).expect("read failed");
            assert!(one.iter().all(|&b| b == i as u8 + 1));
        }
    }

    #[test]
    fn geometry_matches_capacity() {
        let disk = test_disk();
        let geo = disk.geometry();
        assert_eq!(geo, Geometry::from_capacity(1_048_576));
        assert_eq!(geo.cylinders, 16384);

        // Pure function of capacity: asking twice changes nothing.
        assert_eq!(disk.geometry(), geo);
    }

    #[test]
    fn reported_sizes_match_config() {
        let disk = RamDisk::new("utest-sizes", DiskConfig::new(64, 4096)).unwrap();
        assert_eq!(disk.sector_count(), 64);
        assert_eq!(disk.sector_size(), 4096);
        assert_eq!(disk.capacity_bytes(), 64 * 4096);
    }

    #[test]
    fn invalid_config_never_allocates() {
        assert_eq!(
            RamDisk::new("utest-bad", DiskConfig::new(0, 512)).err(),
            Some(DiskError::InvalidConfig)
        );
    }
}

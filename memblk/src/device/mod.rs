// memblk/src/device/mod.rs
//! Device framework and lifecycle management.
//! Devices are created as owned values and attached to a process-wide
//! registry; the host reaches a device through its handle.

pub mod block;
pub mod ramdisk;

use self::block::BlockDevice;
use self::ramdisk::RamDisk;
use crate::config::DiskConfig;
use crate::errors::DiskError;
use crate::logger;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};
use lazy_static::lazy_static;
use spin::Mutex;

/// Unique ID generator for devices
static NEXT_DEVICE_ID: AtomicU64 = AtomicU64::new(1);

/// Generates a unique device ID
fn generate_device_id() -> u64 {
    NEXT_DEVICE_ID.fetch_add(1, Ordering::SeqCst)
}

/// Opaque handle to a registered device
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DeviceHandle(u64);

impl DeviceHandle {
    /// The raw numeric ID behind the handle
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// One registry slot: the device plus the attachment metadata the host
/// supplied when it was created.
struct DeviceEntry {
    handle: DeviceHandle,
    name: String,
    partition_count: usize,
    device: Arc<dyn BlockDevice>,
}

lazy_static! {
    static ref DEVICE_REGISTRY: Mutex<Vec<DeviceEntry>> = Mutex::new(Vec::new());
}

/// Register a device with the system.
/// Refuses a second device under an already-taken name.
pub fn register_device(
    device: Arc<dyn BlockDevice>,
    partition_count: usize,
) -> Result<DeviceHandle, DiskError> {
    let mut registry = DEVICE_REGISTRY.lock();

    if registry.iter().any(|entry| entry.name == device.name()) {
        logger::error(
            "device",
            &format!("'{}' is already registered, refusing", device.name()),
        );
        return Err(DiskError::RegistrationFailed);
    }

    let handle = DeviceHandle(generate_device_id());
    let name = device.name().to_string();
    registry.push(DeviceEntry {
        handle,
        name: name.clone(),
        partition_count,
        device,
    });

    logger::info(
        "device",
        &format!("registered '{}' as device {}", name, handle.raw()),
    );
    Ok(handle)
}

/// Allocate a RAM-backed disk and attach it to the registry.
///
/// Allocation failures abort creation before anything is registered.
/// If registration is refused the just-allocated backing store is
/// released on return and the device never becomes visible.
pub fn create_ramdisk(name: &str, config: DiskConfig) -> Result<DeviceHandle, DiskError> {
    let disk: Arc<dyn BlockDevice> = Arc::new(RamDisk::new(name, config)?);
    register_device(disk, config.partition_count)
}

/// Detach a device from the registry.
/// The backing store is freed once the last outstanding reference drops.
pub fn destroy(handle: DeviceHandle) -> Result<(), DiskError> {
    let mut registry = DEVICE_REGISTRY.lock();

    let position = registry.iter().position(|entry| entry.handle == handle);
    match position {
        Some(position) => {
            let entry = registry.remove(position);
            logger::info(
                "device",
                &format!("unregistered '{}' (device {})", entry.name, handle.raw()),
            );
            Ok(())
        }
        None => {
            logger::warning(
                "device",
                &format!("destroy of unknown device {}", handle.raw()),
            );
            Err(DiskError::DeviceNotFound)
        }
    }
}

/// Get a specific device by handle
pub fn get_device(handle: DeviceHandle) -> Option<Arc<dyn BlockDevice>> {
    let registry = DEVICE_REGISTRY.lock();
    registry
        .iter()
        .find(|entry| entry.handle == handle)
        .map(|entry| entry.device.clone())
}

/// Get a specific device by name
pub fn get_device_by_name(name: &str) -> Option<Arc<dyn BlockDevice>> {
    let registry = DEVICE_REGISTRY.lock();
    registry
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| entry.device.clone())
}

/// Partition slots reserved when the device was attached
pub fn partition_count(handle: DeviceHandle) -> Option<usize> {
    let registry = DEVICE_REGISTRY.lock();
    registry
        .iter()
        .find(|entry| entry.handle == handle)
        .map(|entry| entry.partition_count)
}

/// Number of currently attached devices
pub fn device_count() -> usize {
    DEVICE_REGISTRY.lock().len()
}

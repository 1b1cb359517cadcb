// memblk/src/errors.rs
//! Error types for the memblk crate

use core::fmt;

/// Represents the different failure modes of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskError {
    /// Requested sector range extends past the end of the device
    OutOfBounds,
    /// Request is not sector-addressed filesystem I/O
    UnsupportedRequest,
    /// Buffer length does not match the requested sector count
    BufferSizeMismatch,
    /// Configuration values are unusable (zero sizes, capacity overflow)
    InvalidConfig,
    /// Backing store could not be allocated
    AllocationFailed,
    /// Device could not be attached to the registry
    RegistrationFailed,
    /// No device registered under the given handle or name
    DeviceNotFound,
}

impl DiskError {
    /// Get a string representation of the error
    pub fn to_str(&self) -> &'static str {
        match self {
            DiskError::OutOfBounds => "Sector range out of bounds",
            DiskError::UnsupportedRequest => "Unsupported request type",
            DiskError::BufferSizeMismatch => "Buffer size mismatch",
            DiskError::InvalidConfig => "Invalid configuration",
            DiskError::AllocationFailed => "Allocation failed",
            DiskError::RegistrationFailed => "Registration failed",
            DiskError::DeviceNotFound => "Device not found",
        }
    }
}

impl fmt::Display for DiskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_to_str() {
        let err = DiskError::OutOfBounds;
        assert_eq!(format!("{}", err), err.to_str());
    }
}

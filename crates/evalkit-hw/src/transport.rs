//! Register transport and connection contracts.
//!
//! The vendor bus itself lives outside this crate. Anything that can read
//! and write little-endian bytes at flat addresses can drive a [`Sensor`].
//!
//! [`Sensor`]: crate::Sensor

use evalkit_core::{ModelConfig, TransportError};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Blocking request/response access to a device's register space.
///
/// Implementations are not expected to be thread-safe; the facade owns its
/// transport exclusively and callers serialize access around it.
pub trait RegisterTransport {
    /// Read `size` bytes starting at `address`.
    fn read(&mut self, address: u64, size: u8) -> Result<Vec<u8>, TransportError>;

    /// Write `data` starting at `address`.
    fn write(&mut self, address: u64, data: &[u8]) -> Result<(), TransportError>;

    /// Block while a device-side operation settles.
    fn settle(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    /// Release the underlying connection. Called at most once.
    fn close(&mut self);
}

/// Opens a transport bound to one physical board.
pub trait Connector {
    type Transport: RegisterTransport;

    fn open(&self, paths: &ConnectionPaths) -> Result<Self::Transport, TransportError>;
}

/// Vendor SDK binary and transport descriptor used to open a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionPaths {
    pub binary: PathBuf,
    pub descriptor: PathBuf,
}

impl ConnectionPaths {
    pub fn new(binary: impl Into<PathBuf>, descriptor: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            descriptor: descriptor.into(),
        }
    }

    /// Default install locations for `model`, optionally under another bin directory.
    pub fn for_model(model: &ModelConfig, bin_dir: Option<&Path>) -> Self {
        let dir = bin_dir.unwrap_or_else(|| Path::new(model.default_bin_dir));
        Self::new(
            dir.join(model.default_binary_name),
            dir.join(model.default_descriptor_name),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalkit_core::TOPAZ;

    #[test]
    fn test_paths_for_model_default_dir() {
        let paths = ConnectionPaths::for_model(&TOPAZ, None);
        assert!(paths.binary.ends_with("pigentl-sdk.dll"));
        assert!(paths.descriptor.ends_with("pigentl.cti"));
        assert!(paths.binary.starts_with(TOPAZ.default_bin_dir));
    }

    #[test]
    fn test_paths_for_model_override_dir() {
        let paths = ConnectionPaths::for_model(&TOPAZ, Some(Path::new("/opt/pigentl/bin")));
        assert_eq!(paths.binary, PathBuf::from("/opt/pigentl/bin/pigentl-sdk.dll"));
        assert_eq!(paths.descriptor, PathBuf::from("/opt/pigentl/bin/pigentl.cti"));
    }
}

//! In-memory evaluation board for bring-up, dry runs and tests.
//!
//! Registers are stored per address exactly as written. Every bus operation
//! is appended to a log so callers can check ordering, delays and the
//! absence of I/O. Failures can be injected per write index or per address.

use crate::transport::{ConnectionPaths, Connector, RegisterTransport};
use evalkit_core::{BootstrapRegister, ModelConfig, SensorRegister, TransportError};
use std::collections::HashMap;
use std::time::Duration;

/// One recorded bus operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusOp {
    Read { address: u64, size: u8 },
    Write { address: u64, data: Vec<u8> },
    Settle(Duration),
    Close,
}

#[derive(Debug, Default)]
pub struct SimulatedBus {
    registers: HashMap<u64, Vec<u8>>,
    log: Vec<BusOp>,
    writes_seen: usize,
    fail_write_index: Option<usize>,
    failing_addresses: Vec<u64>,
    short_reads: HashMap<u64, usize>,
}

impl SimulatedBus {
    /// A bus with every register reading as zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// A bus seeded with plausible power-on contents for `model`.
    pub fn for_model(model: &ModelConfig) -> Self {
        let mut bus = Self::new();
        let mut seed_str = |key: BootstrapRegister, text: &str| {
            if let Ok(spec) = model.bootstrap.resolve(key) {
                let mut raw = text.as_bytes().to_vec();
                raw.resize(usize::from(spec.width), 0);
                bus.registers.insert(spec.address, raw);
            }
        };
        seed_str(BootstrapRegister::DeviceVendorName, "Teledyne e2v");
        seed_str(BootstrapRegister::DeviceModelName, model.name);
        seed_str(BootstrapRegister::DeviceVersion, "EK-1.0");
        seed_str(BootstrapRegister::DeviceFirmwareVersion, "1.0.0");
        seed_str(BootstrapRegister::SerialNumber, "SIM000001");

        let (width, height) = if model.thermal.is_some() { (2048u32, 2048u32) } else { (1920, 1080) };
        let mono8 = model.pixel_formats.entries().first().map_or(0, |f| f.code);
        for (key, value) in [
            (BootstrapRegister::SensorWidth, width),
            (BootstrapRegister::SensorHeight, height),
            (BootstrapRegister::PixelFormat, mono8),
        ] {
            if let Ok(spec) = model.bootstrap.resolve(key) {
                bus.registers.insert(spec.address, value.to_le_bytes().to_vec());
            }
        }

        for (key, value) in [
            (SensorRegister::LineLength, 1000u16),
            (SensorRegister::ExposureTime, 1250),
            (SensorRegister::ThermoReadout, 512),
        ] {
            if let Ok(spec) = model.sensor.resolve(key) {
                bus.registers.insert(spec.address, value.to_le_bytes().to_vec());
            }
        }
        bus
    }

    /// Make the `index`-th write from now (0-based) fail.
    pub fn fail_write_at(&mut self, index: usize) {
        self.fail_write_index = Some(self.writes_seen + index);
    }

    /// Make every access to `address` time out.
    pub fn fail_address(&mut self, address: u64) {
        self.failing_addresses.push(address);
    }

    /// Answer reads at `address` with only `len` bytes.
    pub fn short_read(&mut self, address: u64, len: usize) {
        self.short_reads.insert(address, len);
    }

    /// Set a register directly, bypassing the log.
    pub fn set(&mut self, address: u64, data: &[u8]) {
        self.registers.insert(address, data.to_vec());
    }

    pub fn set_u16(&mut self, address: u64, value: u16) {
        self.set(address, &value.to_le_bytes());
    }

    /// Current contents of a register, zero-extended to two bytes.
    pub fn get_u16(&self, address: u64) -> u16 {
        let mut raw = self.registers.get(&address).cloned().unwrap_or_default();
        raw.resize(2, 0);
        u16::from_le_bytes([raw[0], raw[1]])
    }

    pub fn log(&self) -> &[BusOp] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Only the writes from the log, as `(address, data)`.
    pub fn writes(&self) -> Vec<(u64, Vec<u8>)> {
        self.log
            .iter()
            .filter_map(|op| match op {
                BusOp::Write { address, data } => Some((*address, data.clone())),
                _ => None,
            })
            .collect()
    }
}

impl RegisterTransport for SimulatedBus {
    fn read(&mut self, address: u64, size: u8) -> Result<Vec<u8>, TransportError> {
        self.log.push(BusOp::Read { address, size });
        if self.failing_addresses.contains(&address) {
            return Err(TransportError::Timeout);
        }
        let mut raw = self.registers.get(&address).cloned().unwrap_or_default();
        let len = self
            .short_reads
            .get(&address)
            .copied()
            .unwrap_or(usize::from(size));
        raw.resize(len, 0);
        Ok(raw)
    }

    fn write(&mut self, address: u64, data: &[u8]) -> Result<(), TransportError> {
        self.log.push(BusOp::Write {
            address,
            data: data.to_vec(),
        });
        let index = self.writes_seen;
        self.writes_seen += 1;
        if self.fail_write_index == Some(index) {
            return Err(TransportError::Write(format!("injected failure on write {index}")));
        }
        if self.failing_addresses.contains(&address) {
            return Err(TransportError::Timeout);
        }
        self.registers.insert(address, data.to_vec());
        Ok(())
    }

    fn settle(&mut self, duration: Duration) {
        self.log.push(BusOp::Settle(duration));
    }

    fn close(&mut self) {
        self.log.push(BusOp::Close);
    }
}

/// Opens [`SimulatedBus`] instances seeded for one model.
#[derive(Debug)]
pub struct SimulatedConnector {
    model: &'static ModelConfig,
    refuse: bool,
}

impl SimulatedConnector {
    pub fn new(model: &'static ModelConfig) -> Self {
        Self {
            model,
            refuse: false,
        }
    }

    /// A connector whose `open` always fails, as with no board attached.
    pub fn unplugged(model: &'static ModelConfig) -> Self {
        Self {
            model,
            refuse: true,
        }
    }
}

impl Connector for SimulatedConnector {
    type Transport = SimulatedBus;

    fn open(&self, paths: &ConnectionPaths) -> Result<SimulatedBus, TransportError> {
        if self.refuse {
            return Err(TransportError::Open(format!(
                "no board found via {}",
                paths.descriptor.display()
            )));
        }
        tracing::debug!(model = self.model.name, "opening simulated board");
        Ok(SimulatedBus::for_model(self.model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalkit_core::{EMERALD, TOPAZ};

    #[test]
    fn test_unwritten_register_reads_zero() {
        let mut bus = SimulatedBus::new();
        assert_eq!(bus.read(0x1234, 4).unwrap(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_write_then_read() {
        let mut bus = SimulatedBus::new();
        bus.write(0x40004, &[0xC2, 0x21]).unwrap();
        assert_eq!(bus.read(0x40004, 2).unwrap(), vec![0xC2, 0x21]);
        assert_eq!(bus.get_u16(0x40004), 0x21C2);
        assert_eq!(
            bus.log(),
            &[
                BusOp::Write { address: 0x40004, data: vec![0xC2, 0x21] },
                BusOp::Read { address: 0x40004, size: 2 },
            ]
        );
    }

    #[test]
    fn test_injected_write_failure_does_not_store() {
        let mut bus = SimulatedBus::new();
        bus.fail_write_at(1);
        bus.write(0x10, &[1, 0]).unwrap();
        assert!(bus.write(0x12, &[2, 0]).is_err());
        bus.write(0x14, &[3, 0]).unwrap();
        assert_eq!(bus.get_u16(0x12), 0);
        assert_eq!(bus.writes().len(), 3);
    }

    #[test]
    fn test_failing_address_times_out() {
        let mut bus = SimulatedBus::new();
        bus.fail_address(0x20);
        assert_eq!(bus.read(0x20, 2), Err(TransportError::Timeout));
        assert_eq!(bus.write(0x20, &[0, 0]), Err(TransportError::Timeout));
    }

    #[test]
    fn test_short_read() {
        let mut bus = SimulatedBus::new();
        bus.short_read(0x10014, 3);
        assert_eq!(bus.read(0x10014, 4).unwrap().len(), 3);
    }

    #[test]
    fn test_seeded_models() {
        let mut topaz = SimulatedBus::for_model(&TOPAZ);
        assert_eq!(&topaz.read(0x0, 32).unwrap()[..12], b"Teledyne e2v");
        assert_eq!(topaz.get_u16(0x30006), 1000);

        let emerald = SimulatedBus::for_model(&EMERALD);
        assert_eq!(emerald.get_u16(0x4002A), 512);
    }

    #[test]
    fn test_unplugged_connector() {
        let paths = ConnectionPaths::for_model(&TOPAZ, None);
        assert!(SimulatedConnector::unplugged(&TOPAZ).open(&paths).is_err());
        assert!(SimulatedConnector::new(&TOPAZ).open(&paths).is_ok());
    }
}

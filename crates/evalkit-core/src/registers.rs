//! Typed register keys and per-model address maps.
//!
//! Features are enum keys rather than strings, so a misspelt feature is a
//! compile error. A key that exists in the enum but not in a particular
//! model's map resolves to [`SensorError::UnknownFeature`].

use crate::error::{Result, SensorError};
use std::fmt::Debug;

/// A key that can be looked up in a [`RegisterMap`].
pub trait RegisterKey: Copy + Eq + Debug + 'static {
    fn name(&self) -> &'static str;
}

/// Registers of the bootstrap block shared by every board of the product line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapRegister {
    DeviceVendorName,
    DeviceModelName,
    DeviceVersion,
    DeviceFirmwareVersion,
    SerialNumber,
    SensorWidth,
    SensorHeight,
    PixelFormat,
    ConfigurationLoad,
    AutoExposure,
    AwbEnable,
    AwbRedGain,
    AwbGreenGain,
    AwbBlueGain,
}

impl RegisterKey for BootstrapRegister {
    fn name(&self) -> &'static str {
        match self {
            Self::DeviceVendorName => "DeviceVendorName",
            Self::DeviceModelName => "DeviceModelName",
            Self::DeviceVersion => "DeviceVersion",
            Self::DeviceFirmwareVersion => "DeviceFirmwareVersion",
            Self::SerialNumber => "SerialNumber",
            Self::SensorWidth => "SensorWidth",
            Self::SensorHeight => "SensorHeight",
            Self::PixelFormat => "PixelFormat",
            Self::ConfigurationLoad => "ConfigurationLoad",
            Self::AutoExposure => "AutoExposure",
            Self::AwbEnable => "AWBenable",
            Self::AwbRedGain => "AWBredGain",
            Self::AwbGreenGain => "AWBgreenGain",
            Self::AwbBlueGain => "AWBblueGain",
        }
    }
}

/// Registers of the model-specific sensor block, relative to its base address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorRegister {
    LineLength,
    ExposureTime,
    WaitTime,
    AnalogGain,
    ImageOffset,
    VerticalSubsampling,
    AnalogControl,
    ThermoConfig,
    ThermoClockDivider,
    ThermoAverage,
    ThermoTrigger,
    ThermoReadout,
}

impl RegisterKey for SensorRegister {
    fn name(&self) -> &'static str {
        match self {
            Self::LineLength => "LineLength",
            Self::ExposureTime => "ExposureTime",
            Self::WaitTime => "WaitTime",
            Self::AnalogGain => "AnalogGain",
            Self::ImageOffset => "ImageOffset",
            Self::VerticalSubsampling => "VerticalSubsampling",
            Self::AnalogControl => "AnalogControl",
            Self::ThermoConfig => "ThermoConfig",
            Self::ThermoClockDivider => "ThermoClockDivider",
            Self::ThermoAverage => "ThermoAverage",
            Self::ThermoTrigger => "ThermoTrigger",
            Self::ThermoReadout => "ThermoReadout",
        }
    }
}

/// Absolute address and byte width of one register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterSpec {
    pub address: u64,
    pub width: u8,
}

/// One row of a register map: key, offset from the map base, byte width.
#[derive(Debug, Clone, Copy)]
pub struct RegisterEntry<K> {
    pub key: K,
    pub offset: u64,
    pub width: u8,
}

impl<K> RegisterEntry<K> {
    pub const fn new(key: K, offset: u64, width: u8) -> Self {
        Self { key, offset, width }
    }
}

/// Immutable key -> address map for one register block of one model.
#[derive(Debug)]
pub struct RegisterMap<K: 'static> {
    model: &'static str,
    base: u64,
    entries: &'static [RegisterEntry<K>],
}

impl<K: RegisterKey> RegisterMap<K> {
    pub const fn new(model: &'static str, base: u64, entries: &'static [RegisterEntry<K>]) -> Self {
        Self {
            model,
            base,
            entries,
        }
    }

    /// Base address added to every entry offset.
    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn resolve(&self, key: K) -> Result<RegisterSpec> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| RegisterSpec {
                address: self.base + e.offset,
                width: e.width,
            })
            .ok_or(SensorError::UnknownFeature(key.name(), self.model))
    }

    pub fn contains(&self, key: K) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    pub fn entries(&self) -> &'static [RegisterEntry<K>] {
        self.entries
    }
}

/// Bootstrap block common to Topaz and Emerald boards.
pub const PRODUCT_LINE_BOOTSTRAP: &[RegisterEntry<BootstrapRegister>] = &[
    RegisterEntry::new(BootstrapRegister::DeviceVendorName, 0x0, 32),
    RegisterEntry::new(BootstrapRegister::DeviceModelName, 0x20, 32),
    RegisterEntry::new(BootstrapRegister::DeviceVersion, 0x40, 32),
    RegisterEntry::new(BootstrapRegister::DeviceFirmwareVersion, 0x60, 32),
    RegisterEntry::new(BootstrapRegister::SerialNumber, 0xE0, 16),
    RegisterEntry::new(BootstrapRegister::SensorWidth, 0x1000C, 4),
    RegisterEntry::new(BootstrapRegister::SensorHeight, 0x10010, 4),
    RegisterEntry::new(BootstrapRegister::PixelFormat, 0x10014, 4),
    // Not confirmed against hardware yet.
    RegisterEntry::new(BootstrapRegister::ConfigurationLoad, 0x10200, 4),
    RegisterEntry::new(BootstrapRegister::AutoExposure, 0x10300, 4),
    RegisterEntry::new(BootstrapRegister::AwbEnable, 0x10400, 4),
    RegisterEntry::new(BootstrapRegister::AwbRedGain, 0x10410, 4),
    RegisterEntry::new(BootstrapRegister::AwbGreenGain, 0x10414, 4),
    RegisterEntry::new(BootstrapRegister::AwbBlueGain, 0x10418, 4),
];

pub const TOPAZ_SENSOR_BASE: u64 = 0x30000;

pub const TOPAZ_SENSOR: &[RegisterEntry<SensorRegister>] = &[
    RegisterEntry::new(SensorRegister::LineLength, 0x06, 2),
    // FIXME: address unverified on Topaz silicon
    RegisterEntry::new(SensorRegister::WaitTime, 0x09, 2),
    RegisterEntry::new(SensorRegister::ExposureTime, 0x0B, 2),
    RegisterEntry::new(SensorRegister::AnalogGain, 0x0D, 2),
    // FIXME: address unverified on Topaz silicon
    RegisterEntry::new(SensorRegister::VerticalSubsampling, 0x1D, 2),
    RegisterEntry::new(SensorRegister::ImageOffset, 0x22, 2),
];

pub const EMERALD_SENSOR_BASE: u64 = 0x40000;

pub const EMERALD_SENSOR: &[RegisterEntry<SensorRegister>] = &[
    RegisterEntry::new(SensorRegister::LineLength, 0x10, 2),
    RegisterEntry::new(SensorRegister::ExposureTime, 0x12, 2),
    RegisterEntry::new(SensorRegister::WaitTime, 0x14, 2),
    RegisterEntry::new(SensorRegister::AnalogGain, 0x16, 2),
    RegisterEntry::new(SensorRegister::AnalogControl, 0x20, 2),
    RegisterEntry::new(SensorRegister::ThermoConfig, 0x22, 2),
    RegisterEntry::new(SensorRegister::ThermoClockDivider, 0x24, 2),
    RegisterEntry::new(SensorRegister::ThermoAverage, 0x26, 2),
    RegisterEntry::new(SensorRegister::ThermoTrigger, 0x28, 2),
    RegisterEntry::new(SensorRegister::ThermoReadout, 0x2A, 2),
];

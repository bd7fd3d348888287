//! Per-model configuration: everything that differs between camera models.
//!
//! Models differ only in data (addresses, clock, format codes, which optional
//! blocks exist), so one facade implementation serves all of them.

use crate::bitfield::BitField;
use crate::pixel_format::{PixelFormatTable, EMERALD_PIXEL_FORMATS, TOPAZ_PIXEL_FORMATS};
use crate::registers::{
    BootstrapRegister, RegisterMap, SensorRegister, EMERALD_SENSOR, EMERALD_SENSOR_BASE,
    PRODUCT_LINE_BOOTSTRAP, TOPAZ_SENSOR, TOPAZ_SENSOR_BASE,
};

/// A bit field located in a specific sensor register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRef {
    pub register: SensorRegister,
    pub field: BitField,
}

/// One step of a fixed register sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterStep {
    /// Read-modify-write of one field, leaving the rest of the register intact.
    SetField { target: FieldRef, value: u16 },
    /// Full-register write.
    Write { register: SensorRegister, value: u16 },
}

impl RegisterStep {
    pub fn register(&self) -> SensorRegister {
        match self {
            Self::SetField { target, .. } => target.register,
            Self::Write { register, .. } => *register,
        }
    }
}

/// Thermal measurement sub-block.
#[derive(Debug)]
pub struct ThermalBlock {
    /// Bring-up sequence, applied strictly in order.
    pub enable_sequence: &'static [RegisterStep],
    pub readout: SensorRegister,
}

/// Immutable description of one camera model.
#[derive(Debug)]
pub struct ModelConfig {
    pub name: &'static str,
    /// Sensor clock reference used by timing conversions.
    pub clock_mhz: f64,
    pub bootstrap: RegisterMap<BootstrapRegister>,
    pub sensor: RegisterMap<SensorRegister>,
    pub pixel_formats: &'static PixelFormatTable,
    pub clamp_mode: Option<FieldRef>,
    pub thermal: Option<ThermalBlock>,
    /// Vendor SDK install directory and file names.
    pub default_bin_dir: &'static str,
    pub default_binary_name: &'static str,
    pub default_descriptor_name: &'static str,
}

impl ModelConfig {
    /// Line period in microseconds for a raw line length.
    pub fn line_period_us(&self, line_length: u16) -> f64 {
        f64::from(line_length) / self.clock_mhz
    }
}

pub const CLAMP_MODE: BitField = BitField::new("clamp mode", 6, 2);
pub const THERMO_ENABLE: BitField = BitField::new("thermo enable", 5, 1);
pub const THERMO_MODE: BitField = BitField::new("thermo mode", 0, 4);
pub const THERMO_START: BitField = BitField::new("thermo start", 0, 1);

const EMERALD_THERMAL_ENABLE: &[RegisterStep] = &[
    RegisterStep::SetField {
        target: FieldRef {
            register: SensorRegister::AnalogControl,
            field: THERMO_ENABLE,
        },
        value: 1,
    },
    RegisterStep::Write {
        register: SensorRegister::ThermoClockDivider,
        value: 0x0003,
    },
    RegisterStep::SetField {
        target: FieldRef {
            register: SensorRegister::ThermoConfig,
            field: THERMO_MODE,
        },
        value: 0x4,
    },
    RegisterStep::Write {
        register: SensorRegister::ThermoAverage,
        value: 0x0001,
    },
    RegisterStep::SetField {
        target: FieldRef {
            register: SensorRegister::ThermoTrigger,
            field: THERMO_START,
        },
        value: 1,
    },
];

pub static TOPAZ: ModelConfig = ModelConfig {
    name: "Topaz",
    clock_mhz: 50.0,
    bootstrap: RegisterMap::new("Topaz", 0, PRODUCT_LINE_BOOTSTRAP),
    sensor: RegisterMap::new("Topaz", TOPAZ_SENSOR_BASE, TOPAZ_SENSOR),
    pixel_formats: &TOPAZ_PIXEL_FORMATS,
    clamp_mode: None,
    thermal: None,
    default_bin_dir: "C:/Program Files/Teledyne e2v/Evalkit-Topaz/1.0/pigentl/bin",
    default_binary_name: "pigentl-sdk.dll",
    default_descriptor_name: "pigentl.cti",
};

pub static EMERALD: ModelConfig = ModelConfig {
    name: "Emerald",
    clock_mhz: 80.0,
    bootstrap: RegisterMap::new("Emerald", 0, PRODUCT_LINE_BOOTSTRAP),
    sensor: RegisterMap::new("Emerald", EMERALD_SENSOR_BASE, EMERALD_SENSOR),
    pixel_formats: &EMERALD_PIXEL_FORMATS,
    clamp_mode: Some(FieldRef {
        register: SensorRegister::AnalogControl,
        field: CLAMP_MODE,
    }),
    thermal: Some(ThermalBlock {
        enable_sequence: EMERALD_THERMAL_ENABLE,
        readout: SensorRegister::ThermoReadout,
    }),
    default_bin_dir: "C:/Program Files/Teledyne e2v/Evalkit-Emerald/1.0/pigentl/bin",
    default_binary_name: "pigentl-sdk.dll",
    default_descriptor_name: "pigentl.cti",
};

/// All models this crate knows about.
pub fn models() -> [&'static ModelConfig; 2] {
    [&TOPAZ, &EMERALD]
}

/// Case-insensitive lookup by model name.
pub fn lookup_model(name: &str) -> Option<&'static ModelConfig> {
    models()
        .into_iter()
        .find(|m| m.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_model() {
        assert_eq!(lookup_model("topaz").map(|m| m.name), Some("Topaz"));
        assert_eq!(lookup_model("EMERALD").map(|m| m.name), Some("Emerald"));
        assert!(lookup_model("ruby").is_none());
    }

    #[test]
    fn test_clock_references() {
        assert_eq!(TOPAZ.clock_mhz, 50.0);
        assert_eq!(EMERALD.clock_mhz, 80.0);
        assert!((TOPAZ.line_period_us(1000) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_optional_blocks_resolve() {
        for model in models() {
            if let Some(clamp) = model.clamp_mode {
                assert!(model.sensor.contains(clamp.register));
            }
            if let Some(thermal) = &model.thermal {
                assert!(model.sensor.contains(thermal.readout));
                for step in thermal.enable_sequence {
                    assert!(model.sensor.contains(step.register()), "{:?}", step);
                }
            }
        }
    }

    #[test]
    fn test_thermal_sequence_touches_five_registers() {
        let thermal = EMERALD.thermal.as_ref().unwrap();
        let mut registers: Vec<_> = thermal
            .enable_sequence
            .iter()
            .map(|s| s.register())
            .collect();
        registers.dedup();
        assert_eq!(registers.len(), 5);
    }

    #[test]
    fn test_clamp_and_thermo_enable_share_a_register() {
        let clamp = EMERALD.clamp_mode.unwrap();
        assert_eq!(clamp.register, SensorRegister::AnalogControl);
        assert_eq!(clamp.field.mask() & THERMO_ENABLE.mask(), 0);
    }
}

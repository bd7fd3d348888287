//! Named sub-ranges of bits inside a 16-bit register.

use crate::codec;
use crate::error::{Result, SensorError};

/// A `width`-bit field starting at bit `shift` of a 16-bit register.
///
/// `shift + width <= 16` is a register-map contract checked when the
/// constant is built, not on every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    pub name: &'static str,
    pub shift: u32,
    pub width: u32,
}

impl BitField {
    pub const fn new(name: &'static str, shift: u32, width: u32) -> Self {
        assert!(width > 0 && shift + width <= 16, "bit field exceeds 16-bit register");
        Self { name, shift, width }
    }

    /// Bits covered by this field, in register position.
    pub const fn mask(&self) -> u16 {
        let ones = if self.width >= 16 {
            u16::MAX
        } else {
            (1u16 << self.width) - 1
        };
        ones << self.shift
    }

    /// Largest value the field can hold.
    pub const fn max_value(&self) -> u16 {
        self.mask() >> self.shift
    }

    /// Extract this field's value from a full register word.
    pub fn extract(&self, register: u16) -> u16 {
        (register & self.mask()) >> self.shift
    }

    /// Check that `value` fits in the field.
    pub fn validate(&self, value: u16) -> Result<()> {
        if value > self.max_value() {
            return Err(SensorError::out_of_range(self.name, value));
        }
        Ok(())
    }

    /// Return `current` with this field replaced by `value`.
    ///
    /// Rejects values wider than the field instead of letting them spill
    /// into neighbouring bits.
    pub fn insert(&self, current: u16, value: u16) -> Result<u16> {
        self.validate(value)?;
        Ok(codec::apply_field(current, self.mask(), self.shift, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLAMP: BitField = BitField::new("clamp mode", 6, 2);
    const THERMO_EN: BitField = BitField::new("thermo enable", 5, 1);

    #[test]
    fn test_mask_and_max() {
        assert_eq!(CLAMP.mask(), 0x00C0);
        assert_eq!(CLAMP.max_value(), 3);
        assert_eq!(THERMO_EN.mask(), 0x0020);
        assert_eq!(BitField::new("all", 0, 16).mask(), 0xFFFF);
    }

    #[test]
    fn test_insert_leaves_neighbours() {
        let current = 0xFF3F; // clamp bits clear, everything else set
        let updated = CLAMP.insert(current, 2).unwrap();
        assert_eq!(updated, 0xFFBF);
        assert_eq!(CLAMP.extract(updated), 2);
        assert_eq!(updated & !CLAMP.mask(), current & !CLAMP.mask());
    }

    #[test]
    fn test_insert_clears_previous_value() {
        let updated = CLAMP.insert(0x00C0, 1).unwrap();
        assert_eq!(updated, 0x0040);
    }

    #[test]
    fn test_insert_rejects_wide_value() {
        let err = CLAMP.insert(0, 4).unwrap_err();
        assert!(matches!(err, SensorError::ValueOutOfRange { .. }));
    }

    #[test]
    fn test_fields_in_same_register_are_independent() {
        let reg = THERMO_EN.insert(0, 1).unwrap();
        let reg = CLAMP.insert(reg, 3).unwrap();
        assert_eq!(THERMO_EN.extract(reg), 1);
        assert_eq!(CLAMP.extract(reg), 3);
        assert_eq!(reg, 0x00E0);
    }
}

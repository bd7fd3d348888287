//! Value codec — pure conversions between raw register bytes and typed values.
//!
//! All multi-byte registers are little-endian. Nothing here touches the bus;
//! the device facade reads bytes, hands them to these functions and writes
//! whatever they produce.

use crate::error::{Result, SensorError};
use crate::pixel_format::{PixelFormat, PixelFormatTable};

/// Decode a 16-bit little-endian register value.
pub fn decode_u16_le(bytes: &[u8]) -> Result<u16> {
    let raw: [u8; 2] = bytes
        .try_into()
        .map_err(|_| SensorError::MalformedResponse {
            expected: 2,
            actual: bytes.len(),
        })?;
    Ok(u16::from_le_bytes(raw))
}

/// Decode a 32-bit little-endian register value.
pub fn decode_u32_le(bytes: &[u8]) -> Result<u32> {
    let raw: [u8; 4] = bytes
        .try_into()
        .map_err(|_| SensorError::MalformedResponse {
            expected: 4,
            actual: bytes.len(),
        })?;
    Ok(u32::from_le_bytes(raw))
}

/// Decode a fixed-width, NUL-padded device string.
///
/// Everything after the first NUL is padding. Invalid UTF-8 is replaced.
pub fn decode_fixed_string(bytes: &[u8], width: usize) -> Result<String> {
    if bytes.len() != width {
        return Err(SensorError::MalformedResponse {
            expected: width,
            actual: bytes.len(),
        });
    }
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    Ok(String::from_utf8_lossy(&bytes[..end]).trim().to_string())
}

/// Look up a raw pixel-format code in a model's table.
///
/// An absent code is an error, never a default.
pub fn decode_pixel_format(table: &PixelFormatTable, code: u32) -> Result<PixelFormat> {
    table
        .lookup(code)
        .ok_or(SensorError::UnknownPixelFormat(code))
}

/// Convert a duration in milliseconds into a count of line periods.
///
/// `count = round(value_ms * clock_mhz / line_length * 1e3)`. Fails instead
/// of truncating when the count does not fit the 16-bit register.
pub fn encode_timing_ms(value_ms: f64, line_length: u16, clock_mhz: f64) -> Result<u16> {
    if !value_ms.is_finite() || value_ms < 0.0 {
        return Err(SensorError::out_of_range("timing value (ms)", value_ms));
    }
    if line_length == 0 {
        return Err(SensorError::out_of_range("line length", line_length));
    }
    let count = (value_ms * clock_mhz / f64::from(line_length) * 1e3).round();
    if count > f64::from(u16::MAX) {
        return Err(SensorError::out_of_range("timing value (ms)", value_ms));
    }
    Ok(count as u16)
}

/// Convert a count of line periods back into milliseconds, at full precision.
pub fn decode_timing_ms(raw: u16, line_length: u16, clock_mhz: f64) -> f64 {
    f64::from(raw) * (f64::from(line_length) / clock_mhz) * 1e-3
}

/// Length of one encoding step in milliseconds for the given line length.
pub fn timing_quantum_ms(line_length: u16, clock_mhz: f64) -> f64 {
    decode_timing_ms(1, line_length, clock_mhz)
}

/// Thermal sensor ADC reading to degrees Celsius.
///
/// Only the low 10 bits are the ADC value; the upper bits carry status
/// flags and must be masked off.
pub fn decode_thermo_celsius(raw: u16) -> f64 {
    let adc = f64::from(raw & 0x03FF);
    let celsius = adc * 125.0 / 1024.0 - 40.0;
    (celsius * 100.0).round() / 100.0
}

/// Replace the bits selected by `mask` with `new_value << shift`.
///
/// No width check happens here: `mask` and `shift` come from the register
/// map, and callers validate values through [`crate::BitField`].
pub fn apply_field(current: u16, mask: u16, shift: u32, new_value: u16) -> u16 {
    (current & !mask) | new_value.checked_shl(shift).unwrap_or(0)
}

/// White-balance channel gain as the device's fixed-point micro units.
pub fn encode_gain_micro(gain: f64) -> Result<u32> {
    if !gain.is_finite() || gain < 0.0 {
        return Err(SensorError::out_of_range("white balance gain", gain));
    }
    let micro = (gain * 1e6).round();
    if micro > f64::from(u32::MAX) {
        return Err(SensorError::out_of_range("white balance gain", gain));
    }
    Ok(micro as u32)
}

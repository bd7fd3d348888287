//! Pixel-format code tables.
//!
//! Each camera model reports its output format as a 32-bit code. The codes
//! are model-specific (the same name can carry a different code on another
//! model), so every model owns its own table and they are never merged.

use serde::Serialize;
use std::fmt;

/// Semantic pixel format name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PixelFormatName {
    Mono8,
    Mono10,
    Mono12,
    Mono14,
    Mono16,
    /// 10-bit packed, no padding between pixels.
    Mono10p,
    /// 12-bit packed, no padding between pixels.
    Mono12p,
    #[serde(rename = "RGB24")]
    Rgb24,
    #[serde(rename = "YUV444")]
    Yuv444,
}

impl PixelFormatName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mono8 => "Mono8",
            Self::Mono10 => "Mono10",
            Self::Mono12 => "Mono12",
            Self::Mono14 => "Mono14",
            Self::Mono16 => "Mono16",
            Self::Mono10p => "Mono10p",
            Self::Mono12p => "Mono12p",
            Self::Rgb24 => "RGB24",
            Self::Yuv444 => "YUV444",
        }
    }

    /// True for formats carrying three colour channels per pixel.
    pub fn is_color(&self) -> bool {
        matches!(self, Self::Rgb24 | Self::Yuv444)
    }
}

impl fmt::Display for PixelFormatName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a model's pixel-format table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelFormat {
    pub code: u32,
    pub name: PixelFormatName,
    /// Significant bits per pixel (per channel group for colour formats).
    pub bit_depth: u8,
    /// Bits each pixel occupies in a frame buffer.
    pub storage_bits: u8,
}

impl PixelFormat {
    const fn new(code: u32, name: PixelFormatName, bit_depth: u8, storage_bits: u8) -> Self {
        Self {
            code,
            name,
            bit_depth,
            storage_bits,
        }
    }

    /// Bytes needed to hold one `width` x `height` frame in this format.
    pub fn frame_size_bytes(&self, width: u32, height: u32) -> u64 {
        let bits = u64::from(width) * u64::from(height) * u64::from(self.storage_bits);
        bits.div_ceil(8)
    }
}

/// Immutable code -> format table owned by one camera model.
#[derive(Debug)]
pub struct PixelFormatTable {
    entries: &'static [PixelFormat],
}

impl PixelFormatTable {
    pub const fn new(entries: &'static [PixelFormat]) -> Self {
        Self { entries }
    }

    pub fn lookup(&self, code: u32) -> Option<PixelFormat> {
        self.entries.iter().find(|f| f.code == code).copied()
    }

    /// Code used by this table for `name`, if the model supports it.
    pub fn code_for(&self, name: PixelFormatName) -> Option<u32> {
        self.entries.iter().find(|f| f.name == name).map(|f| f.code)
    }

    pub fn entries(&self) -> &'static [PixelFormat] {
        self.entries
    }
}

use PixelFormatName::*;

/// Topaz evaluation kit formats.
pub static TOPAZ_PIXEL_FORMATS: PixelFormatTable = PixelFormatTable::new(&[
    PixelFormat::new(0x0108_0001, Mono8, 8, 8),
    PixelFormat::new(0x010C_0004, Mono10, 10, 16),
    PixelFormat::new(0x010C_0006, Mono12, 12, 16),
    PixelFormat::new(0x0110_0025, Mono14, 14, 16),
    PixelFormat::new(0x0110_0007, Mono16, 16, 16),
    PixelFormat::new(0x0218_0014, Rgb24, 8, 24),
    PixelFormat::new(0x0218_0020, Yuv444, 8, 24),
    PixelFormat::new(0x010A_0046, Mono10p, 10, 10),
]);

/// Emerald evaluation kit formats.
pub static EMERALD_PIXEL_FORMATS: PixelFormatTable = PixelFormatTable::new(&[
    PixelFormat::new(0x0108_0001, Mono8, 8, 8),
    PixelFormat::new(0x0110_0003, Mono10, 10, 16),
    PixelFormat::new(0x0110_0005, Mono12, 12, 16),
    PixelFormat::new(0x010A_0046, Mono10p, 10, 10),
    PixelFormat::new(0x010C_0047, Mono12p, 12, 12),
]);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_pixel_format;
    use crate::error::SensorError;

    #[test]
    fn test_every_table_code_decodes_to_its_name() {
        for table in [&TOPAZ_PIXEL_FORMATS, &EMERALD_PIXEL_FORMATS] {
            for entry in table.entries() {
                let decoded = decode_pixel_format(table, entry.code).unwrap();
                assert_eq!(decoded.name, entry.name);
                assert_eq!(table.code_for(entry.name), Some(entry.code));
            }
        }
    }

    #[test]
    fn test_codes_unique_within_table() {
        for table in [&TOPAZ_PIXEL_FORMATS, &EMERALD_PIXEL_FORMATS] {
            let entries = table.entries();
            for (i, a) in entries.iter().enumerate() {
                for b in &entries[i + 1..] {
                    assert_ne!(a.code, b.code, "{} and {} share a code", a.name, b.name);
                }
            }
        }
    }

    #[test]
    fn test_unknown_code_is_an_error() {
        for code in [0x0, 0xDEAD_BEEF, 0x0108_0002] {
            let err = decode_pixel_format(&TOPAZ_PIXEL_FORMATS, code).unwrap_err();
            assert!(matches!(err, SensorError::UnknownPixelFormat(c) if c == code));
        }
    }

    #[test]
    fn test_tables_are_model_specific() {
        // Topaz's Mono10 code is not an Emerald code, and Emerald's packed Mono12p
        // does not exist on Topaz.
        assert!(EMERALD_PIXEL_FORMATS.lookup(0x010C_0004).is_none());
        assert!(TOPAZ_PIXEL_FORMATS.lookup(0x010C_0047).is_none());
        assert!(TOPAZ_PIXEL_FORMATS.code_for(Rgb24).is_some());
        assert!(EMERALD_PIXEL_FORMATS.code_for(Rgb24).is_none());
    }

    #[test]
    fn test_frame_size_bytes() {
        let mono8 = TOPAZ_PIXEL_FORMATS.lookup(0x0108_0001).unwrap();
        assert_eq!(mono8.frame_size_bytes(1920, 1080), 1920 * 1080);
        let rgb = TOPAZ_PIXEL_FORMATS.lookup(0x0218_0014).unwrap();
        assert_eq!(rgb.frame_size_bytes(4, 2), 24);
        let packed = EMERALD_PIXEL_FORMATS.lookup(0x010A_0046).unwrap();
        // 3 pixels * 10 bits = 30 bits -> 4 bytes
        assert_eq!(packed.frame_size_bytes(3, 1), 4);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Rgb24.to_string(), "RGB24");
        assert_eq!(Mono10p.to_string(), "Mono10p");
        assert!(Yuv444.is_color());
        assert!(!Mono16.is_color());
    }
}

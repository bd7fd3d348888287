//! Sensor configuration tables: ordered register bursts applied with a delay
//! between writes.
//!
//! Tables are TOML documents:
//!
//! ```toml
//! name = "emerald-range-gate"
//! model = "Emerald"
//! inter_write_delay_ms = 10
//!
//! [[entries]]
//! offset = 0x04
//! value = 0x21C2
//! ```
//!
//! Offsets are relative to the model's sensor-local base address.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigTableError {
    #[error("failed to read table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("bad table TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("table {0} has no entries")]
    Empty(String),
}

/// One `(offset, value)` write of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TableEntry {
    pub offset: u64,
    pub value: u16,
}

impl From<(u64, u16)> for TableEntry {
    fn from((offset, value): (u64, u16)) -> Self {
        Self { offset, value }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SensorConfigTable {
    pub name: String,
    /// Model the table was written for; `None` means any model.
    #[serde(default)]
    pub model: Option<String>,
    pub inter_write_delay_ms: u64,
    /// Applied strictly in this order.
    pub entries: Vec<TableEntry>,
}

impl SensorConfigTable {
    pub fn new(
        name: impl Into<String>,
        inter_write_delay: Duration,
        entries: impl IntoIterator<Item = (u64, u16)>,
    ) -> Self {
        Self {
            name: name.into(),
            model: None,
            inter_write_delay_ms: inter_write_delay.as_millis() as u64,
            entries: entries.into_iter().map(TableEntry::from).collect(),
        }
    }

    pub fn from_toml_str(src: &str) -> Result<Self, ConfigTableError> {
        let table: Self = toml::from_str(src)?;
        if table.entries.is_empty() {
            return Err(ConfigTableError::Empty(table.name));
        }
        tracing::debug!(name = %table.name, entries = table.entries.len(), "parsed config table");
        Ok(table)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigTableError> {
        let src = std::fs::read_to_string(path).map_err(|source| ConfigTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&src)
    }

    pub fn inter_write_delay(&self) -> Duration {
        Duration::from_millis(self.inter_write_delay_ms)
    }

    /// Whether the table may be applied to `model_name`.
    pub fn applies_to(&self, model_name: &str) -> bool {
        self.model
            .as_deref()
            .map_or(true, |m| m.eq_ignore_ascii_case(model_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANGE_GATE: &str = r#"
name = "range-gate"
model = "Emerald"
inter_write_delay_ms = 10

[[entries]]
offset = 0x04
value = 0x21C2

[[entries]]
offset = 0x05
value = 0x1F62
"#;

    #[test]
    fn test_parse_preserves_order() {
        let table = SensorConfigTable::from_toml_str(RANGE_GATE).unwrap();
        assert_eq!(table.name, "range-gate");
        assert_eq!(table.inter_write_delay(), Duration::from_millis(10));
        assert_eq!(
            table.entries,
            vec![
                TableEntry { offset: 0x04, value: 0x21C2 },
                TableEntry { offset: 0x05, value: 0x1F62 },
            ]
        );
    }

    #[test]
    fn test_applies_to() {
        let table = SensorConfigTable::from_toml_str(RANGE_GATE).unwrap();
        assert!(table.applies_to("emerald"));
        assert!(!table.applies_to("Topaz"));
        let generic = SensorConfigTable::new("any", Duration::ZERO, [(0x1, 0x2)]);
        assert!(generic.applies_to("Topaz"));
    }

    #[test]
    fn test_value_wider_than_16_bits_rejected() {
        let src = "name = \"x\"\ninter_write_delay_ms = 1\n[[entries]]\noffset = 1\nvalue = 0x10000\n";
        assert!(matches!(
            SensorConfigTable::from_toml_str(src),
            Err(ConfigTableError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_table_rejected() {
        let src = "name = \"empty\"\ninter_write_delay_ms = 1\nentries = []\n";
        assert!(matches!(
            SensorConfigTable::from_toml_str(src),
            Err(ConfigTableError::Empty(name)) if name == "empty"
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = SensorConfigTable::from_file(Path::new("/nonexistent/table.toml")).unwrap_err();
        assert!(matches!(err, ConfigTableError::Io { .. }));
    }
}

//! Built-in sensor configuration tables.
//!
//! Table files are embedded at compile time from `contrib/tables/*.toml`
//! and parsed once on first use.

use evalkit_core::SensorConfigTable;
use std::sync::OnceLock;

const EMERALD_RANGE_GATE: &str = include_str!("../../../contrib/tables/emerald-range-gate.toml");
const TOPAZ_LOW_NOISE: &str = include_str!("../../../contrib/tables/topaz-low-noise.toml");

static TABLE_DB: OnceLock<Vec<SensorConfigTable>> = OnceLock::new();

fn table_db() -> &'static Vec<SensorConfigTable> {
    TABLE_DB.get_or_init(|| {
        let mut db = Vec::new();
        for src in [EMERALD_RANGE_GATE, TOPAZ_LOW_NOISE] {
            match SensorConfigTable::from_toml_str(src) {
                Ok(table) => db.push(table),
                Err(e) => tracing::warn!(error = %e, "skipping bad built-in config table"),
            }
        }
        db
    })
}

/// Look up a built-in table by name.
pub fn lookup_table(name: &str) -> Option<&'static SensorConfigTable> {
    table_db().iter().find(|t| t.name == name)
}

/// All built-in tables.
pub fn list_tables() -> &'static [SensorConfigTable] {
    table_db()
}

/// Built-in tables usable with `model_name`.
pub fn tables_for_model(model_name: &str) -> impl Iterator<Item = &'static SensorConfigTable> + '_ {
    table_db().iter().filter(move |t| t.applies_to(model_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_parse() {
        assert_eq!(list_tables().len(), 2);
    }

    #[test]
    fn test_lookup_range_gate() {
        let table = lookup_table("emerald-range-gate").unwrap();
        assert_eq!(table.entries[0].offset, 0x04);
        assert_eq!(table.entries[0].value, 0x21C2);
        assert_eq!(table.entries[1].value, 0x1F62);
        assert!(lookup_table("missing").is_none());
    }

    #[test]
    fn test_tables_for_model() {
        let names: Vec<_> = tables_for_model("Topaz").map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["topaz-low-noise"]);
    }
}

//! evalkit-core — Register maps and value codecs for image-sensor evaluation boards.
//!
//! Pure data and conversions: nothing in this crate performs bus I/O. The
//! device facade in `evalkit-hw` composes these pieces with a transport.

pub mod bitfield;
pub mod codec;
pub mod config_table;
pub mod error;
pub mod model;
pub mod pixel_format;
pub mod profile;
pub mod registers;

pub use bitfield::BitField;
pub use config_table::{ConfigTableError, SensorConfigTable, TableEntry};
pub use error::{Result, SensorError, TransportError};
pub use model::{lookup_model, FieldRef, ModelConfig, RegisterStep, ThermalBlock, EMERALD, TOPAZ};
pub use pixel_format::{PixelFormat, PixelFormatName, PixelFormatTable};
pub use profile::ConfigurationProfile;
pub use registers::{BootstrapRegister, RegisterKey, RegisterMap, RegisterSpec, SensorRegister};

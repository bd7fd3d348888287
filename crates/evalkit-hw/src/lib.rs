//! evalkit-hw — Register-level control of image-sensor evaluation boards.
//!
//! Provides the [`Sensor`] device facade over any [`RegisterTransport`],
//! an in-memory simulated board, and the built-in configuration tables.

pub mod sensor;
pub mod shared;
pub mod sim;
pub mod tables;
pub mod transport;

pub use sensor::{DeviceIdentity, DeviceInfo, Geometry, Sensor, SensorState};
pub use shared::SharedSensor;
pub use sim::{BusOp, SimulatedBus, SimulatedConnector};
pub use transport::{ConnectionPaths, Connector, RegisterTransport};

//! Error taxonomy shared by codecs, register maps and the device facade.

use thiserror::Error;

/// Failure reported by a register transport.
///
/// Never retried by the facade; the outcome of a failed write is unknown.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("failed to open connection: {0}")]
    Open(String),
    #[error("read failed: {0}")]
    Read(String),
    #[error("write failed: {0}")]
    Write(String),
    #[error("bus timeout")]
    Timeout,
    #[error("device disconnected")]
    Disconnected,
}

/// Errors surfaced by every typed sensor operation.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("failed to connect: {0}")]
    Connect(#[source] TransportError),
    #[error("transport error at {address:#x}: {source}")]
    Transport {
        address: u64,
        #[source]
        source: TransportError,
    },
    #[error("feature {0} is not mapped on {1}")]
    UnknownFeature(&'static str, &'static str),
    #[error("unknown pixel format code {0:#010x}")]
    UnknownPixelFormat(u32),
    #[error("unknown configuration profile: {0}")]
    UnknownConfigurationProfile(String),
    #[error("malformed response: expected {expected} bytes, got {actual}")]
    MalformedResponse { expected: usize, actual: usize },
    #[error("{what} out of range: {value}")]
    ValueOutOfRange { what: &'static str, value: String },
    #[error("operation requires an open device")]
    InvalidState,
    #[error("step {step} (register {address:#x}) failed: {source}")]
    StepFailed {
        step: usize,
        address: u64,
        #[source]
        source: Box<SensorError>,
    },
    #[error("sensor lock poisoned by a panicking thread")]
    LockPoisoned,
}

impl SensorError {
    pub fn out_of_range(what: &'static str, value: impl ToString) -> Self {
        Self::ValueOutOfRange {
            what,
            value: value.to_string(),
        }
    }

    /// Wrap an error as the failure of step `step` of a multi-step sequence.
    pub fn at_step(self, step: usize, address: u64) -> Self {
        Self::StepFailed {
            step,
            address,
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SensorError>;

//! Thread-safe handle serializing all access to one board.

use crate::sensor::Sensor;
use crate::transport::RegisterTransport;
use evalkit_core::{Result, SensorError};
use std::sync::{Arc, Mutex, MutexGuard};

/// Clone-safe handle to a [`Sensor`] behind a single mutex.
///
/// Every operation, including whole multi-step sequences, runs under the
/// lock, so no foreign write can land between the read and write halves of
/// a read-modify-write.
pub struct SharedSensor<T: RegisterTransport> {
    inner: Arc<Mutex<Sensor<T>>>,
}

impl<T: RegisterTransport> Clone for SharedSensor<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: RegisterTransport> SharedSensor<T> {
    pub fn new(sensor: Sensor<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sensor)),
        }
    }

    /// Lock the board for a sequence of calls.
    pub fn lock(&self) -> Result<MutexGuard<'_, Sensor<T>>> {
        self.inner.lock().map_err(|_| SensorError::LockPoisoned)
    }

    /// Run `f` with exclusive access to the board.
    pub fn with<R>(&self, f: impl FnOnce(&mut Sensor<T>) -> Result<R>) -> Result<R> {
        let mut sensor = self.lock()?;
        f(&mut sensor)
    }

    pub fn close(&self) -> Result<()> {
        self.lock()?.close();
        Ok(())
    }
}

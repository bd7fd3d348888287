//! Device facade: typed camera properties on top of raw register access.
//!
//! One generic [`Sensor`] serves every camera model; the model's
//! [`ModelConfig`] supplies addresses, clock reference, pixel-format table
//! and which optional blocks exist.

use crate::transport::{ConnectionPaths, Connector, RegisterTransport};
use evalkit_core::codec;
use evalkit_core::{
    BootstrapRegister, ConfigurationProfile, FieldRef, ModelConfig, PixelFormat, RegisterSpec,
    RegisterStep, Result, SensorConfigTable, SensorError, SensorRegister,
};
use serde::Serialize;
use std::time::Duration;

/// Identity strings reported by the bootstrap block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    pub vendor: String,
    pub model: String,
    pub version: String,
    pub serial: String,
    pub firmware_version: String,
}

/// Active sensor area in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    /// Bytes needed to hold one frame of this geometry in `format`.
    pub fn frame_size_bytes(&self, format: &PixelFormat) -> u64 {
        format.frame_size_bytes(self.width, self.height)
    }
}

/// Snapshot of the settings an operator usually wants to see at once.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    pub identity: DeviceIdentity,
    pub geometry: Geometry,
    pub pixel_format: PixelFormat,
    pub line_length: u16,
    pub line_period_us: f64,
    pub exposure_time_ms: f64,
    pub wait_time_ms: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorState {
    Open,
    Closed,
}

/// A camera board bound to one open transport.
///
/// All methods take `&mut self`: read-modify-write sequences are only safe
/// when nothing else touches the bus in between. Wrap in
/// [`SharedSensor`](crate::SharedSensor) to share across threads.
pub struct Sensor<T: RegisterTransport> {
    model: &'static ModelConfig,
    transport: Option<T>,
}

impl<T: RegisterTransport> Sensor<T> {
    /// Open a board through `connector` and bind it to `model`.
    pub fn open<C>(connector: &C, paths: &ConnectionPaths, model: &'static ModelConfig) -> Result<Self>
    where
        C: Connector<Transport = T>,
    {
        let transport = connector.open(paths).map_err(SensorError::Connect)?;
        tracing::info!(
            model = model.name,
            binary = %paths.binary.display(),
            descriptor = %paths.descriptor.display(),
            "opened evaluation board"
        );
        Ok(Self::from_transport(transport, model))
    }

    /// Wrap an already-open transport.
    pub fn from_transport(transport: T, model: &'static ModelConfig) -> Self {
        Self {
            model,
            transport: Some(transport),
        }
    }

    pub fn model(&self) -> &'static ModelConfig {
        self.model
    }

    pub fn state(&self) -> SensorState {
        if self.transport.is_some() {
            SensorState::Open
        } else {
            SensorState::Closed
        }
    }

    /// The underlying transport, while open.
    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    /// Release the transport. Only the first call has any effect.
    pub fn close(&mut self) {
        match self.transport.take() {
            Some(mut transport) => {
                transport.close();
                tracing::info!(model = self.model.name, "closed evaluation board");
            }
            None => tracing::debug!(model = self.model.name, "close on already-closed board"),
        }
    }

    pub fn get_identity(&mut self) -> Result<DeviceIdentity> {
        self.ensure_open()?;
        Ok(DeviceIdentity {
            vendor: self.read_string(BootstrapRegister::DeviceVendorName)?,
            model: self.read_string(BootstrapRegister::DeviceModelName)?,
            version: self.read_string(BootstrapRegister::DeviceVersion)?,
            serial: self.read_string(BootstrapRegister::SerialNumber)?,
            firmware_version: self.read_string(BootstrapRegister::DeviceFirmwareVersion)?,
        })
    }

    pub fn get_geometry(&mut self) -> Result<Geometry> {
        self.ensure_open()?;
        let width = self.bootstrap(BootstrapRegister::SensorWidth)?;
        let height = self.bootstrap(BootstrapRegister::SensorHeight)?;
        Ok(Geometry {
            width: self.read_u32(width)?,
            height: self.read_u32(height)?,
        })
    }

    pub fn get_pixel_format(&mut self) -> Result<PixelFormat> {
        self.ensure_open()?;
        let spec = self.bootstrap(BootstrapRegister::PixelFormat)?;
        let code = self.read_u32(spec)?;
        codec::decode_pixel_format(self.model.pixel_formats, code)
    }

    /// Raw line length in sensor clock cycles.
    ///
    /// Always read from the device: configuration loads change it.
    pub fn get_line_length(&mut self) -> Result<u16> {
        self.ensure_open()?;
        let spec = self.sensor(SensorRegister::LineLength)?;
        self.read_u16(spec)
    }

    pub fn line_period_us(&mut self) -> Result<f64> {
        self.ensure_open()?;
        let line_length = self.get_line_length()?;
        Ok(self.model.line_period_us(line_length))
    }

    pub fn get_exposure_time_ms(&mut self) -> Result<f64> {
        self.ensure_open()?;
        self.get_timing_ms(SensorRegister::ExposureTime)
    }

    pub fn set_exposure_time_ms(&mut self, value_ms: f64) -> Result<()> {
        self.ensure_open()?;
        self.set_timing_ms(SensorRegister::ExposureTime, value_ms)
    }

    pub fn get_wait_time_ms(&mut self) -> Result<f64> {
        self.ensure_open()?;
        self.get_timing_ms(SensorRegister::WaitTime)
    }

    pub fn set_wait_time_ms(&mut self, value_ms: f64) -> Result<()> {
        self.ensure_open()?;
        self.set_timing_ms(SensorRegister::WaitTime, value_ms)
    }

    fn get_timing_ms(&mut self, register: SensorRegister) -> Result<f64> {
        let spec = self.sensor(register)?;
        let line_length = self.get_line_length()?;
        let raw = self.read_u16(spec)?;
        Ok(codec::decode_timing_ms(raw, line_length, self.model.clock_mhz))
    }

    fn set_timing_ms(&mut self, register: SensorRegister, value_ms: f64) -> Result<()> {
        let spec = self.sensor(register)?;
        let line_length = self.get_line_length()?;
        let raw = codec::encode_timing_ms(value_ms, line_length, self.model.clock_mhz)?;
        tracing::debug!(register = ?register, value_ms, line_length, raw, "setting timing");
        self.write_u16(spec, raw)
    }

    pub fn get_analog_gain(&mut self) -> Result<u16> {
        self.ensure_open()?;
        let spec = self.sensor(SensorRegister::AnalogGain)?;
        self.read_u16(spec)
    }

    pub fn set_analog_gain(&mut self, code: u16) -> Result<()> {
        self.ensure_open()?;
        let spec = self.sensor(SensorRegister::AnalogGain)?;
        self.write_u16(spec, code)
    }

    /// Image (black-level) offset. Only mapped on models exposing it.
    pub fn get_image_offset(&mut self) -> Result<u16> {
        self.ensure_open()?;
        let spec = self.sensor(SensorRegister::ImageOffset)?;
        self.read_u16(spec)
    }

    pub fn set_image_offset(&mut self, value: u16) -> Result<()> {
        self.ensure_open()?;
        let spec = self.sensor(SensorRegister::ImageOffset)?;
        self.write_u16(spec, value)
    }

    pub fn get_clamp_mode(&mut self) -> Result<u16> {
        self.ensure_open()?;
        let target = self.clamp_field()?;
        let spec = self.sensor(target.register)?;
        Ok(target.field.extract(self.read_u16(spec)?))
    }

    pub fn set_clamp_mode(&mut self, value: u16) -> Result<()> {
        self.ensure_open()?;
        let target = self.clamp_field()?;
        self.update_field(target, value)
    }

    fn clamp_field(&self) -> Result<FieldRef> {
        self.model
            .clamp_mode
            .ok_or(SensorError::UnknownFeature("ClampMode", self.model.name))
    }

    pub fn enable_vertical_subsampling(&mut self, enable: bool) -> Result<()> {
        self.ensure_open()?;
        let spec = self.sensor(SensorRegister::VerticalSubsampling)?;
        // 4 selects 1-in-2 row readout, 0 full resolution
        self.write_u16(spec, if enable { 4 } else { 0 })
    }

    /// Write red/green/blue gains (1.0 = unity).
    pub fn set_white_balance(&mut self, red: f64, green: f64, blue: f64) -> Result<()> {
        self.ensure_open()?;
        let gains = [
            (BootstrapRegister::AwbRedGain, codec::encode_gain_micro(red)?),
            (BootstrapRegister::AwbGreenGain, codec::encode_gain_micro(green)?),
            (BootstrapRegister::AwbBlueGain, codec::encode_gain_micro(blue)?),
        ];
        for (register, micro) in gains {
            let spec = self.bootstrap(register)?;
            self.write_u32(spec, micro)?;
        }
        Ok(())
    }

    /// Enable or disable automatic white balance while acquiring.
    pub fn enable_white_balance(&mut self, enable: bool) -> Result<()> {
        self.ensure_open()?;
        let spec = self.bootstrap(BootstrapRegister::AwbEnable)?;
        self.write_u32(spec, u32::from(enable))
    }

    /// Run one white-balance pass (`true`) or return to enabled-idle (`false`).
    pub fn trigger_white_balance(&mut self, run: bool) -> Result<()> {
        self.ensure_open()?;
        let spec = self.bootstrap(BootstrapRegister::AwbEnable)?;
        self.write_u32(spec, if run { 3 } else { 1 })
    }

    pub fn get_auto_exposure(&mut self) -> Result<bool> {
        self.ensure_open()?;
        let spec = self.bootstrap(BootstrapRegister::AutoExposure)?;
        Ok(self.read_u32(spec)? != 0)
    }

    pub fn set_auto_exposure(&mut self, enable: bool) -> Result<()> {
        self.ensure_open()?;
        let spec = self.bootstrap(BootstrapRegister::AutoExposure)?;
        self.write_u32(spec, u32::from(enable))
    }

    /// Trigger a named operating mode.
    ///
    /// Returns as soon as the trigger is written. The board applies the
    /// profile asynchronously; call [`settle`](Self::settle) before relying
    /// on any register again.
    pub fn load_configuration_profile(&mut self, name: &str) -> Result<()> {
        self.ensure_open()?;
        let profile: ConfigurationProfile = name.parse()?;
        self.load_profile(profile)
    }

    pub fn load_profile(&mut self, profile: ConfigurationProfile) -> Result<()> {
        self.ensure_open()?;
        let spec = self.bootstrap(BootstrapRegister::ConfigurationLoad)?;
        tracing::info!(%profile, code = profile.code(), "loading configuration profile");
        self.write_u32(spec, profile.code())
    }

    /// Wait for a device-side operation such as a profile load.
    pub fn settle(&mut self, duration: Duration) -> Result<()> {
        self.bus()?.settle(duration);
        Ok(())
    }

    /// Write every table entry in order, waiting the table's delay after each,
    /// including the last, so the board has settled when this returns.
    ///
    /// Stops at the first failure; earlier entries stay applied.
    pub fn apply_config_table(&mut self, table: &SensorConfigTable) -> Result<()> {
        self.ensure_open()?;
        let delay = table.inter_write_delay();
        tracing::info!(
            table = %table.name,
            entries = table.entries.len(),
            delay_ms = table.inter_write_delay_ms,
            "applying config table"
        );
        for (step, entry) in table.entries.iter().enumerate() {
            let spec = self
                .sensor_offset(entry.offset)
                .map_err(|e| e.at_step(step, entry.offset))?;
            self.write_u16(spec, entry.value)
                .map_err(|e| e.at_step(step, spec.address))?;
            self.settle(delay)?;
        }
        Ok(())
    }

    /// Read a sensor register by offset from the model's sensor base.
    pub fn read_sensor_register(&mut self, offset: u64) -> Result<u16> {
        self.ensure_open()?;
        let spec = self.sensor_offset(offset)?;
        self.read_u16(spec)
    }

    /// Write a sensor register by offset from the model's sensor base.
    pub fn write_sensor_register(&mut self, offset: u64, value: u16) -> Result<()> {
        self.ensure_open()?;
        let spec = self.sensor_offset(offset)?;
        self.write_u16(spec, value)
    }

    fn sensor_offset(&self, offset: u64) -> Result<RegisterSpec> {
        let address = self
            .model
            .sensor
            .base()
            .checked_add(offset)
            .ok_or_else(|| SensorError::out_of_range("sensor register offset", offset))?;
        Ok(RegisterSpec { address, width: 2 })
    }

    /// Run the model's thermal-sensor bring-up sequence.
    ///
    /// Steps run strictly in order and abort on the first failure.
    pub fn enable_thermal_sensor(&mut self) -> Result<()> {
        self.ensure_open()?;
        let model = self.model;
        let thermal = model
            .thermal
            .as_ref()
            .ok_or(SensorError::UnknownFeature("ThermalSensor", model.name))?;
        for (step, action) in thermal.enable_sequence.iter().enumerate() {
            let spec = self.sensor(action.register())?;
            let outcome = match *action {
                RegisterStep::SetField { target, value } => self.update_field(target, value),
                RegisterStep::Write { value, .. } => self.write_u16(spec, value),
            };
            outcome.map_err(|e| e.at_step(step, spec.address))?;
        }
        tracing::info!(model = model.name, "thermal sensor enabled");
        Ok(())
    }

    pub fn read_thermal_celsius(&mut self) -> Result<f64> {
        self.ensure_open()?;
        let model = self.model;
        let thermal = model
            .thermal
            .as_ref()
            .ok_or(SensorError::UnknownFeature("ThermalSensor", model.name))?;
        let spec = self.sensor(thermal.readout)?;
        let raw = self.read_u16(spec)?;
        Ok(codec::decode_thermo_celsius(raw))
    }

    pub fn device_info(&mut self) -> Result<DeviceInfo> {
        self.ensure_open()?;
        let identity = self.get_identity()?;
        let geometry = self.get_geometry()?;
        let pixel_format = self.get_pixel_format()?;
        let line_length = self.get_line_length()?;
        let exposure_time_ms = self.get_exposure_time_ms()?;
        let wait_time_ms = if self.model.sensor.contains(SensorRegister::WaitTime) {
            Some(self.get_wait_time_ms()?)
        } else {
            None
        };
        Ok(DeviceInfo {
            identity,
            geometry,
            pixel_format,
            line_length,
            line_period_us: self.model.line_period_us(line_length),
            exposure_time_ms,
            wait_time_ms,
        })
    }

    fn ensure_open(&self) -> Result<()> {
        match self.transport {
            Some(_) => Ok(()),
            None => Err(SensorError::InvalidState),
        }
    }

    fn bus(&mut self) -> Result<&mut T> {
        self.transport.as_mut().ok_or(SensorError::InvalidState)
    }

    fn bootstrap(&self, key: BootstrapRegister) -> Result<RegisterSpec> {
        self.model.bootstrap.resolve(key)
    }

    fn sensor(&self, key: SensorRegister) -> Result<RegisterSpec> {
        self.model.sensor.resolve(key)
    }

    fn read_raw(&mut self, spec: RegisterSpec) -> Result<Vec<u8>> {
        let bytes = self
            .bus()?
            .read(spec.address, spec.width)
            .map_err(|source| SensorError::Transport {
                address: spec.address,
                source,
            })?;
        tracing::debug!(address = spec.address, size = spec.width, ?bytes, "register read");
        Ok(bytes)
    }

    fn write_raw(&mut self, address: u64, data: &[u8]) -> Result<()> {
        tracing::debug!(address, ?data, "register write");
        self.bus()?
            .write(address, data)
            .map_err(|source| SensorError::Transport { address, source })
    }

    fn read_u16(&mut self, spec: RegisterSpec) -> Result<u16> {
        let bytes = self.read_raw(spec)?;
        codec::decode_u16_le(&bytes)
    }

    fn read_u32(&mut self, spec: RegisterSpec) -> Result<u32> {
        let bytes = self.read_raw(spec)?;
        codec::decode_u32_le(&bytes)
    }

    fn read_string(&mut self, key: BootstrapRegister) -> Result<String> {
        let spec = self.bootstrap(key)?;
        let bytes = self.read_raw(spec)?;
        codec::decode_fixed_string(&bytes, usize::from(spec.width))
    }

    fn write_u16(&mut self, spec: RegisterSpec, value: u16) -> Result<()> {
        self.write_raw(spec.address, &value.to_le_bytes())
    }

    fn write_u32(&mut self, spec: RegisterSpec, value: u32) -> Result<()> {
        self.write_raw(spec.address, &value.to_le_bytes())
    }

    /// Read-modify-write of one bit field.
    fn update_field(&mut self, target: FieldRef, value: u16) -> Result<()> {
        target.field.validate(value)?;
        let spec = self.sensor(target.register)?;
        let current = self.read_u16(spec)?;
        let updated = target.field.insert(current, value)?;
        tracing::debug!(
            field = target.field.name,
            value,
            current,
            updated,
            "updating register field"
        );
        self.write_u16(spec, updated)
    }
}

impl<T: RegisterTransport> Drop for Sensor<T> {
    fn drop(&mut self) {
        if self.transport.is_some() {
            tracing::warn!(model = self.model.name, "sensor dropped while open, closing");
            self.close();
        }
    }
}

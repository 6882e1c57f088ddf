//! Controller configuration snapshots
//!
//! A snapshot is produced by an external loader and handed to a
//! controller through `apply_config`.  The controller never parses or
//! persists it; the codec helpers at the bottom of this file are for the
//! loader side of that boundary.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Hardware address of a device on a shared bus (e.g. a OneWire ROM code).
pub type HwAddress = [u8; 8];

/// Identity of one physical, addressable device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Output pin number. `0` means "not assigned".
    pub pin: u8,
    /// Bus address; all zeroes for devices wired directly to a pin.
    pub hw_address: HwAddress,
}

impl DeviceDescriptor {
    pub const fn new(pin: u8, hw_address: HwAddress) -> Self {
        Self { pin, hw_address }
    }

    /// Whether an actuator can be bound to this descriptor.
    pub const fn is_addressable(&self) -> bool {
        self.pin != 0
    }
}

/// Feedback controller tunings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 10.0,
            ki: 0.05,
            kd: 1.0,
        }
    }
}

/// Settings shared by every controller variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Desired steady-state temperature (°C). `<= 0` selects fixed heater duty.
    pub target_temperature_c: f32,
    /// Heater output device.
    pub heater: DeviceDescriptor,
    /// Temperature probe read on every tick.
    pub temp_sensor: DeviceDescriptor,
    /// Control period (milliseconds); doubles as the feedback sample time.
    pub heating_period_ms: u32,
    /// Feedback controller tunings.
    pub gains: PidGains,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            target_temperature_c: 0.0,
            heater: DeviceDescriptor::default(),
            temp_sensor: DeviceDescriptor::default(),
            heating_period_ms: 1000, // 1 Hz
            gains: PidGains::default(),
        }
    }
}

/// Brewing controller configuration: one heater, up to two pumps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BrewConfig {
    pub control: ControlConfig,
    /// Heater duty (0-100) used only when no target temperature is set.
    pub heater_duty: f32,
    /// Pump 1 duty (0-100). `<= 0` disables the pump.
    pub pump1_duty: f32,
    /// Pump 2 duty (0-100). `<= 0` disables the pump.
    pub pump2_duty: f32,
    pub pump1: DeviceDescriptor,
    pub pump2: DeviceDescriptor,
}

/// Hottest target a snapshot may request (°C).
pub const MAX_TARGET_TEMPERATURE_C: f32 = 110.0;

impl BrewConfig {
    pub fn target_temperature(&self) -> f32 {
        self.control.target_temperature_c
    }

    /// Range-check every field.
    ///
    /// Non-positive duties and temperatures are legal: they select
    /// "disabled" and "fixed duty" respectively.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.control;
        if !c.target_temperature_c.is_finite() || c.target_temperature_c > MAX_TARGET_TEMPERATURE_C
        {
            return Err(ConfigError::ValidationFailed(
                "target_temperature_c must be finite and <= 110.0",
            ));
        }
        if c.heating_period_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "heating_period_ms must be > 0",
            ));
        }
        let PidGains { kp, ki, kd } = c.gains;
        if [kp, ki, kd].iter().any(|g| !g.is_finite() || *g < 0.0) {
            return Err(ConfigError::ValidationFailed(
                "PID gains must be finite and >= 0",
            ));
        }
        check_duty(self.heater_duty, "heater_duty must be finite and <= 100")?;
        check_duty(self.pump1_duty, "pump1_duty must be finite and <= 100")?;
        check_duty(self.pump2_duty, "pump2_duty must be finite and <= 100")?;
        Ok(())
    }

    /// Decode and validate a JSON snapshot.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_slice(bytes).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Decode and validate a postcard-encoded snapshot.
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, ConfigError> {
        let cfg: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate and encode with postcard.
    pub fn to_postcard(&self) -> Result<Vec<u8>, ConfigError> {
        self.validate()?;
        postcard::to_allocvec(self).map_err(|_| ConfigError::EncodeFailed)
    }
}

fn check_duty(duty: f32, msg: &'static str) -> Result<(), ConfigError> {
    if duty.is_finite() && duty <= 100.0 {
        Ok(())
    } else {
        Err(ConfigError::ValidationFailed(msg))
    }
}

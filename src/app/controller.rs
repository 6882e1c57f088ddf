//! Controller capability set and the state shared by every variant.
//!
//! A variant (the brewing controller is the only one today) composes a
//! [`ControllerBase`], which owns the heater actuator, the injected device
//! gateway, the feedback controller and the last measured temperature.
//! Variant-specific outputs (pumps, fans, ...) live in the variant.

use log::{debug, info};

use crate::config::ControlConfig;
use crate::drivers::actuator::PwmActuator;

use super::ports::{DevicePort, FeedbackController, Mode, TemperaturePort};

/// Output range of the feedback controller, in duty percent.
pub const OUTPUT_MIN: f32 = 0.0;
pub const OUTPUT_MAX: f32 = 100.0;

/// Operations every controller variant supports.
///
/// All entry points are synchronous and must be serialized by the caller;
/// none of them blocks or fails.
pub trait Controller {
    type Config;

    /// Re-establish operating mode and actuator ownership from `config`.
    fn apply_config(&mut self, config: Self::Config);

    /// One control period.  Safe to call unconditionally.
    fn tick(&mut self, sensor: &mut impl TemperaturePort);

    /// Command every owned output off and release it.  Terminal.
    fn dispose(&mut self);

    fn setpoint(&self) -> f32;

    fn set_setpoint(&mut self, setpoint: f32);

    fn target_temperature(&self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// ControllerBase
// ───────────────────────────────────────────────────────────────

pub struct ControllerBase<D, F> {
    config: ControlConfig,
    devices: D,
    feedback: F,
    heater: Option<PwmActuator>,
    current_temperature: f32,
}

impl<D: DevicePort, F: FeedbackController> ControllerBase<D, F> {
    pub fn new(devices: D, feedback: F) -> Self {
        Self {
            config: ControlConfig::default(),
            devices,
            feedback,
            heater: None,
            current_temperature: 0.0,
        }
    }

    // ── Configuration ─────────────────────────────────────────

    /// Store `config` and bring the heater binding and tunings in line with it.
    pub fn set_config(&mut self, config: ControlConfig) {
        self.config = config;
        self.feedback.set_tunings(config.gains);
        self.feedback.set_sample_period_ms(config.heating_period_ms);

        if self
            .heater
            .as_ref()
            .is_some_and(|h| !h.is_bound_to(&config.heater))
        {
            self.release_heater();
        }
        if self.heater.is_none() {
            self.heater = PwmActuator::bind(config.heater);
            if let Some(heater) = &self.heater {
                info!("heater bound to pin {}", heater.pin());
            }
        }
    }

    // ── Feedback controller ───────────────────────────────────

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    pub fn feedback_mut(&mut self) -> &mut F {
        &mut self.feedback
    }

    pub fn setpoint(&self) -> f32 {
        self.feedback.setpoint()
    }

    pub fn set_setpoint(&mut self, setpoint: f32) {
        self.feedback.set_setpoint(setpoint);
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.feedback.mode() != mode {
            info!("feedback controller -> {:?}", mode);
        }
        self.feedback.set_mode(mode);
    }

    /// Fresh output for the current setpoint and last measured temperature.
    pub fn output(&mut self) -> f32 {
        self.feedback.compute(self.current_temperature)
    }

    // ── Temperature ───────────────────────────────────────────

    /// Sample the configured probe and remember the reading.
    pub fn read_temperature(&mut self, sensor: &mut impl TemperaturePort) -> f32 {
        self.current_temperature = sensor.read_celsius(&self.config.temp_sensor);
        self.current_temperature
    }

    pub fn current_temperature(&self) -> f32 {
        self.current_temperature
    }

    // ── Actuators ─────────────────────────────────────────────

    pub fn heater(&self) -> Option<&PwmActuator> {
        self.heater.as_ref()
    }

    pub fn turn_on_heater(&mut self, duty: f32) {
        if let Some(heater) = self.heater.as_mut() {
            debug!("heater -> {:.1}%", duty);
            dispatch(&self.devices, heater, duty);
        }
    }

    pub fn turn_off_heater(&mut self) {
        self.turn_on_heater(0.0);
    }

    /// Record `duty` on `actuator` and forward it to the gateway.
    pub fn command(&self, actuator: &mut PwmActuator, duty: f32) {
        dispatch(&self.devices, actuator, duty);
    }

    fn release_heater(&mut self) {
        self.turn_off_heater();
        if let Some(heater) = self.heater.take() {
            info!("heater released from pin {}", heater.pin());
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Heater off and released, feedback controller parked in manual.
    pub fn dispose(&mut self) {
        self.release_heater();
        self.feedback.set_mode(Mode::Manual);
    }
}

/// The two-step command primitive: update the handle, then the hardware.
fn dispatch(devices: &impl DevicePort, actuator: &mut PwmActuator, duty: f32) {
    actuator.set_duty(duty);
    devices.set_device_value(actuator.pin(), actuator.hw_address(), duty);
}

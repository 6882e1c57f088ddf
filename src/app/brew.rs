//! Brewing controller — one heater, up to two pumps.
//!
//! ```text
//!  BrewConfig ──▶ apply_config ──▶ mode + pump handles
//!  TemperaturePort ──▶ tick ──▶ setpoint ramp ──▶ PID ──▶ heater duty ──▶ DevicePort
//! ```
//!
//! ## Setpoint ramp
//!
//! With a target set, the feedback controller first chases
//! `target - RAMP_MARGIN`.  Only once the measured temperature has come
//! within `RAMP_MARGIN` of that interim setpoint (while still below the
//! target) is the setpoint promoted to the target itself.  This keeps the
//! integral term from winding up against a far-away target and
//! overshooting.  Promotion is one-shot; only `apply_config` resets it.
//!
//! ## Pump slots
//!
//! Each slot holds at most one [`PwmActuator`].  A positive duty binds the
//! slot's descriptor (if it has a pin) and drives it; a non-positive duty
//! zeroes and releases whatever is bound.  A descriptor change under a
//! positive duty is handled as disable-then-enable.

use log::{debug, info, trace, warn};

use crate::config::{BrewConfig, DeviceDescriptor};
use crate::drivers::actuator::PwmActuator;

use super::controller::{Controller, ControllerBase, OUTPUT_MAX, OUTPUT_MIN};
use super::ports::{DevicePort, FeedbackController, Mode, TemperaturePort};

/// Offset below the target used as the interim setpoint (°C).
pub const RAMP_MARGIN: f32 = 0.5;

/// One of the two auxiliary pump outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpSlot {
    Pump1,
    Pump2,
}

impl PumpSlot {
    pub const ALL: [PumpSlot; 2] = [PumpSlot::Pump1, PumpSlot::Pump2];

    const fn index(self) -> usize {
        match self {
            PumpSlot::Pump1 => 0,
            PumpSlot::Pump2 => 1,
        }
    }
}

pub struct BrewController<D: DevicePort, F: FeedbackController> {
    base: ControllerBase<D, F>,
    config: BrewConfig,
    pumps: [Option<PwmActuator>; 2],
    disposed: bool,
}

impl<D: DevicePort, F: FeedbackController> BrewController<D, F> {
    /// Build a controller and apply `config` immediately.
    pub fn new(config: BrewConfig, devices: D, feedback: F) -> Self {
        let mut controller = Self {
            base: ControllerBase::new(devices, feedback),
            config,
            pumps: [None, None],
            disposed: false,
        };
        controller.apply_config(config);
        controller
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &BrewConfig {
        &self.config
    }

    pub fn pump(&self, slot: PumpSlot) -> Option<&PwmActuator> {
        self.pumps[slot.index()].as_ref()
    }

    /// Number of pump handles currently bound.
    pub fn live_pumps(&self) -> usize {
        self.pumps.iter().flatten().count()
    }

    pub fn heater(&self) -> Option<&PwmActuator> {
        self.base.heater()
    }

    pub fn feedback(&self) -> &F {
        self.base.feedback()
    }

    pub fn feedback_mut(&mut self) -> &mut F {
        self.base.feedback_mut()
    }

    pub fn current_temperature(&self) -> f32 {
        self.base.current_temperature()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ── Command primitives ────────────────────────────────────

    /// Drive `slot` at its configured duty.  No-op if nothing is bound.
    pub fn activate(&mut self, slot: PumpSlot) {
        let duty = self.slot_duty(slot);
        if let Some(pump) = self.pumps[slot.index()].as_mut() {
            self.base.command(pump, duty);
        }
    }

    /// Drive `slot` to zero.  No-op if nothing is bound.
    pub fn deactivate(&mut self, slot: PumpSlot) {
        if let Some(pump) = self.pumps[slot.index()].as_mut() {
            self.base.command(pump, 0.0);
        }
    }

    /// Drive the heater at `duty`.  No-op if no heater is bound.
    pub fn command_heater(&mut self, duty: f32) {
        self.base.turn_on_heater(duty);
    }

    // ── Internal ──────────────────────────────────────────────

    fn slot_duty(&self, slot: PumpSlot) -> f32 {
        match slot {
            PumpSlot::Pump1 => self.config.pump1_duty,
            PumpSlot::Pump2 => self.config.pump2_duty,
        }
    }

    fn slot_descriptor(&self, slot: PumpSlot) -> DeviceDescriptor {
        match slot {
            PumpSlot::Pump1 => self.config.pump1,
            PumpSlot::Pump2 => self.config.pump2,
        }
    }

    fn resolve_pump(&mut self, slot: PumpSlot) {
        if self.slot_duty(slot) > 0.0 {
            self.bind(slot);
            self.activate(slot);
        } else {
            self.release(slot);
        }
    }

    /// Make sure the slot's handle matches its descriptor.
    fn bind(&mut self, slot: PumpSlot) {
        let descriptor = self.slot_descriptor(slot);
        let i = slot.index();

        if self.pumps[i]
            .as_ref()
            .is_some_and(|p| !p.is_bound_to(&descriptor))
        {
            self.release(slot);
        }
        if self.pumps[i].is_none() {
            self.pumps[i] = PwmActuator::bind(descriptor);
            match &self.pumps[i] {
                Some(pump) => info!("{:?} bound to pin {}", slot, pump.pin()),
                None => debug!("{:?} enabled without a pin, nothing bound", slot),
            }
        }
    }

    /// Zero the slot's handle, then drop it.
    fn release(&mut self, slot: PumpSlot) {
        self.deactivate(slot);
        if let Some(pump) = self.pumps[slot.index()].take() {
            info!("{:?} released from pin {}", slot, pump.pin());
        }
    }
}

impl<D: DevicePort, F: FeedbackController> Controller for BrewController<D, F> {
    type Config = BrewConfig;

    fn apply_config(&mut self, config: BrewConfig) {
        if self.disposed {
            warn!("apply_config on a disposed controller ignored");
            return;
        }
        self.config = config;
        self.base.set_config(config.control);
        self.base.feedback_mut().set_output_limits(OUTPUT_MIN, OUTPUT_MAX);

        let target = config.target_temperature();
        if target > 0.0 {
            self.base.set_setpoint(target - RAMP_MARGIN);
            self.base.set_mode(Mode::Automatic);
        } else {
            self.base.set_mode(Mode::Manual);
            self.base.turn_on_heater(config.heater_duty);
        }

        for slot in PumpSlot::ALL {
            self.resolve_pump(slot);
        }
    }

    fn tick(&mut self, sensor: &mut impl TemperaturePort) {
        if self.disposed {
            return;
        }
        let target = self.config.target_temperature();
        if target <= 0.0 {
            return;
        }
        let measured = self.base.read_temperature(sensor);
        if !measured.is_finite() || measured <= 0.0 {
            trace!("no valid temperature reading, regulation skipped");
            return;
        }

        let setpoint = self.base.setpoint();
        if setpoint != target && measured < target && measured > setpoint - RAMP_MARGIN {
            debug!(
                "setpoint {:.1} -> {:.1} at {:.2}\u{00b0}C",
                setpoint, target, measured
            );
            self.base.set_setpoint(target);
        }

        let output = self.base.output();
        if output > 0.0 {
            self.base.turn_on_heater(output);
        } else {
            self.base.turn_off_heater();
        }
    }

    fn dispose(&mut self) {
        if self.disposed {
            warn!("controller already disposed");
            return;
        }
        self.base.dispose();

        for slot in PumpSlot::ALL {
            self.deactivate(slot);
        }
        for slot in PumpSlot::ALL {
            if let Some(pump) = self.pumps[slot.index()].take() {
                info!("{:?} released from pin {}", slot, pump.pin());
            }
        }
        self.disposed = true;
    }

    fn setpoint(&self) -> f32 {
        self.base.setpoint()
    }

    fn set_setpoint(&mut self, setpoint: f32) {
        self.base.set_setpoint(setpoint);
    }

    fn target_temperature(&self) -> f32 {
        self.config.target_temperature()
    }
}

impl<D: DevicePort, F: FeedbackController> Drop for BrewController<D, F> {
    fn drop(&mut self) {
        if !self.disposed {
            self.dispose();
        }
    }
}

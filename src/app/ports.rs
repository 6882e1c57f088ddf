//! Port traits — the hexagonal boundary between the control core and the outside world.
//!
//! ```text
//!   ReadingTable ──▶ TemperaturePort ──▶ ┌────────────────┐ ──▶ DevicePort ──▶ DeviceRegistry
//!                                        │ BrewController │
//!   PidController ◀─ FeedbackController ─└────────────────┘
//! ```
//!
//! The controller consumes these via generics, so the core never touches
//! hardware, clocks, or storage directly.

use std::sync::Arc;

use crate::config::{DeviceDescriptor, HwAddress, PidGains};

// ───────────────────────────────────────────────────────────────
// Device dispatch port (driven adapter: core → hardware)
// ───────────────────────────────────────────────────────────────

/// Process-wide sink for pin-level output commands.
///
/// Fire-and-forget: no acknowledgment is modeled.  Implementations are
/// shared by every controller in the process and must serialize the
/// physical writes themselves, hence `&self`.
pub trait DevicePort {
    /// Drive the device at `pin`/`hw_address` to `duty` (0–100).
    fn set_device_value(&self, pin: u8, hw_address: HwAddress, duty: f32);
}

impl<T: DevicePort + ?Sized> DevicePort for &T {
    fn set_device_value(&self, pin: u8, hw_address: HwAddress, duty: f32) {
        (**self).set_device_value(pin, hw_address, duty);
    }
}

impl<T: DevicePort + ?Sized> DevicePort for Arc<T> {
    fn set_device_value(&self, pin: u8, hw_address: HwAddress, duty: f32) {
        (**self).set_device_value(pin, hw_address, duty);
    }
}

// ───────────────────────────────────────────────────────────────
// Feedback controller port
// ───────────────────────────────────────────────────────────────

/// Operating mode of a [`FeedbackController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The controller computes its output from setpoint and measurement.
    Automatic,
    /// The output is fixed by the caller; `compute` does not integrate.
    Manual,
}

/// Closed-loop controller driving a measured value toward a setpoint.
///
/// Blanket-implemented for `&mut T` so the surrounding application can
/// keep ownership of the controller and lend it to the core.
pub trait FeedbackController {
    /// Clamp every future output to `[low, high]`.
    fn set_output_limits(&mut self, low: f32, high: f32);

    fn set_mode(&mut self, mode: Mode);

    fn mode(&self) -> Mode;

    fn set_setpoint(&mut self, setpoint: f32);

    fn setpoint(&self) -> f32;

    /// Replace the tunings.
    fn set_tunings(&mut self, gains: PidGains);

    /// Interval between successive `compute` calls (milliseconds).
    fn set_sample_period_ms(&mut self, period_ms: u32);

    /// Compute a fresh output from the current setpoint and `measured`.
    /// The result is always within the configured limits.
    fn compute(&mut self, measured: f32) -> f32;
}

impl<T: FeedbackController + ?Sized> FeedbackController for &mut T {
    fn set_output_limits(&mut self, low: f32, high: f32) {
        (**self).set_output_limits(low, high);
    }

    fn set_mode(&mut self, mode: Mode) {
        (**self).set_mode(mode);
    }

    fn mode(&self) -> Mode {
        (**self).mode()
    }

    fn set_setpoint(&mut self, setpoint: f32) {
        (**self).set_setpoint(setpoint);
    }

    fn setpoint(&self) -> f32 {
        (**self).setpoint()
    }

    fn set_tunings(&mut self, gains: PidGains) {
        (**self).set_tunings(gains);
    }

    fn set_sample_period_ms(&mut self, period_ms: u32) {
        (**self).set_sample_period_ms(period_ms);
    }

    fn compute(&mut self, measured: f32) -> f32 {
        (**self).compute(measured)
    }
}

// ───────────────────────────────────────────────────────────────
// Temperature port (driven adapter: hardware → core)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the temperature probe.
pub trait TemperaturePort {
    /// Latest reading of `sensor` in °C.  Values `<= 0` mean "no valid reading".
    fn read_celsius(&mut self, sensor: &DeviceDescriptor) -> f32;
}

impl<T: TemperaturePort + ?Sized> TemperaturePort for &mut T {
    fn read_celsius(&mut self, sensor: &DeviceDescriptor) -> f32 {
        (**self).read_celsius(sensor)
    }
}

//! PID controller for heater regulation
//!
//! Proportional-integral-derivative controller with output clamping,
//! integral anti-windup, derivative-on-measurement and bumpless
//! manual → automatic transfer.

use crate::app::ports::{FeedbackController, Mode};
use crate::config::PidGains;

/// PID controller
pub struct PidController {
    gains: PidGains,
    setpoint: f32,
    /// Integral term, already scaled by `ki`.
    integral: f32,
    /// Previous measurement; `None` until the first automatic compute.
    prev_input: Option<f32>,
    output: f32,
    output_min: f32,
    output_max: f32,
    sample_secs: f32,
    mode: Mode,
}

impl PidController {
    pub fn new(gains: PidGains, sample_period_ms: u32) -> Self {
        Self {
            gains,
            setpoint: 0.0,
            integral: 0.0,
            prev_input: None,
            output: 0.0,
            output_min: 0.0,
            output_max: 100.0,
            sample_secs: sample_period_ms as f32 / 1000.0,
            mode: Mode::Manual,
        }
    }

    /// Last computed (or manually held) output.
    pub fn output(&self) -> f32 {
        self.output
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    fn clamp(&self, v: f32) -> f32 {
        v.clamp(self.output_min, self.output_max)
    }
}

impl FeedbackController for PidController {
    fn set_output_limits(&mut self, low: f32, high: f32) {
        if low >= high {
            return;
        }
        self.output_min = low;
        self.output_max = high;
        if self.mode == Mode::Automatic {
            self.output = self.clamp(self.output);
            self.integral = self.clamp(self.integral);
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        if mode == Mode::Automatic && self.mode == Mode::Manual {
            // Bumpless transfer: resume from the output that was held.
            self.integral = self.clamp(self.output);
            self.prev_input = None;
        }
        self.mode = mode;
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn set_setpoint(&mut self, setpoint: f32) {
        self.setpoint = setpoint;
    }

    fn setpoint(&self) -> f32 {
        self.setpoint
    }

    fn set_tunings(&mut self, gains: PidGains) {
        if gains.kp < 0.0 || gains.ki < 0.0 || gains.kd < 0.0 {
            return;
        }
        self.gains = gains;
    }

    fn set_sample_period_ms(&mut self, period_ms: u32) {
        if period_ms > 0 {
            self.sample_secs = period_ms as f32 / 1000.0;
        }
    }

    fn compute(&mut self, measured: f32) -> f32 {
        if self.mode == Mode::Manual || !measured.is_finite() {
            return self.output;
        }

        let dt = self.sample_secs;
        let error = self.setpoint - measured;

        // Proportional
        let p = self.gains.kp * error;

        // Integral (clamped so it cannot wind up past the output range)
        self.integral = self.clamp(self.integral + self.gains.ki * error * dt);

        // Derivative on measurement avoids a kick when the setpoint jumps
        let d = match self.prev_input {
            Some(prev) if dt > 0.0 => -self.gains.kd * (measured - prev) / dt,
            _ => 0.0,
        };
        self.prev_input = Some(measured);

        self.output = self.clamp(p + self.integral + d);
        self.output
    }
}

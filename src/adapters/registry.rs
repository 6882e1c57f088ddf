//! Device registry — the process-wide dispatch gateway.
//!
//! Implements [`DevicePort`] over a fixed-capacity table of PWM outputs
//! keyed by pin and bus address.  Every write goes through a
//! critical-section mutex, so a single registry can sit in a `static` and
//! serve any number of controllers.
//!
//! ```text
//!  BrewController ─┐
//!  BrewController ─┼─▶ DeviceRegistry ──▶ SetDutyCycle (LEDC, PCA9685, ...)
//!  (any caller)  ──┘
//! ```
//!
//! Dispatch is fire-and-forget: a write to an unknown device or a failed
//! PWM write is logged and dropped, never reported back to the caller.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_hal::pwm::{Error as _, SetDutyCycle};
use heapless::Vec;
use log::{info, warn};

use crate::app::ports::DevicePort;
use crate::config::{DeviceDescriptor, HwAddress};
use crate::error::{ActuatorError, Result};

/// Resolution used when converting a 0–100 duty into a PWM fraction.
const DUTY_DENOM: u16 = 1000;

struct Output<P> {
    descriptor: DeviceDescriptor,
    pwm: P,
    /// Last duty successfully written.
    value: f32,
}

pub struct DeviceRegistry<P, const N: usize> {
    outputs: Mutex<CriticalSectionRawMutex, RefCell<Vec<Output<P>, N>>>,
}

impl<P: SetDutyCycle, const N: usize> DeviceRegistry<P, N> {
    pub const fn new() -> Self {
        Self {
            outputs: Mutex::new(RefCell::new(Vec::new())),
        }
    }

    /// Attach a PWM output under `descriptor`.
    pub fn register(&self, descriptor: DeviceDescriptor, pwm: P) -> Result<()> {
        if !descriptor.is_addressable() {
            return Err(ActuatorError::UnaddressableDevice.into());
        }
        self.outputs.lock(|cell| -> Result<()> {
            let mut outputs = cell.borrow_mut();
            if outputs.iter().any(|o| o.descriptor == descriptor) {
                return Err(ActuatorError::DuplicateDevice.into());
            }
            outputs
                .push(Output {
                    descriptor,
                    pwm,
                    value: 0.0,
                })
                .map_err(|_| ActuatorError::RegistryFull)?;
            info!("registry: pin {} registered ({}/{})", descriptor.pin, outputs.len(), N);
            Ok(())
        })
    }

    /// Last duty written to `descriptor`, if it is registered.
    pub fn last_value(&self, descriptor: &DeviceDescriptor) -> Option<f32> {
        self.outputs.lock(|cell| {
            cell.borrow()
                .iter()
                .find(|o| o.descriptor == *descriptor)
                .map(|o| o.value)
        })
    }

    pub fn len(&self) -> usize {
        self.outputs.lock(|cell| cell.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P: SetDutyCycle, const N: usize> Default for DeviceRegistry<P, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: SetDutyCycle, const N: usize> DevicePort for DeviceRegistry<P, N> {
    fn set_device_value(&self, pin: u8, hw_address: HwAddress, duty: f32) {
        let target = DeviceDescriptor::new(pin, hw_address);
        self.outputs.lock(|cell| {
            let mut outputs = cell.borrow_mut();
            let Some(output) = outputs.iter_mut().find(|o| o.descriptor == target) else {
                warn!("registry: no device at pin {} addr {:02x?}", pin, hw_address);
                return;
            };
            match output.pwm.set_duty_cycle_fraction(to_fraction(duty), DUTY_DENOM) {
                Ok(()) => output.value = duty,
                Err(e) => warn!(
                    "registry: pin {}: {} ({:?})",
                    pin,
                    ActuatorError::PwmWriteFailed,
                    e.kind()
                ),
            }
        });
    }
}

/// 0–100 duty to a numerator over [`DUTY_DENOM`].  Out-of-range and NaN
/// duties saturate.
fn to_fraction(duty: f32) -> u16 {
    if duty.is_nan() {
        return 0;
    }
    (duty.clamp(0.0, 100.0) * (DUTY_DENOM as f32 / 100.0)).round() as u16
}

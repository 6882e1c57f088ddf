//! PWM actuator handle.
//!
//! A software handle bound to one physical output (heater element or
//! pump motor).  The handle only records the commanded duty; pin-level
//! writes go through the [`DevicePort`](crate::app::ports::DevicePort)
//! that the owning controller was built with.
//!
//! Handles are exclusively owned by the controller that bound them and
//! are released by dropping them.  Callers must command the device to
//! zero before releasing; dropping a handle does not touch hardware.

use crate::config::{DeviceDescriptor, HwAddress};

#[derive(Debug, PartialEq)]
pub struct PwmActuator {
    descriptor: DeviceDescriptor,
    duty: f32,
}

impl PwmActuator {
    /// Bind a handle to `descriptor`.
    ///
    /// Returns `None` when the descriptor has no pin assigned.
    pub fn bind(descriptor: DeviceDescriptor) -> Option<Self> {
        descriptor.is_addressable().then_some(Self {
            descriptor,
            duty: 0.0,
        })
    }

    pub fn pin(&self) -> u8 {
        self.descriptor.pin
    }

    pub fn hw_address(&self) -> HwAddress {
        self.descriptor.hw_address
    }

    /// Whether this handle drives the device named by `descriptor`.
    pub fn is_bound_to(&self, descriptor: &DeviceDescriptor) -> bool {
        self.descriptor == *descriptor
    }

    /// Record a new commanded duty.
    pub fn set_duty(&mut self, duty: f32) {
        self.duty = duty;
    }

    pub fn duty(&self) -> f32 {
        self.duty
    }

    pub fn is_active(&self) -> bool {
        self.duty > 0.0
    }
}

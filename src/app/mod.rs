//! Application core — pure control logic, zero I/O.
//!
//! This module contains the regulation rules for the brewing controller:
//! configuration application, the periodic control tick, and actuator
//! lifecycle.  All interaction with hardware happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod brew;
pub mod controller;
pub mod ports;

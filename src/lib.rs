//! BrewCore control library.
//!
//! Heater and pump regulation for an embedded brewing controller.  The
//! control core in [`app`] talks to hardware only through port traits;
//! [`adapters`] holds the concrete gateway and reading table used on
//! target, and the integration tests swap in mocks.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;

pub use app::brew::{BrewController, PumpSlot};
pub use app::controller::Controller;
pub use config::{BrewConfig, ControlConfig, DeviceDescriptor, PidGains};
pub use control::pid::PidController;
pub use error::{Error, Result};

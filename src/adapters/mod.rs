//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements       | Connects to                    |
//! |------------|------------------|--------------------------------|
//! | `registry` | DevicePort       | embedded-hal PWM outputs       |
//! | `readings` | TemperaturePort  | acquisition task's latest data |

pub mod readings;
pub mod registry;

//! Actuator handles.

pub mod actuator;

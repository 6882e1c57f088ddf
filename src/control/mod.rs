//! Feedback control algorithms.

pub mod pid;

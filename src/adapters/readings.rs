//! Latest-reading table for temperature probes.
//!
//! The acquisition task (OneWire bus scan, ADC sampling, ...) publishes
//! each probe's reading here; controllers read it through
//! [`TemperaturePort`] on their own tick.  Unknown or invalidated probes
//! read as `0.0`, which the control tick treats as "no valid reading".

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use heapless::Vec;

use crate::app::ports::TemperaturePort;
use crate::config::DeviceDescriptor;
use crate::error::{Result, SensorError};

pub struct ReadingTable<const N: usize> {
    readings: Mutex<CriticalSectionRawMutex, RefCell<Vec<(DeviceDescriptor, f32), N>>>,
}

impl<const N: usize> ReadingTable<N> {
    pub const fn new() -> Self {
        Self {
            readings: Mutex::new(RefCell::new(Vec::new())),
        }
    }

    /// Store the latest reading for `sensor`.  Non-finite values invalidate it.
    pub fn publish(&self, sensor: DeviceDescriptor, celsius: f32) -> Result<()> {
        let celsius = if celsius.is_finite() { celsius } else { 0.0 };
        self.readings.lock(|cell| -> Result<()> {
            let mut readings = cell.borrow_mut();
            if let Some(entry) = readings.iter_mut().find(|(d, _)| *d == sensor) {
                entry.1 = celsius;
                return Ok(());
            }
            readings
                .push((sensor, celsius))
                .map_err(|_| SensorError::TableFull)?;
            Ok(())
        })
    }

    /// Mark `sensor` as having no valid reading (e.g. CRC failure, probe lost).
    pub fn invalidate(&self, sensor: &DeviceDescriptor) {
        self.readings.lock(|cell| {
            if let Some(entry) = cell.borrow_mut().iter_mut().find(|(d, _)| d == sensor) {
                entry.1 = 0.0;
            }
        });
    }

    pub fn get(&self, sensor: &DeviceDescriptor) -> f32 {
        self.readings.lock(|cell| {
            cell.borrow()
                .iter()
                .find(|(d, _)| d == sensor)
                .map_or(0.0, |(_, c)| *c)
        })
    }
}

impl<const N: usize> Default for ReadingTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TemperaturePort for ReadingTable<N> {
    fn read_celsius(&mut self, sensor: &DeviceDescriptor) -> f32 {
        self.get(sensor)
    }
}

impl<const N: usize> TemperaturePort for &ReadingTable<N> {
    fn read_celsius(&mut self, sensor: &DeviceDescriptor) -> f32 {
        self.get(sensor)
    }
}

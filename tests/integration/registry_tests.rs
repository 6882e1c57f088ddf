//! End-to-end: controller → process-wide DeviceRegistry → PWM channel,
//! with temperatures fed through a shared ReadingTable.

use core::convert::Infallible;
use std::sync::atomic::{AtomicU16, Ordering};

use brewcore::adapters::readings::ReadingTable;
use brewcore::adapters::registry::DeviceRegistry;
use brewcore::app::brew::BrewController;
use brewcore::app::controller::Controller;
use brewcore::config::{BrewConfig, ControlConfig, DeviceDescriptor};
use brewcore::control::pid::PidController;
use embedded_hal::pwm::{ErrorType, SetDutyCycle};

/// PWM channel with an 8-bit timer whose compare value lands in an atomic.
struct LedcChannel(&'static AtomicU16);

impl ErrorType for LedcChannel {
    type Error = Infallible;
}

impl SetDutyCycle for LedcChannel {
    fn max_duty_cycle(&self) -> u16 {
        255
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        self.0.store(duty, Ordering::Relaxed);
        Ok(())
    }
}

const HEATER: DeviceDescriptor = DeviceDescriptor::new(2, [0; 8]);
const PUMP: DeviceDescriptor = DeviceDescriptor::new(5, [0; 8]);
const PROBE: DeviceDescriptor = DeviceDescriptor::new(0, [0x28, 0xaa, 0, 0, 0, 0, 0, 0x01]);

static HEATER_CMP: AtomicU16 = AtomicU16::new(0);
static PUMP_CMP: AtomicU16 = AtomicU16::new(0);

static REGISTRY: DeviceRegistry<LedcChannel, 4> = DeviceRegistry::new();
static READINGS: ReadingTable<4> = ReadingTable::new();

#[test]
fn controller_drives_registered_pwm_channels() {
    REGISTRY.register(HEATER, LedcChannel(&HEATER_CMP)).unwrap();
    REGISTRY.register(PUMP, LedcChannel(&PUMP_CMP)).unwrap();

    let cfg = BrewConfig {
        control: ControlConfig {
            target_temperature_c: 65.0,
            heater: HEATER,
            temp_sensor: PROBE,
            ..ControlConfig::default()
        },
        pump1_duty: 40.0,
        pump1: PUMP,
        ..BrewConfig::default()
    };
    let mut c = BrewController::new(cfg, &REGISTRY, PidController::new(cfg.control.gains, 1000));

    // 40 % of 255
    assert_eq!(PUMP_CMP.load(Ordering::Relaxed), 102);
    assert_eq!(REGISTRY.last_value(&PUMP), Some(40.0));

    // No reading published yet: regulation skipped.
    let mut probe = &READINGS;
    c.tick(&mut probe);
    assert_eq!(HEATER_CMP.load(Ordering::Relaxed), 0);

    READINGS.publish(PROBE, 20.0).unwrap();
    c.tick(&mut probe);
    assert_eq!(REGISTRY.last_value(&HEATER), Some(100.0));
    assert_eq!(HEATER_CMP.load(Ordering::Relaxed), 255);

    c.dispose();
    assert_eq!(PUMP_CMP.load(Ordering::Relaxed), 0);
    assert_eq!(HEATER_CMP.load(Ordering::Relaxed), 0);
}

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

use crate::error::{HwError, Result};

const PWM_PERIOD: Duration = Duration::from_millis(20);

/// Hobby servo on a GPIO pin using software PWM at 50 Hz.
/// Position units are pulse widths in microseconds.
pub struct PwmServo {
    pin: rppal::gpio::OutputPin,
    position: Arc<AtomicI32>,
}

impl PwmServo {
    pub fn new(pin: u8, initial_us: i32) -> Result<Self> {
        let gpio = rppal::gpio::Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let pin = gpio
            .get(pin)
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_output();
        let mut servo = Self {
            pin,
            position: Arc::new(AtomicI32::new(initial_us)),
        };
        servo.write(initial_us)?;
        Ok(servo)
    }

    fn write(&mut self, us: i32) -> Result<()> {
        let width = Duration::from_micros(u64::try_from(us.max(0)).unwrap_or(0));
        self.pin
            .set_pwm(PWM_PERIOD, width)
            .map_err(|e| HwError::Gpio(e.to_string()))?;
        self.position.store(us, Ordering::Relaxed);
        Ok(())
    }

    /// Shared view of the commanded pulse width, for a scale that needs to
    /// know when the bottle is tipped.
    pub fn position_handle(&self) -> Arc<AtomicI32> {
        self.position.clone()
    }
}

impl pour_traits::Actuator for PwmServo {
    fn set_position(&mut self, units: i32) -> std::result::Result<(), pour_traits::BoxError> {
        self.write(units).map_err(Into::into)
    }

    fn position(&self) -> i32 {
        self.position.load(Ordering::Relaxed)
    }
}

use std::time::Duration;
use tracing::trace;

use crate::error::Result;
use crate::util::wait_until_low_with_timeout;

/// Bit-banged ADS1231 24-bit load-cell converter.
pub struct Ads1231 {
    dout: rppal::gpio::InputPin,
    sclk: rppal::gpio::OutputPin,
}

impl Ads1231 {
    pub fn new(dout: rppal::gpio::InputPin, mut sclk: rppal::gpio::OutputPin) -> Self {
        sclk.set_low(); // clock idles low
        Self { dout, sclk }
    }

    /// DOUT goes low once a conversion is ready.
    pub fn is_ready(&self) -> bool {
        self.dout.is_low()
    }

    pub fn read_with_timeout(&mut self, timeout: Duration) -> Result<i32> {
        let dout = &self.dout;
        wait_until_low_with_timeout(|| dout.is_high(), timeout, Duration::from_micros(200))?;
        Ok(self.shift_in())
    }

    /// Clock out a conversion that is already known to be ready.
    pub fn read_ready(&mut self) -> i32 {
        self.shift_in()
    }

    fn shift_in(&mut self) -> i32 {
        let mut value: i32 = 0;
        for _ in 0..24 {
            self.sclk.set_high();
            spin_delay();
            value = (value << 1) | i32::from(self.dout.is_high());
            self.sclk.set_low();
            spin_delay();
        }
        // 25th pulse forces DOUT high until the next conversion
        self.sclk.set_high();
        spin_delay();
        self.sclk.set_low();

        if (value & 0x80_0000) != 0 {
            value |= !0xFF_FFFF;
        }
        trace!(raw = value, "ads1231 raw read");
        value
    }
}

#[inline(always)]
fn spin_delay() {
    std::hint::spin_loop();
}

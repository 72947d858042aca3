use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Wait until `is_high` turns false (the converter pulls DOUT low when a
/// conversion is ready) or `timeout` expires. Sleeps `poll_interval` between
/// checks instead of spinning.
pub fn wait_until_low_with_timeout(
    mut is_high: impl FnMut() -> bool,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    while is_high() {
        if Instant::now() >= deadline {
            return Err(HwError::DataReadyTimeout);
        }
        std::thread::sleep(poll_interval);
    }
    Ok(())
}

/// Convert raw ADC counts to grams.
///
/// `divisor` is counts per milligram and `offset_mg` the zero offset in
/// milligrams. The result is rounded to the nearest gram.
pub fn counts_to_grams(raw: i32, divisor: i32, offset_mg: i32) -> i32 {
    let divisor = i64::from(divisor.max(1));
    let mg = i64::from(raw) / divisor - i64::from(offset_mg);
    let g = if mg >= 0 { (mg + 500) / 1000 } else { (mg - 500) / 1000 };
    g.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Track consecutive equal readings; returns the value once `needed` in a row
/// have been seen.
#[derive(Debug, Default)]
pub struct RunOfEqual {
    last: Option<i32>,
    run: u32,
}

impl RunOfEqual {
    pub fn push(&mut self, v: i32, needed: u32) -> Option<i32> {
        if self.last == Some(v) {
            self.run += 1;
        } else {
            self.last = Some(v);
            self.run = 1;
        }
        (self.run >= needed.max(1)).then_some(v)
    }
}

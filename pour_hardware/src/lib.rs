pub mod error;
pub mod util;

#[cfg(feature = "hardware")]
pub mod ads1231;
#[cfg(feature = "hardware")]
pub mod servo;

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::{Duration, Instant};

use pour_traits::{Actuator, BoxError, Clock, Sample, Scale};

pub use error::HwError;

/// Simulated servo. The position lives in a shared handle so a simulated
/// scale can tell when the bottle is tipped.
#[derive(Debug, Clone)]
pub struct SimulatedServo {
    position: Arc<AtomicI32>,
}

impl SimulatedServo {
    pub fn new(initial: i32) -> Self {
        Self {
            position: Arc::new(AtomicI32::new(initial)),
        }
    }

    pub fn position_handle(&self) -> Arc<AtomicI32> {
        self.position.clone()
    }
}

impl Actuator for SimulatedServo {
    fn set_position(&mut self, units: i32) -> Result<(), BoxError> {
        self.position.store(units, Ordering::Relaxed);
        Ok(())
    }

    fn position(&self) -> i32 {
        self.position.load(Ordering::Relaxed)
    }
}

/// Simulated scale with a cup already on it. While the observed servo sits at
/// the pour position each sample adds `step_g` grams.
#[derive(Debug)]
pub struct SimulatedScale {
    weight: i32,
    step_g: i32,
    pouring_at: Option<(Arc<AtomicI32>, i32)>,
}

impl SimulatedScale {
    pub fn new(cup_g: i32, step_g: i32) -> Self {
        Self {
            weight: cup_g,
            step_g,
            pouring_at: None,
        }
    }

    /// Only grow while `servo` reports `pour_pos`.
    pub fn pouring_at(mut self, servo: Arc<AtomicI32>, pour_pos: i32) -> Self {
        self.pouring_at = Some((servo, pour_pos));
        self
    }

    fn is_pouring(&self) -> bool {
        match &self.pouring_at {
            Some((pos, pour_pos)) => pos.load(Ordering::Relaxed) == *pour_pos,
            None => true,
        }
    }
}

impl Scale for SimulatedScale {
    fn sample_nonblocking(&mut self) -> Result<Sample, BoxError> {
        if self.is_pouring() {
            self.weight = self.weight.saturating_add(self.step_g);
        }
        tracing::trace!(weight_g = self.weight, "simulated scale sample");
        Ok(Sample::Ready(self.weight))
    }

    fn read_stable_blocking(&mut self) -> Result<i32, BoxError> {
        Ok(self.weight)
    }

    fn read_average_blocking(&mut self) -> Result<i32, BoxError> {
        Ok(self.weight)
    }
}

/// Stand-in for machines built without a load cell.
///
/// Stable reads report `fixed_g` and restart the synthetic pour. Every read
/// adds one gram per `ms_per_gram` spent at the pour position since the
/// previous read, so a timed pour reaches its target through the normal
/// weight path. Without `pouring_at` all elapsed time counts.
#[derive(Debug)]
pub struct NullScale<C: Clock> {
    clock: C,
    fixed_g: i32,
    ms_per_gram: u64,
    poured_ms: u64,
    last_read: Instant,
    pouring_at: Option<(Arc<AtomicI32>, i32)>,
}

impl<C: Clock> NullScale<C> {
    pub fn new(clock: C, fixed_g: i32, ms_per_gram: u64) -> Self {
        let last_read = clock.now();
        Self {
            clock,
            fixed_g,
            ms_per_gram: ms_per_gram.max(1),
            poured_ms: 0,
            last_read,
            pouring_at: None,
        }
    }

    /// Only count time while `servo` reports `pour_pos`.
    pub fn pouring_at(mut self, servo: Arc<AtomicI32>, pour_pos: i32) -> Self {
        self.pouring_at = Some((servo, pour_pos));
        self
    }

    fn is_pouring(&self) -> bool {
        match &self.pouring_at {
            Some((pos, pour_pos)) => pos.load(Ordering::Relaxed) == *pour_pos,
            None => true,
        }
    }

    fn synthetic(&mut self) -> i32 {
        let elapsed = self.clock.ms_since(self.last_read);
        self.last_read = self.clock.now();
        if self.is_pouring() {
            self.poured_ms = self.poured_ms.saturating_add(elapsed);
        }
        let grams = self.poured_ms / self.ms_per_gram;
        self.fixed_g
            .saturating_add(i32::try_from(grams).unwrap_or(i32::MAX))
    }
}

impl<C: Clock> Scale for NullScale<C> {
    fn sample_nonblocking(&mut self) -> Result<Sample, BoxError> {
        Ok(Sample::Ready(self.synthetic()))
    }

    fn read_stable_blocking(&mut self) -> Result<i32, BoxError> {
        self.poured_ms = 0;
        self.last_read = self.clock.now();
        Ok(self.fixed_g)
    }

    fn read_average_blocking(&mut self) -> Result<i32, BoxError> {
        Ok(self.synthetic())
    }
}

/// Conversion and sampling parameters for the ADC-backed scale.
#[derive(Debug, Clone, Copy)]
pub struct AdcParams {
    /// ADC counts per milligram.
    pub divisor: i32,
    /// Zero offset in milligrams.
    pub offset_mg: i32,
    /// Consecutive equal readings required by `read_stable_blocking`.
    pub stable_samples: u32,
    /// Readings averaged by `read_average_blocking`.
    pub average_samples: u32,
    pub read_timeout: Duration,
}

impl Default for AdcParams {
    fn default() -> Self {
        Self {
            divisor: 1,
            offset_mg: 0,
            stable_samples: 3,
            average_samples: 10,
            read_timeout: Duration::from_millis(150),
        }
    }
}

#[cfg(feature = "hardware")]
pub mod hardware {
    use super::*;
    use crate::ads1231::Ads1231;
    use crate::util::{RunOfEqual, counts_to_grams};

    /// Give up on a stable reading after this many reads per required sample.
    const STABLE_ATTEMPTS_PER_SAMPLE: u32 = 20;

    pub use crate::servo::PwmServo;

    pub struct HardwareScale {
        adc: Ads1231,
        params: AdcParams,
    }

    impl HardwareScale {
        pub fn new(dout_pin: u8, sclk_pin: u8, params: AdcParams) -> crate::error::Result<Self> {
            let gpio = rppal::gpio::Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
            let dout = gpio
                .get(dout_pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_input();
            let sclk = gpio
                .get(sclk_pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_output();
            Ok(Self {
                adc: Ads1231::new(dout, sclk),
                params,
            })
        }

        fn read_grams(&mut self) -> crate::error::Result<i32> {
            let mut attempts = 0;
            let max_attempts = 3;
            loop {
                match self.adc.read_with_timeout(self.params.read_timeout) {
                    Ok(raw) => {
                        return Ok(counts_to_grams(
                            raw,
                            self.params.divisor,
                            self.params.offset_mg,
                        ));
                    }
                    Err(HwError::DataReadyTimeout) if attempts < max_attempts => {
                        attempts += 1;
                        tracing::warn!(retries = attempts, "scale timeout, retrying");
                    }
                    Err(e) => {
                        tracing::error!("Scale read error: {}", e);
                        return Err(e);
                    }
                }
            }
        }
    }

    impl Scale for HardwareScale {
        fn sample_nonblocking(&mut self) -> Result<Sample, BoxError> {
            if !self.adc.is_ready() {
                return Ok(Sample::NotReady);
            }
            let raw = self.adc.read_ready();
            Ok(Sample::Ready(counts_to_grams(
                raw,
                self.params.divisor,
                self.params.offset_mg,
            )))
        }

        fn read_stable_blocking(&mut self) -> Result<i32, BoxError> {
            let needed = self.params.stable_samples.max(1);
            let budget = needed.saturating_mul(STABLE_ATTEMPTS_PER_SAMPLE);
            let mut run = RunOfEqual::default();
            for _ in 0..budget {
                let g = self.read_grams()?;
                if let Some(v) = run.push(g, needed) {
                    return Ok(v);
                }
            }
            Err(HwError::Unstable(budget).into())
        }

        fn read_average_blocking(&mut self) -> Result<i32, BoxError> {
            let n = self.params.average_samples.max(1);
            let mut sum: i64 = 0;
            for _ in 0..n {
                sum += i64::from(self.read_grams()?);
            }
            Ok((sum / i64::from(n)) as i32)
        }
    }
}

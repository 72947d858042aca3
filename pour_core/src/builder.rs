//! Type-state builder for `Pourer` and generic `build_pour_core` constructor.
//!
//! The builder enforces at compile time that the actuator, scale, signal
//! source and bottle are provided before `build()` is available.
//! `try_build()` is always available for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use pour_traits::{Actuator, Clock, MonotonicClock, Reporter, Scale, SignalSource};

use crate::bottle::Bottle;
use crate::config::{PourSettings, RetryPolicy, Thresholds, Timing};
use crate::engine::PourCore;
use crate::error::{BuildError, PourResult, Result};
use crate::reporter::TracingReporter;
use crate::stepper::{StepChecks, StepOutcome};

// ── Public dynamic-dispatch wrapper ──────────────────────────────────────────

type DynCore = PourCore<
    Box<dyn Actuator>,
    Box<dyn Scale>,
    Box<dyn SignalSource>,
    Box<dyn Reporter>,
>;

/// Boxed pourer for callers that pick their hardware at runtime.
pub struct Pourer {
    pub(crate) inner: DynCore,
}

impl core::fmt::Debug for Pourer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.inner, f)
    }
}

impl Pourer {
    /// Start building a Pourer.
    pub fn builder() -> PourerBuilder<Missing, Missing, Missing, Missing> {
        PourerBuilder::default()
    }

    pub fn bottle(&self) -> &Bottle {
        self.inner.bottle()
    }

    pub fn position(&self) -> i32 {
        self.inner.position()
    }

    pub fn timing(&self) -> &Timing {
        self.inner.timing()
    }

    /// Run one full pour; returns the measured grams.
    pub fn pour(&mut self, requested_g: i32) -> PourResult<i32> {
        self.inner.pour(requested_g)
    }

    pub fn step_to(
        &mut self,
        target: i32,
        delay: Duration,
        checks: StepChecks,
    ) -> PourResult<StepOutcome> {
        self.inner.step_to(target, delay, checks)
    }

    pub fn turn_up(&mut self, delay: Duration, check_abort: bool) -> PourResult<StepOutcome> {
        self.inner.turn_up(delay, check_abort)
    }

    pub fn turn_down(&mut self, delay: Duration, check_weight: bool) -> PourResult<StepOutcome> {
        self.inner.turn_down(delay, check_weight)
    }

    pub fn turn_to_pause(&mut self, delay: Duration) -> PourResult<StepOutcome> {
        self.inner.turn_to_pause(delay)
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `Pourer`. Settings are validated on `build()`.
pub struct PourerBuilder<A, S, G, B> {
    actuator: Option<Box<dyn Actuator>>,
    scale: Option<Box<dyn Scale>>,
    signals: Option<Box<dyn SignalSource>>,
    reporter: Option<Box<dyn Reporter>>,
    bottle: Option<Bottle>,
    timing: Option<Timing>,
    thresholds: Option<Thresholds>,
    retry: Option<RetryPolicy>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    _a: PhantomData<A>,
    _s: PhantomData<S>,
    _g: PhantomData<G>,
    _b: PhantomData<B>,
}

impl Default for PourerBuilder<Missing, Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            actuator: None,
            scale: None,
            signals: None,
            reporter: None,
            bottle: None,
            timing: None,
            thresholds: None,
            retry: None,
            clock: None,
            _a: PhantomData,
            _s: PhantomData,
            _g: PhantomData,
            _b: PhantomData,
        }
    }
}

/// Validate settings and construct a `PourCore`.
///
/// Shared by `PourerBuilder::try_build()` and `build_pour_core()`.
fn validate_and_build<A, S, G, R>(
    actuator: A,
    scale: S,
    signals: G,
    reporter: R,
    bottle: Bottle,
    settings: PourSettings,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<PourCore<A, S, G, R>>
where
    A: Actuator,
    S: Scale,
    G: SignalSource,
    R: Reporter,
{
    let PourSettings {
        timing,
        thresholds,
        retry,
    } = settings;

    // ── Validation ───────────────────────────────────────────────────────────
    if timing.turn_down_delay.is_zero()
        || timing.turn_up_delay.is_zero()
        || timing.fast_turn_up_delay.is_zero()
    {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "step delays must be > 0",
        )));
    }
    if timing.pouring_timeout.is_zero() {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "pouring_timeout must be > 0",
        )));
    }
    if timing.poll_interval.is_zero() {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "poll_interval must be > 0",
        )));
    }
    if thresholds.weight_epsilon_g < 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "weight_epsilon_g must be >= 0",
        )));
    }
    if thresholds.upright_offset_g < 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "upright_offset_g must be >= 0",
        )));
    }
    if thresholds.bottle_empty_pos_offset < 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "bottle_empty_pos_offset must be >= 0",
        )));
    }

    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(b) => Arc::from(b),
        None => Arc::new(MonotonicClock::new()),
    };

    Ok(PourCore {
        actuator,
        scale,
        signals,
        reporter,
        bottle,
        timing,
        thresholds,
        retry,
        clock,
    })
}

impl<A, S, G, B> PourerBuilder<A, S, G, B> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<Pourer> {
        let actuator = self
            .actuator
            .ok_or_else(|| eyre::Report::new(BuildError::MissingActuator))?;
        let scale = self
            .scale
            .ok_or_else(|| eyre::Report::new(BuildError::MissingScale))?;
        let signals = self
            .signals
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSignals))?;
        let bottle = self
            .bottle
            .ok_or_else(|| eyre::Report::new(BuildError::MissingBottle))?;
        let reporter = self
            .reporter
            .unwrap_or_else(|| Box::new(TracingReporter::new()));

        let settings = PourSettings {
            timing: self.timing.unwrap_or_default(),
            thresholds: self.thresholds.unwrap_or_default(),
            retry: self.retry.unwrap_or_default(),
        };
        let inner = validate_and_build(
            actuator, scale, signals, reporter, bottle, settings, self.clock,
        )?;

        Ok(Pourer { inner })
    }

    // Chainable setters that do not affect type-state.

    /// Defaults to `TracingReporter` when not provided.
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = Some(timing);
        self
    }
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }
    /// Timing, thresholds and retry policy in one go, e.g. from a config file.
    pub fn with_settings(self, settings: PourSettings) -> Self {
        self.with_timing(settings.timing)
            .with_thresholds(settings.thresholds)
            .with_retry(settings.retry)
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    fn retype<A2, S2, G2, B2>(self) -> PourerBuilder<A2, S2, G2, B2> {
        PourerBuilder {
            actuator: self.actuator,
            scale: self.scale,
            signals: self.signals,
            reporter: self.reporter,
            bottle: self.bottle,
            timing: self.timing,
            thresholds: self.thresholds,
            retry: self.retry,
            clock: self.clock,
            _a: PhantomData,
            _s: PhantomData,
            _g: PhantomData,
            _b: PhantomData,
        }
    }
}

// Setters that advance type-state
impl<S, G, B> PourerBuilder<Missing, S, G, B> {
    pub fn with_actuator(
        mut self,
        actuator: impl Actuator + 'static,
    ) -> PourerBuilder<Set, S, G, B> {
        self.actuator = Some(Box::new(actuator));
        self.retype()
    }
}

impl<A, G, B> PourerBuilder<A, Missing, G, B> {
    pub fn with_scale(mut self, scale: impl Scale + 'static) -> PourerBuilder<A, Set, G, B> {
        self.scale = Some(Box::new(scale));
        self.retype()
    }
}

impl<A, S, B> PourerBuilder<A, S, Missing, B> {
    pub fn with_signals(
        mut self,
        signals: impl SignalSource + 'static,
    ) -> PourerBuilder<A, S, Set, B> {
        self.signals = Some(Box::new(signals));
        self.retype()
    }
}

impl<A, S, G> PourerBuilder<A, S, G, Missing> {
    pub fn with_bottle(mut self, bottle: Bottle) -> PourerBuilder<A, S, G, Set> {
        self.bottle = Some(bottle);
        self.retype()
    }
}

impl PourerBuilder<Set, Set, Set, Set> {
    /// Validate and build. Only available once every required part is set.
    pub fn build(self) -> Result<Pourer> {
        self.try_build()
    }
}

/// Build a generic, statically-dispatched `PourCore` from concrete parts.
///
/// Delegates to the shared `validate_and_build`.
pub fn build_pour_core<A, S, G, R>(
    actuator: A,
    scale: S,
    signals: G,
    reporter: R,
    bottle: Bottle,
    settings: PourSettings,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<PourCore<A, S, G, R>>
where
    A: Actuator,
    S: Scale,
    G: SignalSource,
    R: Reporter,
{
    validate_and_build(actuator, scale, signals, reporter, bottle, settings, clock)
}

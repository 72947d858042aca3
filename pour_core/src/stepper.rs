//! Unit-by-unit servo motion with optional abort and weight checks.
//!
//! Per unit step the order is fixed: abort check, weight sample, sleep, move.
//! The per-step delay doubles as settling time for the scale.

use std::time::Duration;

use pour_traits::{Actuator, Reporter, Sample, Scale, SignalSource};

use crate::engine::PourCore;
use crate::error::{PourError, PourResult};
use crate::hw_error::{map_actuator_error, map_hw_error};

/// Which checks `step_to` performs between unit steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepChecks {
    /// Fail with `CupMissing` when a sample drops below epsilon.
    pub weight: bool,
    /// Stop early once three consecutive samples agree.
    pub stable_weight: bool,
    /// Poll the signal source for an operator abort.
    pub abort: bool,
}

impl StepChecks {
    pub const NONE: Self = Self {
        weight: false,
        stable_weight: false,
        abort: false,
    };
    pub const ABORT: Self = Self {
        weight: false,
        stable_weight: false,
        abort: true,
    };

    #[must_use]
    pub const fn with_weight(mut self) -> Self {
        self.weight = true;
        self
    }

    #[must_use]
    pub const fn with_stable_weight(mut self) -> Self {
        self.stable_weight = true;
        self
    }

    #[must_use]
    pub const fn with_abort(mut self) -> Self {
        self.abort = true;
        self
    }

    const fn samples(self) -> bool {
        self.weight || self.stable_weight
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Target position reached.
    Reached,
    /// Weight settled before the target; the actuator stopped there.
    Stable(i32),
}

/// The two samples preceding the current one. Lives for one `step_to` call.
#[derive(Debug, Default)]
struct StabilityWindow {
    older: Option<i32>,
    newer: Option<i32>,
}

impl StabilityWindow {
    fn push(&mut self, w: i32) -> Option<i32> {
        if self.older == Some(w) && self.newer == Some(w) {
            return Some(w);
        }
        self.older = self.newer;
        self.newer = Some(w);
        None
    }
}

impl<A, S, G, R> PourCore<A, S, G, R>
where
    A: Actuator,
    S: Scale,
    G: SignalSource,
    R: Reporter,
{
    /// Move one unit at a time toward `target`, sleeping `delay` before each
    /// unit.
    pub fn step_to(
        &mut self,
        target: i32,
        delay: Duration,
        checks: StepChecks,
    ) -> PourResult<StepOutcome> {
        let range = self.bottle.range();
        if !range.contains(target) {
            return Err(PourError::OutOfRange {
                target,
                min: range.min,
                max: range.max,
            });
        }

        let current = self.actuator.position();
        if current == target {
            return Ok(StepOutcome::Reached);
        }
        tracing::debug!(
            bottle = self.bottle.number(),
            current,
            target,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "step_to"
        );

        let dir = if target > current { 1 } else { -1 };
        let mut window = StabilityWindow::default();
        let mut pos = current;
        while pos != target {
            pos += dir;

            if checks.abort && self.signals.is_abort_requested() {
                tracing::warn!(
                    bottle = self.bottle.number(),
                    position = self.actuator.position(),
                    "abort requested while stepping"
                );
                self.retract_to_rest();
                return Err(PourError::Aborted);
            }

            if checks.samples() {
                match self.scale.sample_nonblocking().map_err(|e| map_hw_error(&*e))? {
                    Sample::NotReady => {}
                    Sample::Ready(w) => {
                        tracing::trace!(weight_g = w, position = pos - dir, "step sample");
                        if checks.weight && w < self.thresholds.weight_epsilon_g {
                            tracing::warn!(weight_g = w, "cup missing while stepping");
                            return Err(PourError::CupMissing);
                        }
                        if checks.stable_weight {
                            if let Some(stable) = window.push(w) {
                                tracing::debug!(weight_g = stable, position = pos - dir, "weight stable");
                                return Ok(StepOutcome::Stable(stable));
                            }
                        }
                    }
                }
            }

            self.clock.sleep(delay);
            self.actuator
                .set_position(pos)
                .map_err(|e| map_actuator_error(&*e))?;
        }

        if checks.stable_weight {
            Err(PourError::WeightNotStable)
        } else {
            Ok(StepOutcome::Reached)
        }
    }

    /// Best-effort return to rest after an abort or an exhausted retry budget.
    /// Never checks abort again; a failure here is only logged so the caller
    /// still sees the original error.
    pub(crate) fn retract_to_rest(&mut self) {
        let rest = self.bottle.pos_up();
        let delay = self.timing.fast_turn_up_delay;
        if let Err(e) = self.step_to(rest, delay, StepChecks::NONE) {
            tracing::warn!(error = %e, "retract to rest failed");
        }
    }

    /// Return to rest (bottle upright).
    pub fn turn_up(&mut self, delay: Duration, check_abort: bool) -> PourResult<StepOutcome> {
        let checks = if check_abort {
            StepChecks::ABORT
        } else {
            StepChecks::NONE
        };
        self.step_to(self.bottle.pos_up(), delay, checks)
    }

    /// Tip to the pour position, optionally failing on a missing cup.
    pub fn turn_down(&mut self, delay: Duration, check_weight: bool) -> PourResult<StepOutcome> {
        let checks = if check_weight {
            StepChecks::ABORT.with_weight()
        } else {
            StepChecks::ABORT
        };
        self.step_to(self.bottle.pos_down(), delay, checks)
    }

    /// Park halfway between pour and rest.
    pub fn turn_to_pause(&mut self, delay: Duration) -> PourResult<StepOutcome> {
        self.step_to(self.bottle.pause_pos(), delay, StepChecks::ABORT)
    }
}

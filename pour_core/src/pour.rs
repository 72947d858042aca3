//! The pour state machine: baseline, pour until target, settle and measure.
//!
//! Only `CupMissing` and `BottleEmpty` are recovered here, by waiting on the
//! operator. Everything else is returned to the caller unchanged.

use pour_traits::{Actuator, Reporter, Sample, Scale, Signal, SignalSource};

use crate::engine::PourCore;
use crate::error::{PourError, PourResult, RecoverableFault};
use crate::hw_error::map_hw_error;
use crate::stepper::{StepChecks, StepOutcome};
use crate::timer::PollTimer;

/// Operator waits spent so far in one pour.
#[derive(Debug, Default)]
struct RetryBudget {
    cup_waits: u32,
    resume_waits: u32,
}

impl RetryBudget {
    /// Count one more wait for `fault`; fails when that would exceed `limit`.
    fn spend(&mut self, fault: RecoverableFault, limit: Option<u32>) -> PourResult<()> {
        let used = match fault {
            RecoverableFault::CupMissing => &mut self.cup_waits,
            RecoverableFault::BottleEmpty => &mut self.resume_waits,
        };
        if limit.is_some_and(|max| *used >= max) {
            return Err(PourError::RetryBudgetExhausted { fault });
        }
        *used += 1;
        Ok(())
    }
}

impl<A, S, G, R> PourCore<A, S, G, R>
where
    A: Actuator,
    S: Scale,
    G: SignalSource,
    R: Reporter,
{
    /// Pour `requested` grams and return what the scale says actually landed
    /// in the cup.
    ///
    /// Leaves the bottle at the pause position on success, so the next
    /// bottle can start while this one drains.
    pub fn pour(&mut self, requested: i32) -> PourResult<i32> {
        let number = self.bottle.number();
        tracing::info!(bottle = number, requested_g = requested, "pour start");
        let mut budget = RetryBudget::default();

        let baseline = self.measure_baseline(&mut budget)?;
        self.pour_until_target(requested, baseline, &mut budget)?;

        self.turn_to_pause(self.timing.turn_up_delay)?;
        let final_g = self
            .scale
            .read_average_blocking()
            .map_err(|e| map_hw_error(&*e))?;
        let measured = final_g.saturating_sub(baseline);

        self.reporter
            .message(&format!("POURED {number} {requested} {measured}"));
        tracing::info!(
            bottle = number,
            requested_g = requested,
            measured_g = measured,
            baseline_g = baseline,
            "pour complete"
        );
        Ok(measured)
    }

    /// Weigh the cup on the way to the below-pause position. Loops until a
    /// cup heavier than epsilon is on the scale.
    fn measure_baseline(&mut self, budget: &mut RetryBudget) -> PourResult<i32> {
        let checks = StepChecks::ABORT.with_weight().with_stable_weight();
        loop {
            let target = self.bottle.below_pause_pos();
            let reading = match self.step_to(target, self.timing.turn_down_delay, checks) {
                Ok(StepOutcome::Stable(w)) => Ok(w),
                Ok(StepOutcome::Reached) | Err(PourError::WeightNotStable) => {
                    tracing::debug!("no stable weight while turning, reading blocking");
                    self.scale
                        .read_stable_blocking()
                        .map_err(|e| map_hw_error(&*e))
                }
                Err(e) => Err(e),
            };

            match reading {
                Ok(w) if w >= self.thresholds.weight_epsilon_g => {
                    tracing::debug!(bottle = self.bottle.number(), baseline_g = w, "baseline");
                    return Ok(w);
                }
                Ok(w) => tracing::warn!(weight_g = w, "baseline below epsilon"),
                Err(PourError::CupMissing) => {}
                Err(e) => return Err(e),
            }

            self.report_fault(RecoverableFault::CupMissing);
            self.wait_for_cup(budget)?;
        }
    }

    /// Tip down and wait for the target, recovering from a removed cup or an
    /// empty bottle by retrying from the top.
    fn pour_until_target(
        &mut self,
        requested: i32,
        baseline: i32,
        budget: &mut RetryBudget,
    ) -> PourResult<()> {
        let number = self.bottle.number();
        let cutoff = baseline
            .saturating_add(requested)
            .saturating_sub(self.thresholds.upright_offset_g);

        loop {
            self.reporter.message(&format!("POURING {number} {baseline}"));

            let attempt = self
                .turn_down(self.timing.turn_down_delay, true)
                .and_then(|_| self.wait_for_weight(cutoff));

            match attempt {
                Ok(()) => return Ok(()),
                Err(PourError::BottleEmpty) => {
                    self.report_fault(RecoverableFault::BottleEmpty);
                    let offset = self.thresholds.bottle_empty_pos_offset;
                    let park = self.bottle.past_rest_pos(offset);
                    if self.bottle.past_rest_is_clamped(offset) {
                        tracing::warn!(
                            bottle = number,
                            offset,
                            park,
                            "empty-bottle park position clamped to servo range"
                        );
                    }
                    self.step_to(park, self.timing.turn_up_delay, StepChecks::ABORT)?;
                    self.wait_for_resume(budget)?;
                }
                Err(PourError::CupMissing) => {
                    self.report_fault(RecoverableFault::CupMissing);
                    self.turn_to_pause(self.timing.fast_turn_up_delay)?;
                    self.wait_for_cup(budget)?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Poll until the scale reads at least `target` grams, the cup goes
    /// missing, the operator aborts or the pour times out.
    fn wait_for_weight(&mut self, target: i32) -> PourResult<()> {
        let start = self.clock.now();
        let mut progress = PollTimer::new(start);

        loop {
            if self.signals.is_abort_requested() {
                tracing::warn!(bottle = self.bottle.number(), "abort requested while pouring");
                self.retract_to_rest();
                return Err(PourError::Aborted);
            }

            if let Sample::Ready(w) = self
                .scale
                .sample_nonblocking()
                .map_err(|e| map_hw_error(&*e))?
            {
                tracing::trace!(weight_g = w, target_g = target, "pour sample");
                if w < self.thresholds.weight_epsilon_g {
                    tracing::warn!(weight_g = w, "cup missing while pouring");
                    return Err(PourError::CupMissing);
                }
                if w >= target {
                    tracing::debug!(weight_g = w, target_g = target, "target reached");
                    return Ok(());
                }
                if let Some(every) = self.timing.progress_log_every {
                    if progress.has_elapsed(self.clock.now(), every) {
                        tracing::info!(weight_g = w, target_g = target, "pouring");
                    }
                }
            }

            if self.clock.now().saturating_duration_since(start) >= self.timing.pouring_timeout {
                tracing::warn!(
                    bottle = self.bottle.number(),
                    target_g = target,
                    timeout_ms = u64::try_from(self.timing.pouring_timeout.as_millis())
                        .unwrap_or(u64::MAX),
                    "target not reached before timeout"
                );
                return Err(PourError::BottleEmpty);
            }
            self.clock.sleep(self.timing.poll_interval);
        }
    }

    fn report_fault(&mut self, fault: RecoverableFault) {
        tracing::warn!(bottle = self.bottle.number(), %fault, "waiting on operator");
        self.reporter
            .error(&format!("{fault} {}", self.bottle.number()));
    }

    fn wait_for_cup(&mut self, budget: &mut RetryBudget) -> PourResult<()> {
        self.spend_or_retract(budget, RecoverableFault::CupMissing)?;
        let signal = self.signals.wait_for_cup_present();
        self.resolve_wait(signal)
    }

    fn wait_for_resume(&mut self, budget: &mut RetryBudget) -> PourResult<()> {
        self.spend_or_retract(budget, RecoverableFault::BottleEmpty)?;
        let signal = self.signals.wait_for_resume();
        self.resolve_wait(signal)
    }

    fn spend_or_retract(
        &mut self,
        budget: &mut RetryBudget,
        fault: RecoverableFault,
    ) -> PourResult<()> {
        let limit = match fault {
            RecoverableFault::CupMissing => self.retry.max_cup_waits,
            RecoverableFault::BottleEmpty => self.retry.max_resume_waits,
        };
        if let Err(e) = budget.spend(fault, limit) {
            tracing::warn!(bottle = self.bottle.number(), %fault, "retry budget exhausted");
            self.retract_to_rest();
            return Err(e);
        }
        Ok(())
    }

    fn resolve_wait(&mut self, signal: Signal) -> PourResult<()> {
        match signal {
            Signal::Proceed => {
                self.reporter.clear_error();
                Ok(())
            }
            Signal::Aborted => {
                tracing::warn!(bottle = self.bottle.number(), "aborted while waiting on operator");
                self.retract_to_rest();
                Err(PourError::Aborted)
            }
        }
    }
}

//! The pour engine (`PourCore`): one bottle, one servo, one scale.
//!
//! Stepping lives in `stepper`, the pour state machine in `pour`; both are
//! `impl` blocks on this struct.

use std::sync::Arc;

use pour_traits::{Actuator, Clock, Reporter, Scale, SignalSource};

use crate::bottle::Bottle;
use crate::config::{RetryPolicy, Thresholds, Timing};

/// Unified core for both dynamic (boxed) and generic (static dispatch) variants.
pub struct PourCore<A: Actuator, S: Scale, G: SignalSource, R: Reporter> {
    pub(crate) actuator: A,
    pub(crate) scale: S,
    pub(crate) signals: G,
    pub(crate) reporter: R,
    pub(crate) bottle: Bottle,
    pub(crate) timing: Timing,
    pub(crate) thresholds: Thresholds,
    pub(crate) retry: RetryPolicy,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
}

impl<A, S, G, R> core::fmt::Debug for PourCore<A, S, G, R>
where
    A: Actuator,
    S: Scale,
    G: SignalSource,
    R: Reporter,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PourCore")
            .field("bottle", &self.bottle.number())
            .field("position", &self.actuator.position())
            .field("pos_up", &self.bottle.pos_up())
            .field("pos_down", &self.bottle.pos_down())
            .finish()
    }
}

impl<A, S, G, R> PourCore<A, S, G, R>
where
    A: Actuator,
    S: Scale,
    G: SignalSource,
    R: Reporter,
{
    pub fn bottle(&self) -> &Bottle {
        &self.bottle
    }

    /// Current actuator position.
    pub fn position(&self) -> i32 {
        self.actuator.position()
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn scale(&self) -> &S {
        &self.scale
    }

    pub fn signals(&self) -> &G {
        &self.signals
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Give back the collaborators, e.g. to hand the servo to another bottle.
    pub fn into_parts(self) -> (A, S, G, R) {
        (self.actuator, self.scale, self.signals, self.reporter)
    }
}

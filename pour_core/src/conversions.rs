//! `From` implementations bridging `pour_config` types to `pour_core` types.

use std::time::Duration;

use crate::bottle::{Bottle, ServoRange};
use crate::config::{PourSettings, RetryPolicy, Thresholds, Timing};
use crate::error::BuildError;

// ── ServoRange ───────────────────────────────────────────────────────────────

impl From<&pour_config::ServoRange> for ServoRange {
    fn from(c: &pour_config::ServoRange) -> Self {
        Self {
            min: c.min,
            max: c.max,
        }
    }
}

// ── Timing ───────────────────────────────────────────────────────────────────

impl From<&pour_config::Timing> for Timing {
    fn from(c: &pour_config::Timing) -> Self {
        Self {
            turn_down_delay: Duration::from_millis(c.turn_down_delay_ms),
            turn_up_delay: Duration::from_millis(c.turn_up_delay_ms),
            fast_turn_up_delay: Duration::from_millis(c.fast_turn_up_delay_ms),
            pouring_timeout: Duration::from_millis(c.pouring_timeout_ms),
            poll_interval: Duration::from_millis(c.poll_ms),
            progress_log_every: (c.progress_log_ms > 0)
                .then(|| Duration::from_millis(c.progress_log_ms)),
        }
    }
}

// ── Thresholds ───────────────────────────────────────────────────────────────

impl From<&pour_config::Thresholds> for Thresholds {
    fn from(c: &pour_config::Thresholds) -> Self {
        Self {
            weight_epsilon_g: c.weight_epsilon_g,
            upright_offset_g: c.upright_offset_g,
            bottle_empty_pos_offset: c.bottle_empty_pos_offset,
        }
    }
}

// ── RetryPolicy ──────────────────────────────────────────────────────────────

impl From<&pour_config::RetryCfg> for RetryPolicy {
    fn from(c: &pour_config::RetryCfg) -> Self {
        Self {
            max_cup_waits: c.max_cup_waits,
            max_resume_waits: c.max_resume_waits,
        }
    }
}

impl From<&pour_config::Config> for PourSettings {
    fn from(c: &pour_config::Config) -> Self {
        Self {
            timing: (&c.timing).into(),
            thresholds: (&c.thresholds).into(),
            retry: (&c.retry).into(),
        }
    }
}

// ── Bottle ───────────────────────────────────────────────────────────────────

impl Bottle {
    /// Build bottle `number` from a loaded config.
    pub fn from_config(cfg: &pour_config::Config, number: u8) -> Result<Self, BuildError> {
        let b = cfg
            .bottle(number)
            .ok_or(BuildError::InvalidConfig("no such bottle in config"))?;
        let bottle = Self::new(b.number, b.pos_down, b.pos_up, (&cfg.servo).into())?;
        Ok(match &b.name {
            Some(name) => bottle.with_name(name.clone()),
            None => bottle,
        })
    }
}

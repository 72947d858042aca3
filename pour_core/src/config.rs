//! Runtime configuration for the pour engine.
//!
//! These are separate from the TOML-deserialized config in `pour_config`;
//! see `conversions` for the mapping.

use std::time::Duration;

/// Per-step delays and pour timeouts.
#[derive(Debug, Clone)]
pub struct Timing {
    /// Per-step delay while tipping the bottle toward the cup.
    pub turn_down_delay: Duration,
    /// Per-step delay while returning toward rest.
    pub turn_up_delay: Duration,
    /// Per-step delay for safety retractions (abort, cup removed).
    pub fast_turn_up_delay: Duration,
    /// Give up waiting for the target weight after this long.
    pub pouring_timeout: Duration,
    /// Sleep between weight polls while waiting for the target.
    pub poll_interval: Duration,
    /// Progress log interval while pouring; `None` disables.
    pub progress_log_every: Option<Duration>,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            turn_down_delay: Duration::from_millis(4),
            turn_up_delay: Duration::from_millis(2),
            fast_turn_up_delay: Duration::from_millis(1),
            pouring_timeout: Duration::from_millis(7000),
            poll_interval: Duration::from_millis(5),
            progress_log_every: Some(Duration::from_millis(500)),
        }
    }
}

/// Weight thresholds and offsets, all in grams except where noted.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// A reading below this means there is no cup.
    pub weight_epsilon_g: i32,
    /// Liquid still in flight after the bottle turns up; subtracted from the
    /// cutoff weight.
    pub upright_offset_g: i32,
    /// Servo units past rest used to park an empty bottle.
    pub bottle_empty_pos_offset: i32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            weight_epsilon_g: 5,
            upright_offset_g: 10,
            bottle_empty_pos_offset: 100,
        }
    }
}

/// Bounds on operator-driven recovery. `None` waits indefinitely.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryPolicy {
    pub max_cup_waits: Option<u32>,
    pub max_resume_waits: Option<u32>,
}

/// Everything tunable about one pour, bundled for the builder.
#[derive(Debug, Clone, Default)]
pub struct PourSettings {
    pub timing: Timing,
    pub thresholds: Thresholds,
    pub retry: RetryPolicy,
}

#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core pouring logic (hardware-agnostic).
//!
//! This crate drives one rotating bottle over a load cell. All hardware
//! interactions go through the `pour_traits` traits (`Actuator`, `Scale`,
//! `SignalSource`, `Reporter`, `Clock`).
//!
//! ## Architecture
//!
//! - **Bottle**: servo positions and the derived pause positions (`bottle`)
//! - **Configuration**: delays, thresholds and retry bounds (`config`)
//! - **Stepper**: unit-by-unit motion with abort and weight checks (`stepper`)
//! - **Pour**: baseline, pour-until-target and settle phases (`pour`)
//! - **Builder**: type-state `PourerBuilder` and `build_pour_core` (`builder`)
//!
//! All weights are integer grams as reported by the scale.

pub mod bottle;
pub mod builder;
pub mod config;
pub mod conversions;
pub mod engine;
pub mod error;
pub mod hw_error;
pub mod pour;
pub mod reporter;
pub mod stepper;
pub mod timer;

pub use bottle::{Bottle, SERVO_MAX, SERVO_MIN, ServoRange};
pub use builder::{Missing, Pourer, PourerBuilder, Set, build_pour_core};
pub use config::{PourSettings, RetryPolicy, Thresholds, Timing};
pub use engine::PourCore;
pub use error::{BuildError, PourError, PourResult, RecoverableFault};
pub use reporter::TracingReporter;
pub use stepper::{StepChecks, StepOutcome};
pub use timer::PollTimer;

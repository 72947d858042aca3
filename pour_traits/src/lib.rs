//! Hardware boundary for the pourer.
//!
//! The core only talks to the servo, the load cell, the operator and the
//! display through these traits. Errors crossing the boundary are boxed so
//! that drivers can report whatever they like; `pour_core` maps them to its
//! typed error.

pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of a non-blocking scale read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    /// A fresh weight in grams.
    Ready(i32),
    /// The converter has no new conversion yet. Not an error.
    NotReady,
}

/// Outcome of a blocking operator wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Proceed,
    Aborted,
}

/// Position-controlled actuator (a hobby servo driven by pulse width).
///
/// There is no velocity control; motion is emulated by successive
/// `set_position` calls.
pub trait Actuator {
    fn set_position(&mut self, units: i32) -> Result<(), BoxError>;
    fn position(&self) -> i32;
}

/// Load cell reporting grams.
pub trait Scale {
    fn sample_nonblocking(&mut self) -> Result<Sample, BoxError>;
    /// Block until several consecutive samples agree.
    fn read_stable_blocking(&mut self) -> Result<i32, BoxError>;
    /// Block for an averaged reading.
    fn read_average_blocking(&mut self) -> Result<i32, BoxError>;
}

/// Operator-facing command layer.
pub trait SignalSource {
    fn is_abort_requested(&mut self) -> bool;
    fn wait_for_cup_present(&mut self) -> Signal;
    fn wait_for_resume(&mut self) -> Signal;
}

/// Status and error display. Calls are fire-and-forget.
pub trait Reporter {
    fn message(&mut self, msg: &str);
    fn error(&mut self, msg: &str);
    fn clear_error(&mut self);
}

impl<T: Actuator + ?Sized> Actuator for Box<T> {
    fn set_position(&mut self, units: i32) -> Result<(), BoxError> {
        (**self).set_position(units)
    }
    fn position(&self) -> i32 {
        (**self).position()
    }
}

impl<T: Actuator + ?Sized> Actuator for &mut T {
    fn set_position(&mut self, units: i32) -> Result<(), BoxError> {
        (**self).set_position(units)
    }
    fn position(&self) -> i32 {
        (**self).position()
    }
}

impl<T: Scale + ?Sized> Scale for Box<T> {
    fn sample_nonblocking(&mut self) -> Result<Sample, BoxError> {
        (**self).sample_nonblocking()
    }
    fn read_stable_blocking(&mut self) -> Result<i32, BoxError> {
        (**self).read_stable_blocking()
    }
    fn read_average_blocking(&mut self) -> Result<i32, BoxError> {
        (**self).read_average_blocking()
    }
}

impl<T: Scale + ?Sized> Scale for &mut T {
    fn sample_nonblocking(&mut self) -> Result<Sample, BoxError> {
        (**self).sample_nonblocking()
    }
    fn read_stable_blocking(&mut self) -> Result<i32, BoxError> {
        (**self).read_stable_blocking()
    }
    fn read_average_blocking(&mut self) -> Result<i32, BoxError> {
        (**self).read_average_blocking()
    }
}

impl<T: SignalSource + ?Sized> SignalSource for Box<T> {
    fn is_abort_requested(&mut self) -> bool {
        (**self).is_abort_requested()
    }
    fn wait_for_cup_present(&mut self) -> Signal {
        (**self).wait_for_cup_present()
    }
    fn wait_for_resume(&mut self) -> Signal {
        (**self).wait_for_resume()
    }
}

impl<T: SignalSource + ?Sized> SignalSource for &mut T {
    fn is_abort_requested(&mut self) -> bool {
        (**self).is_abort_requested()
    }
    fn wait_for_cup_present(&mut self) -> Signal {
        (**self).wait_for_cup_present()
    }
    fn wait_for_resume(&mut self) -> Signal {
        (**self).wait_for_resume()
    }
}

impl<T: Reporter + ?Sized> Reporter for Box<T> {
    fn message(&mut self, msg: &str) {
        (**self).message(msg);
    }
    fn error(&mut self, msg: &str) {
        (**self).error(msg);
    }
    fn clear_error(&mut self) {
        (**self).clear_error();
    }
}

impl<T: Reporter + ?Sized> Reporter for &mut T {
    fn message(&mut self, msg: &str) {
        (**self).message(msg);
    }
    fn error(&mut self, msg: &str) {
        (**self).error(msg);
    }
    fn clear_error(&mut self) {
        (**self).clear_error();
    }
}

//! Maps `Box<dyn Error>` from trait boundaries to typed `PourError`.
//!
//! The traits in `pour_traits` use `Box<dyn Error + Send + Sync>`; this module
//! converts those to our typed error, with an optional feature-gated path for
//! `pour_hardware::HwError` downcasting. The original message is kept.

use crate::error::PourError;

/// Map a scale error to a typed `PourError`.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> PourError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<pour_hardware::error::HwError>() {
            return match hw {
                pour_hardware::error::HwError::Timeout
                | pour_hardware::error::HwError::DataReadyTimeout => PourError::SensorTimeout,
                other => PourError::Sensor(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        PourError::SensorTimeout
    } else {
        PourError::Sensor(s)
    }
}

/// Map an actuator error; servos have no timeout semantics.
pub fn map_actuator_error(e: &(dyn std::error::Error + 'static)) -> PourError {
    PourError::Actuator(e.to_string())
}

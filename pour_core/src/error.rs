use thiserror::Error;

/// Faults the pour loop knows how to recover from by waiting on the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverableFault {
    CupMissing,
    BottleEmpty,
}

impl std::fmt::Display for RecoverableFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CupMissing => f.write_str("cup missing"),
            Self::BottleEmpty => f.write_str("bottle empty"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PourError {
    #[error("servo target {target} outside {min}..={max}")]
    OutOfRange { target: i32, min: i32, max: i32 },
    #[error("cup missing")]
    CupMissing,
    #[error("weight not stable")]
    WeightNotStable,
    #[error("bottle empty")]
    BottleEmpty,
    #[error("aborted by operator")]
    Aborted,
    #[error("retry budget exhausted ({fault})")]
    RetryBudgetExhausted { fault: RecoverableFault },
    #[error("sensor error: {0}")]
    Sensor(String),
    #[error("timeout waiting for sensor")]
    SensorTimeout,
    #[error("actuator error: {0}")]
    Actuator(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing actuator")]
    MissingActuator,
    #[error("missing scale")]
    MissingScale,
    #[error("missing signal source")]
    MissingSignals,
    #[error("missing bottle")]
    MissingBottle,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

/// Result of stepping and pouring operations.
pub type PourResult<T> = std::result::Result<T, PourError>;

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;

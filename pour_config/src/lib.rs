#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the pourer.
//!
//! `Config` and its sections are deserialized from TOML and checked by
//! `Config::validate()`. Every calibration constant (delays, thresholds,
//! offsets) lives here with a default; nothing in the core hard-codes them.
use serde::Deserialize;

/// Legal servo pulse-width range in microseconds.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct ServoRange {
    pub min: i32,
    pub max: i32,
}

impl Default for ServoRange {
    fn default() -> Self {
        Self {
            min: 1000,
            max: 2000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BottleCfg {
    pub number: u8,
    /// PWM pin driving this bottle's servo
    pub pin: u8,
    /// Servo position while pouring
    pub pos_down: i32,
    /// Servo position at rest (bottle upright)
    pub pos_up: i32,
    /// Optional human readable name, e.g. "Vodka"
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Timing {
    pub turn_down_delay_ms: u64,
    pub turn_up_delay_ms: u64,
    /// Used when retracting after an abort or a missing cup
    pub fast_turn_up_delay_ms: u64,
    /// Max time to reach the target weight before declaring the bottle empty
    pub pouring_timeout_ms: u64,
    /// Sleep between weight polls while waiting for the target
    pub poll_ms: u64,
    /// Interval for progress log lines while pouring (0 disables)
    pub progress_log_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            turn_down_delay_ms: 4,
            turn_up_delay_ms: 2,
            fast_turn_up_delay_ms: 1,
            pouring_timeout_ms: 7000,
            poll_ms: 5,
            progress_log_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum weight (g) for a cup to count as present
    pub weight_epsilon_g: i32,
    /// Liquid still in flight when the bottle turns up (g)
    pub upright_offset_g: i32,
    /// How far past rest to park an empty bottle (servo units)
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

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    /// Simulated load cell that fills while the bottle is down
    #[default]
    Simulated,
    /// ADS1231 on GPIO (requires the `hardware` feature)
    Hardware,
    /// No load cell: synthetic weight derived from pour time
    #[serde(rename = "none")]
    Null,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScaleCfg {
    pub mode: ScaleMode,
    pub dout_pin: u8,
    pub sclk_pin: u8,
    /// ADC counts per milligram
    pub divisor: i32,
    /// Zero offset in milligrams
    pub offset_mg: i32,
    pub stable_samples: u32,
    pub average_samples: u32,
    pub read_timeout_ms: u64,
    /// Weight reported by the null scale when asked for a stable reading
    pub null_weight_g: i32,
    /// Null scale pour rate
    pub ms_per_gram: u64,
    /// Simulated scale: weight of the empty cup
    pub sim_cup_g: i32,
    /// Simulated scale: grams added per sample while pouring
    pub sim_step_g: i32,
}

impl Default for ScaleCfg {
    fn default() -> Self {
        Self {
            mode: ScaleMode::Simulated,
            dout_pin: 2,
            sclk_pin: 1,
            divisor: 1,
            offset_mg: 0,
            stable_samples: 3,
            average_samples: 10,
            read_timeout_ms: 150,
            null_weight_g: 1000,
            ms_per_gram: 50,
            sim_cup_g: 250,
            sim_step_g: 1,
        }
    }
}

/// Retry bounds for the operator-driven recovery loops.
/// Absent values mean "wait as often as it takes".
#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(default)]
pub struct RetryCfg {
    pub max_cup_waits: Option<u32>,
    pub max_resume_waits: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub servo: ServoRange,
    pub bottles: Vec<BottleCfg>,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub scale: ScaleCfg,
    #[serde(default)]
    pub retry: RetryCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn bottle(&self, number: u8) -> Option<&BottleCfg> {
        self.bottles.iter().find(|b| b.number == number)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        // Servo
        if self.servo.min >= self.servo.max {
            eyre::bail!("servo.min must be < servo.max");
        }

        // Bottles
        if self.bottles.is_empty() {
            eyre::bail!("at least one [[bottles]] entry is required");
        }
        let range = self.servo.min..=self.servo.max;
        for (i, b) in self.bottles.iter().enumerate() {
            if self.bottles[..i].iter().any(|o| o.number == b.number) {
                eyre::bail!("bottle number {} is defined twice", b.number);
            }
            if !range.contains(&b.pos_down) {
                eyre::bail!(
                    "bottle {}: pos_down {} outside servo range {}..={}",
                    b.number,
                    b.pos_down,
                    self.servo.min,
                    self.servo.max
                );
            }
            if !range.contains(&b.pos_up) {
                eyre::bail!(
                    "bottle {}: pos_up {} outside servo range {}..={}",
                    b.number,
                    b.pos_up,
                    self.servo.min,
                    self.servo.max
                );
            }
            if b.pos_down == b.pos_up {
                eyre::bail!("bottle {}: pos_down must differ from pos_up", b.number);
            }
        }

        // Timing
        if self.timing.turn_down_delay_ms == 0 {
            eyre::bail!("timing.turn_down_delay_ms must be >= 1");
        }
        if self.timing.turn_up_delay_ms == 0 {
            eyre::bail!("timing.turn_up_delay_ms must be >= 1");
        }
        if self.timing.fast_turn_up_delay_ms == 0 {
            eyre::bail!("timing.fast_turn_up_delay_ms must be >= 1");
        }
        if self.timing.pouring_timeout_ms == 0 {
            eyre::bail!("timing.pouring_timeout_ms must be >= 1");
        }
        if self.timing.pouring_timeout_ms > 10 * 60 * 1000 {
            eyre::bail!("timing.pouring_timeout_ms is unreasonably large (>10min)");
        }
        if self.timing.poll_ms == 0 {
            eyre::bail!("timing.poll_ms must be >= 1");
        }

        // Thresholds
        if self.thresholds.weight_epsilon_g < 0 {
            eyre::bail!("thresholds.weight_epsilon_g must be >= 0");
        }
        if self.thresholds.upright_offset_g < 0 {
            eyre::bail!("thresholds.upright_offset_g must be >= 0");
        }
        if self.thresholds.bottle_empty_pos_offset < 0 {
            eyre::bail!("thresholds.bottle_empty_pos_offset must be >= 0");
        }

        // Scale
        if self.scale.divisor == 0 {
            eyre::bail!("scale.divisor must be non-zero");
        }
        if self.scale.stable_samples == 0 {
            eyre::bail!("scale.stable_samples must be >= 1");
        }
        if self.scale.average_samples == 0 {
            eyre::bail!("scale.average_samples must be >= 1");
        }
        if self.scale.read_timeout_ms == 0 {
            eyre::bail!("scale.read_timeout_ms must be >= 1");
        }
        if self.scale.ms_per_gram == 0 {
            eyre::bail!("scale.ms_per_gram must be >= 1");
        }
        if self.scale.mode == ScaleMode::Null
            && self.scale.null_weight_g < self.thresholds.weight_epsilon_g
        {
            eyre::bail!("scale.null_weight_g must be >= thresholds.weight_epsilon_g");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref() {
            if !matches!(rot, "never" | "daily" | "hourly") {
                eyre::bail!("logging.rotation must be one of: never, daily, hourly");
            }
        }

        Ok(())
    }
}

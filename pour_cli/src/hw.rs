//! Hardware assembly: picks the servo and scale implementations for a bottle
//! from the config and the enabled features.

use std::sync::Arc;
use std::sync::atomic::AtomicI32;

use eyre::Result;
use pour_config::{BottleCfg, Config, ScaleMode};
use pour_traits::{Actuator, MonotonicClock, Scale};

/// Overrides `scale.sim_step_g` so tests can simulate a dry bottle.
pub const SIM_STEP_ENV: &str = "POUR_TEST_SIM_STEP";

/// The servo plus its shared position, when the driver exposes one.
type ServoParts = (Box<dyn Actuator>, Option<Arc<AtomicI32>>);

fn sim_step_g(cfg: &Config) -> i32 {
    std::env::var(SIM_STEP_ENV)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(cfg.scale.sim_step_g)
}

#[cfg(feature = "hardware")]
fn make_servo(bottle: &BottleCfg) -> Result<ServoParts> {
    use eyre::WrapErr;
    let servo = pour_hardware::hardware::PwmServo::new(bottle.pin, bottle.pos_up)
        .wrap_err_with(|| format!("open servo on pin {}", bottle.pin))?;
    let handle = servo.position_handle();
    Ok((Box::new(servo), Some(handle)))
}

#[cfg(not(feature = "hardware"))]
fn make_servo(bottle: &BottleCfg) -> Result<ServoParts> {
    let servo = pour_hardware::SimulatedServo::new(bottle.pos_up);
    let handle = servo.position_handle();
    Ok((Box::new(servo), Some(handle)))
}

#[cfg(feature = "hardware")]
fn make_hardware_scale(cfg: &Config) -> Result<Box<dyn Scale>> {
    use eyre::WrapErr;
    let params = pour_hardware::AdcParams {
        divisor: cfg.scale.divisor,
        offset_mg: cfg.scale.offset_mg,
        stable_samples: cfg.scale.stable_samples,
        average_samples: cfg.scale.average_samples,
        read_timeout: std::time::Duration::from_millis(cfg.scale.read_timeout_ms),
    };
    let scale =
        pour_hardware::hardware::HardwareScale::new(cfg.scale.dout_pin, cfg.scale.sclk_pin, params)
            .wrap_err("open ADS1231 scale")?;
    Ok(Box::new(scale))
}

#[cfg(not(feature = "hardware"))]
fn make_hardware_scale(_cfg: &Config) -> Result<Box<dyn Scale>> {
    eyre::bail!("scale.mode = \"hardware\" requires a build with --features hardware")
}

/// Servo and scale for one bottle.
pub fn make_rig(cfg: &Config, bottle: &BottleCfg) -> Result<(Box<dyn Actuator>, Box<dyn Scale>)> {
    let (servo, position) = make_servo(bottle)?;
    let scale: Box<dyn Scale> = match cfg.scale.mode {
        ScaleMode::Simulated => {
            let sim = pour_hardware::SimulatedScale::new(cfg.scale.sim_cup_g, sim_step_g(cfg));
            match position {
                Some(handle) => Box::new(sim.pouring_at(handle, bottle.pos_down)),
                None => Box::new(sim),
            }
        }
        ScaleMode::Hardware => make_hardware_scale(cfg)?,
        ScaleMode::Null => {
            let null = pour_hardware::NullScale::new(
                MonotonicClock::new(),
                cfg.scale.null_weight_g,
                cfg.scale.ms_per_gram,
            );
            match position {
                Some(handle) => Box::new(null.pouring_at(handle, bottle.pos_down)),
                None => Box::new(null),
            }
        }
    };
    tracing::debug!(bottle = bottle.number, mode = ?cfg.scale.mode, "hardware assembled");
    Ok((servo, scale))
}

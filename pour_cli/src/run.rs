//! Subcommand execution: wires config, hardware and operator into a `Pourer`.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use eyre::{Result, eyre};
use pour_core::hw_error::map_hw_error;
use pour_core::{Bottle, PourSettings, Pourer};

use crate::cli::TurnTarget;
use crate::hw::make_rig;
use crate::operator::{ConsoleReporter, ConsoleSignals, spawn_stdin_reader};

fn build_pourer(cfg: &pour_config::Config, number: u8, abort: Arc<AtomicBool>) -> Result<Pourer> {
    let bottle_cfg = cfg
        .bottle(number)
        .ok_or_else(|| eyre!("no bottle {number} in config"))?;
    let bottle = Bottle::from_config(cfg, number)?;
    let (actuator, scale) = make_rig(cfg, bottle_cfg)?;
    let settings = PourSettings::from(cfg);
    let signals = ConsoleSignals::new(abort, spawn_stdin_reader(), settings.timing.poll_interval);

    Pourer::builder()
        .with_actuator(actuator)
        .with_scale(scale)
        .with_signals(signals)
        .with_bottle(bottle)
        .with_reporter(ConsoleReporter)
        .with_settings(settings)
        .build()
}

pub fn run_pour(
    cfg: &pour_config::Config,
    bottle: u8,
    grams: i32,
    json: bool,
    abort: Arc<AtomicBool>,
) -> Result<()> {
    let mut pourer = build_pourer(cfg, bottle, abort)?;
    let measured = pourer.pour(grams)?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "bottle": bottle,
                "requested_g": grams,
                "measured_g": measured,
            })
        );
    } else {
        println!("pour complete: measured={measured} g");
    }
    Ok(())
}

pub fn run_turn(
    cfg: &pour_config::Config,
    bottle: u8,
    to: TurnTarget,
    json: bool,
    abort: Arc<AtomicBool>,
) -> Result<()> {
    let mut pourer = build_pourer(cfg, bottle, abort)?;
    let timing = pourer.timing().clone();
    match to {
        TurnTarget::Up => pourer.turn_up(timing.turn_up_delay, true)?,
        TurnTarget::Down => pourer.turn_down(timing.turn_down_delay, false)?,
        TurnTarget::Pause => pourer.turn_to_pause(timing.turn_up_delay)?,
    };

    let position = pourer.position();
    if json {
        println!(
            "{}",
            serde_json::json!({ "bottle": bottle, "position": position })
        );
    } else {
        println!("bottle {bottle} at {position}");
    }
    Ok(())
}

/// Assemble the first bottle's hardware and take one stable reading.
pub fn run_self_check(cfg: &pour_config::Config, json: bool) -> Result<()> {
    let bottle = cfg
        .bottles
        .first()
        .ok_or_else(|| eyre!("no bottle in config"))?;
    let (_servo, mut scale) = make_rig(cfg, bottle)?;
    let weight = scale.read_stable_blocking().map_err(|e| map_hw_error(&*e))?;
    tracing::info!(weight_g = weight, "self-check reading");

    if json {
        println!("{}", serde_json::json!({ "ok": true, "weight_g": weight }));
    } else {
        println!("self-check ok (scale={weight} g)");
    }
    Ok(())
}

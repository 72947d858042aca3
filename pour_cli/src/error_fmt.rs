//! Human-readable error descriptions, exit codes and structured JSON errors.

use pour_core::error::{BuildError, PourError, RecoverableFault};

pub fn pour_error_name(e: &PourError) -> &'static str {
    match e {
        PourError::OutOfRange { .. } => "OutOfRange",
        PourError::CupMissing => "CupMissing",
        PourError::WeightNotStable => "WeightNotStable",
        PourError::BottleEmpty => "BottleEmpty",
        PourError::Aborted => "Aborted",
        PourError::RetryBudgetExhausted { .. } => "RetryBudgetExhausted",
        PourError::Sensor(_) => "Sensor",
        PourError::SensorTimeout => "SensorTimeout",
        PourError::Actuator(_) => "Actuator",
    }
}

/// Every message in an error chain, outermost first.
fn chain_text(err: &eyre::Report) -> String {
    err.chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingActuator | BuildError::MissingScale | BuildError::MissingSignals => format!(
                "What happened: The pourer was built without a {}.\nLikely causes: Hardware failed to initialize.\nHow to fix: Run `pour self-check` and check the wiring.",
                be.to_string().trim_start_matches("missing ")
            ),
            BuildError::MissingBottle => "What happened: No bottle was selected.\nLikely causes: The bottle number is not in the config.\nHow to fix: Pass --bottle with a number listed under [[bottles]].".to_string(),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(pe) = err.downcast_ref::<PourError>() {
        return match pe {
            PourError::Aborted => "What happened: The pour was aborted.\nLikely causes: Ctrl-C, an `abort` line on stdin, or operator input closed while waiting.\nHow to fix: Start a new pour when ready.".to_string(),
            PourError::BottleEmpty => "What happened: The target weight was not reached in time; the bottle looks empty.\nLikely causes: Empty bottle or a blocked spout.\nHow to fix: Replace the bottle, or raise timing.pouring_timeout_ms for slow pours.".to_string(),
            PourError::CupMissing => "What happened: No cup on the scale.\nLikely causes: Cup removed or scale not zeroed.\nHow to fix: Place a cup and retry; check thresholds.weight_epsilon_g.".to_string(),
            PourError::RetryBudgetExhausted { fault } => {
                let hint = match fault {
                    RecoverableFault::CupMissing => "retry.max_cup_waits",
                    RecoverableFault::BottleEmpty => "retry.max_resume_waits",
                };
                format!(
                    "What happened: Gave up after repeated faults ({fault}).\nLikely causes: The operator did not resolve the fault within the allowed waits.\nHow to fix: Fix the cause, or raise {hint} in the config."
                )
            }
            PourError::OutOfRange { target, min, max } => format!(
                "What happened: Servo target {target} is outside {min}..={max}.\nLikely causes: Bottle positions or servo range misconfigured.\nHow to fix: Adjust [servo] or the bottle's pos_down/pos_up."
            ),
            PourError::SensorTimeout => "What happened: Scale read timed out.\nLikely causes: ADS1231 not wired correctly, no power, or timeout too low.\nHow to fix: Verify DOUT/SCLK pins and power, and consider increasing scale.read_timeout_ms.".to_string(),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    let msg = chain_text(err);
    let lower = msg.to_ascii_lowercase();

    if lower.contains("read config") {
        return format!(
            "What happened: The config file could not be read ({msg}).\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Point --config at an existing TOML file."
        );
    }

    if lower.contains("parse config") || lower.contains("invalid configuration") {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: Typos, missing [[bottles]] or out-of-range values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    if lower.contains("no bottle") {
        return format!(
            "What happened: {msg}.\nHow to fix: Pass --bottle with a number listed under [[bottles]]."
        );
    }

    if lower.contains("open servo") || lower.contains("open ads1231") || lower.contains("gpio") {
        return format!(
            "What happened: Failed to initialize hardware pins ({msg}).\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the pins in the config; ensure the process may access GPIO."
        );
    }

    format!(
        "Something went wrong.\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes per fault; 2 is shared with clap usage errors.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<PourError>() {
        Some(PourError::Aborted) => 2,
        Some(
            PourError::BottleEmpty
            | PourError::RetryBudgetExhausted {
                fault: RecoverableFault::BottleEmpty,
            },
        ) => 3,
        Some(
            PourError::CupMissing
            | PourError::RetryBudgetExhausted {
                fault: RecoverableFault::CupMissing,
            },
        ) => 4,
        Some(PourError::OutOfRange { .. }) => 5,
        Some(PourError::Sensor(_) | PourError::SensorTimeout) => 6,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let msg = humanize(err);
    match err.downcast_ref::<PourError>() {
        Some(PourError::RetryBudgetExhausted { fault }) => json!({
            "reason": "RetryBudgetExhausted",
            "details": { "fault": fault.to_string() },
            "message": msg,
        })
        .to_string(),
        Some(pe) => json!({ "reason": pour_error_name(pe), "message": msg }).to_string(),
        None => json!({ "reason": "Error", "message": msg }).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_the_fault() {
        let code = |e: PourError| exit_code_for_error(&eyre::Report::new(e));
        assert_eq!(code(PourError::Aborted), 2);
        assert_eq!(code(PourError::BottleEmpty), 3);
        assert_eq!(
            code(PourError::RetryBudgetExhausted {
                fault: RecoverableFault::CupMissing
            }),
            4
        );
        assert_eq!(
            code(PourError::OutOfRange {
                target: 2100,
                min: 1000,
                max: 2000
            }),
            5
        );
        assert_eq!(code(PourError::SensorTimeout), 6);
        assert_eq!(code(PourError::Actuator("pwm".into())), 1);
        assert_eq!(exit_code_for_error(&eyre::eyre!("plain")), 1);
    }

    #[test]
    fn json_error_names_the_reason() {
        let err = eyre::Report::new(PourError::RetryBudgetExhausted {
            fault: RecoverableFault::BottleEmpty,
        });
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "RetryBudgetExhausted");
        assert_eq!(v["details"]["fault"], "bottle empty");
        assert!(v["message"].as_str().unwrap().contains("max_resume_waits"));
    }

    #[test]
    fn config_errors_keep_their_cause() {
        let err = eyre::eyre!("servo.min must be < servo.max").wrap_err("invalid configuration");
        let text = humanize(&err);
        assert!(text.starts_with("What happened: Configuration is invalid"));
        assert!(text.contains("servo.min must be < servo.max"));
    }
}

use pour_config::{ScaleMode, load_toml};
use rstest::rstest;

const MINIMAL: &str = r#"
[[bottles]]
number = 1
pin = 13
pos_down = 1150
pos_up = 1850
"#;

#[test]
fn minimal_config_takes_defaults() {
    let cfg = load_toml(MINIMAL).expect("parse TOML");
    cfg.validate().expect("minimal config should pass");

    assert_eq!(cfg.servo.min, 1000);
    assert_eq!(cfg.servo.max, 2000);
    assert_eq!(cfg.scale.mode, ScaleMode::Simulated);
    assert_eq!(cfg.scale.stable_samples, 3);
    assert!(cfg.retry.max_cup_waits.is_none());
    assert!(cfg.bottle(1).is_some());
    assert!(cfg.bottle(2).is_none());
}

#[test]
fn full_config_round_trips_every_section() {
    let toml = r#"
[servo]
min = 900
max = 2100

[[bottles]]
number = 1
pin = 13
pos_down = 1000
pos_up = 2000
name = "Vodka"

[[bottles]]
number = 2
pin = 12
pos_down = 1900
pos_up = 1100

[timing]
turn_down_delay_ms = 3
turn_up_delay_ms = 1
fast_turn_up_delay_ms = 1
pouring_timeout_ms = 5000
poll_ms = 2
progress_log_ms = 0

[thresholds]
weight_epsilon_g = 4
upright_offset_g = 22
bottle_empty_pos_offset = 50

[scale]
mode = "none"
null_weight_g = 800
ms_per_gram = 30

[retry]
max_cup_waits = 3

[logging]
level = "debug"
rotation = "daily"
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("full config should pass");

    assert_eq!(cfg.bottles.len(), 2);
    assert_eq!(cfg.bottle(1).and_then(|b| b.name.as_deref()), Some("Vodka"));
    assert_eq!(cfg.timing.pouring_timeout_ms, 5000);
    assert_eq!(cfg.thresholds.upright_offset_g, 22);
    assert_eq!(cfg.scale.mode, ScaleMode::Null);
    assert_eq!(cfg.retry.max_cup_waits, Some(3));
    assert_eq!(cfg.retry.max_resume_waits, None);
    assert_eq!(cfg.logging.rotation.as_deref(), Some("daily"));
}

#[test]
fn missing_bottles_fails_to_parse() {
    assert!(load_toml("[servo]\nmin = 1000\nmax = 2000\n").is_err());
}

#[test]
fn unknown_scale_mode_fails_to_parse() {
    let toml = format!("{MINIMAL}\n[scale]\nmode = \"laser\"\n");
    assert!(load_toml(&toml).is_err());
}

#[rstest]
#[case("[servo]\nmin = 2000\nmax = 1000\n", "servo.min must be < servo.max")]
#[case("[timing]\nturn_down_delay_ms = 0\n", "turn_down_delay_ms must be >= 1")]
#[case("[timing]\npouring_timeout_ms = 0\n", "pouring_timeout_ms must be >= 1")]
#[case("[timing]\npoll_ms = 0\n", "poll_ms must be >= 1")]
#[case("[thresholds]\nweight_epsilon_g = -1\n", "weight_epsilon_g must be >= 0")]
#[case("[thresholds]\nbottle_empty_pos_offset = -5\n", "bottle_empty_pos_offset must be >= 0")]
#[case("[scale]\ndivisor = 0\n", "divisor must be non-zero")]
#[case("[scale]\nstable_samples = 0\n", "stable_samples must be >= 1")]
#[case("[scale]\naverage_samples = 0\n", "average_samples must be >= 1")]
#[case("[scale]\nms_per_gram = 0\n", "ms_per_gram must be >= 1")]
#[case("[scale]\nmode = \"none\"\nnull_weight_g = 0\n", "null_weight_g must be >=")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation must be one of")]
fn rejects_bad_sections(#[case] extra: &str, #[case] needle: &str) {
    let toml = format!("{MINIMAL}\n{extra}");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("config should be rejected");
    assert!(
        err.to_string().contains(needle),
        "expected '{needle}' in '{err}'"
    );
}

#[rstest]
#[case(900, 1850, "pos_down 900 outside servo range")]
#[case(1150, 2050, "pos_up 2050 outside servo range")]
#[case(1500, 1500, "pos_down must differ from pos_up")]
fn rejects_bad_bottle_positions(#[case] down: i32, #[case] up: i32, #[case] needle: &str) {
    let toml = format!("[[bottles]]\nnumber = 7\npin = 3\npos_down = {down}\npos_up = {up}\n");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("bottle should be rejected");
    assert!(err.to_string().contains(needle), "got: {err}");
}

#[test]
fn rejects_duplicate_bottle_numbers() {
    let toml = format!("{MINIMAL}\n[[bottles]]\nnumber = 1\npin = 12\npos_down = 1200\npos_up = 1800\n");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("duplicate should be rejected");
    assert!(err.to_string().contains("defined twice"));
}

#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    let Ok(cfg) = pour_config::load_toml(data) else {
        return;
    };
    if cfg.validate().is_err() {
        return;
    }
    // A validated config must always yield usable bottle geometry.
    for b in &cfg.bottles {
        let bottle = pour_core::Bottle::from_config(&cfg, b.number)
            .expect("validated bottle must convert");
        let range = bottle.range();
        assert!(range.contains(bottle.pause_pos()));
        assert!(range.contains(bottle.below_pause_pos()));
        let _ = pour_core::PourSettings::from(&cfg);
    }
});

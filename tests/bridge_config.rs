use std::sync::Mutex;

use tempfile::NamedTempFile;

use vision_bridge::config::BridgeConfig;
use vision_bridge::Category;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "VISION_CONFIG",
        "VISION_CAMERA_URL",
        "VISION_DEFAULT_CONFIDENCE",
        "VISION_RESET_TRAILING_SLOTS",
        "VISION_WARMUP_MS",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn defaults_apply_without_file_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = BridgeConfig::load().expect("load config");

    assert_eq!(cfg.camera.url, "stub://camera0");
    assert_eq!(cfg.capacities.capacity(Category::Hatch), 3);
    assert_eq!(cfg.capacities.capacity(Category::Ball), 3);
    assert_eq!(cfg.capacities.capacity(Category::Tape), 6);
    assert!(!cfg.reset_all_trailing_slots);
    assert_eq!(cfg.default_confidence, 0.5);
    assert_eq!(cfg.warmup.as_millis(), 2000);

    clear_env();
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "camera": {
            "url": "stub://front",
            "target_fps": 15,
            "width": 800,
            "height": 600
        },
        "slots": {
            "hatch": 4,
            "ball": 2,
            "tape": 8,
            "reset_all_trailing": true
        },
        "confidence": {
            "default": 0.6
        },
        "warmup_ms": 500
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("VISION_CONFIG", file.path());
    std::env::set_var("VISION_CAMERA_URL", "stub://rear");
    std::env::set_var("VISION_DEFAULT_CONFIDENCE", "0.75");

    let cfg = BridgeConfig::load().expect("load config");

    assert_eq!(cfg.camera.url, "stub://rear");
    assert_eq!(cfg.camera.target_fps, 15);
    assert_eq!(cfg.camera.width, 800);
    assert_eq!(cfg.camera.height, 600);
    assert_eq!(cfg.capacities.capacity(Category::Hatch), 4);
    assert_eq!(cfg.capacities.capacity(Category::Ball), 2);
    assert_eq!(cfg.capacities.capacity(Category::Tape), 8);
    assert!(cfg.reset_all_trailing_slots);
    assert_eq!(cfg.default_confidence, 0.75);
    assert_eq!(cfg.warmup.as_millis(), 500);

    clear_env();
}

#[test]
fn rejects_zero_slot_capacity() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{ "slots": { "ball": 0 } }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");
    std::env::set_var("VISION_CONFIG", file.path());

    let err = BridgeConfig::load().unwrap_err();
    assert!(err.to_string().contains("Ball"));

    clear_env();
}

#[test]
fn rejects_out_of_range_default_confidence() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("VISION_DEFAULT_CONFIDENCE", "1.5");

    let err = BridgeConfig::load().unwrap_err();
    assert!(err.to_string().contains("confidence"));

    clear_env();
}

#[test]
fn rejects_malformed_reset_flag() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("VISION_RESET_TRAILING_SLOTS", "maybe");

    assert!(BridgeConfig::load().is_err());

    clear_env();
}

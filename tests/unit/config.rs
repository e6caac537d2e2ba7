use super::*;

#[test]
fn defaults_validate() {
    let cfg = EngineConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.export.width, 600);
    assert_eq!(cfg.export.height, 1200);
    assert_eq!(cfg.profile(HostKind::Modal).default_thickness, 5);
    assert_eq!(cfg.profile(HostKind::Dialog).default_thickness, 8);
}

#[test]
fn partial_json_fills_defaults() {
    let cfg = EngineConfig::from_json_str(r#"{"export":{"width":300,"height":600}}"#).unwrap();
    assert_eq!(cfg.export.width, 300);
    assert_eq!(cfg.dialog, HostProfile::dialog());
    assert_eq!(cfg.default_color, StrokeColor::Blue);
}

#[test]
fn invalid_values_are_rejected() {
    assert!(EngineConfig::from_json_str(r#"{"export":{"width":0,"height":600}}"#).is_err());
    assert!(EngineConfig::from_json_str(r#"{"history_limit":1}"#).is_err());
    assert!(EngineConfig::from_json_str("not json").is_err());

    let mut cfg = EngineConfig::default();
    cfg.modal.default_thickness = 31;
    assert!(cfg.validate().is_err());

    let mut cfg = EngineConfig::default();
    cfg.dialog.padding = -1.0;
    assert!(cfg.validate().is_err());
}

#[test]
fn config_round_trips_through_file() {
    let path = std::env::temp_dir().join(format!(
        "toothsketch_config_test_{}.json",
        std::process::id()
    ));
    let cfg = EngineConfig {
        default_color: StrokeColor::Green,
        ..EngineConfig::default()
    };
    std::fs::write(&path, serde_json::to_string_pretty(&cfg).unwrap()).unwrap();
    let loaded = EngineConfig::from_path(&path).unwrap();
    assert_eq!(loaded, cfg);
    std::fs::remove_file(&path).ok();

    assert!(EngineConfig::from_path("/definitely/not/here.json").is_err());
}

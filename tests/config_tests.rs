use std::io::Write;

use estimate_tool::{ConfigError, EngineConfig};

fn toml_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn file_overrides_merge_with_defaults() {
    let file = toml_file(
        r#"
        [schedule]
        hours_per_workday = 9.5

        [crashing]
        max_extra_crews = 1
        overtime_options = [0.0, 25.0]
        "#,
    );

    let config = EngineConfig::load_from(file.path()).unwrap();
    assert_eq!(config.schedule.hours_per_workday, 9.5);
    assert_eq!(config.schedule.s_curve_bucket_days, 7);
    assert_eq!(config.crashing.max_extra_crews, 1);
    assert_eq!(config.crashing.overtime_options, vec![0.0, 25.0]);
    assert_eq!(config.crashing.overtime_productivity, 0.8);
}

#[test]
fn invalid_values_are_rejected() {
    let file = toml_file("[crashing]\novertime_options = []\n");
    match EngineConfig::load_from(file.path()) {
        Err(ConfigError::Invalid(msg)) => assert!(msg.contains("overtime_options")),
        other => panic!("expected invalid config, got {other:?}"),
    }

    let err = EngineConfig::from_toml_str("[crashing]\novertime_options = [0.0, 600.0]\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn missing_file_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = EngineConfig::load_from(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

#[test]
fn s_curve_bucket_cap_must_be_positive() {
    let config = EngineConfig::from_toml_str("[schedule]\nmax_s_curve_buckets = 52\n").unwrap();
    assert_eq!(config.schedule.max_s_curve_buckets, 52);

    let err = EngineConfig::from_toml_str("[schedule]\nmax_s_curve_buckets = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("max_s_curve_buckets")));
}

//! Config Loading Tests
//!
//! TOML files on disk through to a running floor: partial files fall back to
//! defaults, validation reports every problem at once, and a bad model
//! directory keeps the floor from starting.

use cnc_twin::config::{ConfigError, ConfigSource, SweepMode, TwinConfig};
use cnc_twin::predictors::linear::RUL_MODEL_FILE;
use cnc_twin::twin::TwinError;
use cnc_twin::{Feature, ProductionFloor};
use std::io::Write;

fn write_config(body: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file
}

#[test]
fn partial_file_keeps_defaults() {
    let file = write_config(
        r#"
[simulation]
seconds_per_iteration = 60.0
sweep = "parallel"
seed = 9

[health]
failure_rul = 0.95
"#,
    );
    let config = TwinConfig::load_from_file(file.path()).unwrap();

    assert_eq!(config.simulation.seconds_per_iteration, 60.0);
    assert_eq!(config.simulation.revolutions_per_iteration, 15_000.0);
    assert_eq!(config.simulation.sweep, SweepMode::Parallel);
    assert_eq!(config.simulation.seed, Some(9));
    assert_eq!(config.health.failure_rul, 0.95);
    assert_eq!(config.health.critical_rul, 0.9);
    assert_eq!(config.calibration, TwinConfig::default().calibration);
}

#[test]
fn calibration_override_changes_sampling_interval() {
    let file = write_config(
        r#"
[calibration]
RMS = [0.2, 0.2]
"#,
    );
    let config = TwinConfig::load_from_file(file.path()).unwrap();
    let mut floor = ProductionFloor::from_config(&config).unwrap();
    let id = floor.add_new_machine(None);

    for bearing in floor.get_machine(id).unwrap().bearings() {
        assert_eq!(bearing.state().feature(Feature::Rms), 0.2);
    }
}

#[test]
fn validation_reports_every_problem() {
    let file = write_config(
        r#"
[simulation]
seconds_per_iteration = -1.0

[health]
warning_rul = 0.95

[calibration]
Temperature = [0.0, 1.0]
Kurtosis = [3.0, 2.0]
"#,
    );
    match TwinConfig::load_from_file(file.path()) {
        Err(ConfigError::Validation(errors)) => {
            assert_eq!(errors.len(), 4, "{errors:?}");
            assert!(errors.iter().any(|e| e.contains("seconds_per_iteration")));
            assert!(errors.iter().any(|e| e.contains("warning_rul")));
            assert!(errors.iter().any(|e| e.contains("Temperature")));
            assert!(errors.iter().any(|e| e.contains("Kurtosis")));
        }
        other => panic!("expected validation errors, got {other:?}"),
    }
}

#[test]
fn malformed_toml_is_a_parse_error_with_path() {
    let file = write_config("[simulation\nseed = ");
    let err = TwinConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(ref path, _) if path == file.path()));
}

#[test]
fn environment_file_wins_over_local_file() {
    let env_file = write_config("[simulation]\nseed = 1\n");
    let local_file = write_config("[simulation]\nseed = 2\n");

    let (config, source) =
        TwinConfig::resolve(Some(env_file.path().to_path_buf()), local_file.path());
    assert_eq!(config.simulation.seed, Some(1));
    assert_eq!(source, ConfigSource::EnvVar(env_file.path().to_path_buf()));
    assert!(source.to_string().starts_with("$CNC_TWIN_CONFIG"));
}

#[test]
fn missing_environment_file_falls_back_to_local_file() {
    let dir = tempfile::tempdir().unwrap();
    let local_file = write_config("[simulation]\nseed = 2\n");

    let (config, source) =
        TwinConfig::resolve(Some(dir.path().join("absent.toml")), local_file.path());
    assert_eq!(config.simulation.seed, Some(2));
    assert_eq!(source, ConfigSource::LocalFile(local_file.path().to_path_buf()));
}

#[test]
fn rejected_files_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let broken = write_config("[health]\nwarning_rul = 0.95\n");

    let (config, source) =
        TwinConfig::resolve(Some(broken.path().to_path_buf()), &dir.path().join("absent.toml"));
    assert_eq!(source, ConfigSource::Defaults);
    assert_eq!(source.path(), None);
    assert_eq!(config.health, TwinConfig::default().health);
}

#[test]
fn validation_error_lists_each_problem() {
    let err = TwinConfig::from_toml_str("[simulation]\nseconds_per_iteration = 0.0\ntick_interval_ms = 0\n")
        .unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("2 invalid twin config value(s)"), "{message}");
    assert!(message.contains("tick_interval_ms"));
}

#[test]
fn serialized_config_loads_back() {
    let mut config = TwinConfig::default();
    config.simulation.seed = Some(3);
    config.health.attention_rul = 0.6;
    let file = write_config(&config.to_toml().unwrap());

    let loaded = TwinConfig::load_from_file(file.path()).unwrap();
    assert_eq!(loaded.simulation.seed, Some(3));
    assert_eq!(loaded.health, config.health);
}

#[test]
fn missing_models_keep_floor_from_starting() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("degradation")).unwrap();
    std::fs::write(dir.path().join(RUL_MODEL_FILE), "bias = 0.1\n").unwrap();

    let mut config = TwinConfig::default();
    config.predictors.model_dir = Some(dir.path().to_path_buf());

    match ProductionFloor::from_config(&config) {
        Err(TwinError::PredictorUnavailable(source)) => {
            assert!(source.to_string().contains("RMS"));
        }
        other => panic!("expected PredictorUnavailable, got {other:?}"),
    }
}

#[test]
fn invalid_config_is_rejected_by_the_floor() {
    let mut config = TwinConfig::default();
    config.health.fair_rul = f64::NAN;
    assert!(matches!(
        ProductionFloor::from_config(&config),
        Err(TwinError::InvalidConfiguration(ConfigError::Validation(_)))
    ));
}

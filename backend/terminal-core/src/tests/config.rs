use crate::config::{
    CONFIG_FILE_NAME, ENV_BACKEND, ENV_CONSOLE, ENV_HW_MULT, ENV_PORT, EmulatorConfig,
};
use crate::error::config::ConfigError;

use std::collections::HashMap;

use tempfile::TempDir;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| env.get(name).cloned()
}

#[test]
fn given_missing_config_file_when_loading_then_returns_defaults() {
    let dir = TempDir::new().unwrap();

    let config = EmulatorConfig::load(dir.path()).unwrap();

    assert_eq!(config, EmulatorConfig::default());
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.path, "/ws");
    assert_eq!(config.server.bind_address, "0.0.0.0");
    assert!(config.backend.address.is_none());
    assert!(config.console.enabled);
}

/// **VALUE**: Verifies that save and load agree, so operator edits survive a restart.
///
/// **BUG THIS CATCHES**: Would catch a field added without `#[serde(default)]` or a save
/// that leaves only the temporary file behind.
#[test]
fn given_saved_config_when_loading_then_values_round_trip() {
    // GIVEN: A non-default config saved to disk
    let dir = TempDir::new().unwrap();
    let mut config = EmulatorConfig::default();
    config.server.port = 9191;
    config.backend.address = Some("backend.example:443".to_string());
    config.hardware.business_multiplier = 0.5;
    config.save(dir.path()).unwrap();

    // WHEN: Loading it back
    let loaded = EmulatorConfig::load(dir.path()).unwrap();

    // THEN: Same values, and no temp file left over
    assert_eq!(loaded, config);
    assert!(!dir.path().join(format!("{CONFIG_FILE_NAME}.tmp")).exists());
}

#[test]
fn given_partial_config_file_when_loading_then_missing_sections_default() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"{"server": {"port": 9000}}"#,
    )
    .unwrap();

    let config = EmulatorConfig::load(dir.path()).unwrap();

    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.path, "/ws");
    assert_eq!(config.hardware.business_multiplier, 1.0);
}

#[test]
fn given_corrupt_config_file_when_loading_then_returns_parse_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{ nope").unwrap();

    let result = EmulatorConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn given_out_of_range_multiplier_when_validating_then_rejected() {
    let mut config = EmulatorConfig::default();
    config.hardware.business_multiplier = 11.0;

    let result = config.validate();

    match result {
        Err(ConfigError::ValidationError { reason, .. }) => {
            assert!(reason.contains("multiplier"), "{reason}");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn given_relative_path_when_validating_then_rejected() {
    let mut config = EmulatorConfig::default();
    config.server.path = "ws".to_string();

    assert!(config.validate().is_err());
}

/// **VALUE**: Verifies environment overrides without touching the process environment.
#[test]
fn given_env_overrides_when_applied_then_replace_file_values() {
    let mut config = EmulatorConfig::default();

    config
        .apply_overrides(lookup(&[
            (ENV_PORT, "9443"),
            (ENV_BACKEND, "https://backend.local:8443"),
            (ENV_HW_MULT, "0"),
            (ENV_CONSOLE, "off"),
        ]))
        .unwrap();

    assert_eq!(config.server.port, 9443);
    assert_eq!(config.backend.address.as_deref(), Some("https://backend.local:8443"));
    assert_eq!(config.hardware.business_multiplier, 0.0);
    assert!(!config.console.enabled);
}

#[test]
fn given_empty_backend_override_when_applied_then_falls_back_to_mock() {
    let mut config = EmulatorConfig::default();
    config.backend.address = Some("backend:443".to_string());

    config.apply_overrides(lookup(&[(ENV_BACKEND, "")])).unwrap();

    assert!(config.backend.address.is_none());
}

#[test]
fn given_non_numeric_port_override_when_applied_then_returns_override_error() {
    let mut config = EmulatorConfig::default();

    let result = config.apply_overrides(lookup(&[(ENV_PORT, "eighty")]));

    match result {
        Err(ConfigError::OverrideError { variable, value, .. }) => {
            assert_eq!(variable, ENV_PORT);
            assert_eq!(value, "eighty");
        }
        other => panic!("expected override error, got {other:?}"),
    }
}

use crate::error::EmulatorError;

use terminal_core::config::EmulatorConfig;

/// **VALUE**: Verifies config failures surface unchanged through the app error.
///
/// **BUG THIS CATCHES**: Would catch a wrapper that drops the original reason and
/// location, leaving the operator with a bare "startup failed".
#[test]
fn given_invalid_config_when_converted_then_message_preserved() {
    // GIVEN: A config validation failure
    let mut config = EmulatorConfig::default();
    config.server.port = 0;
    let config_error = config.validate().unwrap_err();
    let expected = config_error.to_string();

    // WHEN: Converting with `?`-style From
    let error: EmulatorError = config_error.into();

    // THEN: Display is transparent
    assert!(matches!(error, EmulatorError::Config(_)));
    assert_eq!(error.to_string(), expected);
}

#[test]
fn given_emulator_error_when_displayed_then_includes_location() {
    let error = EmulatorError::emulator("Test");
    let rendered = error.to_string();

    assert!(rendered.starts_with("Emulator Error: Test ["));
    assert!(rendered.contains("error.rs"));
}

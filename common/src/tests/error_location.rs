use crate::ErrorLocation;

use std::panic::Location;

#[track_caller]
fn capture() -> ErrorLocation {
    ErrorLocation::here()
}

/// **VALUE**: Verifies that `ErrorLocation::here()` records the caller of a
/// `#[track_caller]` helper rather than the helper itself.
///
/// **WHY THIS MATTERS**: Every error constructor in the workspace relies on this to point
/// at the failing call site. If it points at the constructor, all error locations are useless.
///
/// **BUG THIS CATCHES**: Would catch if `#[track_caller]` is dropped from `here()`.
#[test]
fn given_track_caller_helper_when_location_captured_then_points_at_call_site() {
    // GIVEN: The line we are about to call from
    let expected_line = line!() + 3;

    // WHEN: Capturing through a #[track_caller] helper
    let location = capture();

    // THEN: The recorded line is this test's line, in this file
    assert_eq!(location.line, expected_line);
    assert!(location.file.ends_with("error_location.rs"));
    assert!(location.column > 0);
}

#[test]
fn given_error_location_when_formatted_then_produces_bracketed_format() {
    let location = ErrorLocation::from(Location::caller());

    let formatted = location.to_string();

    assert!(formatted.starts_with('['), "Should start with bracket");
    assert!(formatted.ends_with(']'), "Should end with bracket");
    assert_eq!(formatted.matches(':').count(), 2, "file:line:column");
}

use crate::ErrorLocation;
use std::panic::Location;

/// **VALUE**: Verifies that `ErrorLocation::from()` captures file, line, and column.
///
/// **WHY THIS MATTERS**: Every error in the workspace embeds an `ErrorLocation`.
/// If capture breaks, all error messages lose their debugging value.
///
/// **BUG THIS CATCHES**: Would catch if `Location::caller()` stops being propagated
/// or the file path extraction breaks.
#[test]
fn given_location_caller_when_error_location_created_then_captures_file_line_column() {
    // GIVEN/WHEN: Creating ErrorLocation from the current position
    let location = ErrorLocation::from(Location::caller());

    // THEN: Should capture file, line, and column
    assert!(
        location.file.contains("error_location.rs"),
        "Should capture file path"
    );
    assert!(location.line > 0, "Should capture line number");
    assert!(location.column > 0, "Should capture column number");
}

#[track_caller]
fn capture_here() -> ErrorLocation {
    ErrorLocation::caller()
}

/// **VALUE**: Verifies that `ErrorLocation::caller()` reports the caller of a
/// `#[track_caller]` constructor rather than the constructor itself.
///
/// **BUG THIS CATCHES**: Would catch if `#[track_caller]` is dropped from `caller()`,
/// making every error point into the common crate.
#[test]
fn given_track_caller_helper_when_caller_used_then_reports_call_site() {
    // GIVEN: The line we call from
    let expected_line = line!() + 3;

    // WHEN: Capturing through a #[track_caller] helper
    let location = capture_here();

    // THEN: Should point at this test, not at the helper
    assert_eq!(location.line, expected_line);
    assert!(location.file.contains("error_location.rs"));
}

/// **VALUE**: Verifies the Display format `[file:line:column]`.
///
/// **WHY THIS MATTERS**: Error messages end with this suffix; log scrapers rely on it.
#[test]
fn given_error_location_when_formatted_then_produces_bracketed_format() {
    // GIVEN: An ErrorLocation
    let location = ErrorLocation::caller();

    // WHEN: Formatting as string
    let formatted = location.to_string();

    // THEN: Should produce "[file:line:column]"
    assert!(formatted.starts_with('['), "Should start with '['");
    assert!(formatted.ends_with(']'), "Should end with ']'");
    assert_eq!(formatted.matches(':').count(), 2, "Should have two separators");
    assert!(formatted.contains(&location.line.to_string()));
}

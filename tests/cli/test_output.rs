//! Tests for CLI output formatting helpers
//!
//! Tests the output formatting utilities:
//! - Truncation of long field values
//! - Color helpers (respects NO_COLOR)
//! - Print helpers

use doctext::cli::output::{colors, print_header, print_output, print_warning, truncate};
use doctext::cli::OutputFormat;
use serde_json::json;

// =============================================================================
// truncate tests
// =============================================================================

/// Test truncation boundaries
#[test]
fn test_truncate_boundaries() {
    assert_eq!(truncate("", 5), "");
    assert_eq!(truncate("exact", 5), "exact");
    assert_eq!(truncate("longer", 5), "lo...");
    assert_eq!(truncate(&"x".repeat(150), 100).chars().count(), 100);
}

/// Test truncation of a serialized JSON value
#[test]
fn test_truncate_json_value() {
    let value = json!(["array", "of", "strings"]).to_string();
    assert_eq!(truncate(&value, 100), r#"["array","of","strings"]"#);
    assert!(truncate(&value, 10).ends_with("..."));
}

// =============================================================================
// Color helper tests
// Note: These test that colors don't break output, not visual appearance.
// The `colored` crate respects NO_COLOR env var automatically.
// =============================================================================

/// Test that color functions keep their text
#[test]
fn test_colors_return_valid_strings() {
    colored::control::set_override(false);

    assert_eq!(colors::label("test").to_string(), "test");
    assert_eq!(colors::collection("posts").to_string(), "posts");
    assert_eq!(colors::id("5f00").to_string(), "5f00");
    assert_eq!(colors::number("42").to_string(), "42");
    assert_eq!(colors::warning("caution").to_string(), "caution");
    assert_eq!(colors::dim("(score: 1.00)").to_string(), "(score: 1.00)");
    assert_eq!(colors::rank("1").to_string(), "1");

    colored::control::unset_override();
}

/// Test print helpers don't panic
#[test]
fn test_print_helpers() {
    print_header("Command:");
    print_warning("something to note");
    print_output(&json!({"text": "posts"}), OutputFormat::Json);
    print_output(&json!({"text": "posts"}), OutputFormat::Human);
}

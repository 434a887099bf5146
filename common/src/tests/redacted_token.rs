use crate::RedactedToken;

/// **VALUE**: Verifies that Debug and Display never leak the token.
///
/// **WHY THIS MATTERS**: The token is the only thing standing between a local
/// process and arbitrary code execution inside the host. It must not end up in
/// log files through `{:?}` on some struct that happens to hold it.
///
/// **BUG THIS CATCHES**: Would catch a derived `Debug` replacing the manual impl.
#[test]
fn given_token_when_formatted_then_value_is_redacted() {
    // GIVEN: A token
    let token = RedactedToken::new("super-secret-token");

    // WHEN: Formatting it both ways
    let debug = format!("{token:?}");
    let display = format!("{token}");

    // THEN: Neither contains the secret
    assert!(!debug.contains("super-secret-token"));
    assert!(!display.contains("super-secret-token"));
    assert!(debug.contains("REDACTED"));
}

#[test]
fn given_token_when_matching_then_only_exact_value_matches() {
    let token = RedactedToken::new("abc123");

    assert!(token.matches("abc123"));
    assert!(!token.matches("abc124"));
    assert!(!token.matches("abc12"));
    assert!(!token.matches(""));
}

#[test]
fn given_token_when_hint_requested_then_shows_only_prefix() {
    let token = RedactedToken::new("abcdefgh");

    assert_eq!(token.hint(), "abcd…");
    assert_eq!(token.len(), 8);
    assert!(!token.is_empty());
}

/// **VALUE**: Verifies that serde serialization is refused.
///
/// **BUG THIS CATCHES**: Would catch someone adding `#[derive(Serialize)]` to a
/// struct holding the token and shipping it over the wire by accident.
#[test]
fn given_token_when_serialized_then_fails() {
    let token = RedactedToken::new("secret");

    let result = serde_json::to_string(&token);

    assert!(result.is_err(), "Serializing a RedactedToken must fail");
}

/// **VALUE**: Verifies that candidates sharing a prefix with the token are
/// rejected whichever side is longer.
///
/// **BUG THIS CATCHES**: Would catch a comparison that only walks the shorter
/// of the two byte strings and accepts a truncated or padded token.
#[test]
fn given_token_when_candidate_shares_prefix_then_does_not_match() {
    // GIVEN: A token
    let token = RedactedToken::new("0f1e2d3c");

    // WHEN / THEN: Prefixes and extensions are both rejected
    assert!(!token.matches("0f1e2d3"));
    assert!(!token.matches("0f1e2d3c4"));
    assert!(token.matches("0f1e2d3c"));
}

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn recursion_message_names_callee() {
    let err = recursion_detected("fact");
    assert_eq!(err.message, "Recursion detected calling function 'fact'");
    assert!(matches!(err.kind, EvalErrorKind::Recursion { .. }));
}

#[test]
fn assertion_message_quotes_user_text() {
    let err = assertion_failed("(x > 0)", Some("x must be positive"));
    assert_eq!(
        err.message,
        "Assertion '(x > 0)' failed: \"x must be positive\""
    );
    let bare = assertion_failed("false", None);
    assert_eq!(bare.message, "Assertion 'false' failed");
}

#[test]
fn loop_counter_message() {
    assert_eq!(
        loop_counter_exceeded().to_string(),
        "for loop counter exceeded limit"
    );
}

#[test]
fn first_location_wins() {
    let first = Location::line(None, 3);
    let err = EvalError::new("boom")
        .with_location(first.clone())
        .with_location(Location::line(None, 9));
    assert_eq!(err.location, first);
    assert_eq!(err.to_string(), "boom line 3");
}

#[test]
fn timer_errors_are_session_fatal() {
    let err: EvalError = TimerError::UnknownId(7).into();
    assert!(err.is_session_fatal());
    assert!(!hard_warning("w").is_session_fatal());
}

#[test]
fn stack_exhaustion_converts() {
    let err: EvalError = StackExhausted {
        remaining: 10,
        red_zone: 20,
    }
    .into();
    assert!(matches!(err.kind, EvalErrorKind::StackExhausted(_)));
}

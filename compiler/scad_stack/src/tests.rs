use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_check_stack_passes_with_small_red_zone() {
    assert_eq!(check_stack(1), Ok(()));
}

#[test]
fn test_check_stack_trips_with_huge_red_zone() {
    let Some(remaining) = remaining_stack() else {
        return;
    };
    let err = check_stack(usize::MAX).unwrap_err();
    assert_eq!(err.red_zone, usize::MAX);
    assert!(err.remaining <= remaining + 4096);
}

#[test]
fn test_guarded_recursion_stops_before_overflow() {
    fn descend(depth: usize) -> Result<usize, StackExhausted> {
        check_stack(DEFAULT_RED_ZONE)?;
        let padding = [0u8; 512];
        let next = descend(depth + 1)?;
        Ok(next + usize::from(padding[depth % 512]))
    }

    if remaining_stack().is_none() {
        return;
    }
    assert!(descend(0).is_err());
}

#[test]
fn test_deep_recursion_with_growth() {
    fn deep_recurse(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { deep_recurse(n - 1) + 1 })
    }

    assert_eq!(deep_recurse(100_000), 100_000);
}

#[test]
fn test_error_message() {
    let err = StackExhausted {
        remaining: 10,
        red_zone: 20,
    };
    assert_eq!(
        err.to_string(),
        "native stack exhausted (10 bytes left, 20 bytes required)"
    );
}

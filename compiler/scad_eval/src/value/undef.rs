//! The undefined value and its reasons.

use std::cell::Cell;

/// Payload of `undef`.
///
/// Operators that fail produce an `undef` carrying the reason, with later
/// context appended (`"in vector comparison at index 2"`). The first time
/// the value is checked the reasons are reported as one warning; copies
/// made afterwards do not report again.
#[derive(Clone, Debug, Default)]
pub struct UndefType {
    reasons: Vec<String>,
    reported: Cell<bool>,
}

impl UndefType {
    pub fn new() -> Self {
        UndefType::default()
    }

    pub fn with_reason(reason: impl Into<String>) -> Self {
        UndefType {
            reasons: vec![reason.into()],
            reported: Cell::new(false),
        }
    }

    /// Add context to the reason chain.
    pub fn append(&mut self, reason: impl Into<String>) {
        self.reasons.push(reason.into());
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    /// Whether this value still carries reasons nobody has reported.
    pub fn is_unchecked(&self) -> bool {
        !self.reasons.is_empty() && !self.reported.get()
    }

    /// Reasons joined for a warning, once. Later calls return `None`.
    pub fn take_report(&self) -> Option<String> {
        if !self.is_unchecked() {
            return None;
        }
        self.reported.set(true);
        Some(self.reasons.join("\n\t"))
    }
}

//! Error types for evaluation.
//!
//! Soft problems (unknown names, type-mismatched operators, bad indices)
//! never become an [`EvalError`]: they are reported as warnings and
//! evaluate to `undef`. An `EvalError` aborts the current evaluation and
//! unwinds to the caller.
//!
//! # Structured Error Categories
//!
//! [`EvalErrorKind`] carries the typed category. Factory functions
//! (`recursion_detected()`, `assertion_failed()`, ...) populate both the
//! kind and the message.

use std::fmt;

use scad_ir::Location;
use scad_stack::StackExhausted;

use crate::diagnostics::MessageGroup;
use crate::session::EvaluationSession;
use crate::timers::TimerError;
use crate::value::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// The tail-call loop crossed the recursion limit.
    Recursion { name: String },
    /// A C-style `for` comprehension crossed the loop limit.
    LoopCounter,
    /// The native stack guard tripped.
    StackExhausted(StackExhausted),
    AssertionFailed { message: String },
    /// A warning escalated by "stop on first warning".
    HardWarning { message: String },
    /// Misuse of the timer API. Never recovered from.
    Timer(TimerError),
    Custom { message: String },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recursion { name } => write!(f, "Recursion detected calling function '{name}'"),
            Self::LoopCounter => f.write_str("for loop counter exceeded limit"),
            Self::StackExhausted(_) => f.write_str("Recursion detected: native stack exhausted"),
            Self::AssertionFailed { message } => write!(f, "Assertion {message}"),
            Self::HardWarning { message } => write!(f, "{message}"),
            Self::Timer(err) => write!(f, "{err}"),
            Self::Custom { message } => f.write_str(message),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()` for factory
    /// created errors.
    pub message: String,
    /// Where the error was raised.
    pub location: Location,
    /// Remaining number of `TRACE` entries unwinding frames may log.
    pub trace_depth: u32,
    /// Secondary information attached while unwinding.
    pub notes: Vec<String>,
}

impl EvalError {
    /// Create an error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::from_kind(EvalErrorKind::Custom { message })
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError {
            kind,
            message,
            location: Location::NONE,
            trace_depth: 0,
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        if self.location.is_none() {
            self.location = location;
        }
        self
    }

    #[must_use]
    pub fn with_trace_depth(mut self, depth: u32) -> Self {
        self.trace_depth = depth;
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Errors that indicate a caller bug rather than a script problem.
    pub fn is_session_fatal(&self) -> bool {
        matches!(self.kind, EvalErrorKind::Timer(_))
    }

    /// Log one `TRACE` entry for an unwinding frame, if budget remains.
    pub fn trace(&mut self, session: &EvaluationSession, message: &str, location: &Location) {
        if self.trace_depth > 0 {
            session.log(MessageGroup::Trace, location.clone(), message);
            self.trace_depth -= 1;
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if !self.location.is_none() {
            write!(f, " {}", self.location)?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

impl From<TimerError> for EvalError {
    fn from(err: TimerError) -> Self {
        EvalError::from_kind(EvalErrorKind::Timer(err))
    }
}

impl From<StackExhausted> for EvalError {
    fn from(err: StackExhausted) -> Self {
        EvalError::from_kind(EvalErrorKind::StackExhausted(err))
    }
}

// Factories

#[cold]
pub fn recursion_detected(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Recursion {
        name: name.to_owned(),
    })
}

#[cold]
pub fn loop_counter_exceeded() -> EvalError {
    EvalError::from_kind(EvalErrorKind::LoopCounter)
}

/// `expr` is the printed condition, `message` the optional user text.
#[cold]
pub fn assertion_failed(expr: &str, message: Option<&str>) -> EvalError {
    let message = match message {
        Some(text) => format!("'{expr}' failed: \"{text}\""),
        None => format!("'{expr}' failed"),
    };
    EvalError::from_kind(EvalErrorKind::AssertionFailed { message })
}

#[cold]
pub fn hard_warning(message: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::HardWarning {
        message: message.to_owned(),
    })
}

#[cfg(test)]
mod tests;

//! Diagnostic messages reported during evaluation.
//!
//! Messages go two ways: as `tracing` events (for whoever installed a
//! subscriber) and through the session's print handler in the user-facing
//! `GROUP: text, location` format.

use std::fmt;
use std::sync::Once;

use scad_ir::Location;

/// Category of a diagnostic message.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MessageGroup {
    Warning,
    Deprecated,
    Echo,
    Trace,
    Error,
}

impl MessageGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageGroup::Warning => "WARNING",
            MessageGroup::Deprecated => "DEPRECATED",
            MessageGroup::Echo => "ECHO",
            MessageGroup::Trace => "TRACE",
            MessageGroup::Error => "ERROR",
        }
    }

    /// Whether "stop on first warning" escalates this group.
    pub fn is_warning(self) -> bool {
        matches!(self, MessageGroup::Warning | MessageGroup::Deprecated)
    }
}

/// One reported message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub group: MessageGroup,
    pub text: String,
    pub location: Location,
}

impl Message {
    pub fn new(group: MessageGroup, text: impl Into<String>, location: Location) -> Self {
        Message {
            group,
            text: text.into(),
            location,
        }
    }

    /// Forward the message to `tracing` at a level matching its group.
    pub(crate) fn emit_event(&self) {
        let location = &self.location;
        match self.group {
            MessageGroup::Warning | MessageGroup::Deprecated => {
                tracing::warn!(group = self.group.as_str(), %location, "{}", self.text);
            }
            MessageGroup::Echo => tracing::info!(%location, "{}", self.text),
            MessageGroup::Trace => tracing::debug!(%location, "{}", self.text),
            MessageGroup::Error => tracing::error!(%location, "{}", self.text),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.group.as_str(), self.text)?;
        if !self.location.is_none() {
            write!(f, " {}", self.location)?;
        }
        Ok(())
    }
}

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber driven by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset, and only ever runs once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

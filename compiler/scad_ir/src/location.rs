//! Source locations.
//!
//! The evaluator only uses locations for diagnostics, so they carry the
//! file path plus a line/column span rather than byte offsets.

use std::fmt;
use std::rc::Rc;

/// A region of a source file.
#[derive(Clone, Eq, PartialEq, Hash, Default)]
pub struct Location {
    /// Path of the file this location points into, if any.
    pub file: Option<Rc<str>>,
    pub first_line: u32,
    pub first_column: u32,
    pub last_line: u32,
    pub last_column: u32,
}

impl Location {
    /// Location for synthesized nodes and messages with no source.
    pub const NONE: Location = Location {
        file: None,
        first_line: 0,
        first_column: 0,
        last_line: 0,
        last_column: 0,
    };

    /// Create a location spanning `(first_line, first_column)` to
    /// `(last_line, last_column)` in `file`.
    pub fn new(
        file: Option<Rc<str>>,
        first_line: u32,
        first_column: u32,
        last_line: u32,
        last_column: u32,
    ) -> Self {
        Location {
            file,
            first_line,
            first_column,
            last_line,
            last_column,
        }
    }

    /// Single-line location, handy for synthesized trees.
    pub fn line(file: Option<Rc<str>>, line: u32) -> Self {
        Location::new(file, line, 0, line, 0)
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        self.first_line == 0 && self.file.is_none()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return Ok(());
        }
        match &self.file {
            Some(file) => write!(f, "in file {file}, line {}", self.first_line),
            None => write!(f, "line {}", self.first_line),
        }
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}-{}:{}",
            self.file.as_deref().unwrap_or("<none>"),
            self.first_line,
            self.first_column,
            self.last_line,
            self.last_column
        )
    }
}

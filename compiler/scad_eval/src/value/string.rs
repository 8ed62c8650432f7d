//! Strings indexed by grapheme.

use std::fmt;
use std::rc::Rc;

use unicode_segmentation::UnicodeSegmentation;

/// Immutable UTF-8 string. Length and indexing count user-perceived
/// characters (extended grapheme clusters), not bytes.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StrType(Rc<str>);

impl StrType {
    pub fn new(s: impl Into<Rc<str>>) -> Self {
        StrType(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of graphemes.
    pub fn grapheme_count(&self) -> usize {
        self.0.graphemes(true).count()
    }

    /// The grapheme at `index`, if any.
    pub fn grapheme(&self, index: usize) -> Option<&str> {
        self.0.graphemes(true).nth(index)
    }

    pub fn graphemes(&self) -> impl Iterator<Item = &str> {
        self.0.graphemes(true)
    }
}

impl fmt::Display for StrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for StrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl From<&str> for StrType {
    fn from(s: &str) -> Self {
        StrType(s.into())
    }
}

impl From<String> for StrType {
    fn from(s: String) -> Self {
        StrType(s.into())
    }
}

impl From<Rc<str>> for StrType {
    fn from(s: Rc<str>) -> Self {
        StrType(s)
    }
}

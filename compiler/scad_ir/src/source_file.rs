//! Parsed source files.

use std::rc::Rc;

use crate::ast::Scope;

/// A parsed file: its top-level block plus the libraries it pulls in with
/// `use <path>`.
///
/// Library paths are resolved by the evaluation session's source-file
/// cache; a library that was never registered is silently skipped.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceFile {
    pub path: Rc<str>,
    pub scope: Rc<Scope>,
    used_libraries: Vec<Rc<str>>,
}

impl SourceFile {
    pub fn new(path: impl Into<Rc<str>>, scope: Scope) -> Self {
        SourceFile {
            path: path.into(),
            scope: Rc::new(scope),
            used_libraries: Vec::new(),
        }
    }

    /// Record `use <path>`. Repeated uses of one path are kept once.
    pub fn register_use(&mut self, path: impl Into<Rc<str>>) {
        let path = path.into();
        if !self.used_libraries.contains(&path) {
            self.used_libraries.push(path);
        }
    }

    /// Builder-style [`SourceFile::register_use`].
    #[must_use]
    pub fn with_use(mut self, path: impl Into<Rc<str>>) -> Self {
        self.register_use(path);
        self
    }

    /// Used libraries, most recently registered first. Later `use`
    /// statements shadow earlier ones.
    pub fn used_libraries_newest_first(&self) -> impl Iterator<Item = &Rc<str>> {
        self.used_libraries.iter().rev()
    }
}

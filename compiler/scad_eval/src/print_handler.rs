//! Output sink for session diagnostics.
//!
//! Every message the session reports (warnings, deprecations, `echo`
//! output, call traces) is written through one of these handlers:
//! - Stdout: the default for command-line use
//! - Buffer: captures output for tests and embedders
//! - Silent: discards output, leaving only the tracing events
//!
//! Enum dispatch keeps the hot `println` path free of vtable calls.

use std::rc::Rc;

use parking_lot::Mutex;

use crate::config::PrintTarget;

/// Handler that writes to stdout.
#[derive(Default)]
pub struct StdoutPrintHandler;

impl StdoutPrintHandler {
    pub fn println(&self, msg: &str) {
        println!("{msg}");
    }

    /// Stdout does not capture, so this is always empty.
    pub fn get_output(&self) -> String {
        String::new()
    }
}

/// Handler that captures output to a buffer.
pub struct BufferPrintHandler {
    buffer: Mutex<String>,
}

impl BufferPrintHandler {
    pub fn new() -> Self {
        BufferPrintHandler {
            buffer: Mutex::new(String::new()),
        }
    }

    pub fn println(&self, msg: &str) {
        let mut buf = self.buffer.lock();
        buf.push_str(msg);
        buf.push('\n');
    }

    pub fn get_output(&self) -> String {
        self.buffer.lock().clone()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Default for BufferPrintHandler {
    fn default() -> Self {
        Self::new()
    }
}

pub enum PrintHandlerImpl {
    Stdout(StdoutPrintHandler),
    Buffer(BufferPrintHandler),
    Silent,
}

impl PrintHandlerImpl {
    pub fn println(&self, msg: &str) {
        match self {
            Self::Stdout(h) => h.println(msg),
            Self::Buffer(h) => h.println(msg),
            Self::Silent => {}
        }
    }

    /// Everything captured so far. Empty for handlers that don't capture.
    pub fn get_output(&self) -> String {
        match self {
            Self::Stdout(h) => h.get_output(),
            Self::Buffer(h) => h.get_output(),
            Self::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        match self {
            Self::Buffer(h) => h.clear(),
            Self::Stdout(_) | Self::Silent => {}
        }
    }
}

/// Print handler shared between a session and its embedder.
pub type SharedPrintHandler = Rc<PrintHandlerImpl>;

pub fn stdout_handler() -> SharedPrintHandler {
    Rc::new(PrintHandlerImpl::Stdout(StdoutPrintHandler))
}

pub fn buffer_handler() -> SharedPrintHandler {
    Rc::new(PrintHandlerImpl::Buffer(BufferPrintHandler::new()))
}

pub fn silent_handler() -> SharedPrintHandler {
    Rc::new(PrintHandlerImpl::Silent)
}

/// Handler for a configured [`PrintTarget`].
pub fn handler_for(target: PrintTarget) -> SharedPrintHandler {
    match target {
        PrintTarget::Stdout => stdout_handler(),
        PrintTarget::Buffer => buffer_handler(),
        PrintTarget::Silent => silent_handler(),
    }
}

#[cfg(test)]
mod tests;

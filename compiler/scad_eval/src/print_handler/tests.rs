use super::*;
use pretty_assertions::assert_eq;

#[test]
fn buffer_handler_println_captures_with_newline() {
    let handler = BufferPrintHandler::new();
    handler.println("WARNING: x");
    assert_eq!(handler.get_output(), "WARNING: x\n");
}

#[test]
fn buffer_handler_clear_empties_buffer() {
    let handler = BufferPrintHandler::new();
    handler.println("ECHO: 1");
    assert!(!handler.get_output().is_empty());
    handler.clear();
    assert!(handler.get_output().is_empty());
}

#[test]
fn stdout_handler_get_output_returns_empty() {
    assert_eq!(StdoutPrintHandler.get_output(), "");
}

#[test]
fn silent_handler_discards_output() {
    let handler = silent_handler();
    handler.println("hello");
    assert_eq!(handler.get_output(), "");
}

#[test]
fn handler_for_buffer_target_captures() {
    let handler = handler_for(PrintTarget::Buffer);
    handler.println("one");
    handler.println("two");
    assert_eq!(handler.get_output(), "one\ntwo\n");
    handler.clear();
    assert_eq!(handler.get_output(), "");
}

//! Host IO capability: program output and line input.
//!
//! Output and input are injectable per interpreter instance:
//! - `Stdout`: writes stdout, prompts on stdin (native default)
//! - `Buffer`: captures output and serves scripted input (tests, embedding)
//! - `Silent`: discards output, has no input
//!
//! Enum dispatch rather than a trait object keeps this frequently-hit path
//! static.

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// IO handler that talks to the real terminal.
#[derive(Default)]
pub struct StdoutIo;

impl StdoutIo {
    pub fn visible(&self, msg: &str) {
        println!("{msg}");
    }

    /// Prompt on stdout, read one line from stdin. `None` on EOF or a read
    /// failure.
    pub fn prompt(&self, message: &str) -> Option<String> {
        if !message.is_empty() {
            print!("{message}");
            let _ = std::io::stdout().flush();
        }
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                Some(line)
            }
        }
    }
}

/// IO handler that captures output and serves pre-queued input lines.
pub struct BufferIo {
    output: Mutex<String>,
    input: Mutex<VecDeque<String>>,
}

impl BufferIo {
    pub fn new() -> Self {
        BufferIo {
            output: Mutex::new(String::new()),
            input: Mutex::new(VecDeque::new()),
        }
    }

    pub fn visible(&self, msg: &str) {
        let mut out = self.output.lock();
        out.push_str(msg);
        out.push('\n');
    }

    /// Serve the next scripted input line; `None` once the queue is empty.
    pub fn prompt(&self, _message: &str) -> Option<String> {
        self.input.lock().pop_front()
    }

    /// Queue a line for a future prompt.
    pub fn push_input(&self, line: impl Into<String>) {
        self.input.lock().push_back(line.into());
    }

    /// All captured output so far.
    pub fn output(&self) -> String {
        self.output.lock().clone()
    }

    pub fn clear(&self) {
        self.output.lock().clear();
    }
}

impl Default for BufferIo {
    fn default() -> Self {
        BufferIo::new()
    }
}

/// The injectable IO capability, one variant per destination.
pub enum IoHandlerImpl {
    Stdout(StdoutIo),
    Buffer(BufferIo),
    Silent,
}

impl IoHandlerImpl {
    pub fn visible(&self, msg: &str) {
        match self {
            IoHandlerImpl::Stdout(io) => io.visible(msg),
            IoHandlerImpl::Buffer(io) => io.visible(msg),
            IoHandlerImpl::Silent => {}
        }
    }

    pub fn prompt(&self, message: &str) -> Option<String> {
        match self {
            IoHandlerImpl::Stdout(io) => io.prompt(message),
            IoHandlerImpl::Buffer(io) => io.prompt(message),
            IoHandlerImpl::Silent => None,
        }
    }

    /// Captured output, for handlers that capture; empty otherwise.
    pub fn output(&self) -> String {
        match self {
            IoHandlerImpl::Buffer(io) => io.output(),
            IoHandlerImpl::Stdout(_) | IoHandlerImpl::Silent => String::new(),
        }
    }

    /// Queue a scripted input line, for handlers that take one.
    pub fn push_input(&self, line: impl Into<String>) {
        if let IoHandlerImpl::Buffer(io) = self {
            io.push_input(line);
        }
    }
}

/// Shared handle to an IO capability.
pub type SharedIo = Arc<IoHandlerImpl>;

/// Terminal-backed IO (the default).
pub fn stdout_io() -> SharedIo {
    Arc::new(IoHandlerImpl::Stdout(StdoutIo))
}

/// Capturing IO with scripted input.
pub fn buffer_io() -> SharedIo {
    Arc::new(IoHandlerImpl::Buffer(BufferIo::new()))
}

/// IO that discards everything.
pub fn silent_io() -> SharedIo {
    Arc::new(IoHandlerImpl::Silent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn buffer_captures_lines() {
        let io = BufferIo::new();
        io.visible("HAI");
        io.visible("KTHXBYE");
        assert_eq!(io.output(), "HAI\nKTHXBYE\n");
        io.clear();
        assert_eq!(io.output(), "");
    }

    #[test]
    fn buffer_serves_scripted_input_in_order() {
        let io = BufferIo::new();
        io.push_input("first");
        io.push_input("second");
        assert_eq!(io.prompt(""), Some("first".to_string()));
        assert_eq!(io.prompt(""), Some("second".to_string()));
        assert_eq!(io.prompt(""), None);
    }

    #[test]
    fn silent_discards_and_has_no_input() {
        let io = silent_io();
        io.visible("dropped");
        assert_eq!(io.output(), "");
        assert_eq!(io.prompt("?"), None);
    }

    #[test]
    fn handle_push_input_reaches_buffer() {
        let io = buffer_io();
        io.push_input("42");
        assert_eq!(io.prompt(""), Some("42".to_string()));
    }
}

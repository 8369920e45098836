//! Builder-style construction of interpreter instances.

use std::time::Duration;

use crate::io::{stdout_io, SharedIo};
use crate::scope::{ScopeStack, SharedScope};
use crate::shared::Shared;
use crate::value::Value;

use super::{DoneCallback, Interpreter, PausedCallback, DEFAULT_SLICE};

/// Configures IO, callbacks, and the tick slice before building an
/// [`Interpreter`].
pub struct InterpreterBuilder {
    io: SharedIo,
    slice: Duration,
    on_done: Option<DoneCallback>,
    on_paused: Option<PausedCallback>,
    scope: Option<SharedScope>,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        InterpreterBuilder {
            io: stdout_io(),
            slice: DEFAULT_SLICE,
            on_done: None,
            on_paused: None,
            scope: None,
        }
    }

    /// Replace the IO capability.
    #[must_use]
    pub fn io(mut self, io: SharedIo) -> Self {
        self.io = io;
        self
    }

    /// Wall-clock budget of a single `tick`.
    #[must_use]
    pub fn slice(mut self, slice: Duration) -> Self {
        self.slice = slice;
        self
    }

    /// Completion callback; fires exactly once per `evaluate` run.
    #[must_use]
    pub fn on_done(mut self, f: impl FnMut(&Value) + 'static) -> Self {
        self.on_done = Some(Box::new(f));
        self
    }

    /// Pause callback; fires on every breakpoint, host pause, and error.
    #[must_use]
    pub fn on_paused(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_paused = Some(Box::new(f));
        self
    }

    /// Alias an existing scope chain instead of creating one. Used by the
    /// watch-expression sandbox.
    #[must_use]
    pub(crate) fn shared_scope(mut self, scope: SharedScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn build(self) -> Interpreter {
        let aliased = self.scope.is_some();
        let scope = self.scope.unwrap_or_else(|| Shared::new(ScopeStack::new()));
        let mut interpreter = Interpreter {
            program: None,
            scope,
            work: Vec::new(),
            io: self.io,
            errors: Vec::new(),
            paused: false,
            finished: false,
            outcome: None,
            current: None,
            slice: self.slice,
            on_done: self.on_done,
            on_paused: self.on_paused,
        };
        // a fresh chain gets the root frame and its own builtin copy; an
        // aliased chain already has both
        if !aliased {
            interpreter.install_root_frame();
        }
        interpreter
    }
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        InterpreterBuilder::new()
    }
}

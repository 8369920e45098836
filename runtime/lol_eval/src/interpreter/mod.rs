//! The interpreter: scope, work scheduler, tick driver, and control surface.
//!
//! # Architecture
//!
//! Execution never recurses on the native call stack. Node handlers
//! (`dispatch.rs`) push batches of pending children onto an explicit LIFO
//! stack (`scheduler.rs`) and return; the tick driver in this module
//! advances that stack one node at a time inside wall-clock-bounded slices.
//! Everything the evaluation "is" — scope chain, batch stack, error log —
//! lives in the [`Interpreter`] value, which is what makes pausing after
//! any single sub-expression, resuming, and breakpoints possible.
//!
//! Driving is host-cooperative: [`Interpreter::tick`] returns
//! [`TickStatus::Yielded`] when its slice expires, and the host re-invokes
//! on its next turn. [`Interpreter::run`] is the synchronous convenience
//! loop. Exactly one batch is ever in flight; suspension points are between
//! steps, never inside a handler.

mod builder;
mod call;
mod dispatch;
mod scheduler;

pub use builder::InterpreterBuilder;

use std::rc::Rc;
use std::time::{Duration, Instant};

use lol_ir::{NodeId, Program, Span};

use crate::builtins::builtin_table;
use crate::errors::{not_implemented, EvalError, EvalResult};
use crate::io::SharedIo;
use crate::scope::{Frame, FrameTag, ScopeStack, SharedScope};
use crate::value::Value;

use scheduler::{Batch, BatchOptions, Continuation};

/// Outcome of one bounded driver slice.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickStatus {
    /// The program ran to completion (or there is nothing left to run).
    Completed,
    /// The slice expired with work remaining; call `tick` again.
    Yielded,
    /// Execution is paused (breakpoint or host request).
    Paused,
    /// A fatal error is on the log; only a fresh `evaluate` clears it.
    Errored,
}

/// Default wall-clock budget of a single `tick`.
pub const DEFAULT_SLICE: Duration = Duration::from_millis(200);

pub(crate) type DoneCallback = Box<dyn FnMut(&Value)>;
pub(crate) type PausedCallback = Box<dyn FnMut()>;

/// A suspendable tree-walking evaluator instance.
pub struct Interpreter {
    program: Option<Rc<Program>>,
    pub(crate) scope: SharedScope,
    pub(crate) work: Vec<Batch>,
    pub(crate) io: SharedIo,
    errors: Vec<EvalError>,
    paused: bool,
    finished: bool,
    outcome: Option<Value>,
    pub(crate) current: Option<Span>,
    slice: Duration,
    on_done: Option<DoneCallback>,
    on_paused: Option<PausedCallback>,
}

impl Interpreter {
    /// An interpreter with default IO (stdout/stdin) and no callbacks.
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    /// Discard all execution state and arm `program` for driving.
    ///
    /// The scope is rebuilt around a fresh copy of the builtin table and the
    /// error log is cleared. Any in-flight work from a previous run is gone,
    /// which is also what cancels a previous driver.
    pub fn evaluate(&mut self, program: Rc<Program>) {
        self.reset();
        tracing::debug!(nodes = program.arena.len(), "evaluation armed");
        self.arm(program);
    }

    fn arm(&mut self, program: Rc<Program>) {
        let root = program.root;
        self.program = Some(program);
        self.work.push(Batch::new(
            vec![root],
            Continuation::Finish,
            BatchOptions::default(),
        ));
    }

    fn reset(&mut self) {
        self.work.clear();
        self.errors.clear();
        self.paused = false;
        self.finished = false;
        self.outcome = None;
        self.current = None;
        self.program = None;
        *self.scope.borrow_mut() = ScopeStack::new();
        self.install_root_frame();
    }

    pub(crate) fn install_root_frame(&mut self) {
        self.scope
            .borrow_mut()
            .push(Frame::with_symbols(FrameTag::Program, builtin_table()));
    }

    /// One bounded driver slice.
    ///
    /// Advances until the program completes, pauses, errors, or the slice
    /// expires — whichever comes first.
    pub fn tick(&mut self) -> TickStatus {
        if !self.errors.is_empty() {
            return TickStatus::Errored;
        }
        if self.paused {
            return TickStatus::Paused;
        }
        if self.finished || self.work.is_empty() {
            return TickStatus::Completed;
        }
        let start = Instant::now();
        loop {
            self.step();
            if self.finished || self.paused || !self.errors.is_empty() {
                return self.status();
            }
            if start.elapsed() >= self.slice {
                tracing::trace!("tick slice expired");
                return TickStatus::Yielded;
            }
        }
    }

    /// Drive `tick` until it stops yielding.
    pub fn run(&mut self) -> TickStatus {
        loop {
            match self.tick() {
                TickStatus::Yielded => {}
                status => return status,
            }
        }
    }

    /// Arm `program` and drive it as far as it will go.
    pub fn run_program(&mut self, program: Rc<Program>) -> TickStatus {
        self.evaluate(program);
        self.run()
    }

    /// Advance by a single node evaluation. No-op while errors are pending.
    pub fn next(&mut self) -> TickStatus {
        if !self.errors.is_empty() {
            return TickStatus::Errored;
        }
        if self.finished || self.work.is_empty() {
            return TickStatus::Completed;
        }
        self.paused = false;
        self.step();
        self.status()
    }

    fn step(&mut self) {
        if let Err(err) = self.advance_one() {
            self.record_error(err);
        }
    }

    fn status(&self) -> TickStatus {
        if !self.errors.is_empty() {
            TickStatus::Errored
        } else if self.finished {
            TickStatus::Completed
        } else if self.paused {
            TickStatus::Paused
        } else {
            TickStatus::Yielded
        }
    }

    fn record_error(&mut self, err: EvalError) {
        let err = match (err.span, self.current) {
            (None, Some(span)) => err.with_span(span),
            _ => err,
        };
        tracing::debug!(error = %err, "evaluation error");
        self.errors.push(err);
        self.pause();
    }

    /// The whole batch stack has drained; latch the final value and notify.
    pub(crate) fn finish_program(&mut self, value: Value) -> bool {
        self.finished = true;
        self.current = None;
        tracing::debug!("evaluation complete");
        self.outcome = Some(value.clone());
        if let Some(done) = self.on_done.as_mut() {
            done(&value);
        }
        true
    }

    /// Halt between steps and fire the paused notification.
    pub fn pause(&mut self) {
        self.paused = true;
        if let Some(paused) = self.on_paused.as_mut() {
            paused();
        }
    }

    /// Halt without notifying.
    pub fn pause_silent(&mut self) {
        self.paused = true;
    }

    /// Clear a pause and drive the current batch stack onward.
    ///
    /// Nothing is replayed: state is the batch stack, and the driver picks
    /// up exactly where it stopped. Pending errors are not cleared, so
    /// resuming an errored run is a no-op.
    pub fn resume(&mut self) -> TickStatus {
        if !self.errors.is_empty() {
            return TickStatus::Errored;
        }
        self.paused = false;
        self.run()
    }

    /// The accumulated error log. Cleared only by `evaluate`.
    pub fn errors(&self) -> &[EvalError] {
        &self.errors
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Final value of the last completed run.
    pub fn result(&self) -> Option<&Value> {
        self.outcome.as_ref()
    }

    /// Source region of the node currently being evaluated, for editor
    /// highlighting.
    pub fn pos(&self) -> Option<Span> {
        self.current
    }

    /// The IO handler this instance writes and reads through.
    pub fn io(&self) -> &SharedIo {
        &self.io
    }

    pub(crate) fn program(&self) -> EvalResult<Rc<Program>> {
        self.program
            .clone()
            .ok_or_else(|| not_implemented("evaluation without a program"))
    }

    pub(crate) fn node_span(&self, id: NodeId) -> Span {
        self.program
            .as_ref()
            .and_then(|p| p.arena.get(id))
            .map_or_else(Span::default, |node| node.span)
    }

    // --- watch expressions ---

    /// Build a sandbox interpreter aliasing this instance's live scope chain
    /// and IO handler.
    ///
    /// Reads observe current program state; assignments write through to the
    /// running program — shared by reference, deliberately. The sandbox has
    /// its own batch stack and driver, so driving it leaves this instance's
    /// pause state alone. Do not drive both from genuinely parallel
    /// contexts.
    pub fn watch_sandbox(&self) -> Interpreter {
        InterpreterBuilder::new()
            .io(self.io.clone())
            .shared_scope(self.scope.clone())
            .build()
    }

    /// Evaluate a side expression against the live scope, to completion.
    ///
    /// Breakpoints in the watched tree are skipped over. On error, frames
    /// the sandbox pushed onto the shared chain are unwound before the
    /// error is returned.
    pub fn evaluate_watch(&self, program: Rc<Program>) -> Result<Value, EvalError> {
        let depth = self.scope.borrow().depth();
        let mut sandbox = self.watch_sandbox();
        sandbox.arm(program);
        loop {
            match sandbox.tick() {
                TickStatus::Yielded => {}
                TickStatus::Paused => sandbox.paused = false,
                TickStatus::Completed => {
                    return Ok(sandbox.outcome.take().unwrap_or(Value::Null));
                }
                TickStatus::Errored => {
                    self.scope.borrow_mut().truncate(depth);
                    return Err(sandbox
                        .errors
                        .first()
                        .cloned()
                        .unwrap_or_else(|| not_implemented("watch evaluation")));
                }
            }
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

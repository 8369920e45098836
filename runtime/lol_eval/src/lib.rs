//! Suspendable tree-walking evaluator for the lol runtime.
//!
//! This crate executes the syntax trees defined in `lol_ir`. The defining
//! property of the design is that evaluation is *interruptible*: instead of
//! recursing, node handlers push explicit batches of pending work, so the
//! driver can stop after any single sub-expression, report a position, honor
//! breakpoints, and hand control back to a single-threaded host between
//! bounded time slices.
//!
//! # Architecture
//!
//! - `scope`: stack of tagged frames with symbol lookup/assignment rules
//!   and frame-targeted control-flow specials
//! - `interpreter`: the batch scheduler, per-kind dispatch, tick driver,
//!   and the watch-expression sandbox
//! - `builtins`: host-native operations and the cast table, copied per
//!   instance
//! - `io`: injectable output/input capability
//! - `value` / `errors`: the runtime value model and typed fatal errors
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use lol_ir::{Literal, NodeArena, NodeKind, Program, Span};
//! use lol_eval::{buffer_io, Interpreter, TickStatus, Value};
//!
//! let mut arena = NodeArena::new();
//! let root = arena.alloc(
//!     NodeKind::Literal { value: Literal::Number(6.0) },
//!     Span::default(),
//! );
//! let program = Rc::new(Program::new(arena, root));
//!
//! let mut interp = Interpreter::builder().io(buffer_io()).build();
//! assert_eq!(interp.run_program(program), TickStatus::Completed);
//! assert!(matches!(interp.result(), Some(Value::Number(n)) if *n == 6.0));
//! ```

pub mod builtins;
pub mod errors;
mod interpreter;
pub mod io;
mod scope;
mod shared;
mod value;

pub use builtins::{apply_cast, builtin_table, CastTarget};
pub use errors::{
    index_out_of_range, invalid_scope_pop, not_a_function, not_implemented, not_indexable,
    unknown_cast_type, unknown_symbol, EvalError, EvalErrorKind, EvalResult,
};
pub use interpreter::{Interpreter, InterpreterBuilder, TickStatus, DEFAULT_SLICE};
pub use io::{buffer_io, silent_io, stdout_io, BufferIo, IoHandlerImpl, SharedIo, StdoutIo};
pub use scope::{Frame, FrameTag, ScopeStack, SharedScope, IT, RETURN_SPECIAL};
pub use shared::Shared;
pub use value::{
    format_number, parse_number, FunctionValue, ListRef, NativeFn, NativeFunction, UserFunction,
    Value,
};

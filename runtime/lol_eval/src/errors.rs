//! Error types for program evaluation.
//!
//! Every runtime failure has a typed [`EvalErrorKind`] and a factory
//! function. Errors are fatal to the running program: the driver records
//! them on an accumulating log and pauses, rather than unwinding through
//! host control flow, so an embedding UI can inspect them and stay
//! responsive. The log survives until the next `evaluate`.

use std::fmt;

use lol_ir::Span;

use crate::value::Value;

/// Result of evaluation.
pub type EvalResult<T = Value> = Result<T, EvalError>;

/// Typed category for every way a program can fail at runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// A symbol was read that no frame declares.
    UnknownSymbol { name: String },
    /// A call target resolved to a non-callable value, or not at all.
    NotAFunction { name: String },
    /// Indexing was attempted on a value that supports no positions.
    NotIndexable { type_name: String },
    /// A read or normalized index fell outside the container.
    IndexOutOfRange { index: i64 },
    /// A cast named a type outside the fixed target set.
    UnknownCastType { name: String },
    /// A frame pop would have removed the root frame.
    InvalidScopePop { tag: String },
    /// A node kind with no registered handler was dispatched. Indicates a
    /// tree the parser should never have produced.
    NotImplemented { kind: String },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalErrorKind::UnknownSymbol { name } => write!(f, "no such symbol: {name}"),
            EvalErrorKind::NotAFunction { name } => write!(f, "{name} is not a function"),
            EvalErrorKind::NotIndexable { type_name } => {
                write!(f, "{type_name} is not indexable")
            }
            EvalErrorKind::IndexOutOfRange { index } => {
                write!(f, "index {index} out of range")
            }
            EvalErrorKind::UnknownCastType { name } => {
                write!(f, "unrecognised type: {name}")
            }
            EvalErrorKind::InvalidScopePop { tag } => {
                write!(f, "no {tag} frame to pop")
            }
            EvalErrorKind::NotImplemented { kind } => write!(f, "not implemented: {kind}"),
        }
    }
}

/// A fatal evaluation error.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Rendered message; equals `kind.to_string()` for factory-built errors.
    pub message: String,
    /// Source region of the node being evaluated, when known.
    pub span: Option<Span>,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError {
            kind,
            message,
            span: None,
        }
    }

    /// Attach the source region the error occurred at.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(span) = self.span {
            write!(f, " at {span}")?;
        }
        Ok(())
    }
}

pub fn unknown_symbol(name: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownSymbol { name: name.into() })
}

pub fn not_a_function(name: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotAFunction { name: name.into() })
}

pub fn not_indexable(type_name: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotIndexable {
        type_name: type_name.into(),
    })
}

pub fn index_out_of_range(index: i64) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfRange { index })
}

pub fn unknown_cast_type(name: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownCastType { name: name.into() })
}

pub fn invalid_scope_pop(tag: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidScopePop { tag: tag.into() })
}

pub fn not_implemented(kind: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotImplemented { kind: kind.into() })
}

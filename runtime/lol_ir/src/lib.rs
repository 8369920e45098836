//! Syntax-tree types for the lol runtime.
//!
//! This crate defines the data the evaluator consumes and nothing else: the
//! closed [`NodeKind`] variant set, arena allocation with [`NodeId`] indices,
//! source [`Span`]s, and the string-literal escape decoder applied at
//! tree-construction time. Parsing itself lives outside this workspace; a
//! parser produces a [`Program`] through [`NodeArena::alloc`].

pub mod ast;
pub mod escape;
pub mod span;

pub use ast::{
    ElseIf, Literal, LoopCheck, LoopDirection, Node, NodeArena, NodeId, NodeKind, Program,
};
pub use escape::{decode_escapes, decode_string_literal, ESCAPE_MARKER};
pub use span::{Span, Spanned};

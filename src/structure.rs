//! Structural analysis: context trees over token streams
//!
//! The structural analyzer is the second stage of the pipeline. It walks
//! the lexer's token stream exactly once and produces a tree of nested
//! syntactic contexts (statements, blocks, literals, parameter lists, ...)
//! while decorating each token with backlinks into that tree. Everything
//! downstream — the indentation engine, the alias resolver, and external
//! lint rules — consumes those annotations rather than re-deriving
//! structure.
//!
//! This is not grammar parsing: the analyzer is a heuristic single pass
//! that keeps working on malformed input, and the only fatal condition is
//! a closer that contradicts the innermost open context.

pub mod analyzer;
pub mod context;
pub(crate) mod docflags;

pub use self::analyzer::{build_contexts, StructuralParseError};
pub use self::context::{Context, ContextId, ContextKind, ContextTree};

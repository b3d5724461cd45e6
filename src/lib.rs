//! # jstyle
//!
//! A line-oriented style and structure analyzer for JavaScript-family
//! source. The crate provides the analysis core used by lint tooling that
//! wants fast, deterministic per-file diagnostics without executing code
//! or building a grammar-level AST.
//!
//! ## Pipeline
//!
//! Analysis of one file runs four stages in a fixed order, each a single
//! linear pass:
//!
//! 1. [`lexing::tokenize`] — raw text to an annotated token stream. The
//!    stream round-trips to the original text byte-for-byte; a non-default
//!    ending mode signals an unterminated construct.
//! 2. [`structure::build_contexts`] — the token stream to a tree of nested
//!    syntactic contexts, with per-token backlinks, implied statement and
//!    block boundaries, and operator classification. A mismatched closer
//!    halts this stage only; annotations made so far stay usable.
//! 3. [`indentation::check_indentation`] — per-line diagnostics from a
//!    stack model of blocks, continuations, and hard stops.
//! 4. [`aliases::resolve_aliases`] — canonical-symbol annotations for
//!    locally aliased namespaced symbols, plus marker usage diagnostics.
//!
//! Stages 3 and 4 are independent of each other; both need a complete
//! context tree. External lint rules make a final pass over the annotated
//! stream and are out of scope here, as are file discovery, CLI flags,
//! and output formatting.
//!
//! [`analyze`] wires the stages together for one file and is the entry
//! point batch tooling calls per file; cross-file parallelism belongs to
//! the caller (each analysis owns all of its state).

pub mod aliases;
pub mod config;
pub mod diagnostics;
pub mod indentation;
pub mod lexing;
pub mod structure;
pub mod tokens;

pub use crate::aliases::resolve_aliases;
pub use crate::config::CheckConfig;
pub use crate::diagnostics::{
    Diagnostic, DiagnosticCode, DiagnosticCollector, DiagnosticSink, Position,
};
pub use crate::indentation::check_indentation;
pub use crate::lexing::{tokenize, LexerMode};
pub use crate::structure::{
    build_contexts, Context, ContextId, ContextKind, ContextTree, StructuralParseError,
};
pub use crate::tokens::{Token, TokenId, TokenKind, TokenStream};

/// Everything produced by analyzing one file.
#[derive(Debug)]
pub struct FileAnalysis {
    pub stream: TokenStream,
    /// The context tree; partial when a structural error halted the pass.
    pub tree: Option<ContextTree>,
    pub ending_mode: LexerMode,
    /// The structural error, when one halted context building.
    pub structural_error: Option<StructuralParseError>,
    /// All diagnostics, in report order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Run the full per-file pipeline in order.
///
/// A structural parse error stops context building and the passes that
/// depend on a complete tree, but diagnostics produced before the halt are
/// retained, so a malformed file still yields partial results instead of
/// none.
pub fn analyze(source: &str, config: &CheckConfig) -> FileAnalysis {
    let (mut stream, ending_mode) = lexing::tokenize(source);

    let mut collector = DiagnosticCollector::new();
    if let Some(diagnostic) = lexing::unterminated_diagnostic(&stream, ending_mode) {
        collector.report(diagnostic);
    }

    match structure::build_contexts(&mut stream) {
        Ok(tree) => {
            for diagnostic in indentation::check_indentation(&stream, &tree, config) {
                collector.report(diagnostic);
            }
            for diagnostic in aliases::resolve_aliases(&mut stream, &tree, config) {
                collector.report(diagnostic);
            }
            FileAnalysis {
                stream,
                tree: Some(tree),
                ending_mode,
                structural_error: None,
                diagnostics: collector.into_vec(),
            }
        }
        Err(error) => {
            collector.report(error.to_diagnostic());
            let tree = (*error.partial).clone();
            FileAnalysis {
                stream,
                tree: Some(tree),
                ending_mode,
                structural_error: Some(error),
                diagnostics: collector.into_vec(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_file_has_no_diagnostics() {
        let analysis = analyze("var x = 1;\n", &CheckConfig::default());
        assert!(analysis.diagnostics.is_empty(), "{:?}", analysis.diagnostics);
        assert_eq!(analysis.ending_mode, LexerMode::Text);
        assert!(analysis.structural_error.is_none());
    }

    #[test]
    fn test_structural_error_halts_dependent_passes() {
        // The stray `)` is fatal to context building; the misindented line
        // after it must not be reported.
        let analysis = analyze("x = 1;\n)\n      y();\n", &CheckConfig::default());
        assert!(analysis.structural_error.is_some());
        assert_eq!(analysis.diagnostics.len(), 1);
        assert_eq!(
            analysis.diagnostics[0].code,
            DiagnosticCode::StructuralParseError
        );
        // The partial tree is still available for callers.
        assert!(analysis.tree.is_some());
    }

    #[test]
    fn test_unterminated_construct_reported_alongside_results() {
        let analysis = analyze("var x = 'abc\n", &CheckConfig::default());
        assert!(analysis
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::UnterminatedConstruct));
    }
}

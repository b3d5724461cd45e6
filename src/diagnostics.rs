//! Diagnostic types and the reporting sink
//!
//! Every finding produced by the core funnels through the [`DiagnosticSink`]
//! trait: a code, a message, the offending token, and an optional position
//! payload. No pass prints or panics; callers decide how findings are
//! formatted, counted, or turned into exit codes.

use serde::{Deserialize, Serialize};

use crate::tokens::TokenId;

/// Stable numeric codes for every diagnostic the core can produce.
///
/// The values are part of the external contract (batch tooling suppresses
/// and groups findings by number), so new codes must be appended rather
/// than renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    /// The lexer ended the file inside a string, comment, or parameter list.
    UnterminatedConstruct = 1,
    /// A closing token did not match the innermost open context.
    StructuralParseError = 2,
    /// A line's leading whitespace is outside the allowable set.
    WrongIndentation = 6,
    /// The closing line of an aliasing block lacks its trailing comment.
    MissingAliasBlockEndComment = 7,
    /// The closing line of an aliasing block has a malformed trailing comment.
    MalformedAliasBlockEndComment = 8,
    /// An aliasing-block marker used anywhere but as a top-level statement.
    InvalidAliasMarkerUse = 10,
    /// More than one aliasing-block marker in a single file.
    ExtraAliasMarker = 11,
    /// The indentation stack was not empty at end of file.
    InternalConsistency = 99,
}

/// A half-open byte range attached to a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub offset: usize,
    pub length: usize,
}

/// A single reported finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    /// The token the finding is anchored to. Absent only for end-of-file
    /// findings that have no token to point at.
    pub token: Option<TokenId>,
    pub position: Option<Position>,
    pub fix_hint: Option<String>,
}

impl Diagnostic {
    /// Build a diagnostic anchored to a token, without position payload.
    pub fn new(code: DiagnosticCode, message: impl Into<String>, token: TokenId) -> Self {
        Diagnostic {
            code,
            message: message.into(),
            token: Some(token),
            position: None,
            fix_hint: None,
        }
    }

    pub fn with_position(mut self, offset: usize, length: usize) -> Self {
        self.position = Some(Position { offset, length });
        self
    }
}

/// Receiver for diagnostics produced by the analysis passes.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// A sink that collects diagnostics into a vector, in report order.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        DiagnosticCollector::default()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl DiagnosticSink for DiagnosticCollector {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_preserves_order() {
        let mut collector = DiagnosticCollector::new();
        collector.report(Diagnostic::new(
            DiagnosticCode::WrongIndentation,
            "first",
            TokenId::new(0),
        ));
        collector.report(Diagnostic::new(
            DiagnosticCode::ExtraAliasMarker,
            "second",
            TokenId::new(1),
        ));
        let diagnostics = collector.into_vec();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].message, "first");
        assert_eq!(diagnostics[1].code, DiagnosticCode::ExtraAliasMarker);
    }

    #[test]
    fn test_position_builder() {
        let diagnostic = Diagnostic::new(
            DiagnosticCode::WrongIndentation,
            "indent",
            TokenId::new(3),
        )
        .with_position(2, 4);
        assert_eq!(diagnostic.position, Some(Position { offset: 2, length: 4 }));
    }
}

//! Lexer modes
//!
//! The tokenizer is a finite-state machine over these modes. Each mode has
//! its own ordered rule table (see [`rules`](crate::lexing::rules)); rules
//! can switch the machine into another mode, and the mode active at end of
//! input is reported back to the caller as the ending mode.

use serde::{Deserialize, Serialize};

use crate::tokens::TokenKind;

/// The matcher mode the tokenizer is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LexerMode {
    /// Ordinary code.
    Text,
    SingleQuoteString,
    DoubleQuoteString,
    TemplateString,
    BlockComment,
    DocComment,
    /// Doc comment directly after a type-bearing flag, where whitespace is
    /// significant and lexed into its own tokens.
    DocCommentLexSpaces,
    LineComment,
    /// After the `function` keyword, before its parameter list.
    FunctionHeader,
    /// Inside a function parameter list, where text follows different rules
    /// than general code.
    ParameterList,
}

impl LexerMode {
    /// Kind given to input no rule matched, consumed one character at a time.
    pub(crate) fn default_kind(self) -> TokenKind {
        match self {
            LexerMode::DocComment | LexerMode::DocCommentLexSpaces => TokenKind::Comment,
            _ => TokenKind::Normal,
        }
    }

    /// Human-readable name of the construct left open when the file ends in
    /// this mode.
    pub fn unterminated_description(self) -> Option<&'static str> {
        match self {
            LexerMode::Text => None,
            LexerMode::SingleQuoteString => Some("single-quoted string"),
            LexerMode::DoubleQuoteString => Some("double-quoted string"),
            LexerMode::TemplateString => Some("template string"),
            LexerMode::BlockComment => Some("block comment"),
            LexerMode::DocComment | LexerMode::DocCommentLexSpaces => Some("doc comment"),
            LexerMode::LineComment => Some("line comment"),
            LexerMode::FunctionHeader => Some("function header"),
            LexerMode::ParameterList => Some("parameter list"),
        }
    }
}

//! Core token kinds, the token record, and the arena-backed stream

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tokens::metadata::TokenMetadata;

/// Operators that assign into their left-hand side.
pub const ASSIGNMENT_OPERATORS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=", ">>>=",
];

/// The lexical classification of a token.
///
/// String and comment content is kept as first-class tokens (start marker,
/// body text, end marker) rather than being collapsed, so the stream
/// round-trips to the original source exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// Default kind for input no rule matched; consumed one character at a
    /// time so lexing never fails outright.
    Normal,
    Whitespace,
    StartDocComment,
    EndDocComment,
    StartBlockComment,
    EndBlockComment,
    StartSingleLineComment,
    Comment,
    DocPrefix,
    DocFlag,
    DocInlineFlag,
    DocStartBrace,
    DocEndBrace,
    DocTypeStartBlock,
    DocTypeEndBlock,
    DocTypeModifier,
    SingleQuoteStringStart,
    SingleQuoteStringEnd,
    DoubleQuoteStringStart,
    DoubleQuoteStringEnd,
    TemplateStringStart,
    TemplateStringEnd,
    StringText,
    Regex,
    Number,
    Operator,
    /// An identifier immediately followed (modulo spaces) by a plain `=`.
    SimpleLvalue,
    Keyword,
    Identifier,
    Semicolon,
    StartBlock,
    EndBlock,
    StartParen,
    EndParen,
    StartBracket,
    EndBracket,
    FunctionDeclaration,
    FunctionName,
    StartParameters,
    Parameters,
    EndParameters,
}

impl TokenKind {
    /// Whether this kind is part of a comment (including doc annotations).
    pub fn is_comment(self) -> bool {
        matches!(
            self,
            TokenKind::StartDocComment
                | TokenKind::EndDocComment
                | TokenKind::StartBlockComment
                | TokenKind::EndBlockComment
                | TokenKind::StartSingleLineComment
                | TokenKind::Comment
                | TokenKind::DocPrefix
                | TokenKind::DocFlag
                | TokenKind::DocInlineFlag
                | TokenKind::DocStartBrace
                | TokenKind::DocEndBrace
                | TokenKind::DocTypeStartBlock
                | TokenKind::DocTypeEndBlock
                | TokenKind::DocTypeModifier
        )
    }

    /// Whether this kind never participates in code structure
    /// (comments and whitespace).
    pub fn is_non_code(self) -> bool {
        self == TokenKind::Whitespace || self.is_comment()
    }

    /// Whether this kind is one of the string delimiters or string body text.
    pub fn is_string(self) -> bool {
        matches!(
            self,
            TokenKind::SingleQuoteStringStart
                | TokenKind::SingleQuoteStringEnd
                | TokenKind::DoubleQuoteStringStart
                | TokenKind::DoubleQuoteStringEnd
                | TokenKind::TemplateStringStart
                | TokenKind::TemplateStringEnd
                | TokenKind::StringText
        )
    }
}

/// Index of a token in its [`TokenStream`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TokenId(usize);

impl TokenId {
    pub fn new(index: usize) -> Self {
        TokenId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One lexical unit: kind, exact source text, and position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact source text, never normalized.
    pub text: String,
    /// 1-based line number.
    pub line_number: usize,
    /// Byte column of the first character within its line.
    pub start_index: usize,
    /// Tombstone set by fix tooling; the entry stays in the arena so
    /// existing ids remain valid.
    pub deleted: bool,
    pub metadata: TokenMetadata,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line_number: usize, start_index: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            line_number,
            start_index,
            deleted: false,
            metadata: TokenMetadata::default(),
        }
    }

    pub fn length(&self) -> usize {
        self.text.len()
    }

    /// Whether this token assigns into a left-hand side: a simple lvalue
    /// or an assignment operator.
    pub fn is_assignment(&self) -> bool {
        self.kind == TokenKind::SimpleLvalue
            || (self.kind == TokenKind::Operator
                && ASSIGNMENT_OPERATORS.contains(&self.text.as_str()))
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == word
    }

    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    pub fn is_code(&self) -> bool {
        !self.kind.is_non_code()
    }
}

/// The linear token sequence for one file, stored as an index-addressed
/// arena. Sequence order is source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        TokenStream::default()
    }

    pub fn push(&mut self, token: Token) -> TokenId {
        let id = TokenId(self.tokens.len());
        self.tokens.push(token);
        id
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, id: TokenId) -> &Token {
        &self.tokens[id.0]
    }

    pub fn get_mut(&mut self, id: TokenId) -> &mut Token {
        &mut self.tokens[id.0]
    }

    /// Ids of all live (non-tombstoned) tokens in source order.
    pub fn ids(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.deleted)
            .map(|(i, _)| TokenId(i))
    }

    pub fn first(&self) -> Option<TokenId> {
        self.ids().next()
    }

    pub fn mark_deleted(&mut self, id: TokenId) {
        self.tokens[id.0].deleted = true;
    }

    /// The next live token after `id` in source order.
    pub fn next_token(&self, id: TokenId) -> Option<TokenId> {
        self.tokens[id.0 + 1..]
            .iter()
            .position(|t| !t.deleted)
            .map(|offset| TokenId(id.0 + 1 + offset))
    }

    /// The previous live token before `id` in source order.
    pub fn prev_token(&self, id: TokenId) -> Option<TokenId> {
        self.tokens[..id.0]
            .iter()
            .rposition(|t| !t.deleted)
            .map(TokenId)
    }

    /// The next token that participates in code structure.
    pub fn next_code(&self, id: TokenId) -> Option<TokenId> {
        let mut current = self.next_token(id);
        while let Some(t) = current {
            if self.get(t).is_code() {
                return Some(t);
            }
            current = self.next_token(t);
        }
        None
    }

    /// The previous token that participates in code structure.
    pub fn prev_code(&self, id: TokenId) -> Option<TokenId> {
        let mut current = self.prev_token(id);
        while let Some(t) = current {
            if self.get(t).is_code() {
                return Some(t);
            }
            current = self.prev_token(t);
        }
        None
    }

    /// The first live token on the same line as `id`.
    pub fn first_in_line(&self, id: TokenId) -> TokenId {
        let line = self.get(id).line_number;
        let mut current = id;
        while let Some(prev) = self.prev_token(current) {
            if self.get(prev).line_number != line {
                break;
            }
            current = prev;
        }
        current
    }

    pub fn is_first_in_line(&self, id: TokenId) -> bool {
        match self.prev_token(id) {
            Some(prev) => self.get(prev).line_number != self.get(id).line_number,
            None => true,
        }
    }

    /// Whether `id` is the first token on its line that isn't whitespace.
    pub fn is_first_non_space_in_line(&self, id: TokenId) -> bool {
        if self.get(id).kind == TokenKind::Whitespace {
            return false;
        }
        if self.is_first_in_line(id) {
            return true;
        }
        match self.prev_token(id) {
            Some(prev) => {
                self.is_first_in_line(prev) && self.get(prev).kind == TokenKind::Whitespace
            }
            None => false,
        }
    }

    /// Whether `id` is the last code token on its line.
    pub fn is_last_code_in_line(&self, id: TokenId) -> bool {
        if !self.get(id).is_code() {
            return false;
        }
        let line = self.get(id).line_number;
        let mut current = self.next_token(id);
        while let Some(t) = current {
            if self.get(t).line_number != line {
                return true;
            }
            if self.get(t).is_code() {
                return false;
            }
            current = self.next_token(t);
        }
        true
    }

    /// The full text of the line containing `id`, terminator included.
    pub fn line_text(&self, id: TokenId) -> String {
        let line = self.get(id).line_number;
        let mut text = String::new();
        let mut current = Some(self.first_in_line(id));
        while let Some(t) = current {
            let token = self.get(t);
            if token.line_number != line {
                break;
            }
            text.push_str(&token.text);
            current = self.next_token(t);
        }
        text
    }

    /// The last live non-whitespace token of the stream.
    pub fn last_non_whitespace(&self) -> Option<TokenId> {
        self.tokens
            .iter()
            .rposition(|t| !t.deleted && t.kind != TokenKind::Whitespace)
            .map(TokenId)
    }

    /// Reconstruct the source by concatenating every live token's text.
    pub fn source_text(&self) -> String {
        self.tokens
            .iter()
            .filter(|t| !t.deleted)
            .map(|t| t.text.as_str())
            .collect()
    }

    /// Serialize the stream, annotations included, for debugging and
    /// tooling dumps.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_of(parts: &[(TokenKind, &str, usize, usize)]) -> TokenStream {
        let mut stream = TokenStream::new();
        for (kind, text, line, col) in parts {
            stream.push(Token::new(*kind, *text, *line, *col));
        }
        stream
    }

    #[test]
    fn test_navigation_skips_tombstones() {
        let mut stream = stream_of(&[
            (TokenKind::Identifier, "a", 1, 0),
            (TokenKind::Whitespace, " ", 1, 1),
            (TokenKind::Identifier, "b", 1, 2),
        ]);
        let ids: Vec<_> = stream.ids().collect();
        stream.mark_deleted(ids[1]);
        assert_eq!(stream.next_token(ids[0]), Some(ids[2]));
        assert_eq!(stream.prev_token(ids[2]), Some(ids[0]));
        assert_eq!(stream.source_text(), "ab");
    }

    #[test]
    fn test_code_navigation() {
        let stream = stream_of(&[
            (TokenKind::Identifier, "x", 1, 0),
            (TokenKind::Whitespace, " ", 1, 1),
            (TokenKind::Comment, "c", 1, 2),
            (TokenKind::Operator, "=", 1, 3),
        ]);
        let ids: Vec<_> = stream.ids().collect();
        assert_eq!(stream.next_code(ids[0]), Some(ids[3]));
        assert_eq!(stream.prev_code(ids[3]), Some(ids[0]));
    }

    #[test]
    fn test_first_non_space_in_line() {
        let stream = stream_of(&[
            (TokenKind::Whitespace, "  ", 1, 0),
            (TokenKind::Identifier, "x", 1, 2),
            (TokenKind::Whitespace, "\n", 1, 3),
            (TokenKind::Identifier, "y", 2, 0),
        ]);
        let ids: Vec<_> = stream.ids().collect();
        assert!(stream.is_first_non_space_in_line(ids[1]));
        assert!(stream.is_first_non_space_in_line(ids[3]));
        assert!(!stream.is_first_non_space_in_line(ids[0]));
    }

    #[test]
    fn test_is_last_code_in_line() {
        let stream = stream_of(&[
            (TokenKind::Identifier, "x", 1, 0),
            (TokenKind::Semicolon, ";", 1, 1),
            (TokenKind::Whitespace, "\n", 1, 2),
            (TokenKind::Identifier, "y", 2, 0),
        ]);
        let ids: Vec<_> = stream.ids().collect();
        assert!(!stream.is_last_code_in_line(ids[0]));
        assert!(stream.is_last_code_in_line(ids[1]));
        assert!(stream.is_last_code_in_line(ids[3]));
    }

    #[test]
    fn test_json_dump_round_trips() {
        let stream = stream_of(&[
            (TokenKind::Identifier, "a", 1, 0),
            (TokenKind::Semicolon, ";", 1, 1),
        ]);
        let json = stream.to_json().unwrap();
        let back: TokenStream = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stream);
    }

    #[test]
    fn test_assignment_predicate() {
        let plus_eq = Token::new(TokenKind::Operator, "+=", 1, 0);
        let eq_eq = Token::new(TokenKind::Operator, "==", 1, 0);
        let lvalue = Token::new(TokenKind::SimpleLvalue, "x", 1, 0);
        assert!(plus_eq.is_assignment());
        assert!(!eq_eq.is_assignment());
        assert!(lvalue.is_assignment());
    }
}

//! Mode-switching tokenizer
//!
//! `tokenize` turns raw source text into the annotated token stream every
//! later pass consumes. The tokenizer is an explicit finite-state machine
//! over [`LexerMode`]s; each mode carries an ordered rule table (see
//! [`rules`]) tried first-match against the input at the cursor, one line
//! at a time.
//!
//! Lexing never fails: input no rule matches is consumed one character at a
//! time with the mode's default kind, and whitespace, newlines, and comments
//! are preserved as first-class tokens, so concatenating every token's text
//! in order reproduces the source byte-for-byte. A file ending in a
//! non-default mode signals an unterminated construct to the caller.

pub mod modes;
pub(crate) mod rules;

pub use self::modes::LexerMode;

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::tokens::{Token, TokenKind, TokenStream};

/// Tokenize a file into a stream plus the mode active at end of input.
///
/// The returned mode is [`LexerMode::Text`] for well-formed input; anything
/// else means a string, comment, or parameter list was left open.
pub fn tokenize(source: &str) -> (TokenStream, LexerMode) {
    let mut stream = TokenStream::new();
    let mut mode = LexerMode::Text;

    for (line_index, raw_line) in source.split_inclusive('\n').enumerate() {
        let line_number = line_index + 1;
        let (content, terminated) = match raw_line.strip_suffix('\n') {
            Some(content) => (content, true),
            None => (raw_line, false),
        };

        let mut cursor = 0;
        while cursor < content.len() {
            match match_at(mode, content, cursor) {
                Some((length, kind, next_mode)) => {
                    stream.push(Token::new(
                        kind,
                        &content[cursor..cursor + length],
                        line_number,
                        cursor,
                    ));
                    cursor += length;
                    if let Some(next) = next_mode {
                        mode = next;
                    }
                }
                None => {
                    // Lexical anomaly: emit one character with the mode's
                    // default kind and keep going.
                    let width = content[cursor..]
                        .chars()
                        .next()
                        .map(char::len_utf8)
                        .unwrap_or(1);
                    stream.push(Token::new(
                        mode.default_kind(),
                        &content[cursor..cursor + width],
                        line_number,
                        cursor,
                    ));
                    cursor += width;
                }
            }
        }

        if terminated {
            stream.push(Token::new(
                TokenKind::Whitespace,
                "\n",
                line_number,
                content.len(),
            ));
        }
    }

    (stream, mode)
}

/// Try the current mode's rules, in order, at `line[cursor..]`.
fn match_at(
    mode: LexerMode,
    line: &str,
    cursor: usize,
) -> Option<(usize, TokenKind, Option<LexerMode>)> {
    for rule in rules_in_order(mode) {
        if rule.line_start_only && cursor != 0 {
            continue;
        }
        let Some(found) = rule.pattern.find(&line[cursor..]) else {
            continue;
        };
        if found.start() != 0 || found.is_empty() {
            continue;
        }
        let end = cursor + found.end();
        if let Some(guard) = rule.guard {
            if !guard.allows(line, cursor, end) {
                continue;
            }
        }
        return Some((found.end(), rule.kind, rule.next_mode));
    }
    None
}

fn rules_in_order(mode: LexerMode) -> &'static [rules::LexRule] {
    rules::rules_for(mode)
}

/// Build the unterminated-construct diagnostic for a non-default ending
/// mode, anchored to the last non-whitespace token.
pub fn unterminated_diagnostic(stream: &TokenStream, ending_mode: LexerMode) -> Option<Diagnostic> {
    let description = ending_mode.unterminated_description()?;
    let token = stream.last_non_whitespace()?;
    Some(Diagnostic::new(
        DiagnosticCode::UnterminatedConstruct,
        format!("file ends inside an unterminated {}", description),
        token,
    ))
}

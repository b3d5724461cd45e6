//! Doc-comment flag payloads
//!
//! When the structural pass meets a `DocFlag` token it parses the tokens
//! that follow it inside the comment — an optional `{...}` type annotation
//! and free description text — into the structured payload later passes
//! consume (the alias resolver rewrites identifiers inside type trees).
//!
//! The type grammar handled here is deliberately small: dotted identifiers,
//! `?`/`!` nullability modifiers, unions with `|`, generic or function
//! applications with `<...>`/`(...)`, record braces, and `name: type`
//! fields. Anything stranger degrades to plain text without failing.

use crate::tokens::{DocFlagPayload, TokenId, TokenKind, TokenStream, TypeAnnotation};

/// Parse the payload for a doc flag token and attach it to its metadata.
pub(crate) fn attach_doc_flag(stream: &mut TokenStream, flag: TokenId) {
    let name = stream
        .get(flag)
        .text
        .trim_start_matches('@')
        .to_string();

    let mut cursor = stream.next_token(flag);

    // Skip comment-lexed whitespace between the flag and its type.
    while let Some(id) = cursor {
        let token = stream.get(id);
        if token.kind == TokenKind::Comment && token.text.trim().is_empty() {
            cursor = stream.next_token(id);
        } else {
            break;
        }
    }

    let mut jstype = None;
    if let Some(open) = cursor {
        if stream.get(open).kind == TokenKind::DocStartBrace {
            let (tokens, after) = collect_type_tokens(stream, open);
            jstype = parse_type_tokens(&tokens);
            cursor = after;
        }
    }

    let description = collect_description(stream, cursor);

    stream.get_mut(flag).metadata.doc_flag = Some(DocFlagPayload {
        flag: name,
        jstype,
        description,
    });
}

/// Collect the token texts between a `DocStartBrace` and its matching
/// `DocEndBrace`, brace-depth aware. Returns the texts and the token after
/// the closing brace.
fn collect_type_tokens(
    stream: &TokenStream,
    open: TokenId,
) -> (Vec<(TokenKind, String)>, Option<TokenId>) {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut cursor = Some(open);
    while let Some(id) = cursor {
        let token = stream.get(id);
        match token.kind {
            TokenKind::DocStartBrace => {
                depth += 1;
                if depth > 1 {
                    tokens.push((token.kind, token.text.clone()));
                }
            }
            TokenKind::DocEndBrace => {
                depth -= 1;
                if depth == 0 {
                    return (tokens, stream.next_token(id));
                }
                tokens.push((token.kind, token.text.clone()));
            }
            TokenKind::EndDocComment => return (tokens, Some(id)),
            _ => tokens.push((token.kind, token.text.clone())),
        }
        cursor = stream.next_token(id);
    }
    (tokens, None)
}

/// Concatenate trailing comment text up to the next flag or the end of the
/// comment.
fn collect_description(stream: &TokenStream, start: Option<TokenId>) -> String {
    let mut description = String::new();
    let mut cursor = start;
    while let Some(id) = cursor {
        let token = stream.get(id);
        match token.kind {
            TokenKind::DocFlag | TokenKind::DocInlineFlag | TokenKind::EndDocComment => break,
            TokenKind::Comment => description.push_str(&token.text),
            TokenKind::Whitespace => description.push(' '),
            TokenKind::DocPrefix => {}
            _ => break,
        }
        cursor = stream.next_token(id);
    }
    description.split_whitespace().collect::<Vec<_>>().join(" ")
}

struct TypeParser<'a> {
    tokens: &'a [(TokenKind, String)],
    position: usize,
}

/// Parse collected type tokens into an annotation tree.
pub(crate) fn parse_type_tokens(tokens: &[(TokenKind, String)]) -> Option<TypeAnnotation> {
    let mut parser = TypeParser { tokens, position: 0 };
    let annotation = parser.parse_union();
    if annotation.identifier.is_empty() && annotation.sub_types.is_empty() {
        None
    } else {
        Some(annotation)
    }
}

impl<'a> TypeParser<'a> {
    fn peek(&self) -> Option<&(TokenKind, String)> {
        self.tokens.get(self.position)
    }

    fn bump(&mut self) -> Option<&(TokenKind, String)> {
        let token = self.tokens.get(self.position);
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn peek_modifier(&self, text: &str) -> bool {
        matches!(self.peek(), Some((TokenKind::DocTypeModifier, t)) if t == text)
    }

    fn parse_union(&mut self) -> TypeAnnotation {
        let mut members = vec![self.parse_single()];
        while self.peek_modifier("|") {
            self.bump();
            members.push(self.parse_single());
        }
        if members.len() == 1 {
            members.pop().unwrap_or_default()
        } else {
            TypeAnnotation {
                sub_types: members,
                ..TypeAnnotation::default()
            }
        }
    }

    fn parse_single(&mut self) -> TypeAnnotation {
        let mut annotation = TypeAnnotation::default();
        loop {
            if self.peek_modifier("?") {
                annotation.or_null = true;
                self.bump();
            } else if self.peek_modifier("!") {
                annotation.not_null = true;
                self.bump();
            } else if self.peek_modifier("=") {
                // Optional-parameter marker, no tree shape of its own.
                self.bump();
            } else {
                break;
            }
        }

        match self.peek() {
            Some((TokenKind::Comment, text)) => {
                annotation.identifier = text.trim().to_string();
                self.bump();
            }
            Some((TokenKind::DocStartBrace, _)) => {
                // Record type: fields separated by commas.
                self.bump();
                annotation.sub_types = self.parse_list(TokenKind::DocEndBrace);
                return annotation;
            }
            _ => {}
        }

        // Field label: `name: type` yields the value type.
        if self.peek_modifier(":") {
            self.bump();
            return self.parse_single();
        }

        if let Some((TokenKind::DocTypeStartBlock, _)) = self.peek() {
            self.bump();
            annotation.sub_types = self.parse_list(TokenKind::DocTypeEndBlock);
        }

        // Trailing optional marker.
        if self.peek_modifier("=") {
            self.bump();
        }

        annotation
    }

    /// Comma-separated union members until `end` (or input runs out).
    fn parse_list(&mut self, end: TokenKind) -> Vec<TypeAnnotation> {
        let mut members = Vec::new();
        loop {
            match self.peek() {
                None => break,
                Some((kind, _)) if *kind == end => {
                    self.bump();
                    break;
                }
                Some((TokenKind::DocTypeModifier, t)) if t == "," => {
                    self.bump();
                }
                _ => {
                    let member = self.parse_union();
                    if member.identifier.is_empty() && member.sub_types.is_empty() {
                        // No progress on this token; skip it to stay total.
                        self.bump();
                    } else {
                        members.push(member);
                    }
                }
            }
        }
        members
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexing::tokenize;
    use crate::structure::build_contexts;

    fn payload_for(source: &str) -> DocFlagPayload {
        let (mut stream, _) = tokenize(source);
        build_contexts(&mut stream).expect("parses");
        let flag = stream
            .ids()
            .find(|id| stream.get(*id).kind == TokenKind::DocFlag)
            .expect("doc flag present");
        stream
            .get(flag)
            .metadata
            .doc_flag
            .clone()
            .expect("payload attached")
    }

    #[test]
    fn test_simple_param_flag() {
        let payload = payload_for("/** @param {ns.Foo} bar the description */");
        assert_eq!(payload.flag, "param");
        let jstype = payload.jstype.unwrap();
        assert_eq!(jstype.identifier, "ns.Foo");
        assert_eq!(payload.description, "bar the description");
    }

    #[test]
    fn test_union_type() {
        let payload = payload_for("/** @type {string|ns.Bar} */");
        let jstype = payload.jstype.unwrap();
        assert_eq!(jstype.identifier, "");
        assert_eq!(jstype.sub_types.len(), 2);
        assert_eq!(jstype.sub_types[0].identifier, "string");
        assert_eq!(jstype.sub_types[1].identifier, "ns.Bar");
    }

    #[test]
    fn test_generic_type() {
        let payload = payload_for("/** @type {Array<ns.Item>} */");
        let jstype = payload.jstype.unwrap();
        assert_eq!(jstype.identifier, "Array");
        assert_eq!(jstype.sub_types.len(), 1);
        assert_eq!(jstype.sub_types[0].identifier, "ns.Item");
    }

    #[test]
    fn test_nullability_modifiers() {
        let payload = payload_for("/** @type {?ns.Maybe} */");
        let jstype = payload.jstype.unwrap();
        assert!(jstype.or_null);
        assert_eq!(jstype.identifier, "ns.Maybe");
    }

    #[test]
    fn test_flag_without_type() {
        let payload = payload_for("/** @private something */");
        assert_eq!(payload.flag, "private");
        assert!(payload.jstype.is_none());
    }
}

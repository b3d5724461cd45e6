//! Single-pass structural analysis
//!
//! One forward walk over the token stream maintains an explicit stack of
//! open contexts and decorates every token with its innermost context and
//! its nearest preceding code token. Along the way the pass decides what an
//! opening brace means from its syntactic position (block vs. object
//! literal), infers statement boundaries that have no explicit punctuation,
//! wraps brace-less control-structure bodies in implied blocks, and
//! classifies operators as unary or binary.
//!
//! The pass is heuristic rather than grammar-driven: it must degrade
//! gracefully on malformed input. The only fatal condition is a closing
//! token that does not match the innermost open context; everything
//! annotated up to that point stays valid.

use thiserror::Error;

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::structure::context::{ContextId, ContextKind, ContextTree};
use crate::structure::docflags;
use crate::tokens::{OperatorClass, TokenId, TokenKind, TokenMetadata, TokenStream};

/// A closer that does not match the innermost open context.
///
/// Fatal to the structural pass only: the partial tree is carried along so
/// annotations already applied to tokens keep resolving.
#[derive(Debug, Clone, Error)]
#[error("structural parse error at line {line}, column {column}: {reason}")]
pub struct StructuralParseError {
    pub token: TokenId,
    pub line: usize,
    pub column: usize,
    pub reason: String,
    /// The tree as built up to the offending token.
    pub partial: Box<ContextTree>,
}

impl StructuralParseError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::StructuralParseError,
            self.to_string(),
            self.token,
        )
    }
}

/// Build the context tree for a token stream, annotating tokens in place.
pub fn build_contexts(stream: &mut TokenStream) -> Result<ContextTree, StructuralParseError> {
    Analyzer::new(stream).run()
}

/// Why an implied block is pending at the next code token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    /// A control header group just closed (`if (...)`, `for (...)`, ...).
    Control,
    /// An `else` keyword; an immediately following `if` keeps the chain
    /// flat instead of nesting a body.
    Else,
}

struct Analyzer<'a> {
    stream: &'a mut TokenStream,
    tree: ContextTree,
    stack: Vec<ContextId>,
    last_code: Option<TokenId>,
    /// A control header waiting for its body, with the keyword that opened
    /// it. The keyword carries the implied-block flag so the body's
    /// indentation contribution starts on the header line.
    pending_implied_block: Option<(Pending, TokenId)>,
    /// Inside a `case`/`default` label, before its `:`.
    case_label: bool,
}

impl<'a> Analyzer<'a> {
    fn new(stream: &'a mut TokenStream) -> Self {
        let tree = ContextTree::new();
        let root = tree.root();
        Analyzer {
            stream,
            tree,
            stack: vec![root],
            last_code: None,
            pending_implied_block: None,
            case_label: false,
        }
    }

    fn run(mut self) -> Result<ContextTree, StructuralParseError> {
        let ids: Vec<TokenId> = self.stream.ids().collect();
        if let Some(first) = ids.first() {
            self.tree.set_root_start(*first);
        }

        for id in ids {
            // Re-running the pass over an unmodified stream must produce the
            // same annotations, so stale metadata is cleared up front.
            self.stream.get_mut(id).metadata = TokenMetadata::default();
            self.stream.get_mut(id).metadata.last_code = self.last_code;

            let kind = self.stream.get(id).kind;
            if kind == TokenKind::Whitespace {
                self.stream.get_mut(id).metadata.context = Some(self.top());
                if self.stream.get(id).text.ends_with('\n') {
                    self.handle_line_end(id);
                }
                continue;
            }
            if kind.is_comment() {
                self.stream.get_mut(id).metadata.context = Some(self.top());
                if kind == TokenKind::DocFlag {
                    docflags::attach_doc_flag(self.stream, id);
                }
                continue;
            }

            self.handle_code_token(id, kind)?;
            if self.stream.get(id).metadata.context.is_none() {
                self.stream.get_mut(id).metadata.context = Some(self.top());
            }
            self.last_code = Some(id);
        }

        self.finish();
        Ok(self.tree)
    }

    fn top(&self) -> ContextId {
        *self.stack.last().expect("root context never popped")
    }

    fn open(&mut self, kind: ContextKind, start: TokenId) -> ContextId {
        let id = self.tree.add(kind, self.top(), start);
        self.stack.push(id);
        id
    }

    fn close_top(&mut self, end: TokenId) -> Option<ContextId> {
        if self.stack.len() == 1 {
            return None;
        }
        let id = self.stack.pop().expect("stack underflow");
        self.tree.close(id, end);
        Some(id)
    }

    fn error(&self, token: TokenId, reason: impl Into<String>) -> StructuralParseError {
        let t = self.stream.get(token);
        StructuralParseError {
            token,
            line: t.line_number,
            column: t.start_index,
            reason: reason.into(),
            partial: Box::new(self.tree.clone()),
        }
    }

    /// Open a statement when the current context hosts statements directly.
    fn ensure_statement(&mut self, start: TokenId) {
        let top = self.top();
        if self.tree.kind(top).is_statement_level() {
            if self.tree.kind(top) == ContextKind::CaseBlock && self.case_label {
                return;
            }
            self.open(ContextKind::Statement, start);
        }
    }

    fn handle_code_token(
        &mut self,
        id: TokenId,
        kind: TokenKind,
    ) -> Result<(), StructuralParseError> {
        // A control header without braces wraps its body in an implied
        // block so later stages see a uniform block abstraction.
        if let Some((pending, keyword)) = self.pending_implied_block.take() {
            let is_else_if =
                pending == Pending::Else && self.stream.get(id).is_keyword("if");
            if kind != TokenKind::StartBlock && kind != TokenKind::Semicolon && !is_else_if {
                self.open(ContextKind::ImpliedBlock, keyword);
                self.stream.get_mut(keyword).metadata.implied_block = true;
            }
        }

        // First member token inside a literal opens its element context.
        let top_kind = self.tree.kind(self.top());
        if matches!(top_kind, ContextKind::ObjectLiteral | ContextKind::ArrayLiteral) {
            let is_separator = self.stream.get(id).is_operator(",");
            let is_closer = matches!(kind, TokenKind::EndBlock | TokenKind::EndBracket);
            if !is_separator && !is_closer {
                self.open(ContextKind::LiteralElement, id);
            }
        }

        match kind {
            TokenKind::StartBlock => self.handle_start_block(id),
            TokenKind::EndBlock => self.handle_end_block(id)?,
            TokenKind::StartParen => {
                self.ensure_statement(id);
                let group_kind = if self.last_is_keyword("for") {
                    ContextKind::ForGroup
                } else {
                    ContextKind::Group
                };
                self.open(group_kind, id);
            }
            TokenKind::EndParen => self.handle_end_paren(id)?,
            TokenKind::StartBracket => {
                self.ensure_statement(id);
                let bracket_kind = if self.bracket_is_array_literal() {
                    ContextKind::ArrayLiteral
                } else {
                    ContextKind::Group
                };
                self.open(bracket_kind, id);
            }
            TokenKind::EndBracket => self.handle_end_bracket(id)?,
            TokenKind::StartParameters => {
                self.open(ContextKind::Parameters, id);
            }
            TokenKind::EndParameters => {
                if self.tree.kind(self.top()) == ContextKind::Parameters {
                    let closed = self.close_top(id);
                    self.stream.get_mut(id).metadata.context = closed;
                } else {
                    return Err(self.error(id, "unmatched end of parameter list"));
                }
            }
            TokenKind::Semicolon => self.handle_semicolon(id),
            TokenKind::Keyword => self.handle_keyword(id),
            TokenKind::Operator => self.handle_operator(id),
            _ => self.ensure_statement(id),
        }
        Ok(())
    }

    fn last_is_keyword(&self, word: &str) -> bool {
        self.last_code
            .map_or(false, |last| self.stream.get(last).is_keyword(word))
    }

    /// An opening brace is an object literal when it sits in value position;
    /// the shape of the brace alone says nothing.
    fn brace_is_object_literal(&self) -> bool {
        let Some(last) = self.last_code else {
            return false;
        };
        let token = self.stream.get(last);
        match token.kind {
            TokenKind::Operator => !matches!(token.text.as_str(), "=>" | "++" | "--"),
            TokenKind::StartParen | TokenKind::StartBracket => true,
            TokenKind::Keyword => matches!(token.text.as_str(), "return" | "case"),
            _ => false,
        }
    }

    /// An opening bracket in value position starts an array literal;
    /// after a value it is an index access.
    fn bracket_is_array_literal(&self) -> bool {
        let Some(last) = self.last_code else {
            return true;
        };
        let token = self.stream.get(last);
        match token.kind {
            TokenKind::Operator => !matches!(token.text.as_str(), "++" | "--"),
            TokenKind::StartParen
            | TokenKind::StartBracket
            | TokenKind::StartBlock
            | TokenKind::Semicolon => true,
            TokenKind::Keyword => true,
            _ => false,
        }
    }

    fn handle_start_block(&mut self, id: TokenId) {
        let kind = if self.brace_is_object_literal() {
            ContextKind::ObjectLiteral
        } else {
            ContextKind::Block
        };
        self.open(kind, id);
    }

    fn handle_end_block(&mut self, id: TokenId) -> Result<(), StructuralParseError> {
        loop {
            let top = self.top();
            match self.tree.kind(top) {
                ContextKind::Statement
                | ContextKind::Var
                | ContextKind::ImpliedBlock
                | ContextKind::CaseBlock
                | ContextKind::LiteralElement => {
                    self.case_label = false;
                    self.close_top(id);
                }
                ContextKind::Block => {
                    self.close_top(id);
                    self.stream.get_mut(id).metadata.context = Some(top);
                    self.after_block_close(id);
                    return Ok(());
                }
                ContextKind::ObjectLiteral => {
                    self.close_top(id);
                    self.stream.get_mut(id).metadata.context = Some(top);
                    return Ok(());
                }
                _ => return Err(self.error(id, "'}' does not match an open block")),
            }
        }
    }

    /// A `}` that closes a block may end the enclosing statement, unless
    /// the statement continues (`else`, `catch`, a call on the block, ...).
    fn after_block_close(&mut self, id: TokenId) {
        let top = self.top();
        if self.tree.kind(top) != ContextKind::Statement {
            return;
        }
        let keeps_open = match self.stream.next_code(id) {
            None => false,
            Some(next) => {
                let token = self.stream.get(next);
                match token.kind {
                    TokenKind::Operator
                    | TokenKind::Semicolon
                    | TokenKind::StartParen
                    | TokenKind::StartBracket => true,
                    TokenKind::Keyword => self.statement_continues_with(top, &token.text),
                    _ => false,
                }
            }
        };
        if !keeps_open {
            self.end_statement(id);
        }
    }

    /// Whether `word` legally extends the statement that starts at
    /// `statement`'s first token (`else` after `if`, `while` after `do`...).
    fn statement_continues_with(&self, statement: ContextId, word: &str) -> bool {
        let Some(start) = self.tree.get(statement).start_token else {
            return false;
        };
        let first = &self.stream.get(start).text;
        match word {
            "else" => first == "if",
            "catch" | "finally" => first == "try",
            "while" => first == "do",
            _ => false,
        }
    }

    fn handle_end_paren(&mut self, id: TokenId) -> Result<(), StructuralParseError> {
        loop {
            let top = self.top();
            match self.tree.kind(top) {
                ContextKind::Var | ContextKind::LiteralElement => {
                    self.close_top(id);
                }
                ContextKind::Group | ContextKind::ForGroup => {
                    let opener_kind = self
                        .tree
                        .get(top)
                        .start_token
                        .map(|t| self.stream.get(t).kind);
                    if opener_kind != Some(TokenKind::StartParen) {
                        return Err(self.error(id, "')' does not match an open parenthesis"));
                    }
                    self.close_top(id);
                    self.stream.get_mut(id).metadata.context = Some(top);
                    self.note_control_header_close(top);
                    return Ok(());
                }
                _ => return Err(self.error(id, "')' does not match an open parenthesis")),
            }
        }
    }

    /// After a control header's group closes, its body may follow without
    /// braces; remember that the next code token starts an implied block.
    fn note_control_header_close(&mut self, group: ContextId) {
        let Some(opener) = self.tree.get(group).start_token else {
            return;
        };
        let Some(prev) = self.stream.prev_code(opener) else {
            return;
        };
        if self.tree.kind(group) == ContextKind::ForGroup {
            self.pending_implied_block = Some((Pending::Control, prev));
            return;
        }
        let keyword = self.stream.get(prev);
        let is_control = keyword.is_keyword("if")
            || keyword.is_keyword("while")
            || keyword.is_keyword("with");
        if !is_control {
            return;
        }
        // The trailing `while (...)` of do-while has no body of its own.
        if keyword.is_keyword("while") && self.innermost_statement_starts_with("do") {
            return;
        }
        self.pending_implied_block = Some((Pending::Control, prev));
    }

    fn innermost_statement_starts_with(&self, word: &str) -> bool {
        for context in self.tree.ancestors(self.top()) {
            if self.tree.kind(context) == ContextKind::Statement {
                return self
                    .tree
                    .get(context)
                    .start_token
                    .map_or(false, |t| self.stream.get(t).text == word);
            }
        }
        false
    }

    fn handle_end_bracket(&mut self, id: TokenId) -> Result<(), StructuralParseError> {
        loop {
            let top = self.top();
            match self.tree.kind(top) {
                ContextKind::Var | ContextKind::LiteralElement => {
                    self.close_top(id);
                }
                ContextKind::ArrayLiteral => {
                    self.close_top(id);
                    self.stream.get_mut(id).metadata.context = Some(top);
                    return Ok(());
                }
                ContextKind::Group => {
                    let opener_kind = self
                        .tree
                        .get(top)
                        .start_token
                        .map(|t| self.stream.get(t).kind);
                    if opener_kind != Some(TokenKind::StartBracket) {
                        return Err(self.error(id, "']' does not match an open bracket"));
                    }
                    self.close_top(id);
                    self.stream.get_mut(id).metadata.context = Some(top);
                    return Ok(());
                }
                _ => return Err(self.error(id, "']' does not match an open bracket")),
            }
        }
    }

    fn handle_semicolon(&mut self, id: TokenId) {
        if self.in_for_group_header() {
            if self.tree.kind(self.top()) == ContextKind::Var {
                self.close_top(id);
            }
            self.stream.get_mut(id).metadata.context = Some(self.top());
            return;
        }
        let statement = self
            .tree
            .ancestors(self.top())
            .find(|c| self.tree.kind(*c) == ContextKind::Statement);
        self.stream.get_mut(id).metadata.context = statement.or(Some(self.top()));
        self.end_statement(id);
    }

    /// Whether the innermost grouping construct is a `for` header, whose
    /// semicolons separate clauses instead of ending statements.
    fn in_for_group_header(&self) -> bool {
        for context in self.tree.ancestors(self.top()) {
            match self.tree.kind(context) {
                ContextKind::Statement | ContextKind::Var | ContextKind::LiteralElement => {
                    continue
                }
                ContextKind::ForGroup => return true,
                _ => return false,
            }
        }
        false
    }

    fn handle_keyword(&mut self, id: TokenId) {
        let text = self.stream.get(id).text.clone();
        match text.as_str() {
            "var" | "let" | "const" => {
                self.ensure_statement(id);
                self.open(ContextKind::Var, id);
            }
            "case" | "default" => {
                let end = self.last_code.unwrap_or(id);
                loop {
                    match self.tree.kind(self.top()) {
                        ContextKind::Statement | ContextKind::Var | ContextKind::LiteralElement => {
                            self.close_top(end);
                        }
                        _ => break,
                    }
                }
                if self.tree.kind(self.top()) == ContextKind::CaseBlock {
                    self.close_top(end);
                }
                self.open(ContextKind::CaseBlock, id);
                self.case_label = true;
            }
            "else" => {
                self.ensure_statement(id);
                self.pending_implied_block = Some((Pending::Else, id));
            }
            "do" => {
                self.ensure_statement(id);
                self.pending_implied_block = Some((Pending::Control, id));
            }
            _ => self.ensure_statement(id),
        }
    }

    fn handle_operator(&mut self, id: TokenId) {
        let class = self.classify_operator(id);
        self.stream.get_mut(id).metadata.operator_class = Some(class);

        if self.stream.get(id).text == "," {
            if self.tree.kind(self.top()) == ContextKind::LiteralElement {
                let end = self.last_code.unwrap_or(id);
                self.close_top(end);
                self.stream.get_mut(id).metadata.context = Some(self.top());
            }
            return;
        }
        if self.stream.get(id).text == ":"
            && self.case_label
            && self.tree.kind(self.top()) == ContextKind::CaseBlock
        {
            self.case_label = false;
            return;
        }
        self.ensure_statement(id);
    }

    fn classify_operator(&self, id: TokenId) -> OperatorClass {
        let text = self.stream.get(id).text.as_str();
        match text {
            "!" | "new" | "delete" | "typeof" | "void" => OperatorClass::UnaryPrefix,
            "++" | "--" => match self.last_code.map(|l| self.stream.get(l).kind) {
                Some(
                    TokenKind::Identifier
                    | TokenKind::SimpleLvalue
                    | TokenKind::Number
                    | TokenKind::EndParen
                    | TokenKind::EndBracket,
                ) => OperatorClass::UnaryPostfix,
                _ => OperatorClass::UnaryPrefix,
            },
            "+" | "-" => match self.last_code.map(|l| self.stream.get(l).kind) {
                None
                | Some(
                    TokenKind::Operator
                    | TokenKind::StartParen
                    | TokenKind::StartBracket
                    | TokenKind::StartBlock
                    | TokenKind::Semicolon
                    | TokenKind::Keyword,
                ) => OperatorClass::UnaryPrefix,
                _ => OperatorClass::Binary,
            },
            _ => OperatorClass::Binary,
        }
    }

    /// Statement-boundary inference at a line break.
    fn handle_line_end(&mut self, newline: TokenId) {
        if self.pending_implied_block.is_some() {
            // A control header is still waiting for its body.
            return;
        }
        let Some(last) = self.last_code else {
            return;
        };
        if self.stream.get(last).line_number != self.stream.get(newline).line_number {
            return;
        }
        if !self.in_open_statement() {
            return;
        }
        if !self.can_end_statement(last) {
            return;
        }
        if let Some(next) = self.stream.next_code(newline) {
            if self.continues_statement(next) {
                return;
            }
        }
        self.stream.get_mut(last).metadata.implied_semicolon = true;
        self.end_statement(last);
    }

    fn in_open_statement(&self) -> bool {
        let top = self.top();
        match self.tree.kind(top) {
            ContextKind::Statement => true,
            ContextKind::Var => {
                self.tree.parent(top).map(|p| self.tree.kind(p))
                    == Some(ContextKind::Statement)
            }
            _ => false,
        }
    }

    /// Whether a statement may end after this token.
    fn can_end_statement(&self, id: TokenId) -> bool {
        let token = self.stream.get(id);
        match token.kind {
            TokenKind::Identifier
            | TokenKind::Number
            | TokenKind::Regex
            | TokenKind::SingleQuoteStringEnd
            | TokenKind::DoubleQuoteStringEnd
            | TokenKind::TemplateStringEnd
            | TokenKind::EndParen
            | TokenKind::EndBracket
            | TokenKind::EndBlock => true,
            TokenKind::Operator => {
                token.metadata.operator_class == Some(OperatorClass::UnaryPostfix)
            }
            TokenKind::Keyword => {
                matches!(token.text.as_str(), "return" | "break" | "continue")
            }
            _ => false,
        }
    }

    /// Whether the next line's first code token continues the current
    /// statement rather than starting a new one.
    fn continues_statement(&self, id: TokenId) -> bool {
        let token = self.stream.get(id);
        match token.kind {
            TokenKind::Operator => !matches!(
                token.text.as_str(),
                "!" | "++" | "--" | "new" | "delete" | "typeof" | "void"
            ),
            TokenKind::StartBlock | TokenKind::StartParen | TokenKind::StartBracket => true,
            _ => false,
        }
    }

    /// Close the innermost statement (and any var declaration or implied
    /// block it terminates) at `end`.
    fn end_statement(&mut self, end: TokenId) {
        loop {
            match self.tree.kind(self.top()) {
                ContextKind::Var | ContextKind::LiteralElement => {
                    self.close_top(end);
                }
                ContextKind::Statement => {
                    self.close_top(end);
                    if self.tree.kind(self.top()) == ContextKind::ImpliedBlock {
                        self.close_top(end);
                        self.stream.get_mut(end).metadata.implied_block_close = true;
                        let statement = self.top();
                        let continues = self.stream.next_code(end).map_or(false, |next| {
                            let token = self.stream.get(next);
                            token.kind == TokenKind::Keyword
                                && self.statement_continues_with(statement, &token.text)
                        });
                        if continues {
                            break;
                        }
                        continue;
                    }
                    break;
                }
                _ => break,
            }
        }
    }

    /// End-of-file: a statement left open without a final newline still
    /// ends; unclosed blocks and groups keep an absent end token.
    fn finish(&mut self) {
        if self.pending_implied_block.is_some() {
            return;
        }
        let Some(last) = self.last_code else {
            return;
        };
        if self.in_open_statement() && self.can_end_statement(last) {
            self.stream.get_mut(last).metadata.implied_semicolon = true;
            self.end_statement(last);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexing::tokenize;

    fn analyze(source: &str) -> (TokenStream, ContextTree) {
        let (mut stream, _) = tokenize(source);
        let tree = build_contexts(&mut stream).expect("source should parse");
        (stream, tree)
    }

    fn context_kind_of(stream: &TokenStream, tree: &ContextTree, text: &str) -> ContextKind {
        let id = stream
            .ids()
            .find(|id| stream.get(*id).text == text)
            .expect("token present");
        let context = stream.get(id).metadata.context.expect("context set");
        tree.kind(context)
    }

    #[test]
    fn test_brace_disambiguation() {
        let (stream, tree) = analyze("x = {a: 1};\n");
        assert_eq!(context_kind_of(&stream, &tree, "{"), ContextKind::ObjectLiteral);

        let (stream, tree) = analyze("if (x) { y(); }\n");
        assert_eq!(context_kind_of(&stream, &tree, "{"), ContextKind::Block);
    }

    #[test]
    fn test_bracket_disambiguation() {
        let (stream, tree) = analyze("x = [1];\n");
        assert_eq!(context_kind_of(&stream, &tree, "["), ContextKind::ArrayLiteral);

        let (stream, tree) = analyze("y = x[0];\n");
        assert_eq!(context_kind_of(&stream, &tree, "["), ContextKind::Group);
    }

    #[test]
    fn test_for_group_semicolons_do_not_end_statement() {
        let (stream, tree) = analyze("for (var i = 0; i < n; i++) {\n  y();\n}\n");
        let semis: Vec<_> = stream
            .ids()
            .filter(|id| stream.get(*id).kind == TokenKind::Semicolon)
            .collect();
        // First two semicolons sit in the for header, the third ends y();.
        assert_eq!(tree.kind(stream.get(semis[0]).metadata.context.unwrap()), ContextKind::ForGroup);
        assert_eq!(tree.kind(stream.get(semis[1]).metadata.context.unwrap()), ContextKind::ForGroup);
        assert_eq!(tree.kind(stream.get(semis[2]).metadata.context.unwrap()), ContextKind::Statement);
    }

    #[test]
    fn test_implied_semicolon_at_line_break() {
        let (stream, _) = analyze("x = 1\ny = 2\n");
        let one = stream.ids().find(|id| stream.get(*id).text == "1").unwrap();
        assert!(stream.get(one).metadata.implied_semicolon);
    }

    #[test]
    fn test_operator_continuation_suppresses_implied_semicolon() {
        let (stream, _) = analyze("x = 1\n    + 2;\n");
        let one = stream.ids().find(|id| stream.get(*id).text == "1").unwrap();
        assert!(!stream.get(one).metadata.implied_semicolon);
    }

    #[test]
    fn test_implied_block_for_braceless_body() {
        let (stream, tree) = analyze("if (x)\n  y();\nz();\n");
        // The control keyword carries the flag so the body's indentation
        // contribution starts on the header line.
        let if_kw = stream.ids().find(|id| stream.get(*id).text == "if").unwrap();
        assert!(stream.get(if_kw).metadata.implied_block);
        let y = stream.ids().find(|id| stream.get(*id).text == "y").unwrap();
        assert!(!stream.get(y).metadata.implied_block);
        let y_context = stream.get(y).metadata.context.unwrap();
        let kinds: Vec<_> = tree.ancestors(y_context).map(|c| tree.kind(c)).collect();
        assert_eq!(
            kinds,
            vec![
                ContextKind::Statement,
                ContextKind::ImpliedBlock,
                ContextKind::Statement,
                ContextKind::Root,
            ]
        );
        let semi = stream
            .ids()
            .filter(|id| stream.get(*id).kind == TokenKind::Semicolon)
            .next()
            .unwrap();
        assert!(stream.get(semi).metadata.implied_block_close);
        // z(); is back at root level.
        let z = stream.ids().find(|id| stream.get(*id).text == "z").unwrap();
        let z_context = stream.get(z).metadata.context.unwrap();
        assert_eq!(tree.parent(z_context), Some(tree.root()));
    }

    #[test]
    fn test_else_if_chain_stays_flat() {
        let (stream, tree) = analyze("if (a) {\n} else if (b) {\n}\n");
        // One top-level statement: the whole chain.
        let root_children = tree.children(tree.root());
        assert_eq!(root_children.len(), 1);
        let b = stream.ids().find(|id| stream.get(*id).text == "b").unwrap();
        assert!(!stream.get(b).metadata.implied_block);
    }

    #[test]
    fn test_case_labels_live_in_case_blocks() {
        let (stream, tree) = analyze(
            "switch (x) {\n  case 1:\n    y();\n    break;\n  default:\n    z();\n}\n",
        );
        let colon = stream
            .ids()
            .find(|id| stream.get(*id).is_operator(":"))
            .unwrap();
        assert_eq!(
            tree.kind(stream.get(colon).metadata.context.unwrap()),
            ContextKind::CaseBlock
        );
        // y(); is a statement inside the case block.
        let y = stream.ids().find(|id| stream.get(*id).text == "y").unwrap();
        let y_context = stream.get(y).metadata.context.unwrap();
        assert_eq!(tree.kind(y_context), ContextKind::Statement);
        assert_eq!(
            tree.kind(tree.parent(y_context).unwrap()),
            ContextKind::CaseBlock
        );
    }

    #[test]
    fn test_literal_elements() {
        let (stream, tree) = analyze("x = {a: 1, b: 2};\n");
        let colons: Vec<_> = stream
            .ids()
            .filter(|id| stream.get(*id).is_operator(":"))
            .collect();
        for colon in colons {
            assert_eq!(
                tree.kind(stream.get(colon).metadata.context.unwrap()),
                ContextKind::LiteralElement
            );
        }
        let comma = stream.ids().find(|id| stream.get(*id).is_operator(",")).unwrap();
        assert_eq!(
            tree.kind(stream.get(comma).metadata.context.unwrap()),
            ContextKind::ObjectLiteral
        );
    }

    #[test]
    fn test_mismatched_closer_is_fatal_but_keeps_annotations() {
        let (mut stream, _) = tokenize("x = 1;\n)\n");
        let err = build_contexts(&mut stream).unwrap_err();
        assert_eq!(stream.get(err.token).text, ")");
        // Tokens before the error keep their annotations.
        let x = stream.ids().next().unwrap();
        assert!(stream.get(x).metadata.context.is_some());
        assert!(err.partial.len() > 1);
    }

    #[test]
    fn test_last_code_backlink() {
        let (stream, _) = analyze("x = 1;\n");
        let semi = stream
            .ids()
            .find(|id| stream.get(*id).kind == TokenKind::Semicolon)
            .unwrap();
        let last = stream.get(semi).metadata.last_code.unwrap();
        assert_eq!(stream.get(last).text, "1");
    }

    #[test]
    fn test_operator_classification() {
        let (stream, _) = analyze("x = -1 + y++;\n");
        let classes: Vec<_> = stream
            .ids()
            .filter(|id| stream.get(*id).kind == TokenKind::Operator)
            .map(|id| {
                (
                    stream.get(id).text.clone(),
                    stream.get(id).metadata.operator_class.unwrap(),
                )
            })
            .collect();
        assert_eq!(
            classes,
            vec![
                ("=".to_string(), OperatorClass::Binary),
                ("-".to_string(), OperatorClass::UnaryPrefix),
                ("+".to_string(), OperatorClass::Binary),
                ("++".to_string(), OperatorClass::UnaryPostfix),
            ]
        );
    }

    #[test]
    fn test_do_while_keeps_one_statement() {
        let (_, tree) = analyze("do x();\nwhile (y);\n");
        assert_eq!(tree.children(tree.root()).len(), 1);
    }

    #[test]
    fn test_rerun_produces_identical_tree() {
        let source = "if (a) {\n  b = {c: 1};\n}\n";
        let (mut stream, _) = tokenize(source);
        let first = build_contexts(&mut stream).unwrap();
        let second = build_contexts(&mut stream).unwrap();
        assert_eq!(first, second);
    }
}

//! Indentation inference and checking
//!
//! The engine keeps one stack of tokens that can affect indentation. Block
//! openers (and implied blocks) require a fixed +2; continuation tokens
//! (open parens, trailing operators, assignments) require +4, with entries
//! in the same unbroken continuation widening the allowable set instead of
//! replacing it. On top of the additive columns, some entries register
//! hard stops: exact columns anchored to their own source position (one
//! past an open paren, past `return`, past an assignment operator).
//!
//! JavaScript indentation conventions are flexible, so the engine follows
//! a no-false-positives approach and builds the most permissive set it
//! can. When a line still falls outside the set, one diagnostic is
//! reported and a per-line correction offset is remembered so hard stops
//! computed from that line use the intended column instead of cascading
//! further reports.

use std::collections::{BTreeSet, HashMap};

use log::debug;

use crate::config::CheckConfig;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::structure::{ContextKind, ContextTree};
use crate::tokens::{TokenId, TokenKind, TokenStream};

/// One entry of the indentation stack.
#[derive(Debug, Clone)]
struct TokenInfo {
    token: TokenId,
    /// Block indentation (+2) rather than continuation (+4).
    is_block: bool,
    /// Removed automatically at statement boundaries instead of waiting
    /// for a matching end token.
    is_transient: bool,
    /// Token whose indentation requirement replaces this entry's while the
    /// override is active.
    overridden_by: Option<TokenId>,
    /// The override survives even after the overriding token leaves the
    /// stack, as in:
    /// ```text
    /// x([
    ///   1],
    /// 2);
    /// ```
    is_permanent_override: bool,
    /// Effective line number of this entry.
    line_number: usize,
}

impl TokenInfo {
    fn new(stream: &TokenStream, token: TokenId, is_block: bool) -> Self {
        let kind = stream.get(token).kind;
        TokenInfo {
            token,
            is_block,
            is_transient: !is_block
                && !matches!(kind, TokenKind::StartParen | TokenKind::StartParameters),
            overridden_by: None,
            is_permanent_override: false,
            line_number: stream.get(token).line_number,
        }
    }
}

/// Check every line of the stream against its allowable indentation set.
pub fn check_indentation(
    stream: &TokenStream,
    tree: &ContextTree,
    config: &CheckConfig,
) -> Vec<Diagnostic> {
    let mut checker = IndentationChecker {
        stream,
        tree,
        config,
        stack: Vec::new(),
        start_index_offset: HashMap::new(),
    };
    let mut diagnostics = Vec::new();
    for id in stream.ids() {
        checker.check_token(id, &mut diagnostics);
    }
    checker.finish(&mut diagnostics);
    diagnostics
}

struct IndentationChecker<'a> {
    stream: &'a TokenStream,
    tree: &'a ContextTree,
    config: &'a CheckConfig,
    stack: Vec<TokenInfo>,
    /// Per-line correction applied to hard-stop arithmetic after a line
    /// was reported, keyed by line number.
    start_index_offset: HashMap<usize, i64>,
}

impl<'a> IndentationChecker<'a> {
    fn check_token(&mut self, id: TokenId, diagnostics: &mut Vec<Diagnostic>) {
        let kind = self.stream.get(id).kind;
        let is_first = self.stream.is_first_non_space_in_line(id);

        // Entries that decrease indentation come off before the check.
        match kind {
            TokenKind::EndParen => {
                self.pop_to(TokenKind::StartParen);
            }
            TokenKind::EndParameters => {
                self.pop_to(TokenKind::StartParameters);
            }
            TokenKind::EndBracket => {
                self.pop_to(TokenKind::StartBracket);
            }
            TokenKind::EndBlock => {
                if let Some(start) = self.pop_to(TokenKind::StartBlock) {
                    if self.alias_block_marker(start.token).is_some() {
                        self.check_alias_block_close_comment(id, &start, diagnostics);
                    }
                }
            }
            TokenKind::Keyword
                if matches!(self.stream.get(id).text.as_str(), "case" | "default") =>
            {
                if let Some(block) = self.pop_to(TokenKind::StartBlock) {
                    self.add(block);
                }
            }
            TokenKind::Semicolon => self.pop_transient(),
            _ => {}
        }

        if is_first
            && !matches!(
                kind,
                TokenKind::Comment | TokenKind::DocPrefix | TokenKind::StringText
            )
        {
            self.check_line(id, kind, diagnostics);
        }

        // Entries that increase indentation go on after the check.
        let token = self.stream.get(id);
        if kind == TokenKind::StartBracket {
            let is_block = self.context_kind(id) == Some(ContextKind::ArrayLiteral);
            self.add(TokenInfo::new(self.stream, id, is_block));
        } else if kind == TokenKind::StartBlock || token.metadata.implied_block {
            self.add(TokenInfo::new(self.stream, id, true));
        } else if matches!(kind, TokenKind::StartParen | TokenKind::StartParameters) {
            self.add(TokenInfo::new(self.stream, id, false));
        } else if token.is_keyword("return") {
            self.add(TokenInfo::new(self.stream, id, false));
        } else if !self.stream.is_last_code_in_line(id)
            && (token.is_assignment() || token.is_operator("?"))
        {
            self.add(TokenInfo::new(self.stream, id, false));
        }

        if self.stream.get(id).metadata.implied_block_close {
            let closed = self.implied_blocks_closed_at(id).max(1);
            for _ in 0..closed {
                self.pop_to_implied_block();
            }
        }

        // Some entries only matter when the token ends its line.
        if self.stream.is_last_code_in_line(id) {
            self.handle_line_final_token(id);
        } else if self.stream.get(id).is_assignment() {
            self.add(TokenInfo::new(self.stream, id, false));
        }
    }

    fn check_line(&mut self, id: TokenId, kind: TokenKind, diagnostics: &mut Vec<Diagnostic>) {
        let line_number = self.stream.get(id).line_number;
        if self.config.debug_indentation {
            debug!("line {}: stack {:?}", line_number, self.stack);
        }

        let mut expected = self.allowable_indentations();

        // Comments describing else, case, and default may outdent to the
        // parent block.
        if kind.is_comment() {
            let mut next_code = self.stream.next_code(id);
            if let Some(nc) = next_code {
                if self.stream.get(nc).kind == TokenKind::EndBlock {
                    next_code = self.stream.next_code(nc);
                }
            }
            if let Some(nc) = next_code {
                if matches!(
                    self.stream.get(nc).text.as_str(),
                    "else" | "case" | "default"
                ) {
                    let outdented: BTreeSet<i64> = expected.iter().map(|x| x - 2).collect();
                    expected.extend(outdented);
                }
            }
        }

        let Some(actual) = self.actual_indentation(id) else {
            // Tab-indented lines are reported elsewhere.
            return;
        };
        if expected.contains(&(actual as i64)) {
            return;
        }

        let shown: Vec<String> = expected
            .iter()
            .filter(|x| (**x) < self.config.max_line_length as i64)
            .map(|x| x.to_string())
            .collect();
        let first = expected.iter().next().copied().unwrap_or(0);
        diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::WrongIndentation,
                format!(
                    "Wrong indentation: expected any of {{{}}} but got {}",
                    shown.join(", "),
                    actual
                ),
                id,
            )
            .with_position(actual, first.max(0) as usize),
        );
        self.start_index_offset
            .insert(line_number, first - actual as i64);
    }

    /// Stack growth decided by the last code token on a line.
    fn handle_line_final_token(&mut self, id: TokenId) {
        let token = self.stream.get(id);
        let kind = token.kind;
        let next_code = self.stream.next_code(id);

        if kind == TokenKind::Operator {
            if token.text == ":" {
                let top_is_question = self
                    .stack
                    .last()
                    .map_or(false, |info| self.stream.get(info.token).text == "?");
                if top_is_question {
                    // A ternary `:` on the same line as its `?` adds the
                    // continuation; on a later line it adds nothing.
                    let top_line = self
                        .stack
                        .last()
                        .map(|info| self.stream.get(info.token).line_number);
                    if top_line == Some(token.line_number) {
                        self.add(TokenInfo::new(self.stream, id, false));
                    }
                } else if self.context_kind(id) == Some(ContextKind::CaseBlock) {
                    // The label's own continuation ends here; the case body
                    // is a block.
                    self.pop_transient();
                    self.add(TokenInfo::new(self.stream, id, true));
                } else if self.context_kind(id) == Some(ContextKind::LiteralElement) {
                    self.add(TokenInfo::new(self.stream, id, false));
                }
                // Otherwise a statement label: no effect on indentation.
            } else if token.text != "," {
                self.add(TokenInfo::new(self.stream, id, false));
            } else if self.context_kind(id) == Some(ContextKind::Var) {
                self.add(TokenInfo::new(self.stream, id, false));
            } else if self.context_kind(id) != Some(ContextKind::Parameters) {
                self.pop_transient();
            }
        } else if next_code.map_or(false, |nc| {
            let next = self.stream.get(nc);
            next.kind == TokenKind::Operator && !next.metadata.is_unary_operator()
        }) {
            // The statement is continued by an operator on the next line.
            self.add(TokenInfo::new(self.stream, id, false));
        } else if kind == TokenKind::Parameters && token.text.trim_end().ends_with(',') {
            self.add(TokenInfo::new(self.stream, id, false));
        } else if matches!(token.text.as_str(), "var" | "let" | "const")
            && kind == TokenKind::Keyword
        {
            self.add(TokenInfo::new(self.stream, id, false));
        } else if token.metadata.implied_semicolon {
            self.pop_transient();
        }
    }

    fn context_kind(&self, id: TokenId) -> Option<ContextKind> {
        self.stream
            .get(id)
            .metadata
            .context
            .map(|c| self.tree.kind(c))
    }

    fn is_hard_stop(&self, id: TokenId) -> bool {
        let token = self.stream.get(id);
        matches!(
            token.kind,
            TokenKind::StartParen | TokenKind::StartParameters | TokenKind::StartBracket
        ) || matches!(token.text.as_str(), "return" | "?")
            || token.is_assignment()
    }

    /// The set of acceptable leading-space counts given the current stack.
    fn allowable_indentations(&self) -> BTreeSet<i64> {
        let mut expected: BTreeSet<i64> = BTreeSet::new();
        expected.insert(0);
        let mut hard_stops: BTreeSet<i64> = BTreeSet::new();

        // Whether entries are still in the same continuation, where extra
        // indentation is optional:
        //   x = 5 +
        //       6 +
        //       7;
        // The second `+` adds no required indentation.
        let mut in_same_continuation = false;

        for info in &self.stack {
            let token = self.stream.get(info.token);

            if info.overridden_by.is_none() && token.text != "return" {
                if info.is_block {
                    expected = add_to_each(&expected, 2);
                    hard_stops = add_to_each(&hard_stops, 2);
                    in_same_continuation = false;
                } else if in_same_continuation {
                    let widened = add_to_each(&expected, 4);
                    expected.extend(widened);
                    let widened_stops = add_to_each(&hard_stops, 4);
                    hard_stops.extend(widened_stops);
                } else {
                    expected = add_to_each(&expected, 4);
                    let widened_stops = add_to_each(&hard_stops, 4);
                    hard_stops.extend(widened_stops);
                    in_same_continuation = true;
                }
            }

            if self.is_hard_stop(info.token) {
                let override_is_hard_stop = info
                    .overridden_by
                    .map_or(false, |o| self.is_hard_stop(o));

                if token.kind == TokenKind::StartParen {
                    // someFunction(... also allows the identifier's own
                    // column + 4.
                    if let Some(prev) = self.stream.prev_token(info.token) {
                        let p = self.stream.get(prev);
                        if p.kind == TokenKind::Identifier
                            && p.line_number == token.line_number
                        {
                            hard_stops.insert(p.start_index as i64 + 4);
                        }
                    }
                }

                if !override_is_hard_stop {
                    let mut start_index = token.start_index as i64;
                    if let Some(offset) = self.start_index_offset.get(&token.line_number) {
                        start_index += offset;
                    }
                    if matches!(
                        token.kind,
                        TokenKind::StartParen | TokenKind::StartParameters
                    ) && info.overridden_by.is_none()
                    {
                        hard_stops.insert(start_index + 1);
                    } else if token.text == "return" && info.overridden_by.is_none() {
                        hard_stops.insert(start_index + 7);
                    } else if token.kind == TokenKind::StartBracket {
                        hard_stops.insert(start_index + 1);
                    } else if token.is_assignment() {
                        hard_stops.insert(start_index + token.length() as i64 + 1);
                    } else if token.is_operator("?") && info.overridden_by.is_none() {
                        hard_stops.insert(start_index + 2);
                    }
                }
            }
        }

        expected.extend(hard_stops);
        expected
    }

    /// Leading-space count of the line containing `id`; `None` when the
    /// line is tab-indented and should be skipped.
    fn actual_indentation(&self, id: TokenId) -> Option<usize> {
        let first = self.stream.first_in_line(id);
        let token = self.stream.get(first);
        match token.kind {
            TokenKind::Whitespace => {
                if token.text.contains('\t') {
                    None
                } else {
                    Some(token.text.len())
                }
            }
            TokenKind::Parameters => {
                Some(token.text.len() - token.text.trim_start().len())
            }
            _ => Some(0),
        }
    }

    /// The marker identifier when `block_token` opens an aliasing block
    /// (whose contents conventionally do not indent).
    fn alias_block_marker(&self, block_token: TokenId) -> Option<TokenId> {
        if self.stream.get(block_token).kind != TokenKind::StartBlock {
            return None;
        }
        let context = self.stream.get(block_token).metadata.context?;
        let statement = self
            .tree
            .ancestors(context)
            .find(|c| self.tree.kind(*c) == ContextKind::Statement)?;
        let start = self.tree.get(statement).start_token?;
        let token = self.stream.get(start);
        if token.kind == TokenKind::Identifier && token.text == self.config.alias_marker {
            Some(start)
        } else {
            None
        }
    }

    /// The closing line of an aliasing block must end with the exact
    /// trailing comment `;  // <marker>`.
    fn check_alias_block_close_comment(
        &self,
        end_block: TokenId,
        start: &TokenInfo,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let line = self.stream.line_text(end_block);
        let line = line.strip_suffix('\n').unwrap_or(&line);
        let suffix = format!(";  // {}", self.config.alias_marker);
        if line.ends_with(&suffix) {
            return;
        }
        let token = self.stream.get(end_block);
        let comment_at = line.find("//");
        let marker_after_comment = match comment_at {
            Some(at) => line
                .rfind(self.config.alias_marker.as_str())
                .map_or(false, |m| m > at),
            None => false,
        };
        let diagnostic = if marker_after_comment {
            Diagnostic::new(
                DiagnosticCode::MalformedAliasBlockEndComment,
                format!(
                    "Malformed end of aliasing block comment. Please use the exact \
                     following syntax to close the scope:\n}});  // {}",
                    self.config.alias_marker
                ),
                end_block,
            )
        } else {
            Diagnostic::new(
                DiagnosticCode::MissingAliasBlockEndComment,
                format!(
                    "Missing comment for end of aliasing block which opened at line \
                     {}. End the scope with:\n}});  // {}",
                    start.line_number, self.config.alias_marker
                ),
                end_block,
            )
        };
        diagnostics.push(diagnostic.with_position(token.start_index, token.length()));
    }

    /// How many implied blocks end exactly at this token.
    fn implied_blocks_closed_at(&self, id: TokenId) -> usize {
        self.tree
            .iter()
            .filter(|(_, c)| c.kind == ContextKind::ImpliedBlock && c.end_token == Some(id))
            .count()
    }

    fn add(&mut self, mut info: TokenInfo) {
        if self
            .stack
            .last()
            .map_or(false, |top| top.token == info.token)
        {
            // Never add the same token twice.
            return;
        }

        let token_kind = self.stream.get(info.token).kind;
        if info.is_block || token_kind == TokenKind::StartParen {
            // Aliasing blocks do not indent their contents; their entry is
            // born overridden.
            info.overridden_by = self.alias_block_marker(info.token);

            if token_kind == TokenKind::StartBlock
                && self.context_kind(info.token) == Some(ContextKind::Block)
            {
                // function() {} assignments get special treatment: the
                // block contents may indent by two even when `{` and `=`
                // sit on different lines:
                //   long.long.name = function(
                //       a) {
                // The override applies to every earlier stack entry that is
                // part of the assignment of the block.
                let has_assignment = self
                    .stack
                    .iter()
                    .any(|x| self.stream.get(x.token).is_assignment());
                if has_assignment {
                    let mut last_token = self.stream.prev_token(info.token);
                    for stack_info in self.stack.iter_mut().rev() {
                        let Some(until) = last_token else { break };
                        if !funprop_assign_range(self.stream, stack_info.token, until) {
                            break;
                        }
                        stack_info.overridden_by = Some(info.token);
                        stack_info.is_permanent_override = true;
                        last_token = Some(stack_info.token);
                    }
                }
            }

            // Multi-line blocks have lasting overrides, as in:
            //   callFn({
            //     a: 10
            //   },
            //   30);
            let close_line = if token_kind == TokenKind::StartBlock {
                self.stream
                    .get(info.token)
                    .metadata
                    .context
                    .and_then(|c| self.tree.get(c).end_token)
                    .map(|e| self.stream.get(e).line_number)
            } else {
                None
            };

            // Tokens only override each other when they share a line.
            for stack_info in self.stack.iter_mut().rev() {
                if stack_info.line_number != info.line_number {
                    break;
                }
                stack_info.overridden_by = Some(info.token);
                if token_kind == TokenKind::StartBlock {
                    let earlier = self.stream.get(stack_info.token);
                    if earlier.is_assignment()
                        || matches!(
                            earlier.kind,
                            TokenKind::Identifier | TokenKind::StartParen
                        )
                    {
                        stack_info.is_permanent_override =
                            close_line.map_or(false, |l| l != info.line_number);
                    }
                }
            }
        }

        self.stack.push(info);
    }

    fn pop(&mut self) -> Option<TokenInfo> {
        let info = self.stack.pop()?;
        let kind = self.stream.get(info.token).kind;
        if !matches!(kind, TokenKind::StartBlock | TokenKind::StartBracket) {
            self.remove_overrides(&info);
        } else {
            // Braces and brackets can be literals; only drop their
            // overrides when the literal closes on its opening line.
            let goal = if kind == TokenKind::StartBracket {
                TokenKind::EndBracket
            } else {
                TokenKind::EndBlock
            };
            let line = self.stream.get(info.token).line_number;
            let mut count = 0i32;
            let mut cursor = Some(info.token);
            while let Some(t) = cursor {
                if self.stream.get(t).line_number != line {
                    break;
                }
                let k = self.stream.get(t).kind;
                if k == goal {
                    count -= 1;
                    if count == 0 {
                        self.remove_overrides(&info);
                        break;
                    }
                }
                if k == kind {
                    count += 1;
                }
                cursor = self.stream.next_token(t);
            }
        }
        Some(info)
    }

    fn pop_to(&mut self, stop_kind: TokenKind) -> Option<TokenInfo> {
        loop {
            let info = self.pop()?;
            if self.stream.get(info.token).kind == stop_kind {
                return Some(info);
            }
        }
    }

    fn pop_to_implied_block(&mut self) {
        loop {
            match self.pop() {
                None => return,
                Some(info) => {
                    if self.stream.get(info.token).metadata.implied_block {
                        return;
                    }
                }
            }
        }
    }

    fn pop_transient(&mut self) {
        while self.stack.last().map_or(false, |info| info.is_transient) {
            self.pop();
        }
    }

    /// Reactivate entries this token had overridden, unless permanent.
    fn remove_overrides(&mut self, info: &TokenInfo) {
        for stack_info in &mut self.stack {
            if stack_info.overridden_by == Some(info.token)
                && !stack_info.is_permanent_override
            {
                stack_info.overridden_by = None;
            }
        }
    }

    /// A non-empty stack at end of file is an internal defect, surfaced as
    /// a diagnostic so one bad file cannot abort a batch.
    fn finish(&mut self, diagnostics: &mut Vec<Diagnostic>) {
        if self.stack.is_empty() {
            return;
        }
        let top = self.stack.last().map(|info| info.token);
        let mut diagnostic = Diagnostic {
            code: DiagnosticCode::InternalConsistency,
            message: format!(
                "indentation stack is not empty at end of file ({} open entries)",
                self.stack.len()
            ),
            token: top,
            position: None,
            fix_hint: None,
        };
        if let Some(token) = top {
            let t = self.stream.get(token);
            diagnostic = diagnostic.with_position(t.start_index, t.length());
        }
        diagnostics.push(diagnostic);
        self.stack.clear();
    }
}

fn add_to_each(set: &BTreeSet<i64>, amount: i64) -> BTreeSet<i64> {
    set.iter().map(|x| x + amount).collect()
}

/// Whether every token in `start..=end` is legal inside a function
/// declaration assigned into a property.
fn funprop_assign_range(stream: &TokenStream, start: TokenId, end: TokenId) -> bool {
    let mut cursor = Some(start);
    while let Some(id) = cursor {
        let token = stream.get(id);
        let fn_decl = matches!(
            token.kind,
            TokenKind::FunctionDeclaration
                | TokenKind::Parameters
                | TokenKind::StartParameters
                | TokenKind::EndParameters
                | TokenKind::EndParen
        );
        let identifier_or_dot = matches!(
            token.kind,
            TokenKind::Identifier | TokenKind::SimpleLvalue | TokenKind::FunctionName
        ) || token.is_operator(".");
        if !fn_decl
            && token.is_code()
            && !identifier_or_dot
            && !token.is_assignment()
            && !token.is_operator(",")
        {
            return false;
        }
        if id == end {
            break;
        }
        cursor = stream.next_token(id);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexing::tokenize;
    use crate::structure::build_contexts;

    fn check(source: &str) -> Vec<Diagnostic> {
        check_with(source, &CheckConfig::default())
    }

    fn check_with(source: &str, config: &CheckConfig) -> Vec<Diagnostic> {
        let (mut stream, _) = tokenize(source);
        let tree = build_contexts(&mut stream).expect("source should parse");
        check_indentation(&stream, &tree, config)
    }

    fn indentation_errors(diagnostics: &[Diagnostic]) -> usize {
        diagnostics
            .iter()
            .filter(|d| d.code == DiagnosticCode::WrongIndentation)
            .count()
    }

    #[test]
    fn test_block_indents_by_two() {
        let diagnostics = check("if (x) {\n  y();\n}\n");
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn test_misindented_block_line_is_reported() {
        let diagnostics = check("if (x) {\n    y();\n}\n");
        assert_eq!(indentation_errors(&diagnostics), 1);
        assert!(diagnostics[0].message.contains("expected any of"));
        assert!(diagnostics[0].message.contains("got 4"));
    }

    #[test]
    fn test_continuation_line_allows_hard_stop_after_paren() {
        // The open paren sits at column 10; column 11 lines up one past it.
        let diagnostics = check("abcdefghij(\n           42);\n");
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn test_closing_paren_may_return_to_column_zero() {
        let diagnostics = check("abcdefghij(\n);\n");
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn test_continuation_between_the_stops_is_reported() {
        let diagnostics = check("abcdefghij(\n      42);\n");
        assert_eq!(indentation_errors(&diagnostics), 1);
    }

    #[test]
    fn test_chained_continuation_keeps_options_open() {
        // The second `+` must not demand further indentation.
        let diagnostics = check("x = 5 +\n    6 +\n    7;\n");
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn test_switch_case_shape() {
        let source = "switch (x) {\n  case 1:\n    y();\n    break;\n  default:\n    z();\n}\n";
        let diagnostics = check(source);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn test_braceless_body_indents_like_a_block() {
        let diagnostics = check("if (x)\n  y();\nz();\n");
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn test_self_correction_avoids_cascading_reports() {
        // Only the first line is off; the brace and body line up with the
        // intended column and must not be re-reported.
        let source = "if (x) {\n   y();\n}\n";
        let diagnostics = check(source);
        assert_eq!(indentation_errors(&diagnostics), 1);
    }

    #[test]
    fn test_unclosed_paren_surfaces_internal_consistency() {
        let diagnostics = check("foo(\n");
        assert!(diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::InternalConsistency));
    }

    #[test]
    fn test_alias_block_contents_do_not_indent() {
        let source = "goog.scope(function() {\nvar x = 1;\n});  // goog.scope\n";
        let diagnostics = check(source);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn test_alias_block_missing_close_comment() {
        let source = "goog.scope(function() {\nvar x = 1;\n});\n";
        let diagnostics = check(source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].code,
            DiagnosticCode::MissingAliasBlockEndComment
        );
    }

    #[test]
    fn test_alias_block_malformed_close_comment() {
        let source = "goog.scope(function() {\nvar x = 1;\n}); // end goog.scope\n";
        let diagnostics = check(source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].code,
            DiagnosticCode::MalformedAliasBlockEndComment
        );
    }

    #[test]
    fn test_tab_indented_lines_are_skipped() {
        let diagnostics = check("if (x) {\n\ty();\n}\n");
        assert_eq!(indentation_errors(&diagnostics), 0);
    }

    #[test]
    fn test_object_literal_members_indent_by_two() {
        let diagnostics = check("x = {\n  a: 1,\n  b: 2\n};\n");
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn test_return_hard_stop() {
        // Continuation after `return` may line up past the keyword.
        let diagnostics = check("return x +\n    y;\n");
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let diagnostics = check("return x +\n       y;\n");
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }
}

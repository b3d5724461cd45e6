//! Alias resolution for namespaced symbols
//!
//! Inside an aliasing block (a `<marker>(function() { ... });` statement at
//! top level, `goog.scope` by default) local short names may stand in for
//! fully qualified symbols:
//!
//! ```text
//! goog.scope(function() {
//! var Widget = ns.ui.Widget;
//! Widget.prototype.render = function() { ... };
//! });  // goog.scope
//! ```
//!
//! The resolver runs two phases. Phase A collects module-style bindings in
//! top-level statements (`var Widget = goog.require('ns.ui.Widget');`) into
//! a global alias map. Phase B walks every aliasing block with a local copy
//! of that map, registering block-local `var` bindings (following aliases
//! of aliases to their ultimate target) and annotating every identifier —
//! including identifiers inside doc-comment type annotations — whose
//! leading dotted segment names a registered alias with the expanded
//! canonical symbol. Expansion substitutes only the leading segment, so
//! `Widget.prototype.render` becomes `ns.ui.Widget.prototype.render`.
//!
//! Marker misuse (a marker that is not a direct top-level statement, or a
//! second marker in one file) is reported but never halts resolution.

use std::collections::HashMap;

use crate::config::CheckConfig;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::structure::{ContextId, ContextKind, ContextTree};
use crate::tokens::{TokenId, TokenKind, TokenStream};

/// Scoped short-name to canonical-symbol map.
pub type AliasMap = HashMap<String, String>;

/// Resolve aliases across the file, annotating tokens in place, and report
/// marker usage errors.
pub fn resolve_aliases(
    stream: &mut TokenStream,
    tree: &ContextTree,
    config: &CheckConfig,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let markers: Vec<TokenId> = stream
        .ids()
        .filter(|id| {
            let token = stream.get(*id);
            token.kind == TokenKind::Identifier && token.text == config.alias_marker
        })
        .collect();

    for marker in &markers {
        if !marker_is_top_level(stream, tree, *marker) {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::InvalidAliasMarkerUse,
                format!("{} call not in global scope", config.alias_marker),
                *marker,
            ));
        }
    }
    // There should be only one marker per file; every later one is an
    // extra-usage error, but its block is still resolved.
    for marker in markers.iter().skip(1) {
        diagnostics.push(Diagnostic::new(
            DiagnosticCode::ExtraAliasMarker,
            format!("More than one {} call in file.", config.alias_marker),
            *marker,
        ));
    }

    if config.tracked_prefixes.is_empty() {
        return diagnostics;
    }

    let global_map = collect_module_bindings(stream, tree, config);

    for marker in &markers {
        if let Some(block) = aliasing_block_for_marker(stream, tree, *marker) {
            process_block(stream, tree, config, block, global_map.clone());
        }
    }

    diagnostics
}

fn marker_is_top_level(stream: &TokenStream, tree: &ContextTree, marker: TokenId) -> bool {
    let Some(context) = stream.get(marker).metadata.context else {
        return false;
    };
    tree.kind(context) == ContextKind::Statement
        && tree.parent(context).map(|p| tree.kind(p)) == Some(ContextKind::Root)
}

/// The function-body block of a marker statement, found as the first block
/// context nested under the statement.
fn aliasing_block_for_marker(
    stream: &TokenStream,
    tree: &ContextTree,
    marker: TokenId,
) -> Option<ContextId> {
    let statement = stream.get(marker).metadata.context?;
    let mut queue: Vec<ContextId> = tree.children(statement).to_vec();
    while let Some(context) = queue.pop() {
        if tree.kind(context) == ContextKind::Block {
            return Some(context);
        }
        queue.extend_from_slice(tree.children(context));
    }
    None
}

/// Phase A: `var Name = <ns>.require('sym');`-style bindings in top-level
/// statements, where `<ns>` is the marker's leading segment.
fn collect_module_bindings(
    stream: &TokenStream,
    tree: &ContextTree,
    config: &CheckConfig,
) -> AliasMap {
    let mut map = AliasMap::new();
    let namespace = config.marker_namespace();
    let binding_calls = [
        format!("{namespace}.require"),
        format!("{namespace}.requireType"),
        format!("{namespace}.forwardDeclare"),
        format!("{namespace}.module.get"),
    ];

    for statement in tree.children(tree.root()) {
        if tree.kind(*statement) != ContextKind::Statement {
            continue;
        }
        for var_context in tree.children(*statement) {
            if tree.kind(*var_context) != ContextKind::Var {
                continue;
            }
            if let Some((name, symbol)) =
                match_module_binding(stream, tree, *var_context, &binding_calls)
            {
                // Module bindings cannot use further aliases; the symbol is
                // the required string itself.
                if config.tracks(&symbol) {
                    map.insert(name, symbol);
                }
            }
        }
    }
    map
}

/// Match `var Name = call('symbol')` inside a var context.
fn match_module_binding(
    stream: &TokenStream,
    tree: &ContextTree,
    var_context: ContextId,
    binding_calls: &[String],
) -> Option<(String, String)> {
    let keyword = tree.get(var_context).start_token?;
    let name = stream.next_code(keyword)?;
    let name_token = stream.get(name);
    if !matches!(
        name_token.kind,
        TokenKind::Identifier | TokenKind::SimpleLvalue
    ) {
        return None;
    }
    let equals = stream.next_code(name)?;
    if !stream.get(equals).is_operator("=") {
        return None;
    }
    let callee = stream.next_code(equals)?;
    let callee_token = stream.get(callee);
    if callee_token.kind != TokenKind::Identifier
        || !binding_calls.iter().any(|c| c == &callee_token.text)
    {
        return None;
    }
    let paren = stream.next_code(callee)?;
    if stream.get(paren).kind != TokenKind::StartParen {
        return None;
    }
    // Skip the string delimiter to its text.
    let quote = stream.next_code(paren)?;
    if !matches!(
        stream.get(quote).kind,
        TokenKind::SingleQuoteStringStart | TokenKind::DoubleQuoteStringStart
    ) {
        return None;
    }
    let text = stream.next_code(quote)?;
    if stream.get(text).kind != TokenKind::StringText {
        return None;
    }
    Some((name_token.text.clone(), stream.get(text).text.clone()))
}

/// Match `var Name = dotted.identifier;` directly inside an aliasing block.
fn match_scope_binding(
    stream: &TokenStream,
    tree: &ContextTree,
    var_context: ContextId,
) -> Option<(String, String)> {
    let keyword = tree.get(var_context).start_token?;
    let name = stream.next_code(keyword)?;
    let name_token = stream.get(name);
    if !matches!(
        name_token.kind,
        TokenKind::Identifier | TokenKind::SimpleLvalue
    ) {
        return None;
    }
    let equals = stream.next_code(name)?;
    if !stream.get(equals).is_operator("=") {
        return None;
    }
    let value = stream.next_code(equals)?;
    let value_token = stream.get(value);
    if value_token.kind != TokenKind::Identifier {
        return None;
    }
    // The right-hand side must be the whole value: a following semicolon
    // or an implied one.
    let terminated = match stream.next_code(value) {
        None => true,
        Some(next) => {
            stream.get(next).kind == TokenKind::Semicolon
                || value_token.metadata.implied_semicolon
        }
    };
    if !terminated {
        return None;
    }
    Some((name_token.text.clone(), value_token.text.clone()))
}

/// `Local.prototype.m` -> `ns.foo.Bar.prototype.m` when `Local` is mapped
/// to `ns.foo.Bar`. Substitution applies to the leading segment only.
fn alias_for_identifier(identifier: &str, map: &AliasMap) -> Option<String> {
    let namespace = identifier.split('.').next().unwrap_or(identifier);
    map.get(namespace)
        .map(|symbol| format!("{}{}", symbol, &identifier[namespace.len()..]))
}

/// Phase B for one aliasing block, with its own copy of the global map.
fn process_block(
    stream: &mut TokenStream,
    tree: &ContextTree,
    config: &CheckConfig,
    block: ContextId,
    mut map: AliasMap,
) {
    let mut seen_contexts: Vec<ContextId> = Vec::new();
    let Some(start) = tree.get(block).start_token else {
        return;
    };

    let mut cursor = Some(start);
    while let Some(id) = cursor {
        let token_context = stream.get(id).metadata.context;
        let Some(token_context) = token_context else {
            cursor = stream.next_token(id);
            continue;
        };
        if !tree.is_within(token_context, block) {
            break;
        }

        // Multiple tokens share one context; register each var binding
        // only once.
        if !seen_contexts.contains(&token_context) {
            seen_contexts.push(token_context);
            if tree.kind(token_context) == ContextKind::Var
                && var_sits_directly_in_block(tree, token_context, block)
            {
                if let Some((name, symbol)) = match_scope_binding(stream, tree, token_context) {
                    // An alias of an alias resolves to its ultimate target.
                    let symbol = alias_for_identifier(&symbol, &map).unwrap_or(symbol);
                    if config.tracks(&symbol) {
                        map.insert(name, symbol);
                    }
                }
            }
        }

        let kind = stream.get(id).kind;
        if matches!(kind, TokenKind::Identifier | TokenKind::SimpleLvalue) {
            if let Some(identifier) = full_identifier_at(stream, id) {
                if let Some(symbol) = alias_for_identifier(&identifier, &map) {
                    stream.get_mut(id).metadata.aliased_symbol = Some(symbol);
                }
            }
        } else if kind == TokenKind::DocFlag {
            if let Some(payload) = stream.get_mut(id).metadata.doc_flag.as_mut() {
                if let Some(jstype) = payload.jstype.as_mut() {
                    jstype.for_each_mut(&mut |node| {
                        if let Some(symbol) = alias_for_identifier(&node.identifier, &map) {
                            node.alias = Some(symbol);
                        }
                    });
                }
            }
        }

        cursor = stream.next_token(id);
    }
}

/// Whether the var context's statement sits directly inside `block`.
fn var_sits_directly_in_block(tree: &ContextTree, var_context: ContextId, block: ContextId) -> bool {
    let Some(statement) = tree.parent(var_context) else {
        return false;
    };
    if tree.kind(statement) != ContextKind::Statement {
        return false;
    }
    tree.parent(statement) == Some(block)
}

/// The full dotted identifier led by `id`, reassembling pieces wrapped
/// across lines; `None` when `id` is itself a continuation piece.
fn full_identifier_at(stream: &TokenStream, id: TokenId) -> Option<String> {
    if let Some(prev) = stream.prev_code(id) {
        if stream.get(prev).is_operator(".") {
            return None;
        }
    }
    let mut identifier = stream.get(id).text.clone();
    let mut cursor = id;
    loop {
        let Some(dot) = stream.next_code(cursor) else {
            break;
        };
        if !stream.get(dot).is_operator(".") {
            break;
        }
        let Some(piece) = stream.next_code(dot) else {
            break;
        };
        let piece_token = stream.get(piece);
        if !matches!(
            piece_token.kind,
            TokenKind::Identifier | TokenKind::SimpleLvalue
        ) {
            break;
        }
        identifier.push('.');
        identifier.push_str(&piece_token.text);
        cursor = piece;
    }
    Some(identifier)
}

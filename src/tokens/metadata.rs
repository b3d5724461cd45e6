//! Per-token analysis metadata
//!
//! The lexer leaves metadata empty; the structural analyzer fills in the
//! context backlink, the last-code backlink, operator classification, and
//! the implied-boundary flags, and the alias resolver adds canonical-symbol
//! annotations. The payload for doc-comment flag tokens is a tagged record
//! rather than a dynamic attachment, keyed by the token kind that carries it.

use serde::{Deserialize, Serialize};

use crate::structure::context::ContextId;
use crate::tokens::core::TokenId;

/// How an operator binds to its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatorClass {
    UnaryPrefix,
    UnaryPostfix,
    Binary,
}

/// Mutable annotations attached to every token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Innermost enclosing context, set by the structural analyzer.
    pub context: Option<ContextId>,
    /// The nearest preceding non-whitespace, non-comment token.
    pub last_code: Option<TokenId>,
    /// Classification for operator tokens.
    pub operator_class: Option<OperatorClass>,
    /// Set on the last token of a statement ended without explicit
    /// punctuation.
    pub implied_semicolon: bool,
    /// Set on the first token of a brace-less control-structure body.
    pub implied_block: bool,
    /// Set on the token that ends a brace-less control-structure body.
    pub implied_block_close: bool,
    /// Canonical symbol this token refers to through a local alias.
    pub aliased_symbol: Option<String>,
    /// Structured payload for doc-comment flag tokens.
    pub doc_flag: Option<DocFlagPayload>,
}

impl TokenMetadata {
    pub fn is_unary_operator(&self) -> bool {
        matches!(
            self.operator_class,
            Some(OperatorClass::UnaryPrefix) | Some(OperatorClass::UnaryPostfix)
        )
    }
}

/// Parsed form of a doc-comment flag such as `@param {ns.Foo} name text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocFlagPayload {
    /// Flag name without the `@`.
    pub flag: String,
    /// The `{...}` type annotation, when present.
    pub jstype: Option<TypeAnnotation>,
    /// Free text following the flag (and type), trimmed.
    pub description: String,
}

/// One node of a doc-comment type annotation.
///
/// Unions are represented as a node with an empty identifier whose children
/// are the member types; generic applications keep the applied identifier
/// and carry the arguments as children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeAnnotation {
    pub identifier: String,
    /// Leading `?` modifier.
    pub or_null: bool,
    /// Leading `!` modifier.
    pub not_null: bool,
    pub sub_types: Vec<TypeAnnotation>,
    /// Canonical symbol for the identifier, filled in by alias resolution.
    pub alias: Option<String>,
}

impl TypeAnnotation {
    pub fn named(identifier: impl Into<String>) -> Self {
        TypeAnnotation {
            identifier: identifier.into(),
            ..TypeAnnotation::default()
        }
    }

    /// Visit this node and every nested type, depth first.
    pub fn for_each_mut(&mut self, visit: &mut impl FnMut(&mut TypeAnnotation)) {
        visit(self);
        for sub in &mut self.sub_types {
            sub.for_each_mut(visit);
        }
    }

    /// Visit this node and every nested type, depth first.
    pub fn for_each(&self, visit: &mut impl FnMut(&TypeAnnotation)) {
        visit(self);
        for sub in &self.sub_types {
            sub.for_each(visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unary_operator_predicate() {
        let mut metadata = TokenMetadata::default();
        assert!(!metadata.is_unary_operator());
        metadata.operator_class = Some(OperatorClass::UnaryPrefix);
        assert!(metadata.is_unary_operator());
        metadata.operator_class = Some(OperatorClass::Binary);
        assert!(!metadata.is_unary_operator());
    }

    #[test]
    fn test_type_annotation_visits_nested_types() {
        let mut annotation = TypeAnnotation::named("Array");
        annotation.sub_types.push(TypeAnnotation::named("ns.Foo"));
        annotation.sub_types[0]
            .sub_types
            .push(TypeAnnotation::named("string"));

        let mut seen = Vec::new();
        annotation.for_each(&mut |t| seen.push(t.identifier.clone()));
        assert_eq!(seen, ["Array", "ns.Foo", "string"]);
    }
}

//! Context tree nodes and arena
//!
//! Contexts form a tree of nested syntactic regions. Nodes live in an
//! index-addressed arena and reference each other by [`ContextId`]; the
//! parent link is an index rather than a pointer, so the tree has no
//! ownership cycles and stays cheap to clone and serialize.

use serde::{Deserialize, Serialize};

use crate::tokens::TokenId;

/// Index of a context in its [`ContextTree`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ContextId(usize);

impl ContextId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The syntactic flavor of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextKind {
    Root,
    Statement,
    /// A `{ ... }` code block.
    Block,
    /// The body of a brace-less control structure, so all control
    /// constructs present a uniform block abstraction.
    ImpliedBlock,
    /// A parenthesized group (including index brackets).
    Group,
    /// The `( ... ; ... ; ... )` header group of a `for` loop, whose
    /// semicolons are separators rather than statement terminators.
    ForGroup,
    /// A function parameter list.
    Parameters,
    /// A variable declaration, from the declaring keyword to its end.
    Var,
    /// One `case x:`/`default:` arm of a switch, label included.
    CaseBlock,
    ObjectLiteral,
    ArrayLiteral,
    /// One member of an object or array literal.
    LiteralElement,
}

impl ContextKind {
    /// Whether statements open directly inside this context.
    pub(crate) fn is_statement_level(self) -> bool {
        matches!(
            self,
            ContextKind::Root
                | ContextKind::Block
                | ContextKind::ImpliedBlock
                | ContextKind::CaseBlock
        )
    }
}

/// One node of the context tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub kind: ContextKind,
    /// Absent only for the root.
    pub parent: Option<ContextId>,
    pub children: Vec<ContextId>,
    /// Absent only for the root of an empty file.
    pub start_token: Option<TokenId>,
    /// Absent while the context is open, and permanently absent when
    /// analysis halted before the closer was seen.
    pub end_token: Option<TokenId>,
}

/// The arena of contexts for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextTree {
    contexts: Vec<Context>,
    root: ContextId,
}

impl ContextTree {
    pub(crate) fn new() -> Self {
        let root = Context {
            kind: ContextKind::Root,
            parent: None,
            children: Vec::new(),
            start_token: None,
            end_token: None,
        };
        ContextTree {
            contexts: vec![root],
            root: ContextId(0),
        }
    }

    pub fn root(&self) -> ContextId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn get(&self, id: ContextId) -> &Context {
        &self.contexts[id.0]
    }

    pub fn kind(&self, id: ContextId) -> ContextKind {
        self.contexts[id.0].kind
    }

    pub fn parent(&self, id: ContextId) -> Option<ContextId> {
        self.contexts[id.0].parent
    }

    pub fn children(&self, id: ContextId) -> &[ContextId] {
        &self.contexts[id.0].children
    }

    /// Walk from `id` to the root, starting with `id` itself.
    pub fn ancestors(&self, id: ContextId) -> impl Iterator<Item = ContextId> + '_ {
        let mut current = Some(id);
        std::iter::from_fn(move || {
            let id = current?;
            current = self.parent(id);
            Some(id)
        })
    }

    /// Number of parent links between `id` and the root.
    pub fn depth(&self, id: ContextId) -> usize {
        self.ancestors(id).count() - 1
    }

    /// Whether `id` is `ancestor` or nested anywhere below it.
    pub fn is_within(&self, id: ContextId, ancestor: ContextId) -> bool {
        self.ancestors(id).any(|c| c == ancestor)
    }

    /// All contexts in creation order, root first.
    pub fn iter(&self) -> impl Iterator<Item = (ContextId, &Context)> + '_ {
        self.contexts
            .iter()
            .enumerate()
            .map(|(i, c)| (ContextId(i), c))
    }

    pub(crate) fn add(
        &mut self,
        kind: ContextKind,
        parent: ContextId,
        start_token: TokenId,
    ) -> ContextId {
        let id = ContextId(self.contexts.len());
        self.contexts.push(Context {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            start_token: Some(start_token),
            end_token: None,
        });
        self.contexts[parent.0].children.push(id);
        id
    }

    pub(crate) fn close(&mut self, id: ContextId, end_token: TokenId) {
        let context = &mut self.contexts[id.0];
        if context.end_token.is_none() {
            context.end_token = Some(end_token);
        }
    }

    pub(crate) fn set_root_start(&mut self, start_token: TokenId) {
        if self.contexts[self.root.0].start_token.is_none() {
            self.contexts[self.root.0].start_token = Some(start_token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ancestry_and_depth() {
        let mut tree = ContextTree::new();
        let root = tree.root();
        let statement = tree.add(ContextKind::Statement, root, TokenId::new(0));
        let group = tree.add(ContextKind::Group, statement, TokenId::new(2));

        assert_eq!(tree.depth(root), 0);
        assert_eq!(tree.depth(statement), 1);
        assert_eq!(tree.depth(group), 2);
        let chain: Vec<_> = tree.ancestors(group).collect();
        assert_eq!(chain, vec![group, statement, root]);
        assert!(tree.is_within(group, root));
        assert!(!tree.is_within(statement, group));
    }

    #[test]
    fn test_children_follow_insertion_order() {
        let mut tree = ContextTree::new();
        let root = tree.root();
        let a = tree.add(ContextKind::Statement, root, TokenId::new(0));
        let b = tree.add(ContextKind::Statement, root, TokenId::new(5));
        assert_eq!(tree.children(root), &[a, b]);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut tree = ContextTree::new();
        let root = tree.root();
        let statement = tree.add(ContextKind::Statement, root, TokenId::new(0));
        tree.close(statement, TokenId::new(3));
        tree.close(statement, TokenId::new(9));
        assert_eq!(tree.get(statement).end_token, Some(TokenId::new(3)));
    }
}

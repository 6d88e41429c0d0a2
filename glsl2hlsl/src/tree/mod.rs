//! Arena-allocated syntax tree
//!
//! Nodes own their children through [NodeId] indices into the arena, and refer back to their
//! parent through another index. The tree lives as long as the arena: nothing is freed before
//! the whole tree is dropped.

mod constant;
pub use constant::*;

mod kind;
pub use kind::*;

use crate::ident::{InfoId, ScopeId};
use crate::source::SourceLocation;
use crate::types::Type;

/// Index of a node in its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Verification progress of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyState {
    Unverified,
    /// Verification started but did not complete yet
    Verifying,
    Verified,
    Failed,
}

/// A node of the syntax tree
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub loc: SourceLocation,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    state: VerifyState,
    ty: Option<Type>,
    constant: ConstantValue,
    scope: Option<ScopeId>,
    ident: Option<InfoId>,
}

impl Node {
    fn new(kind: NodeKind, loc: SourceLocation) -> Self {
        Self {
            kind,
            loc,
            children: Vec::new(),
            parent: None,
            state: VerifyState::Unverified,
            ty: None,
            constant: ConstantValue::none(),
            scope: None,
            ident: None,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children[..]
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn state(&self) -> VerifyState {
        self.state
    }

    pub fn is_verified(&self) -> bool {
        self.state == VerifyState::Verified
    }

    /// Resolved type, for expressions and type specifiers
    pub fn ty(&self) -> Option<&Type> {
        self.ty.as_ref()
    }

    /// Constant-expression facts, not counting loop indices as constant
    pub fn constant(&self) -> &ConstantValue {
        &self.constant
    }

    /// Scope introduced by this node
    pub fn scope(&self) -> Option<ScopeId> {
        self.scope
    }

    /// Identifier declared or referenced by this node
    pub fn ident(&self) -> Option<InfoId> {
        self.ident
    }
}

/// Syntax tree rooted at a translation unit
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create a tree holding only its translation unit root
    pub fn new(loc: SourceLocation) -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::TranslationUnit, loc)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a node without attaching it yet
    pub fn add_detached(&mut self, kind: NodeKind, loc: SourceLocation) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind, loc));
        id
    }

    /// Append `child` to the children of `parent`
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    /// Create a node as the last child of `parent`
    pub fn add(&mut self, parent: NodeId, kind: NodeKind, loc: SourceLocation) -> NodeId {
        let id = self.add_detached(kind, loc);
        self.attach(parent, id);
        id
    }

    /// Detach the child at `index` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> Option<NodeId> {
        let children = &mut self.nodes[parent.index()].children;
        if index >= children.len() {
            return None;
        }

        let child = children.remove(index);
        self.nodes[child.index()].parent = None;
        Some(child)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children[..]
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.nodes[id.index()].children.get(index).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn ty(&self, id: NodeId) -> Option<&Type> {
        self.nodes[id.index()].ty.as_ref()
    }

    pub fn loc(&self, id: NodeId) -> SourceLocation {
        self.nodes[id.index()].loc
    }

    /// Strict ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Nearest strict ancestor matching `predicate`
    pub fn find_ancestor(
        &self,
        id: NodeId,
        predicate: impl Fn(&NodeKind) -> bool,
    ) -> Option<NodeId> {
        self.ancestors(id).find(|a| predicate(self.kind(*a)))
    }

    /// All nodes of the subtree rooted at `id`, in pre-order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev());
        }

        result
    }

    /// First node of the subtree rooted at `id` matching `predicate`, in pre-order
    pub fn find(&self, id: NodeId, predicate: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .find(|n| predicate(self.kind(*n)))
    }

    /// Scopes visible from a node, innermost first, ending with the built-in scope
    ///
    /// The return type and name of a function header are not part of the scope the function
    /// introduces.
    pub fn scope_chain(&self, id: NodeId) -> Vec<ScopeId> {
        let mut chain = Vec::new();
        let mut current = id;
        let mut via: Option<NodeId> = None;
        let mut via_via: Option<NodeId> = None;

        loop {
            let node = self.node(current);

            if let Some(scope) = node.scope {
                if let Some(via) = via {
                    if self.scope_covers(via, via_via) {
                        chain.push(scope);
                    }
                }
            }

            match node.parent {
                Some(parent) => {
                    via_via = via;
                    via = Some(current);
                    current = parent;
                }
                None => break,
            }
        }

        chain.push(ScopeId::BUILTIN);
        chain
    }

    fn scope_covers(&self, child: NodeId, grandchild: Option<NodeId>) -> bool {
        match (self.kind(child), grandchild.map(|g| self.kind(g))) {
            (NodeKind::FunctionHeader, Some(NodeKind::FunctionName(_)))
            | (NodeKind::FunctionHeader, Some(NodeKind::TypeSpecifier { .. })) => false,
            _ => true,
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn set_state(&mut self, id: NodeId, state: VerifyState) {
        self.nodes[id.index()].state = state;
    }

    pub(crate) fn set_ty(&mut self, id: NodeId, ty: Type) {
        self.nodes[id.index()].ty = Some(ty);
    }

    pub(crate) fn set_constant(&mut self, id: NodeId, constant: ConstantValue) {
        self.nodes[id.index()].constant = constant;
    }

    pub(crate) fn set_scope(&mut self, id: NodeId, scope: ScopeId) {
        self.nodes[id.index()].scope = Some(scope);
    }

    pub(crate) fn set_ident(&mut self, id: NodeId, ident: InfoId) {
        self.nodes[id.index()].ident = Some(ident);
    }
}

/// Iterator over the ancestors of a node
pub struct Ancestors<'t> {
    tree: &'t Tree,
    current: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self.tree.parent(current);
        Some(current)
    }
}

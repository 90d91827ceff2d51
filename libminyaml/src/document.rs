//! Read-only queries over a parsed document.

use crate::debug::DebugNode;
use crate::error::Warnings;
use crate::scanner::{Line, ScanResult, Token};
use crate::tree::{Node, NodeId, ROOT};
use crate::value::FromScalar;

/// A parsed document: tokens, lines and nodes, all borrowing the source.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    source: &'a str,
    tokens: Vec<Token<'a>>,
    lines: Vec<Line>,
    nodes: Vec<Node>,
    warnings: Warnings,
}

impl<'a> Document<'a> {
    pub(crate) fn new(scan: ScanResult<'a>, nodes: Vec<Node>, warnings: Warnings) -> Self {
        Self {
            source: scan.source,
            tokens: scan.tokens,
            lines: scan.lines,
            nodes,
            warnings,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn tokens(&self) -> &[Token<'a>] {
        &self.tokens
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Warnings raised while parsing this document.
    pub fn warnings(&self) -> &Warnings {
        &self.warnings
    }

    /// True when the text held no data lines.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// The synthetic root, or `None` for a document without data.
    pub fn root(&self) -> Option<&Node> {
        self.nodes.get(ROOT)
    }

    pub fn first_child(&self, node: &Node) -> Option<&Node> {
        node.first_child.map(|id| &self.nodes[id])
    }

    pub fn last_child(&self, node: &Node) -> Option<&Node> {
        node.last_child.map(|id| &self.nodes[id])
    }

    /// Direct children in source order. Each call starts a fresh iterator.
    pub fn children(&self, node: &Node) -> Children<'_> {
        Children {
            nodes: &self.nodes,
            next: node.first_child,
        }
    }

    /// First direct child whose key is exactly `key`.
    pub fn child(&self, node: &Node, key: &str) -> Option<&Node> {
        self.children(node)
            .find(|child| child.key.is_some() && self.read_key(child) == key)
    }

    /// First node with the given key in pre-order depth-first traversal.
    pub fn find_by_key_dfs(&self, key: &str) -> Option<&Node> {
        let mut pending = vec![self.root()?];
        while let Some(node) = pending.pop() {
            if node.key.is_some() && self.read_key(node) == key {
                return Some(node);
            }
            let first = pending.len();
            pending.extend(self.children(node));
            pending[first..].reverse();
        }
        None
    }

    /// Key text as written, or `""` when the node has no key.
    pub fn read_key(&self, node: &Node) -> &'a str {
        node.key.map_or("", |id| self.tokens[id].text)
    }

    /// Value text as written, quotes included, or `""` when absent.
    pub fn read_value(&self, node: &Node) -> &'a str {
        node.value.map_or("", |id| self.tokens[id].text)
    }

    /// Value text with one pair of matching surrounding quotes removed.
    pub fn read_value_unquoted(&self, node: &Node) -> &'a str {
        unquote(self.read_value(node))
    }

    /// Token holding the node's value. `None` for containers and empty values.
    pub fn value_token(&self, node: &Node) -> Option<&Token<'a>> {
        node.value.map(|id| &self.tokens[id])
    }

    /// Decode the node's value strictly as `T`.
    ///
    /// Fails for containers, empty values, text that is not a `T` literal,
    /// and integers outside `T`'s range.
    pub fn read_value_checked<T: FromScalar>(&self, node: &Node) -> Option<T> {
        T::from_scalar(self.value_token(node)?)
    }

    /// Owned mirror of the subtree at `node`.
    pub fn debug_view(&self, node: &Node) -> DebugNode {
        DebugNode::build(self, node)
    }

    /// Owned mirror of the whole document.
    pub fn debug_root(&self) -> Option<DebugNode> {
        self.root().map(|root| self.debug_view(root))
    }
}

/// Strip one pair of matching quotes surrounding `text`.
pub(crate) fn unquote(text: &str) -> &str {
    let bytes = text.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(&open), Some(&close))
            if bytes.len() >= 2 && open == close && (open == b'"' || open == b'\'') =>
        {
            &text[1..text.len() - 1]
        }
        _ => text,
    }
}

/// Iterator over the direct children of a node.
#[derive(Debug, Clone)]
pub struct Children<'d> {
    nodes: &'d [Node],
    next: Option<NodeId>,
}

impl<'d> Iterator for Children<'d> {
    type Item = &'d Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.nodes[self.next?];
        self.next = node.next_sibling;
        Some(node)
    }
}

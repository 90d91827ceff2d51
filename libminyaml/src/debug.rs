//! Owned, printable mirror of a document subtree.

use std::fmt;

use crate::document::Document;
use crate::tree::{Node, NodeId};

/// Detached copy of a node and its descendants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugNode {
    pub key: String,
    pub value: String,
    pub children: Vec<DebugNode>,
    /// Arena id of the parent of the source node.
    pub parent: Option<NodeId>,
    /// Arena id of the source node.
    pub src: NodeId,
}

impl DebugNode {
    pub(crate) fn build(doc: &Document<'_>, node: &Node) -> Self {
        Self {
            key: doc.read_key(node).to_string(),
            value: doc.read_value(node).to_string(),
            children: doc
                .children(node)
                .map(|child| DebugNode::build(doc, child))
                .collect(),
            parent: node.parent,
            src: node.id,
        }
    }

    fn write_at(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:width$}", "", width = depth * 2)?;
        if self.key.is_empty() {
            f.write_str("-")?;
        } else {
            write!(f, "{}:", self.key)?;
        }
        if !self.value.is_empty() {
            write!(f, " {}", self.value)?;
        }
        writeln!(f)?;
        for child in &self.children {
            child.write_at(f, depth + 1)?;
        }
        Ok(())
    }
}

/// YAML-like dump, two spaces per level. A root prints only its children.
impl fmt::Display for DebugNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parent.is_none() && self.key.is_empty() && self.value.is_empty() {
            for child in &self.children {
                child.write_at(f, 0)?;
            }
            return Ok(());
        }
        self.write_at(f, 0)
    }
}

//! Phase 2: Tree Builder
//!
//! The tree builder turns classified lines into a node arena. It tracks open
//! nodes on a stack ordered by indentation:
//! - a deeper line opens a child of the stack top
//! - a line at the indent of an open node becomes that node's sibling
//! - any other indent is an error
//!
//! Node 0 is a synthetic root with no key and no value. Links between nodes
//! are arena indices, so the tree can be cloned or moved freely.

use crate::error::{ErrorKind, ParseError, Result, Warning, Warnings};
use crate::scanner::{Line, LineKind, ScanResult, Token, TokenKind};

/// Index of a node in the arena.
pub type NodeId = usize;

/// Index of a token in the token array.
pub type TokenId = usize;

/// Id of the synthetic root node.
pub const ROOT: NodeId = 0;

/// One element of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub indent: usize,
    /// `None` for list entries, inline collection elements, and the root.
    pub key: Option<TokenId>,
    /// `None` for containers and for keys with an empty value.
    pub value: Option<TokenId>,
    pub num_children: usize,
}

impl Node {
    fn new(id: NodeId, indent: usize) -> Self {
        Self {
            id,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            indent,
            key: None,
            value: None,
            num_children: 0,
        }
    }

    pub fn has_children(&self) -> bool {
        self.num_children > 0
    }
}

/// Build the node arena for tokenized text.
///
/// Empty, comment and file section lines are skipped. When no line remains
/// the arena is empty and a warning is emitted.
pub fn build_tree(scan: &ScanResult<'_>, warnings: &mut Warnings) -> Result<Vec<Node>> {
    let nodes = TreeBuilder::new(scan).build().map_err(|err| {
        tracing::debug!(%err, "tree building failed");
        err
    })?;
    if nodes.is_empty() {
        warnings.push(Warning::NoData);
    }
    tracing::debug!(nodes = nodes.len(), "tree built");
    Ok(nodes)
}

struct TreeBuilder<'s, 'a> {
    source: &'a str,
    tokens: &'s [Token<'a>],
    lines: &'s [Line],
    nodes: Vec<Node>,
    /// Open nodes, innermost last.
    stack: Vec<NodeId>,
}

impl<'s, 'a> TreeBuilder<'s, 'a> {
    fn new(scan: &'s ScanResult<'a>) -> Self {
        Self {
            source: scan.source,
            tokens: &scan.tokens,
            lines: &scan.lines,
            nodes: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn build(mut self) -> Result<Vec<Node>> {
        let lines = self.lines;
        for (line_no, line) in lines.iter().enumerate() {
            if line.kind.is_unused() {
                continue;
            }
            if self.nodes.is_empty() {
                self.nodes.push(Node::new(ROOT, 0));
            }

            let parent = self.place(line_no, line)?;
            let id = self.append(parent, line.indent);
            self.stack.push(id);

            match line.kind {
                LineKind::DictionaryEntry => {
                    self.dictionary_entry(line_no, line, id, line.first_token)?
                }
                LineKind::ListEntry => self.list_entry(line_no, line, id)?,
                LineKind::Empty | LineKind::Comment | LineKind::FileSection => {}
            }
        }
        Ok(self.nodes)
    }

    /// Find the parent for a node at the line's indent, closing deeper nodes.
    fn place(&mut self, line_no: usize, line: &Line) -> Result<NodeId> {
        let Some(&top) = self.stack.last() else {
            return Ok(ROOT);
        };

        if line.indent > self.nodes[top].indent {
            // A scalar or an inline collection cannot also own nested lines.
            let open = &self.nodes[top];
            if open.value.is_some() || open.has_children() {
                return Err(self.indentation_error(line_no, line));
            }
            return Ok(top);
        }

        while let Some(&top) = self.stack.last() {
            if self.nodes[top].indent <= line.indent {
                break;
            }
            self.stack.pop();
        }
        match self.stack.pop() {
            Some(sibling) if self.nodes[sibling].indent == line.indent => {
                Ok(self.nodes[sibling].parent.unwrap_or(ROOT))
            }
            _ => Err(self.indentation_error(line_no, line)),
        }
    }

    /// `key`, then `:` and a value region, or nothing at all.
    fn dictionary_entry(
        &mut self,
        line_no: usize,
        line: &Line,
        id: NodeId,
        key: usize,
    ) -> Result<()> {
        self.nodes[id].key = Some(key);
        let next = self.tokens[key + 1];
        if next.is_char(':') {
            self.value_region(line_no, line, id, key + 2)
        } else if next.ends_value() {
            Ok(())
        } else {
            Err(self.unexpected(line_no, line, next.pos))
        }
    }

    fn list_entry(&mut self, line_no: usize, line: &Line, id: NodeId) -> Result<()> {
        let dash = line.first_token;
        let head = self.tokens[dash + 1];
        if line.traits.has_dictionary_entry && head.kind == TokenKind::Identifier {
            // `- key: value` opens a mapping whose entries align with `key`.
            let indent = line.indent + (head.pos - self.tokens[dash].pos);
            let entry = self.append(id, indent);
            self.stack.push(entry);
            return self.dictionary_entry(line_no, line, entry, dash + 1);
        }
        self.value_region(line_no, line, id, dash + 1)
    }

    /// Tokens from `at` up to the newline hold the node's value, if any.
    fn value_region(&mut self, line_no: usize, line: &Line, id: NodeId, at: usize) -> Result<()> {
        let token = self.tokens[at];
        if token.ends_value() {
            return Ok(());
        }
        if token.is_char('[') && line.traits.has_inline_collection {
            return self.inline_collection(line_no, line, id, at);
        }
        if !is_scalar(&token) {
            return Err(self.unexpected(line_no, line, token.pos));
        }
        self.nodes[id].value = Some(at);
        self.expect_end(line_no, line, at + 1)
    }

    /// One keyless child per element of `[a, b, ...]`.
    fn inline_collection(
        &mut self,
        line_no: usize,
        line: &Line,
        id: NodeId,
        open: usize,
    ) -> Result<()> {
        let indent = self.nodes[id].indent + 1;
        let mut i = open + 1;
        loop {
            let token = self.tokens[i];
            if token.is_char(']') {
                break;
            }
            if !token.is_char(',') {
                if !is_scalar(&token) {
                    return Err(self.unexpected(line_no, line, token.pos));
                }
                let element = self.append(id, indent);
                self.nodes[element].value = Some(i);
            }
            i += 1;
        }
        self.expect_end(line_no, line, i + 1)
    }

    fn expect_end(&self, line_no: usize, line: &Line, at: usize) -> Result<()> {
        let token = &self.tokens[at];
        if token.ends_value() {
            Ok(())
        } else {
            Err(self.unexpected(line_no, line, token.pos))
        }
    }

    fn append(&mut self, parent: NodeId, indent: usize) -> NodeId {
        let id = self.nodes.len();
        let mut node = Node::new(id, indent);
        node.parent = Some(parent);
        self.nodes.push(node);

        match self.nodes[parent].last_child {
            Some(prev) => self.nodes[prev].next_sibling = Some(id),
            None => self.nodes[parent].first_child = Some(id),
        }
        let parent = &mut self.nodes[parent];
        parent.last_child = Some(id);
        parent.num_children += 1;
        id
    }

    fn indentation_error(&self, line_no: usize, line: &Line) -> ParseError {
        let pos = self.tokens[line.first_token].pos;
        ParseError::at(ErrorKind::InvalidIndentation, line_no, self.source, pos, pos + 1)
    }

    fn unexpected(&self, line_no: usize, line: &Line, pos: usize) -> ParseError {
        let start = self.tokens[line.first_token].pos;
        ParseError::at(ErrorKind::UnexpectedToken, line_no, self.source, start, pos)
    }
}

fn is_scalar(token: &Token<'_>) -> bool {
    matches!(
        token.kind,
        TokenKind::Identifier | TokenKind::LiteralString | TokenKind::LiteralNumber
    )
}

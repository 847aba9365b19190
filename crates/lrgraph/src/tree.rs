//! Parse tree nodes.

use crate::{
    grammar::{Grammar, NonterminalID, SymbolID, TerminalID},
    util::display_fn,
};
use std::{collections::VecDeque, fmt};

/// A node of the parse tree.
///
/// Leaves carry the value of the shifted token, internal nodes carry the
/// nodes of the reduced rule's right-hand side in order.
///
/// Dropping, comparing and displaying a tree do not recurse, so trees of any
/// depth the parser produces are safe to handle. The derived `Clone` and
/// `Debug` do recurse and are bounded by the thread's stack.
#[derive(Debug, Clone)]
pub struct Node {
    symbol: SymbolID,
    value: Option<String>,
    children: VecDeque<Node>,
}

impl Node {
    pub fn leaf(symbol: TerminalID, value: Option<String>) -> Self {
        Self {
            symbol: SymbolID::T(symbol),
            value,
            children: VecDeque::new(),
        }
    }

    pub fn internal(symbol: NonterminalID) -> Self {
        Self {
            symbol: SymbolID::N(symbol),
            value: None,
            children: VecDeque::new(),
        }
    }

    pub fn symbol(&self) -> SymbolID {
        self.symbol
    }

    pub fn is_leaf(&self) -> bool {
        self.symbol.is_terminal()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn children(&self) -> impl ExactSizeIterator<Item = &Node> + '_ {
        self.children.iter()
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    pub fn push_child(&mut self, child: Node) {
        debug_assert!(!self.is_leaf(), "terminal nodes have no children");
        self.children.push_back(child);
    }

    pub fn prepend_child(&mut self, child: Node) {
        debug_assert!(!self.is_leaf(), "terminal nodes have no children");
        self.children.push_front(child);
    }

    /// Render this subtree as an S-expression, e.g. `E(T(F(id="A")))`.
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| fmt_node(self, g, f))
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut pending: Vec<Node> = self.children.drain(..).collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.children.drain(..));
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((lhs, rhs)) = pending.pop() {
            if lhs.symbol != rhs.symbol
                || lhs.value != rhs.value
                || lhs.children.len() != rhs.children.len()
            {
                return false;
            }
            pending.extend(lhs.children.iter().zip(&rhs.children));
        }
        true
    }
}

impl Eq for Node {}

enum Step<'n> {
    Node(&'n Node),
    Text(&'static str),
}

fn fmt_node(root: &Node, g: &Grammar, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut pending = vec![Step::Node(root)];
    while let Some(step) = pending.pop() {
        let node = match step {
            Step::Text(text) => {
                f.write_str(text)?;
                continue;
            }
            Step::Node(node) => node,
        };

        write!(f, "{}", g.symbol(node.symbol))?;
        if node.is_leaf() {
            if let Some(value) = &node.value {
                write!(f, "={:?}", value)?;
            }
            continue;
        }

        // Pushed in reverse so that the children come out in order.
        f.write_str("(")?;
        pending.push(Step::Text(")"));
        for (i, child) in node.children.iter().enumerate().rev() {
            pending.push(Step::Node(child));
            if i > 0 {
                pending.push(Step::Text(", "));
            }
        }
    }
    Ok(())
}

//! The parse stack.

use crate::{graph::StateID, tree::Node};

/// A LIFO of `(state, node)` frames, stored as two parallel sequences.
#[derive(Debug, Default)]
pub struct ParseStack {
    states: Vec<StateID>,
    nodes: Vec<Node>,
}

impl ParseStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, state: StateID, node: Node) {
        self.states.push(state);
        self.nodes.push(node);
        debug_assert_eq!(self.states.len(), self.nodes.len());
    }

    /// # Panics
    /// Panics if the stack is empty.
    pub(crate) fn pop(&mut self) -> (StateID, Node) {
        assert!(!self.is_empty(), "pop from an empty parse stack");
        match (self.states.pop(), self.nodes.pop()) {
            (Some(state), Some(node)) => (state, node),
            _ => unreachable!(),
        }
    }

    /// Peek at the most recently pushed frame.
    ///
    /// # Panics
    /// Panics if the stack is empty.
    pub fn top(&self) -> (StateID, &Node) {
        match (self.states.last(), self.nodes.last()) {
            (Some(state), Some(node)) => (*state, node),
            _ => panic!("peek into an empty parse stack"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// The states from the bottom to the top of the stack.
    pub fn states(&self) -> &[StateID] {
        &self.states[..]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes[..]
    }
}

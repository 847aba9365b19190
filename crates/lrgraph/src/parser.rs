//! The shift-reduce parser driven by a parse table.

use crate::{
    grammar::{Grammar, NonterminalID, Rule, RuleID, SymbolID, TerminalID},
    graph::StateID,
    stack::ParseStack,
    table::{Action, ParseTable},
    token::{Token, Tokenizer},
    tree::Node,
};
use std::fmt;

/// Chooses one action among the candidates registered for the current
/// `(state, symbol)` pair, or `None` to fail the parse.
pub type Resolver<'p> =
    Box<dyn FnMut(&[Action], &ParseStack, Option<&Token>) -> Option<Action> + 'p>;

/// Observes every node built by a reduction.
pub type ReduceHook<'p> = Box<dyn FnMut(&Node, &Rule) + 'p>;

/// The default resolver, which accepts only a single candidate.
pub fn resolve_single(
    actions: &[Action],
    _: &ParseStack,
    _: Option<&Token>,
) -> Option<Action> {
    match actions {
        [action] => Some(*action),
        _ => None,
    }
}

/// A parser for one input.
pub struct Parser<'p> {
    grammar: &'p Grammar,
    table: &'p ParseTable,
    stack: ParseStack,
    resolver: Resolver<'p>,
    on_reduce: Option<ReduceHook<'p>>,
}

impl fmt::Debug for Parser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("stack", &self.stack)
            .field("on_reduce", &self.on_reduce.is_some())
            .finish_non_exhaustive()
    }
}

impl<'p> Parser<'p> {
    /// Create a parser whose stack is seeded with the start state.
    ///
    /// # Panics
    /// Panics if the grammar lacks the augmented start rule.
    pub fn new(grammar: &'p Grammar, table: &'p ParseTable) -> Self {
        assert!(
            grammar.rules.contains_key(&RuleID::ACCEPT),
            "the grammar is not augmented"
        );
        let mut stack = ParseStack::new();
        stack.push(table.start_state(), Node::internal(NonterminalID::START));
        Self {
            grammar,
            table,
            stack,
            resolver: Box::new(resolve_single),
            on_reduce: None,
        }
    }

    /// Replace the conflict resolver.
    pub fn with_resolver<F>(mut self, resolver: F) -> Self
    where
        F: FnMut(&[Action], &ParseStack, Option<&Token>) -> Option<Action> + 'p,
    {
        self.resolver = Box::new(resolver);
        self
    }

    /// Install an observer called with each reduced node before it is pushed.
    pub fn on_reduce<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&Node, &Rule) + 'p,
    {
        self.on_reduce = Some(Box::new(hook));
        self
    }

    pub fn stack(&self) -> &ParseStack {
        &self.stack
    }

    /// Run the automaton until the input is accepted or rejected.
    ///
    /// On acceptance the root built by the last reduction is returned,
    /// or `None` if no reduction happened.
    #[tracing::instrument(skip_all)]
    pub fn parse<T>(mut self, tokens: &mut T) -> Result<Option<Node>, ParseError<T::Error>>
    where
        T: Tokenizer,
    {
        let g = self.grammar;
        let mut reduced = false;

        loop {
            let (state, _) = self.stack.top();
            let lookahead = tokens.peek().map_err(ParseError::Lexer)?;
            let symbol = SymbolID::T(lookahead.map_or(TerminalID::EOI, |t| t.symbol));

            let actions = self.table.actions(state, symbol);
            if actions.is_empty() {
                return Err(ParseError::UnexpectedToken {
                    state,
                    token: lookahead.cloned(),
                });
            }
            let action = (self.resolver)(actions, &self.stack, lookahead).ok_or_else(|| {
                ParseError::Conflict {
                    state,
                    symbol,
                    actions: actions.to_vec(),
                }
            })?;
            tracing::trace!("{:?} on {}: {}", state, g.symbol(symbol), action.display(g));

            match action {
                Action::Accept => {
                    return Ok(if reduced {
                        Some(self.stack.pop().1)
                    } else {
                        None
                    });
                }

                Action::Shift(next) => {
                    let Some(token) = tokens.next().map_err(ParseError::Lexer)? else {
                        return Err(ParseError::UnexpectedToken { state, token: None });
                    };
                    self.stack.push(next, Node::leaf(token.symbol, token.value));
                }

                Action::Reduce(rule) => {
                    let rule = g.rule(rule);
                    let mut node = Node::internal(rule.left());
                    for _ in 0..rule.right().len() {
                        let (_, child) = self.stack.pop();
                        node.prepend_child(child);
                    }

                    let (top, _) = self.stack.top();
                    let symbol = SymbolID::N(rule.left());
                    let next = match (self.resolver)(
                        self.table.actions(top, symbol),
                        &self.stack,
                        lookahead,
                    ) {
                        Some(Action::Goto(next)) => next,
                        _ => return Err(ParseError::MissingGoto { state: top, symbol }),
                    };

                    if let Some(on_reduce) = &mut self.on_reduce {
                        on_reduce(&node, rule);
                    }
                    self.stack.push(next, node);
                    reduced = true;
                }

                Action::Goto(..) => {
                    return Err(ParseError::UnexpectedToken {
                        state,
                        token: lookahead.cloned(),
                    });
                }
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError<E: fmt::Display> {
    #[error("from lexer: {}", _0)]
    Lexer(E),

    #[error("unexpected {} at state {}", display_token(.token), .state)]
    UnexpectedToken {
        state: StateID,
        token: Option<Token>,
    },

    #[error("unresolved conflict at state {} ({} candidate actions)", .state, .actions.len())]
    Conflict {
        state: StateID,
        symbol: SymbolID,
        actions: Vec<Action>,
    },

    #[error("no goto transition from state {}", .state)]
    MissingGoto { state: StateID, symbol: SymbolID },
}

fn display_token(token: &Option<Token>) -> String {
    match token {
        Some(Token {
            value: Some(value), ..
        }) => format!("token {:?}", value),
        Some(..) => "token".to_owned(),
        None => "end of input".to_owned(),
    }
}

//! Calculation of the LR parse table.

use crate::{
    grammar::{Grammar, RuleID, SymbolID, TerminalID},
    graph::{ItemGraph, StateID, Strategy},
    item::LRItem,
    util::{display_fn, Map, Set},
};
use std::fmt;

/// The action that the LR automaton in a state performs on a particular
/// symbol.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Accept,

    /// Read a lookahead terminal and transition to the specified state.
    Shift(StateID),

    /// Reduce to the specified production rule.
    Reduce(RuleID),

    /// Transition on a nonterminal after a reduction.
    Goto(StateID),
}

impl Action {
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| match self {
            Self::Accept => f.write_str("accept"),
            Self::Shift(next) => write!(f, "shift({:?})", next),
            Self::Reduce(rule) => write!(f, "reduce({})", g.rule(*rule).display(g)),
            Self::Goto(next) => write!(f, "goto({:?})", next),
        })
    }
}

#[derive(Debug)]
pub struct ParseTable {
    actions: Map<StateID, Map<SymbolID, Vec<Action>>>,
    conflicts: Map<StateID, Set<SymbolID>>,
    start_state: StateID,
}

impl ParseTable {
    /// Create an empty table whose automaton starts at `start_state`.
    pub fn new(start_state: StateID) -> Self {
        Self {
            actions: Map::default(),
            conflicts: Map::default(),
            start_state,
        }
    }

    /// Derive the parse table from a complete item graph.
    ///
    /// With [`LR0`](crate::graph::LR0) items this is an SLR(1) table, with
    /// [`LR1`](crate::graph::LR1) items a canonical LR(1) table. Conflicts
    /// are recorded but do not make the generation fail.
    pub fn generate<S: Strategy>(graph: &ItemGraph<'_, S>) -> Self {
        let g = graph.grammar();
        let mut table = Self::new(graph.start_state());

        for (state, _) in graph.states() {
            for (symbol, next) in graph.goto_set_for(state) {
                let action = match symbol {
                    SymbolID::T(..) => Action::Shift(next),
                    SymbolID::N(..) => Action::Goto(next),
                };
                table.add_action(state, symbol, action);
            }

            for item in graph.items_of(state) {
                if !item.is_complete(g) {
                    continue;
                }
                if item.rule() == RuleID::ACCEPT {
                    table.add_action(state, SymbolID::T(TerminalID::EOI), Action::Accept);
                    continue;
                }
                S::reduce_lookaheads(g, item, |t| {
                    table.add_action(state, SymbolID::T(t), Action::Reduce(item.rule()));
                });
            }
        }

        for (state, symbol) in table.conflicts() {
            tracing::debug!(
                "conflict in state {:?} on {}: {} actions",
                state,
                g.symbol(symbol),
                table.actions(state, symbol).len()
            );
        }

        table
    }

    pub fn start_state(&self) -> StateID {
        self.start_state
    }

    /// The actions registered for `(state, symbol)`, in registration order.
    pub fn actions(&self, state: StateID, symbol: SymbolID) -> &[Action] {
        self.actions
            .get(&state)
            .and_then(|row| row.get(&symbol))
            .map_or(&[], |actions| &actions[..])
    }

    /// Like [`actions`](Self::actions), but allocates the slot when absent.
    pub fn actions_mut(&mut self, state: StateID, symbol: SymbolID) -> &mut Vec<Action> {
        self.actions
            .entry(state)
            .or_default()
            .entry(symbol)
            .or_default()
    }

    /// Append `action` unless an equal one is already registered, marking
    /// the pair as conflicted when it ends up with more than one action.
    pub fn add_action(&mut self, state: StateID, symbol: SymbolID, action: Action) {
        let actions = self.actions_mut(state, symbol);
        if !actions.contains(&action) {
            actions.push(action);
        }
        if actions.len() > 1 {
            self.conflicts.entry(state).or_default().insert(symbol);
        }
    }

    pub fn is_conflicted(&self, state: StateID, symbol: SymbolID) -> bool {
        self.conflicts
            .get(&state)
            .map_or(false, |symbols| symbols.contains(&symbol))
    }

    /// Every conflicted `(state, symbol)` pair.
    pub fn conflicts(&self) -> impl Iterator<Item = (StateID, SymbolID)> + '_ {
        self.conflicts
            .iter()
            .flat_map(|(state, symbols)| symbols.iter().map(move |symbol| (*state, *symbol)))
    }

    pub fn num_conflicts(&self) -> usize {
        self.conflicts.values().map(|symbols| symbols.len()).sum()
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// The states that have at least one conflicted symbol.
    pub fn conflicted_states(&self) -> impl Iterator<Item = StateID> + '_ {
        self.conflicts.keys().copied()
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for (i, (state, row)) in self.actions.iter().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "#### State {:?}", state)?;
                for (symbol, actions) in row {
                    write!(f, "- {} =>", g.symbol(*symbol))?;
                    for action in actions {
                        write!(f, " {}", action.display(g))?;
                    }
                    if self.is_conflicted(*state, *symbol) {
                        f.write_str("  (conflict)")?;
                    }
                    writeln!(f)?;
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        grammar::SymbolID::*,
        graph::{LR0, LR1},
        samples,
    };

    #[test]
    fn add_action_records_conflicts() {
        let s0 = StateID::from_raw(0);
        let s1 = StateID::from_raw(1);
        let sym = T(TerminalID::from_raw(1));
        let mut table = ParseTable::new(s0);

        assert!(table.actions(s0, sym).is_empty());
        assert!(table.actions_mut(s0, sym).is_empty());

        table.add_action(s0, sym, Action::Shift(s1));
        table.add_action(s0, sym, Action::Shift(s1));
        assert_eq!(table.actions(s0, sym), &[Action::Shift(s1)]);
        assert!(!table.is_conflicted(s0, sym));

        table.add_action(s0, sym, Action::Reduce(RuleID::from_raw(2)));
        assert_eq!(
            table.actions(s0, sym),
            &[Action::Shift(s1), Action::Reduce(RuleID::from_raw(2))]
        );
        assert!(table.is_conflicted(s0, sym));
        assert_eq!(table.conflicts().collect::<Vec<_>>(), [(s0, sym)]);
    }

    #[test]
    fn shift_and_goto_are_distinct() {
        let s = StateID::from_raw(4);
        assert_ne!(Action::Shift(s), Action::Goto(s));
        assert_eq!(Action::Reduce(RuleID::ACCEPT), Action::Reduce(RuleID::ACCEPT));
    }

    #[test]
    fn slr_table_of_expr_has_no_conflicts() {
        let g = Grammar::define(samples::expr).unwrap();
        let graph = ItemGraph::<LR0>::build(&g);
        let table = ParseTable::generate(&graph);
        eprintln!("{}", table.display(&g));

        assert!(!table.has_conflicts());

        let e = N(g.nonterminal_by_label("E").unwrap());
        let start = table.start_state();
        let accepting = graph.get_goto(start, e).unwrap();
        assert_eq!(table.actions(start, e), &[Action::Goto(accepting)]);
        assert_eq!(
            table.actions(accepting, T(TerminalID::EOI)),
            &[Action::Accept]
        );

        // every reachable pair resolves to at most one action.
        for (state, _) in graph.states() {
            for symbol in g.all_symbols() {
                assert!(table.actions(state, symbol).len() <= 1);
            }
        }
    }

    #[test]
    fn lookaheads_remove_conflicts() {
        let g = Grammar::define(samples::assign).unwrap();

        let slr = ParseTable::generate(&ItemGraph::<LR0>::build(&g));
        let lr1 = ParseTable::generate(&ItemGraph::<LR1>::build(&g));
        eprintln!("{}", slr.display(&g));

        // [S -> L . eq R] vs [R -> L .] on `eq`
        let eq = T(g.terminal_by_label("eq").unwrap());
        assert_eq!(slr.num_conflicts(), 1);
        assert!(slr.conflicts().all(|(_, symbol)| symbol == eq));
        assert!(lr1.num_conflicts() < slr.num_conflicts());
        assert!(!lr1.has_conflicts());
    }

    #[test]
    fn ambiguous_grammar_conflicts_under_both_variants() {
        let g = Grammar::define(|g| {
            let plus = g.terminal("plus")?;
            let num = g.terminal("num")?;
            let e = g.nonterminal("E")?;
            g.rule(e, [N(e), T(plus), N(e)])?;
            g.rule(e, [T(num)])?;
            Ok(())
        })
        .unwrap();

        let slr = ParseTable::generate(&ItemGraph::<LR0>::build(&g));
        let lr1 = ParseTable::generate(&ItemGraph::<LR1>::build(&g));
        assert!(slr.has_conflicts());
        assert!(lr1.has_conflicts());
        assert_eq!(slr.conflicted_states().count(), 1);
    }
}

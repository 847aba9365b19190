//! The canonical collection of LR item sets.

use crate::{
    grammar::{Grammar, NonterminalID, RuleID, SymbolID, TerminalID},
    interner::{InternID, Interned, Interner},
    item::{self, ItemID, ItemSet, LR0Item, LR1Item, LRItem},
    util::{display_fn, Map},
};
use std::{fmt, ops::ControlFlow};

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateID(u32);

impl StateID {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn into_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S#{:03}", self.0)
    }
}

impl fmt::Display for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl InternID for StateID {
    fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The closure behavior of an item graph, one per item variant.
pub trait Strategy {
    type Item: LRItem + Interned;

    /// The item `$start := . S` the start state is built from.
    fn start_item(g: &Grammar) -> Self::Item;

    /// Emit the items implied by `item`, whose cursor sits before `symbol`.
    fn expand<F>(g: &Grammar, item: &Self::Item, symbol: NonterminalID, emit: F)
    where
        F: FnMut(Self::Item);

    /// Emit the lookahead terminals on which the completed `item` is reduced.
    fn reduce_lookaheads<F>(g: &Grammar, item: &Self::Item, emit: F)
    where
        F: FnMut(TerminalID);
}

/// Position-only items. Reductions use the follow set of the rule's left side (SLR).
#[derive(Debug)]
pub enum LR0 {}

impl Strategy for LR0 {
    type Item = LR0Item;

    fn start_item(_: &Grammar) -> Self::Item {
        LR0Item::new(RuleID::ACCEPT, 0)
    }

    fn expand<F>(g: &Grammar, _: &Self::Item, symbol: NonterminalID, mut emit: F)
    where
        F: FnMut(Self::Item),
    {
        for rule in g.rules_for(symbol) {
            emit(LR0Item::new(rule.id(), 0));
        }
    }

    fn reduce_lookaheads<F>(g: &Grammar, item: &Self::Item, mut emit: F)
    where
        F: FnMut(TerminalID),
    {
        let left = g.rule(item.rule).left();
        for t in g.first_sets().follow(left).iter() {
            emit(t);
        }
    }
}

/// Items with one lookahead terminal (canonical LR(1)).
#[derive(Debug)]
pub enum LR1 {}

impl Strategy for LR1 {
    type Item = LR1Item;

    fn start_item(_: &Grammar) -> Self::Item {
        LR1Item::new(RuleID::ACCEPT, 0, TerminalID::EOI)
    }

    fn expand<F>(g: &Grammar, item: &Self::Item, symbol: NonterminalID, mut emit: F)
    where
        F: FnMut(Self::Item),
    {
        // [A -> alpha . B beta, a] adds [B -> . gamma, b] for b in First(beta a).
        let mut suffix = g.rule(item.rule).right().to_vec();
        suffix.push(SymbolID::T(item.lookahead));
        g.first_sets()
            .for_each_term_in(&suffix, usize::from(item.position) + 1, |t| {
                if let Some(t) = t {
                    for rule in g.rules_for(symbol) {
                        emit(LR1Item::new(rule.id(), 0, t));
                    }
                }
            });
    }

    fn reduce_lookaheads<F>(_: &Grammar, item: &Self::Item, mut emit: F)
    where
        F: FnMut(TerminalID),
    {
        emit(item.lookahead);
    }
}

/// The graph of LR states and the goto transitions between them.
///
/// States only refer to items by [`ItemID`]; every item and item set is
/// resolved through the interners owned by the graph.
pub struct ItemGraph<'g, S: Strategy> {
    grammar: &'g Grammar,
    items: Interner<S::Item, ItemID>,
    item_sets: Interner<ItemSet, StateID>,
    gotos: Map<StateID, Map<SymbolID, StateID>>,
    start_state: StateID,
}

impl<S: Strategy> fmt::Debug for ItemGraph<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemGraph")
            .field("items", &self.items)
            .field("item_sets", &self.item_sets)
            .field("gotos", &self.gotos)
            .field("start_state", &self.start_state)
            .finish_non_exhaustive()
    }
}

impl<'g, S: Strategy> ItemGraph<'g, S> {
    /// Create a graph that only contains the start state.
    pub fn new(grammar: &'g Grammar) -> Self {
        let mut graph = Self {
            grammar,
            items: Interner::new(),
            item_sets: Interner::new(),
            gotos: Map::default(),
            start_state: StateID(0),
        };
        graph.reset();
        graph
    }

    /// Create the complete graph of the specified grammar.
    pub fn build(grammar: &'g Grammar) -> Self {
        let mut graph = Self::new(grammar);
        graph.eval_goto_sets();
        graph
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Forget every state and transition, and recompute the start state.
    pub fn reset(&mut self) {
        self.gotos.clear();
        self.items.clear();
        self.item_sets.clear();
        self.start_state = self.start_set();
    }

    /// Rebuild the graph from scratch.
    pub fn refresh(&mut self) -> &mut Self {
        self.reset();
        self.eval_goto_sets();
        self
    }

    /// Build the start state, `closure({$start := . S})`.
    pub fn start_set(&mut self) -> StateID {
        let g = self.grammar;
        assert!(
            g.rules.contains_key(&RuleID::ACCEPT),
            "the grammar is not augmented"
        );
        let (start, _) = self.items.ensure(S::start_item(g));
        self.closure(Some(start).into_iter().collect())
            .expect("the closure of the start item is never empty")
    }

    /// Compute the closure of `candidate` and return its interned state.
    ///
    /// `None` is returned when the candidate closes to the empty set, which
    /// is never interned.
    pub fn closure(&mut self, candidate: ItemSet) -> Option<StateID> {
        let g = self.grammar;
        let items = &mut self.items;

        let mut out = candidate;
        let mut pending: Vec<ItemID> = out.iter().collect();
        while let Some(id) = pending.pop() {
            let item = *items.get(id);
            let Some(SymbolID::N(symbol)) = item.next_symbol(g) else {
                continue;
            };
            S::expand(g, &item, symbol, |new_item| {
                let (new_id, _) = items.ensure(new_item);
                if out.insert(new_id) {
                    pending.push(new_id);
                }
            });
        }

        if out.is_empty() {
            return None;
        }

        let (id, is_new) = self.item_sets.ensure(out);
        if is_new {
            tracing::trace!("new state {:?}", id);
        }
        Some(id)
    }

    /// Compute the state reached from `state` by reading `symbol`.
    pub fn goto(&mut self, state: StateID, symbol: SymbolID) -> Option<StateID> {
        let g = self.grammar;

        let mut candidate = ItemSet::new();
        for i in 0..self.item_sets.get(state).len() {
            let id = self.item_sets.get(state).as_slice()[i];
            let item = *self.items.get(id);
            if item.next_symbol(g) == Some(symbol) {
                let (next, _) = self.items.ensure(item.advance(g));
                candidate.insert(next);
            }
        }

        if candidate.is_empty() {
            return None;
        }
        self.closure(candidate)
    }

    /// Explore the goto transitions of every state until no new state appears.
    #[tracing::instrument(skip_all)]
    pub fn eval_goto_sets(&mut self) {
        let symbols: Vec<SymbolID> = self.grammar.all_symbols().collect();

        // The bound is re-read on every iteration, so states discovered
        // during the loop are visited as well.
        let mut i = 0;
        while i < self.item_sets.len() {
            let state = StateID::from_index(i);
            for &symbol in &symbols {
                if let Some(next) = self.goto(state, symbol) {
                    self.set_goto(state, symbol, next);
                }
            }
            i += 1;
        }

        tracing::debug!(
            "{} states, {} items",
            self.item_sets.len(),
            self.items.len()
        );
    }

    pub fn set_goto(&mut self, from: StateID, symbol: SymbolID, to: StateID) {
        self.gotos.entry(from).or_default().insert(symbol, to);
    }

    pub fn get_goto(&self, from: StateID, symbol: SymbolID) -> Option<StateID> {
        self.gotos.get(&from)?.get(&symbol).copied()
    }

    /// Visit the outgoing transitions of `state` until the visitor breaks.
    pub fn for_each_goto<F>(&self, state: StateID, mut visitor: F)
    where
        F: FnMut(SymbolID, StateID) -> ControlFlow<()>,
    {
        for (symbol, next) in self.goto_set_for(state) {
            if visitor(symbol, next).is_break() {
                break;
            }
        }
    }

    /// The outgoing transitions of `state`, in discovery order.
    pub fn goto_set_for(&self, state: StateID) -> impl Iterator<Item = (SymbolID, StateID)> + '_ {
        self.gotos
            .get(&state)
            .into_iter()
            .flatten()
            .map(|(symbol, next)| (*symbol, *next))
    }

    pub fn start_state(&self) -> StateID {
        self.start_state
    }

    /// The number of states.
    pub fn len(&self) -> usize {
        self.item_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item_sets.is_empty()
    }

    /// The number of distinct items referenced by the states.
    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    pub fn item(&self, id: ItemID) -> &S::Item {
        self.items.get(id)
    }

    pub fn item_set(&self, state: StateID) -> &ItemSet {
        self.item_sets.get(state)
    }

    pub fn items_of(&self, state: StateID) -> impl Iterator<Item = &S::Item> + '_ {
        self.item_set(state).iter().map(|id| self.items.get(id))
    }

    pub fn states(&self) -> impl Iterator<Item = (StateID, &ItemSet)> + '_ {
        self.item_sets.iter()
    }

    pub fn display(&self) -> impl fmt::Display + '_ {
        display_fn(move |f| {
            let g = self.grammar;
            for (i, (id, _)) in self.states().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "#### State {:?}", id)?;
                writeln!(f, "## items")?;
                for entry in self.items_of(id) {
                    writeln!(f, "- {}", item::display(entry, g))?;
                }
                let mut gotos = self.goto_set_for(id).peekable();
                if gotos.peek().is_some() {
                    writeln!(f, "## gotos")?;
                    for (symbol, next) in gotos {
                        writeln!(f, "- {} => {:?}", g.symbol(symbol), next)?;
                    }
                }
            }
            Ok(())
        })
    }
}

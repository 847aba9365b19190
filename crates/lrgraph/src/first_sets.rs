//! Calculation of nullable, first and follow sets.

use crate::{
    grammar::{NonterminalID, Rule, RuleID, SymbolID, TerminalID},
    util::{Map, Set},
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TerminalSet {
    inner: bit_set::BitSet,
}

impl TerminalSet {
    pub fn contains(&self, id: TerminalID) -> bool {
        self.inner.contains(id.into_raw().into())
    }
    pub fn insert(&mut self, id: TerminalID) -> bool {
        self.inner.insert(id.into_raw().into())
    }
    pub fn union_with(&mut self, other: &Self) {
        self.inner.union_with(&other.inner)
    }
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
    pub fn len(&self) -> usize {
        self.inner.len()
    }
    pub fn iter(&self) -> impl Iterator<Item = TerminalID> + '_ {
        self.inner
            .iter()
            .map(|raw| TerminalID::from_raw(raw as u16))
    }
}

impl FromIterator<TerminalID> for TerminalSet {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = TerminalID>,
    {
        Self {
            inner: iter.into_iter().map(|t| t.into_raw().into()).collect(),
        }
    }
}

/// The first-set service of a grammar.
#[derive(Debug)]
pub struct FirstSets {
    nullables: Set<NonterminalID>,
    firsts: Map<NonterminalID, TerminalSet>,
    follows: Map<NonterminalID, TerminalSet>,
}

impl FirstSets {
    pub(crate) fn new<I>(nonterminals: I, rules: &Map<RuleID, Rule>) -> Self
    where
        I: IntoIterator<Item = NonterminalID>,
    {
        let mut me = Self {
            nullables: nulls_set(rules),
            firsts: Map::default(),
            follows: Map::default(),
        };
        for n in nonterminals {
            me.firsts.insert(n, TerminalSet::default());
            me.follows.insert(n, TerminalSet::default());
        }
        me.firsts = me.first_sets(rules);
        me.follows = me.follow_sets(rules);
        me
    }

    pub fn is_nullable(&self, symbol: NonterminalID) -> bool {
        self.nullables.contains(&symbol)
    }

    /// `First(N)`
    pub fn first(&self, symbol: NonterminalID) -> &TerminalSet {
        &self.firsts[&symbol]
    }

    /// `Follow(N)`
    pub fn follow(&self, symbol: NonterminalID) -> &TerminalSet {
        &self.follows[&symbol]
    }

    /// `First(symbols)`, together with whether `symbols` derives the empty string.
    pub fn first_of(&self, symbols: &[SymbolID]) -> (TerminalSet, bool) {
        let mut res = TerminalSet::default();
        for symbol in symbols {
            match symbol {
                SymbolID::T(t) => {
                    res.insert(*t);
                    return (res, false);
                }
                SymbolID::N(n) => {
                    res.union_with(&self.firsts[n]);
                    if !self.is_nullable(*n) {
                        return (res, false);
                    }
                }
            }
        }
        (res, true)
    }

    /// Enumerate the terminals in `First(symbols[from..])` in ascending id order.
    ///
    /// When the suffix can derive the empty string, the visitor is called
    /// once more with `None` so the caller can fall back to its follow context.
    pub fn for_each_term_in<F>(&self, symbols: &[SymbolID], from: usize, mut visitor: F)
    where
        F: FnMut(Option<TerminalID>),
    {
        let (firsts, nullable) = self.first_of(symbols.get(from..).unwrap_or_default());
        for t in firsts.iter() {
            visitor(Some(t));
        }
        if nullable {
            visitor(None);
        }
    }

    fn first_sets(&self, rules: &Map<RuleID, Rule>) -> Map<NonterminalID, TerminalSet> {
        let mut firsts = self.firsts.clone();

        // First(X) is extended by First(Yi) for the leading nullable
        // prefix Y1 .. Yk of each rule X := Y1 .. Yn.
        let mut changed = true;
        while changed {
            changed = false;
            for rule in rules.values() {
                let mut added = TerminalSet::default();
                for symbol in rule.right() {
                    match symbol {
                        SymbolID::T(t) => {
                            added.insert(*t);
                            break;
                        }
                        SymbolID::N(n) => {
                            added.union_with(&firsts[n]);
                            if !self.nullables.contains(n) {
                                break;
                            }
                        }
                    }
                }

                let slot = &mut firsts[&rule.left()];
                let before = slot.len();
                slot.union_with(&added);
                changed |= slot.len() != before;
            }
        }

        firsts
    }

    fn follow_sets(&self, rules: &Map<RuleID, Rule>) -> Map<NonterminalID, TerminalSet> {
        let mut follows = self.follows.clone();
        follows[&NonterminalID::START].insert(TerminalID::EOI);

        let mut changed = true;
        while changed {
            changed = false;
            for rule in rules.values() {
                for (i, symbol) in rule.right().iter().enumerate() {
                    let SymbolID::N(n) = symbol else { continue };

                    let (mut added, nullable) = self.first_of(&rule.right()[i + 1..]);
                    if nullable {
                        added.union_with(&follows[&rule.left()]);
                    }

                    let slot = &mut follows[n];
                    let before = slot.len();
                    slot.union_with(&added);
                    changed |= slot.len() != before;
                }
            }
        }

        follows
    }
}

/// Calculate the set of nullable symbols in this grammar.
fn nulls_set(rules: &Map<RuleID, Rule>) -> Set<NonterminalID> {
    let mut nulls = Set::default();

    // Repeat until no more symbols are found to be nullable.
    let mut changed = true;
    while changed {
        changed = false;
        for rule in rules.values() {
            if nulls.contains(&rule.left()) {
                continue;
            }
            let is_rhs_nullable = rule
                .right()
                .iter()
                .all(|s| matches!(s, SymbolID::N(n) if nulls.contains(n)));
            if is_rhs_nullable {
                changed |= nulls.insert(rule.left());
            }
        }
    }

    nulls
}

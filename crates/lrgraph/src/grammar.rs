//! Grammar types.

use crate::{
    first_sets::FirstSets,
    util::{display_fn, Map, Set},
};
use std::{borrow::Cow, fmt};

macro_rules! define_id {
    ($(
        $(#[$attr:meta])*
        $name:ident { $(#[$reserved_attr:meta])* $reserved:ident }
    )*) => {$(
        $(#[$attr])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name {
            raw: u16,
        }

        impl $name {
            $(#[$reserved_attr])*
            pub const $reserved: Self = Self::from_raw(0);

            // the first raw value handed out by `GrammarDef`.
            const OFFSET: u16 = 1;

            #[inline]
            pub const fn from_raw(raw: u16) -> Self {
                Self { raw }
            }

            #[inline]
            pub const fn into_raw(self) -> u16 {
                self.raw
            }
        }
    )*};
}

define_id! {
    TerminalID {
        /// Reserved symbol used as a terminal symbol that means the end of input.
        EOI
    }
    NonterminalID {
        /// The left-hand side of the augmented start rule.
        START
    }
    /// The identifier of a production rule.
    RuleID {
        /// The synthesized rule `$start := S`.
        ACCEPT
    }
}

/// A terminal symbol together with its display label.
#[derive(Debug)]
pub struct Terminal {
    id: TerminalID,
    label: Cow<'static, str>,
}

impl Terminal {
    pub fn id(&self) -> TerminalID {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug)]
pub struct Nonterminal {
    id: NonterminalID,
    label: Cow<'static, str>,
}

impl Nonterminal {
    pub fn id(&self) -> NonterminalID {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for Nonterminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolID {
    T(TerminalID),
    N(NonterminalID),
}

impl SymbolID {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::T(..))
    }
}

/// The type that represents a production rule in grammar.
#[derive(Debug)]
pub struct Rule {
    id: RuleID,
    left: NonterminalID,
    right: Vec<SymbolID>,
}

impl Rule {
    pub fn id(&self) -> RuleID {
        self.id
    }

    /// Return the left-hand side of this production.
    pub fn left(&self) -> NonterminalID {
        self.left
    }

    /// Return the right-hand side of this production.
    pub fn right(&self) -> &[SymbolID] {
        &self.right[..]
    }

    // `"LHS := R1 R2 R3"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            write!(f, "{} :=", g.nonterminals[&self.left])?;
            for symbol in &self.right {
                write!(f, " {}", g.symbol(*symbol))?;
            }
            Ok(())
        })
    }
}

/// The grammar definition used to derive the item graph and parse tables.
///
/// A `Grammar` is always augmented: the rule `$start := S` is registered
/// as [`RuleID::ACCEPT`] when the definition is finished.
#[derive(Debug)]
#[non_exhaustive]
pub struct Grammar {
    pub terminals: Map<TerminalID, Terminal>,
    pub nonterminals: Map<NonterminalID, Nonterminal>,
    pub rules: Map<RuleID, Rule>,
    pub start_symbol: NonterminalID,
    rules_by_left: Map<NonterminalID, Vec<RuleID>>,
    first_sets: FirstSets,
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## terminals:")?;
        for terminal in self.terminals.values() {
            writeln!(f, "{}", terminal)?;
        }

        writeln!(f, "\n## nonterminals:")?;
        for nonterminal in self.nonterminals.values() {
            write!(f, "{}", nonterminal)?;
            if nonterminal.id() == self.start_symbol {
                write!(f, " (start)")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## rules:")?;
        for rule in self.rules.values() {
            writeln!(f, "{}", rule.display(self))?;
        }

        Ok(())
    }
}

impl Grammar {
    /// Define a grammar using the specified function.
    pub fn define<F>(f: F) -> Result<Self, GrammarDefError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarDefError>,
    {
        let mut def = GrammarDef {
            terminals: Map::default(),
            nonterminals: Map::default(),
            rules: Map::default(),
            labels: Set::default(),
            start: None,
            next_terminal_id: TerminalID::OFFSET,
            next_nonterminal_id: NonterminalID::OFFSET,
            next_rule_id: RuleID::OFFSET,
        };

        def.terminals.insert(
            TerminalID::EOI,
            Terminal {
                id: TerminalID::EOI,
                label: "$eoi".into(),
            },
        );
        def.nonterminals.insert(
            NonterminalID::START,
            Nonterminal {
                id: NonterminalID::START,
                label: "$start".into(),
            },
        );

        f(&mut def)?;

        def.end()
    }

    pub fn terminal(&self, id: TerminalID) -> &Terminal {
        &self.terminals[&id]
    }

    pub fn nonterminal(&self, id: NonterminalID) -> &Nonterminal {
        &self.nonterminals[&id]
    }

    pub fn rule(&self, id: RuleID) -> &Rule {
        &self.rules[&id]
    }

    /// The augmented start rule `$start := S`.
    pub fn aug_start_rule(&self) -> &Rule {
        self.rule(RuleID::ACCEPT)
    }

    /// Return the production rules whose left-hand side is `left`, in
    /// definition order.
    pub fn rules_for(&self, left: NonterminalID) -> impl Iterator<Item = &Rule> + '_ {
        self.rules_by_left
            .get(&left)
            .into_iter()
            .flatten()
            .map(move |id| &self.rules[id])
    }

    /// Every symbol in this grammar, terminals first, in declaration order.
    pub fn all_symbols(&self) -> impl Iterator<Item = SymbolID> + '_ {
        let terminals = self.terminals.keys().map(|t| SymbolID::T(*t));
        let nonterminals = self.nonterminals.keys().map(|n| SymbolID::N(*n));
        terminals.chain(nonterminals)
    }

    pub fn first_sets(&self) -> &FirstSets {
        &self.first_sets
    }

    pub fn symbol(&self, symbol: SymbolID) -> impl fmt::Display + '_ {
        display_fn(move |f| match symbol {
            SymbolID::T(t) => fmt::Display::fmt(&self.terminals[&t], f),
            SymbolID::N(n) => fmt::Display::fmt(&self.nonterminals[&n], f),
        })
    }

    pub fn terminal_by_label(&self, label: &str) -> Option<TerminalID> {
        self.terminals
            .values()
            .find(|t| t.label() == label)
            .map(|t| t.id())
    }

    pub fn nonterminal_by_label(&self, label: &str) -> Option<NonterminalID> {
        self.nonterminals
            .values()
            .find(|n| n.label() == label)
            .map(|n| n.id())
    }
}

/// The contextural values for building a `Grammar`.
#[derive(Debug)]
pub struct GrammarDef {
    terminals: Map<TerminalID, Terminal>,
    nonterminals: Map<NonterminalID, Nonterminal>,
    rules: Map<RuleID, Rule>,
    labels: Set<String>,
    start: Option<NonterminalID>,
    next_terminal_id: u16,
    next_nonterminal_id: u16,
    next_rule_id: u16,
}

impl GrammarDef {
    /// Declare a terminal symbol used in this grammar.
    pub fn terminal(&mut self, label: &str) -> Result<TerminalID, GrammarDefError> {
        self.verify_label(label)?;

        let id = TerminalID::from_raw(next_raw(
            &mut self.next_terminal_id,
            GrammarDefError::TooManySymbols,
        )?);
        self.labels.insert(label.to_owned());
        self.terminals.insert(
            id,
            Terminal {
                id,
                label: label.to_owned().into(),
            },
        );

        Ok(id)
    }

    /// Declare a nonterminal symbol used in this grammar.
    pub fn nonterminal(&mut self, label: &str) -> Result<NonterminalID, GrammarDefError> {
        self.verify_label(label)?;

        let id = NonterminalID::from_raw(next_raw(
            &mut self.next_nonterminal_id,
            GrammarDefError::TooManySymbols,
        )?);
        self.labels.insert(label.to_owned());
        self.nonterminals.insert(
            id,
            Nonterminal {
                id,
                label: label.to_owned().into(),
            },
        );

        Ok(id)
    }

    /// Specify a production rule into this grammer.
    pub fn rule<I>(&mut self, left: NonterminalID, right: I) -> Result<RuleID, GrammarDefError>
    where
        I: IntoIterator<Item = SymbolID>,
    {
        if left == NonterminalID::START {
            return Err(GrammarDefError::ReservedSymbol);
        }
        if !self.nonterminals.contains_key(&left) {
            return Err(GrammarDefError::UnknownSymbol);
        }

        let right: Vec<SymbolID> = right.into_iter().collect();
        // Item positions are stored as u16.
        if right.len() > usize::from(u16::MAX) {
            return Err(GrammarDefError::RuleTooLong {
                label: self.nonterminals[&left].label().to_owned(),
            });
        }
        for symbol in &right {
            let known = match symbol {
                SymbolID::T(TerminalID::EOI) | SymbolID::N(NonterminalID::START) => {
                    return Err(GrammarDefError::ReservedSymbol)
                }
                SymbolID::T(t) => self.terminals.contains_key(t),
                SymbolID::N(n) => self.nonterminals.contains_key(n),
            };
            if !known {
                return Err(GrammarDefError::UnknownSymbol);
            }
        }

        if self
            .rules
            .values()
            .any(|rule| rule.left == left && rule.right == right)
        {
            return Err(GrammarDefError::DuplicateRule {
                label: self.nonterminals[&left].label().to_owned(),
            });
        }

        let id = RuleID::from_raw(next_raw(
            &mut self.next_rule_id,
            GrammarDefError::TooManyRules,
        )?);
        self.rules.insert(id, Rule { id, left, right });

        Ok(id)
    }

    /// Specify the start symbol for this grammar.
    pub fn start_symbol(&mut self, symbol: NonterminalID) -> Result<(), GrammarDefError> {
        if symbol == NonterminalID::START {
            return Err(GrammarDefError::ReservedSymbol);
        }
        if !self.nonterminals.contains_key(&symbol) {
            return Err(GrammarDefError::UnknownSymbol);
        }
        self.start.replace(symbol);
        Ok(())
    }

    fn verify_label(&self, label: &str) -> Result<(), GrammarDefError> {
        if label.is_empty() || label.starts_with('$') {
            return Err(GrammarDefError::InvalidLabel {
                label: label.to_owned(),
            });
        }
        if self.labels.contains(label) {
            return Err(GrammarDefError::DuplicateLabel {
                label: label.to_owned(),
            });
        }
        Ok(())
    }

    fn end(mut self) -> Result<Grammar, GrammarDefError> {
        // When no start symbol is given, the first declared nonterminal is used.
        let start = match self.start.take() {
            Some(start) => start,
            None => self
                .nonterminals
                .keys()
                .find(|id| **id != NonterminalID::START)
                .copied()
                .ok_or(GrammarDefError::EmptyNonterminals)?,
        };

        self.rules.insert(
            RuleID::ACCEPT,
            Rule {
                id: RuleID::ACCEPT,
                left: NonterminalID::START,
                right: vec![SymbolID::N(start)],
            },
        );

        let mut rules_by_left: Map<NonterminalID, Vec<RuleID>> = Map::default();
        for (id, rule) in &self.rules {
            rules_by_left.entry(rule.left).or_default().push(*id);
        }

        let first_sets = FirstSets::new(self.nonterminals.keys().copied(), &self.rules);

        Ok(Grammar {
            terminals: self.terminals,
            nonterminals: self.nonterminals,
            rules: self.rules,
            start_symbol: start,
            rules_by_left,
            first_sets,
        })
    }
}

/// Hand out the next raw id, failing once the u16 range is used up.
fn next_raw(counter: &mut u16, exhausted: GrammarDefError) -> Result<u16, GrammarDefError> {
    let raw = *counter;
    *counter = raw.checked_add(1).ok_or(exhausted)?;
    Ok(raw)
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarDefError {
    #[error("invalid symbol label: `{}'", label)]
    InvalidLabel { label: String },

    #[error("the label `{}' has already been used", label)]
    DuplicateLabel { label: String },

    #[error("duplicate production rule for `{}'", label)]
    DuplicateRule { label: String },

    #[error("the symbol is not declared in this grammar")]
    UnknownSymbol,

    #[error("reserved symbols cannot be used in rules")]
    ReservedSymbol,

    #[error("empty nonterminal symbols")]
    EmptyNonterminals,

    #[error("too many symbols in this grammar")]
    TooManySymbols,

    #[error("too many production rules in this grammar")]
    TooManyRules,

    #[error("the right-hand side of a rule for `{}' is too long", label)]
    RuleTooLong { label: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::SymbolID::*;

    #[test]
    fn augments_start_rule() {
        let grammar = Grammar::define(|g| {
            let a = g.terminal("a")?;
            let s = g.nonterminal("S")?;
            g.rule(s, [T(a)])?;
            Ok(())
        })
        .unwrap();
        eprintln!("{}", grammar);

        let s = grammar.nonterminal_by_label("S").unwrap();
        assert_eq!(grammar.start_symbol, s);
        let aug = grammar.aug_start_rule();
        assert_eq!(aug.left(), NonterminalID::START);
        assert_eq!(aug.right(), &[N(s)]);
        assert_eq!(aug.display(&grammar).to_string(), "$start := S");
    }

    #[test]
    fn rules_for_keeps_definition_order() {
        let grammar = Grammar::define(|g| {
            let a = g.terminal("a")?;
            let b = g.terminal("b")?;
            let s = g.nonterminal("S")?;
            g.rule(s, [T(b)])?;
            g.rule(s, [T(a), N(s)])?;
            Ok(())
        })
        .unwrap();

        let s = grammar.start_symbol;
        let rules: Vec<String> = grammar
            .rules_for(s)
            .map(|r| r.display(&grammar).to_string())
            .collect();
        assert_eq!(rules, ["S := b", "S := a S"]);
    }

    #[test]
    fn rejects_invalid_definitions() {
        let err = Grammar::define(|g| {
            g.terminal("x")?;
            g.nonterminal("x")?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::DuplicateLabel { .. }));

        let err = Grammar::define(|g| {
            let a = g.terminal("a")?;
            let s = g.nonterminal("S")?;
            g.rule(s, [T(a)])?;
            g.rule(s, [T(a)])?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::DuplicateRule { .. }));

        let err = Grammar::define(|g| {
            let s = g.nonterminal("S")?;
            g.rule(s, [T(TerminalID::EOI)])?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::ReservedSymbol));

        let err = Grammar::define(|g| {
            g.terminal("a")?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::EmptyNonterminals));
    }

    #[test]
    fn rejects_grammars_beyond_the_id_range() {
        let err = Grammar::define(|g| {
            let mut i = 0u32;
            loop {
                g.terminal(&format!("t{}", i))?;
                i += 1;
            }
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::TooManySymbols));

        let err = Grammar::define(|g| {
            let a = g.terminal("a")?;
            let s = g.nonterminal("S")?;
            g.rule(s, vec![T(a); usize::from(u16::MAX) + 1])?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::RuleTooLong { .. }));

        let mut raw = u16::MAX - 1;
        assert_eq!(
            next_raw(&mut raw, GrammarDefError::TooManyRules).unwrap(),
            u16::MAX - 1
        );
        assert!(matches!(
            next_raw(&mut raw, GrammarDefError::TooManyRules),
            Err(GrammarDefError::TooManyRules)
        ));
    }
}

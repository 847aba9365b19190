//! LR items and item sets.

use crate::{
    grammar::{Grammar, RuleID, SymbolID, TerminalID},
    interner::{InternID, Interned},
    util::display_fn,
};
use std::{fmt, hash::Hash};

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemID(u32);

impl fmt::Debug for ItemID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I#{:03}", self.0)
    }
}

impl InternID for ItemID {
    fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The common interface of LR items, a production rule with a cursor.
pub trait LRItem: Copy + Eq + Hash + Ord + fmt::Debug {
    fn rule(&self) -> RuleID;

    /// The cursor position, ranging over `0..=rule.right().len()`.
    fn position(&self) -> u16;

    /// A scalar that uniquely encodes every field of this item.
    fn key(&self) -> u64;

    /// Return the item whose cursor is moved forward by one symbol.
    ///
    /// # Panics
    /// Panics if the cursor is already at the end of the rule.
    fn advance(&self, g: &Grammar) -> Self;

    fn fmt_item(&self, g: &Grammar, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    /// The symbol immediately after the cursor, if any.
    fn next_symbol(&self, g: &Grammar) -> Option<SymbolID> {
        g.rule(self.rule())
            .right()
            .get::<usize>(self.position().into())
            .copied()
    }

    fn is_complete(&self, g: &Grammar) -> bool {
        usize::from(self.position()) == g.rule(self.rule()).right().len()
    }
}

/// The trace form of an item, e.g. `E -> E . plus T`.
pub fn display<'g, I: LRItem>(item: &'g I, g: &'g Grammar) -> impl fmt::Display + 'g {
    display_fn(move |f| item.fmt_item(g, f))
}

fn fmt_core(
    rule: RuleID,
    position: u16,
    g: &Grammar,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    let rule = g.rule(rule);
    write!(f, "{} ->", g.nonterminal(rule.left()))?;
    for (i, symbol) in rule.right().iter().enumerate() {
        if i == usize::from(position) {
            f.write_str(" .")?;
        }
        write!(f, " {}", g.symbol(*symbol))?;
    }
    if usize::from(position) == rule.right().len() {
        f.write_str(" .")?;
    }
    Ok(())
}

/// The LR(0) item, a.k.a. LR item core.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LR0Item {
    pub rule: RuleID,
    pub position: u16,
}

impl LR0Item {
    pub const fn new(rule: RuleID, position: u16) -> Self {
        Self { rule, position }
    }
}

impl LRItem for LR0Item {
    fn rule(&self) -> RuleID {
        self.rule
    }

    fn position(&self) -> u16 {
        self.position
    }

    fn key(&self) -> u64 {
        (u64::from(self.rule.into_raw()) << 16) | u64::from(self.position)
    }

    fn advance(&self, g: &Grammar) -> Self {
        assert!(
            !self.is_complete(g),
            "the cursor is already at the end of the rule"
        );
        // Rules are at most u16::MAX symbols long, so this cannot overflow.
        Self {
            position: self.position + 1,
            ..*self
        }
    }

    fn fmt_item(&self, g: &Grammar, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_core(self.rule, self.position, g, f)
    }
}

impl Interned for LR0Item {
    type Key = u64;
    fn key(&self) -> u64 {
        LRItem::key(self)
    }
}

/// The LR(1) item, an LR(0) item paired with one lookahead terminal.
///
/// The derived ordering compares the rule, the position and then the lookahead.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LR1Item {
    pub rule: RuleID,
    pub position: u16,
    pub lookahead: TerminalID,
}

impl LR1Item {
    pub const fn new(rule: RuleID, position: u16, lookahead: TerminalID) -> Self {
        Self {
            rule,
            position,
            lookahead,
        }
    }
}

impl LRItem for LR1Item {
    fn rule(&self) -> RuleID {
        self.rule
    }

    fn position(&self) -> u16 {
        self.position
    }

    fn key(&self) -> u64 {
        (u64::from(self.rule.into_raw()) << 32)
            | (u64::from(self.position) << 16)
            | u64::from(self.lookahead.into_raw())
    }

    fn advance(&self, g: &Grammar) -> Self {
        assert!(
            !self.is_complete(g),
            "the cursor is already at the end of the rule"
        );
        // Rules are at most u16::MAX symbols long, so this cannot overflow.
        Self {
            position: self.position + 1,
            ..*self
        }
    }

    fn fmt_item(&self, g: &Grammar, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_core(self.rule, self.position, g, f)?;
        write!(f, "  /  {}", g.terminal(self.lookahead))
    }
}

impl Interned for LR1Item {
    type Key = u64;
    fn key(&self) -> u64 {
        LRItem::key(self)
    }
}

/// A parser state, represented as a set of interned items.
///
/// The identifiers are kept sorted and deduplicated, so the sequence
/// itself is the canonical key of the set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ItemSet {
    items: Vec<ItemID>,
}

impl ItemSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: ItemID) -> bool {
        match self.items.binary_search(&item) {
            Ok(..) => false,
            Err(i) => {
                self.items.insert(i, item);
                true
            }
        }
    }

    pub fn contains(&self, item: ItemID) -> bool {
        self.items.binary_search(&item).is_ok()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ItemID> + '_ {
        self.items.iter().copied()
    }

    pub fn as_slice(&self) -> &[ItemID] {
        &self.items[..]
    }
}

impl FromIterator<ItemID> for ItemSet {
    fn from_iter<T: IntoIterator<Item = ItemID>>(iter: T) -> Self {
        let mut items: Vec<ItemID> = iter.into_iter().collect();
        items.sort_unstable();
        items.dedup();
        Self { items }
    }
}

impl Interned for ItemSet {
    type Key = Box<[ItemID]>;
    fn key(&self) -> Self::Key {
        self.items.clone().into_boxed_slice()
    }
}

use lrgraph::{
    grammar::{Grammar, GrammarDef, GrammarDefError, SymbolID::*},
    graph::{ItemGraph, LR0, LR1},
    samples,
    table::ParseTable,
};

// S := a S b | (empty)
fn g_nested(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    let a = g.terminal("a")?;
    let b = g.terminal("b")?;
    let s = g.nonterminal("S")?;
    g.rule(s, [T(a), N(s), T(b)])?;
    g.rule(s, [])?;
    Ok(())
}

// A := B c | d ; B := (empty) | e B
fn g_nullable_prefix(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    let c = g.terminal("c")?;
    let d = g.terminal("d")?;
    let e = g.terminal("e")?;
    let a = g.nonterminal("A")?;
    let b = g.nonterminal("B")?;
    g.rule(a, [N(b), T(c)])?;
    g.rule(a, [T(d)])?;
    g.rule(b, [])?;
    g.rule(b, [T(e), N(b)])?;
    Ok(())
}

// LR(1), but neither SLR(1) nor LALR(1).
// S := a A d | b B d | a B e | b A e ; A := c ; B := c
fn g_reduce_reduce(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    let [a, b, c, d, e] = ["a", "b", "c", "d", "e"].map(|label| g.terminal(label));
    let (a, b, c, d, e) = (a?, b?, c?, d?, e?);
    let s = g.nonterminal("S")?;
    let na = g.nonterminal("A")?;
    let nb = g.nonterminal("B")?;
    g.rule(s, [T(a), N(na), T(d)])?;
    g.rule(s, [T(b), N(nb), T(d)])?;
    g.rule(s, [T(a), N(nb), T(e)])?;
    g.rule(s, [T(b), N(na), T(e)])?;
    g.rule(na, [T(c)])?;
    g.rule(nb, [T(c)])?;
    Ok(())
}

macro_rules! define_tests {
    ($($name:ident => $define:path),*$(,)?) => {$(
        #[test]
        fn $name() {
            let grammar = Grammar::define($define).unwrap();
            let lr0 = ItemGraph::<LR0>::build(&grammar);
            let lr1 = ItemGraph::<LR1>::build(&grammar);
            assert!(lr0.len() <= lr1.len());

            let canonical = ParseTable::generate(&lr1);
            assert!(!canonical.has_conflicts());
        }
    )*};
}

define_tests! {
    expr => samples::expr,
    assign => samples::assign,
    nested => g_nested,
    nullable_prefix => g_nullable_prefix,
    reduce_reduce => g_reduce_reduce,
}

#[test]
fn reduce_reduce_needs_lookaheads() {
    let grammar = Grammar::define(g_reduce_reduce).unwrap();
    let slr = ParseTable::generate(&ItemGraph::<LR0>::build(&grammar));
    assert!(slr.has_conflicts());
}

//! Sample grammars shared by the tests, benchmarks and the CLI.

use crate::grammar::{GrammarDef, GrammarDefError, SymbolID::*};

/// The arithmetic expression grammar.
///
/// ```text
/// E := E plus T | T
/// T := T star F | F
/// F := open E close | id
/// ```
pub fn expr(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    let plus = g.terminal("plus")?;
    let star = g.terminal("star")?;
    let open = g.terminal("open")?;
    let close = g.terminal("close")?;
    let id = g.terminal("id")?;

    let e = g.nonterminal("E")?;
    let t = g.nonterminal("T")?;
    let f = g.nonterminal("F")?;

    g.start_symbol(e)?;

    g.rule(e, [N(e), T(plus), N(t)])?;
    g.rule(e, [N(t)])?;
    g.rule(t, [N(t), T(star), N(f)])?;
    g.rule(t, [N(f)])?;
    g.rule(f, [T(open), N(e), T(close)])?;
    g.rule(f, [T(id)])?;

    Ok(())
}

/// The assignment grammar, which is LR(1) but not SLR(1).
///
/// ```text
/// S := L eq R | R
/// L := star R | id
/// R := L
/// ```
pub fn assign(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    let eq = g.terminal("eq")?;
    let star = g.terminal("star")?;
    let id = g.terminal("id")?;

    let s = g.nonterminal("S")?;
    let l = g.nonterminal("L")?;
    let r = g.nonterminal("R")?;

    g.start_symbol(s)?;

    g.rule(s, [N(l), T(eq), N(r)])?;
    g.rule(s, [N(r)])?;
    g.rule(l, [T(star), N(r)])?;
    g.rule(l, [T(id)])?;
    g.rule(r, [N(l)])?;

    Ok(())
}

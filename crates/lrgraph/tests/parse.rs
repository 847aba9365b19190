use logos::Logos;
use lrgraph::{
    grammar::{Grammar, GrammarDef, GrammarDefError, SymbolID},
    graph::{ItemGraph, Strategy, LR0, LR1},
    parser::{ParseError, Parser},
    samples,
    table::{Action, ParseTable},
    token::{Token, TokenStream, Tokenizer},
    tree::Node,
};
use tracing::Level;

#[derive(Debug, Copy, Clone, Logos, PartialEq)]
#[logos(skip r"[ \t\n\f]+")]
enum Lexeme<'source> {
    #[token("(")]
    Open,

    #[token(")")]
    Close,

    #[token("+")]
    Plus,

    #[token("*")]
    Star,

    #[token("=")]
    Eq,

    #[regex(r"[a-zA-Z]+", |lex| lex.slice())]
    Id(&'source str),
}

impl Lexeme<'_> {
    fn label(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Plus => "plus",
            Self::Star => "star",
            Self::Eq => "eq",
            Self::Id(..) => "id",
        }
    }
}

fn lex<'a>(g: &'a Grammar, input: &'a str) -> impl Tokenizer<Error = String> + 'a {
    let tokens = Lexeme::lexer(input)
        .spanned()
        .map(move |(lexeme, span)| -> Result<Token, String> {
            let lexeme = lexeme.map_err(|()| format!("invalid character at {:?}", span))?;
            let symbol = g
                .terminal_by_label(lexeme.label())
                .ok_or_else(|| format!("`{}' is not used in this grammar", lexeme.label()))?;
            Ok(Token::new(symbol, Some(input[span].to_owned())))
        });
    TokenStream::new(tokens)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::TRACE)
        .try_init();
}

fn parse<S: Strategy>(
    define: fn(&mut GrammarDef) -> Result<(), GrammarDefError>,
    input: &str,
) -> Result<String, String> {
    init_tracing();
    let g = Grammar::define(define).unwrap();
    let table = ParseTable::generate(&ItemGraph::<S>::build(&g));
    let tree = Parser::new(&g, &table)
        .parse(&mut lex(&g, input))
        .map_err(|err| err.to_string())?;
    Ok(tree.map_or_else(String::new, |tree| tree.display(&g).to_string()))
}

#[test]
fn single_identifier() {
    assert_eq!(
        parse::<LR0>(samples::expr, "A").unwrap(),
        r#"E(T(F(id="A")))"#
    );
}

#[test]
fn precedence_of_operators() {
    assert_eq!(
        parse::<LR0>(samples::expr, "A+B*C").unwrap(),
        r#"E(E(T(F(id="A"))), plus="+", T(T(F(id="B")), star="*", F(id="C")))"#
    );
}

#[test]
fn parenthesized_expression() {
    assert_eq!(
        parse::<LR0>(samples::expr, "(A + B) * C").unwrap(),
        concat!(
            r#"E(T(T(F(open="(", E(E(T(F(id="A"))), plus="+", T(F(id="B"))), close=")")), "#,
            r#"star="*", F(id="C")))"#,
        )
    );
}

#[test]
fn variants_agree_on_expr() {
    for input in ["A", "A+B*C", "(A+B)*(C+D)", "((A))"] {
        assert_eq!(
            parse::<LR0>(samples::expr, input),
            parse::<LR1>(samples::expr, input),
        );
    }
}

#[test]
fn assignment_under_lr1() {
    assert_eq!(
        parse::<LR1>(samples::assign, "*A = B").unwrap(),
        r#"S(L(star="*", R(L(id="A"))), eq="=", R(L(id="B")))"#
    );
    assert_eq!(
        parse::<LR1>(samples::assign, "**A").unwrap(),
        r#"S(R(L(star="*", R(L(star="*", R(L(id="A")))))))"#
    );
}

#[test]
fn unresolved_conflict_fails_the_parse() {
    let g = Grammar::define(samples::assign).unwrap();
    let table = ParseTable::generate(&ItemGraph::<LR0>::build(&g));
    assert!(table.has_conflicts());

    let err = Parser::new(&g, &table)
        .parse(&mut lex(&g, "A = B"))
        .unwrap_err();
    let eq = SymbolID::T(g.terminal_by_label("eq").unwrap());
    match err {
        ParseError::Conflict {
            state,
            symbol,
            actions,
        } => {
            assert_eq!(symbol, eq);
            assert!(table.is_conflicted(state, symbol));
            assert!(matches!(actions[..], [Action::Shift(..), Action::Reduce(..)]));
        }
        err => panic!("unexpected error: {}", err),
    }
}

#[test]
fn custom_resolver_prefers_shift() {
    let g = Grammar::define(samples::assign).unwrap();
    let table = ParseTable::generate(&ItemGraph::<LR0>::build(&g));

    let mut resolved = 0;
    let tree = Parser::new(&g, &table)
        .with_resolver(|actions, stack, _| {
            assert!(!stack.is_empty());
            if actions.len() > 1 {
                resolved += 1;
            }
            actions
                .iter()
                .find(|action| matches!(action, Action::Shift(..)))
                .or_else(|| actions.first())
                .copied()
        })
        .parse(&mut lex(&g, "A = B"))
        .unwrap()
        .unwrap();

    assert_eq!(resolved, 1);
    assert_eq!(
        tree.display(&g).to_string(),
        r#"S(L(id="A"), eq="=", R(L(id="B")))"#
    );
}

#[test]
fn children_follow_rule_order() {
    let g = Grammar::define(samples::expr).unwrap();
    let table = ParseTable::generate(&ItemGraph::<LR1>::build(&g));

    let mut num_reduced = 0;
    let tree = Parser::new(&g, &table)
        .on_reduce(|node, rule| {
            let symbols: Vec<SymbolID> = node.children().map(Node::symbol).collect();
            assert_eq!(symbols, rule.right());
            num_reduced += 1;
        })
        .parse(&mut lex(&g, "A * (B + C) + D"))
        .unwrap()
        .unwrap();
    assert!(num_reduced > 0);

    fn walk(node: &Node, g: &Grammar) {
        if node.is_leaf() {
            return;
        }
        let SymbolID::N(left) = node.symbol() else {
            panic!("internal node of a terminal")
        };
        let symbols: Vec<SymbolID> = node.children().map(Node::symbol).collect();
        assert!(g.rules_for(left).any(|rule| rule.right() == &symbols[..]));
        for child in node.children() {
            walk(child, g);
        }
    }
    walk(&tree, &g);
}

#[test]
fn reports_unexpected_token() {
    let err = parse::<LR0>(samples::expr, "A B").unwrap_err();
    assert!(err.starts_with(r#"unexpected token "B" at state "#), "{}", err);

    let err = parse::<LR1>(samples::expr, "(A").unwrap_err();
    assert!(err.contains("end of input"), "{}", err);
}

#[test]
fn reports_lexer_error() {
    let err = parse::<LR0>(samples::expr, "A + 1").unwrap_err();
    assert!(err.starts_with("from lexer: invalid character"), "{}", err);

    let err = parse::<LR1>(samples::assign, "A + B").unwrap_err();
    assert!(err.contains("not used in this grammar"), "{}", err);
}

#[test]
fn table_outlives_failed_parses() {
    let g = Grammar::define(samples::expr).unwrap();
    let table = ParseTable::generate(&ItemGraph::<LR0>::build(&g));

    for _ in 0..2 {
        assert!(Parser::new(&g, &table).parse(&mut lex(&g, "A +")).is_err());
        let tree = Parser::new(&g, &table)
            .parse(&mut lex(&g, "A + B"))
            .unwrap();
        assert!(tree.is_some());
    }
}

use logos::Logos;
use lrgraph::{
    grammar::Grammar,
    token::{Token, TokenStream, Tokenizer},
};

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

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice())]
    Id(&'source str),
}

impl Lexeme<'_> {
    // the terminal label in the bundled grammars.
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

/// Tokenize `input` into the terminals of `grammar`.
pub fn tokens<'a>(
    grammar: &'a Grammar,
    input: &'a str,
) -> impl Tokenizer<Error = anyhow::Error> + 'a {
    let tokens = Lexeme::lexer(input)
        .spanned()
        .map(move |(lexeme, span)| -> anyhow::Result<Token> {
            let lexeme = lexeme.map_err(|()| anyhow::anyhow!("invalid character at {:?}", span))?;
            let symbol = grammar.terminal_by_label(lexeme.label()).ok_or_else(|| {
                anyhow::anyhow!("`{}' is not a terminal of this grammar", &input[span.clone()])
            })?;
            Ok(Token::new(symbol, Some(input[span].to_owned())))
        });
    TokenStream::new(tokens)
}

//! Tokens consumed by the parser.

use crate::grammar::TerminalID;
use std::{convert::Infallible, fmt, iter::Peekable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub symbol: TerminalID,
    pub value: Option<String>,
}

impl Token {
    pub fn new(symbol: TerminalID, value: impl Into<Option<String>>) -> Self {
        Self {
            symbol,
            value: value.into(),
        }
    }
}

/// The source of tokens, with one token of lookahead.
///
/// `Ok(None)` from either method means the end of input.
pub trait Tokenizer {
    type Error: fmt::Display;

    fn peek(&mut self) -> Result<Option<&Token>, Self::Error>;

    fn next(&mut self) -> Result<Option<Token>, Self::Error>;
}

/// Adapt a fallible token iterator, such as a lexer, to [`Tokenizer`].
#[derive(Debug)]
pub struct TokenStream<I> {
    inner: I,
    peeked: Option<Option<Token>>,
}

impl<I, E> TokenStream<I>
where
    I: Iterator<Item = Result<Token, E>>,
{
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            peeked: None,
        }
    }
}

impl<I, E> Tokenizer for TokenStream<I>
where
    I: Iterator<Item = Result<Token, E>>,
    E: fmt::Display,
{
    type Error = E;

    fn peek(&mut self) -> Result<Option<&Token>, E> {
        if self.peeked.is_none() {
            let token = self.inner.next().transpose()?;
            self.peeked = Some(token);
        }
        Ok(self.peeked.as_ref().and_then(Option::as_ref))
    }

    fn next(&mut self) -> Result<Option<Token>, E> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.inner.next().transpose(),
        }
    }
}

impl<I> Tokenizer for Peekable<I>
where
    I: Iterator<Item = Token>,
{
    type Error = Infallible;

    fn peek(&mut self) -> Result<Option<&Token>, Infallible> {
        Ok(Peekable::peek(self))
    }

    fn next(&mut self) -> Result<Option<Token>, Infallible> {
        Ok(Iterator::next(self))
    }
}

//! Term and proof-step grammar
//!
//! Terms are small nested expressions (`imp(p0, imp(p1, p0))`) and proof steps share the
//! same shape, so both go through one chumsky grammar. The declaration parser hands over the
//! significant tokens of a span; spans in the stream are token indices, so every node of the
//! resulting [`SyntaxTerm`] points back at the tokens it was built from.

use crate::follow::ast::{ErrorKind, Token, TokenType};
use chumsky::prelude::*;
use chumsky::Stream;
use std::ops::Range;

/// Token kinds the term grammar distinguishes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum TermLexeme {
    Name(String),
    Open,
    Close,
    Comma,
    Other(String),
}

impl TermLexeme {
    pub(crate) fn from_token(token: &Token) -> Self {
        match (token.token_type, token.content.as_str()) {
            (TokenType::Sep, "(") => TermLexeme::Open,
            (TokenType::Sep, ")") => TermLexeme::Close,
            (TokenType::Sep, ",") => TermLexeme::Comma,
            (TokenType::Word, content) if !token.error => TermLexeme::Name(content.to_string()),
            (_, content) => TermLexeme::Other(content.to_string()),
        }
    }
}

type TermError = Simple<TermLexeme>;

/// Unelaborated term: a name with an optional argument list.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SyntaxTerm {
    pub name: String,
    /// Token index of the name.
    pub name_index: usize,
    /// `None` for a bare name, `Some` (possibly empty) when parenthesized arguments follow.
    pub args: Option<Vec<SyntaxTerm>>,
    /// Token indices covered, end exclusive.
    pub span: Range<usize>,
}

fn term_parser() -> impl Parser<TermLexeme, SyntaxTerm, Error = TermError> {
    recursive(|term| {
        let name = select! { TermLexeme::Name(name) => name };
        let args = term
            .separated_by(just(TermLexeme::Comma))
            .delimited_by(just(TermLexeme::Open), just(TermLexeme::Close));

        name.map_with_span(|name, span: Range<usize>| (name, span.start))
            .then(args.or_not())
            .map_with_span(|((name, name_index), args), span| SyntaxTerm {
                name,
                name_index,
                args,
                span,
            })
    })
}

/// Parse the significant tokens at `indices` as one term.
///
/// On failure returns the token index to blame and the error kind: running out of tokens
/// inside an argument list is a missing `)`, anything else an unexpected token.
pub(crate) fn parse_term(
    tokens: &[Token],
    indices: &[usize],
) -> Result<SyntaxTerm, (usize, ErrorKind)> {
    let Some(&last) = indices.last() else {
        return Err((0, ErrorKind::MissingName));
    };
    let items: Vec<(TermLexeme, Range<usize>)> = indices
        .iter()
        .map(|&index| (TermLexeme::from_token(&tokens[index]), index..index + 1))
        .collect();

    let stream = Stream::from_iter(last + 1..last + 1, items.into_iter());
    term_parser()
        .then_ignore(end())
        .parse(stream)
        .map_err(|errors| match errors.into_iter().next() {
            Some(error) if error.found().is_some() => {
                (error.span().start.min(last), ErrorKind::UnexpectedToken)
            }
            _ => (last, ErrorKind::MissingCloseParen),
        })
}

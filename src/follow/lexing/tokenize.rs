//! Tokenization of a block into [`Token`]s
//!
//! Runs the logos lexer and turns every lexeme into a token with a full range. Spans the
//! lexer cannot match are not dropped: the gap between the previous token and the next
//! recognized one becomes a single token flagged `error`, so the stream always covers the
//! text exactly and in order.

use super::lexeme::Lexeme;
use crate::follow::ast::{SourceLocation, Token, TokenType};
use logos::Logos;
use std::ops::Range as ByteRange;

/// Tokenize normalized block text.
pub fn tokenize(source: &str) -> Vec<Token> {
    let location = SourceLocation::new(source);
    let mut tokens = Vec::new();
    let mut cursor = 0;
    let mut lexer = Lexeme::lexer(source);

    while let Some(result) = lexer.next() {
        // Unmatched input is picked up as the gap before the next recognized lexeme
        let Ok(lexeme) = result else {
            continue;
        };
        let span = lexer.span();
        if span.start > cursor {
            tokens.push(error_token(source, &location, cursor..span.start));
        }
        tokens.push(Token::new(
            &source[span.clone()],
            lexeme.token_type(),
            location.range(&span),
        ));
        cursor = span.end;
    }

    if cursor < source.len() {
        tokens.push(error_token(source, &location, cursor..source.len()));
    }

    tokens
}

fn error_token(source: &str, location: &SourceLocation, span: ByteRange<usize>) -> Token {
    Token::new(&source[span.clone()], TokenType::Word, location.range(&span)).with_error()
}

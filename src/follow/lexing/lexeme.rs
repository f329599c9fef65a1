//! Raw lexemes recognized by the logos lexer
//!
//! Whitespace and comments are lexemes too: the token stream has to reproduce the block text
//! byte for byte, so nothing is skipped.

use crate::follow::ast::TokenType;
use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lexeme {
    #[regex(r"//[^\n]*")]
    Comment,

    #[token("\n")]
    Newline,

    #[regex(r"[ \t\r\f]+")]
    Whitespace,

    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token(",")]
    Comma,
    #[token("=")]
    Equals,

    #[token("|-")]
    Target,
    #[token("-|")]
    Assume,

    #[token("type")]
    Type,
    #[token("term")]
    Term,
    #[token("axiom")]
    Axiom,
    #[token("thm")]
    Thm,

    // `|` only ever appears inside the statement markers
    #[regex(r"[^\s(){},=|]+")]
    Word,
}

impl Lexeme {
    /// Classification before elaboration refines words.
    pub fn token_type(self) -> TokenType {
        match self {
            Lexeme::Comment => TokenType::Comment,
            Lexeme::Newline | Lexeme::Whitespace => TokenType::Ignore,
            Lexeme::OpenParen
            | Lexeme::CloseParen
            | Lexeme::OpenBrace
            | Lexeme::CloseBrace
            | Lexeme::Comma
            | Lexeme::Equals => TokenType::Sep,
            Lexeme::Target
            | Lexeme::Assume
            | Lexeme::Type
            | Lexeme::Term
            | Lexeme::Axiom
            | Lexeme::Thm => TokenType::Key,
            Lexeme::Word => TokenType::Word,
        }
    }
}

/// Declaration keywords, in the order they are offered as completions.
pub const DECLARATION_KEYWORDS: &[&str] = &["type", "term", "axiom", "thm"];

/// Every reserved spelling; none of them can be used as a name.
pub const RESERVED: &[&str] = &["type", "term", "axiom", "thm", "|-", "-|"];

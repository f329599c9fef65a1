//! Tokens as handed to the editor surface
//!
//! The token stream is the highlighting source of truth: it covers the block text without
//! gaps, in order, and each token's [`TokenType`] is the refined classification produced by
//! elaboration (a word used as a theorem name ends up as [`TokenType::ThmName`]).

use super::range::Range;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Syntactic category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenType {
    Word,
    Sep,
    Ignore,
    Key,
    Comment,
    TypeName,
    ArgName,
    TermName,
    ConstName,
    AxiomName,
    ThmName,
}

impl TokenType {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::Word => "word",
            TokenType::Sep => "sep",
            TokenType::Ignore => "ignore",
            TokenType::Key => "key",
            TokenType::Comment => "comment",
            TokenType::TypeName => "type-name",
            TokenType::ArgName => "arg-name",
            TokenType::TermName => "term-name",
            TokenType::ConstName => "const-name",
            TokenType::AxiomName => "axiom-name",
            TokenType::ThmName => "thm-name",
        }
    }

    /// Tokens the parser never looks at.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenType::Ignore | TokenType::Comment)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub content: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub range: Range,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Token {
    pub fn new(content: impl Into<String>, token_type: TokenType, range: Range) -> Self {
        Self {
            content: content.into(),
            token_type,
            range,
            error: false,
            comment: None,
        }
    }

    pub fn with_error(mut self) -> Self {
        self.error = true;
        self
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Concatenate token contents back into source text.
pub fn detokenize(tokens: &[Token]) -> String {
    tokens.iter().map(|token| token.content.as_str()).collect()
}

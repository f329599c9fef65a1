//! Rename by token substitution
//!
//! Renaming is not scope aware: every token whose content equals the old name is replaced,
//! whatever it refers to. Two unrelated declarations that share a name are both renamed.

use crate::follow::ast::Token;
use crate::follow::lexing::{tokenize, RESERVED};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// A name must lex as a single word.
static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s(){},=|]+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenameError {
    #[error("new name cannot be empty")]
    Empty,
    #[error("'{0}' is not a valid name")]
    InvalidName(String),
    #[error("'{0}' is a reserved word")]
    Reserved(String),
    #[error("nothing named '{0}' to rename")]
    NotFound(String),
}

pub fn validate_name(name: &str) -> Result<(), RenameError> {
    if name.is_empty() {
        return Err(RenameError::Empty);
    }
    if !NAME_PATTERN.is_match(name) || name.starts_with("//") {
        return Err(RenameError::InvalidName(name.to_string()));
    }
    if RESERVED.contains(&name) {
        return Err(RenameError::Reserved(name.to_string()));
    }
    Ok(())
}

/// Concatenate `tokens`, writing `to` in place of every token whose content is `from`.
pub fn rename_tokens(tokens: &[Token], from: &str, to: &str) -> String {
    tokens
        .iter()
        .map(|token| {
            if token.content == from {
                to
            } else {
                token.content.as_str()
            }
        })
        .collect()
}

/// Rename `from` to `to` throughout `source`.
pub fn rename(source: &str, from: &str, to: &str) -> Result<String, RenameError> {
    validate_name(to)?;
    let tokens = tokenize(source);
    if !tokens.iter().any(|token| token.content == from) {
        return Err(RenameError::NotFound(from.to_string()));
    }
    Ok(rename_tokens(&tokens, from, to))
}

/// Content of the non-blank token touching `offset`, the rename source for a caret there.
pub fn rename_source_at(tokens: &[Token], offset: usize) -> Option<&str> {
    tokens
        .iter()
        .find(|token| !token.is_blank() && token.range.contains_offset(offset))
        .map(|token| token.content.as_str())
}

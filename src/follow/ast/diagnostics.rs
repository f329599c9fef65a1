//! Diagnostics
//!
//! Problems found while tokenizing, parsing, elaborating or tracking proofs are collected as
//! [`Error`] values: the offending token plus an [`ErrorKind`]. The kind resolves to a
//! display message through a fixed lookup ([`ErrorKind::message`]). Nothing in the pipeline
//! raises these; a block with errors still yields tokens, nodes and suggestions.

use super::token::Token;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    UnknownToken,
    BracketMismatch,
    UnexpectedToken,
    MissingName,
    MissingType,
    MissingOpenBrace,
    MissingCloseParen,
    UnknownType,
    UnknownName,
    UnknownRule,
    DuplicateName,
    DuplicateParam,
    ArgumentCount,
    TypeMismatch,
    MissingTarget,
    InvalidProofStep,
    ProofIncomplete,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::UnknownToken => "unknown-token",
            ErrorKind::BracketMismatch => "bracket-mismatch",
            ErrorKind::UnexpectedToken => "unexpected-token",
            ErrorKind::MissingName => "missing-name",
            ErrorKind::MissingType => "missing-type",
            ErrorKind::MissingOpenBrace => "missing-open-brace",
            ErrorKind::MissingCloseParen => "missing-close-paren",
            ErrorKind::UnknownType => "unknown-type",
            ErrorKind::UnknownName => "unknown-name",
            ErrorKind::UnknownRule => "unknown-rule",
            ErrorKind::DuplicateName => "duplicate-name",
            ErrorKind::DuplicateParam => "duplicate-param",
            ErrorKind::ArgumentCount => "argument-count",
            ErrorKind::TypeMismatch => "type-mismatch",
            ErrorKind::MissingTarget => "missing-target",
            ErrorKind::InvalidProofStep => "invalid-proof-step",
            ErrorKind::ProofIncomplete => "proof-incomplete",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::UnknownToken => "unrecognized character sequence",
            ErrorKind::BracketMismatch => "bracket mismatch: no matching bracket found",
            ErrorKind::UnexpectedToken => "unexpected token",
            ErrorKind::MissingName => "expected a name",
            ErrorKind::MissingType => "expected a type name",
            ErrorKind::MissingOpenBrace => "expected '{'",
            ErrorKind::MissingCloseParen => "expected ')'",
            ErrorKind::UnknownType => "unknown type",
            ErrorKind::UnknownName => "unknown name",
            ErrorKind::UnknownRule => "unknown axiom or theorem",
            ErrorKind::DuplicateName => "name is already declared",
            ErrorKind::DuplicateParam => "parameter name is already used",
            ErrorKind::ArgumentCount => "wrong number of arguments",
            ErrorKind::TypeMismatch => "argument type does not match the parameter type",
            ErrorKind::MissingTarget => "declaration has no target (|-)",
            ErrorKind::InvalidProofStep => "proof step does not apply to the current goals",
            ErrorKind::ProofIncomplete => "proof is incomplete: goals remain",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Error {
    pub token: Token,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
}

impl Error {
    pub fn new(token: Token, kind: ErrorKind) -> Self {
        Self { token, kind }
    }

    pub fn message(&self) -> &'static str {
        self.kind.message()
    }
}

/// Renders the way the editor's error list shows it: `content(l:c-l:c) : message`.
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let range = &self.token.range;
        write!(
            f,
            "{}({}:{}-{}:{}) : {}",
            self.token.content,
            range.start.line,
            range.start.character,
            range.end.line,
            range.end.character,
            self.message()
        )
    }
}

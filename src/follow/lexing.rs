//! Lexer
//!
//!     Block text is first normalized (see [`normalize_source`]) and then tokenized by a
//!     logos lexer into a flat stream of [`Token`](crate::follow::ast::Token)s.
//!
//!     Nothing is skipped: whitespace, newlines and comments are tokens of their own, and
//!     input the lexer does not recognize becomes a token flagged `error`. Concatenating the
//!     contents of the stream gives back the normalized text exactly, and token ranges are
//!     strictly increasing. Later stages never re-slice the source; they work from the
//!     stream and its ranges.
//!
//!     Classification at this stage is purely lexical. Words are refined into type, term,
//!     argument, axiom and theorem names by the parser, see
//!     [`refine`](crate::follow::parsing::refine).

pub mod lexeme;
pub mod tokenize;

pub use lexeme::{Lexeme, DECLARATION_KEYWORDS, RESERVED};
pub use tokenize::tokenize;

/// Normalize block content before compiling.
///
/// Empty content becomes a single newline, and a newline is always appended so that the
/// last line, even an empty one, is represented in the token stream the editor renders.
/// Only the end of the text changes, so offsets into the host's content stay valid.
pub fn normalize_source(source: &str) -> String {
    format!("{}\n", source)
}

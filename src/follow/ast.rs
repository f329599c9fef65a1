//! Data model shared by every stage of the pipeline
//!
//! - [`range`]: positions carrying line, character and byte offset together
//! - [`token`]: classified tokens, the highlighting source of truth
//! - [`term`]: elaborated terms and term display templates
//! - [`cnode`]: compiled declaration nodes, including theorem proof state
//! - [`diagnostics`]: errors as data with a fixed message lookup

pub mod cnode;
pub mod diagnostics;
pub mod range;
pub mod term;
pub mod token;

pub use cnode::{AstNode, AxiomCNode, CNode, CNodeType, Proof, TermCNode, ThmCNode, TypeCNode};
pub use diagnostics::{Error, ErrorKind};
pub use range::{Position, Range, SourceLocation};
pub use term::{Param, TemplatePiece, Term, TermKind, TermTemplate};
pub use token::{detokenize, Token, TokenType};

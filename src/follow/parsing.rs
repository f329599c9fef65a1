//! Parser and elaborator
//!
//!     Turns the token stream of one block into compiled nodes. Parsing and elaboration
//!     happen in the same pass: names are resolved against the declarations seen so far, terms
//!     are type checked, and proof steps are instantiated against the rules they cite.
//!
//!     The parser is error tolerant. A malformed construct records a diagnostic and parsing
//!     resumes at the next declaration keyword (or statement marker, inside a declaration), so
//!     the whole block always yields nodes. Bracket balance is checked by a separate pass over
//!     the stream ([`brackets`]).
//!
//!     The input tokens are never mutated. Classification learned during the pass goes into a
//!     [`Refinement`] that the compiler applies once all diagnostics are known.
//!
//!     Declarations are recursive descent over the significant tokens; terms and proof steps
//!     are handed to the chumsky grammar in [`terms`].

pub mod brackets;
pub mod parser;
pub mod refine;
pub mod scope;
pub mod terms;

pub use parser::parse;
pub use refine::Refinement;
pub use scope::{Rule, RuleKind, Scope, TermDef, TypeDecl};

use crate::follow::ast::{CNode, ErrorKind, Position};

/// A diagnostic before tokens are final: the token index and the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RawError {
    pub index: usize,
    pub kind: ErrorKind,
}

impl RawError {
    pub fn new(index: usize, kind: ErrorKind) -> Self {
        Self { index, kind }
    }
}

/// Where a new proof step for a theorem goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofInsert {
    /// Right after the last step.
    AfterStep(Position),
    /// Right after the `{` of an empty proof block.
    AfterOpenBrace(Position),
    /// Right after the statement block; there is no proof block yet.
    NewBlock(Position),
    /// Right after a `=` that has no `{` following it.
    AfterEquals(Position),
}

/// Token-level bookkeeping for a theorem node.
#[derive(Debug, Clone)]
pub struct ThmSite {
    /// Index of the node in [`ParseOutput::cnodes`].
    pub node: usize,
    pub order: usize,
    pub keyword_index: usize,
    pub name_index: Option<usize>,
    /// Start of the doc comment, or of the keyword when there is none.
    pub leading: Position,
    /// Token index of each step's rule name, co-indexed with the node's proofs.
    pub step_indices: Vec<usize>,
    pub insert: Option<ProofInsert>,
}

/// A reference that did not resolve, with the names that were visible at that point.
#[derive(Debug, Clone)]
pub struct Unresolved {
    pub index: usize,
    pub kind: ErrorKind,
    pub candidates: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    pub cnodes: Vec<CNode>,
    pub scope: Scope,
    pub refinement: Refinement,
    pub errors: Vec<RawError>,
    pub theorems: Vec<ThmSite>,
    pub unresolved: Vec<Unresolved>,
    /// Words found where a declaration keyword was expected.
    pub stray_words: Vec<usize>,
}

//! Compiled nodes
//!
//! One [`CNode`] per declaration in the block. All variants expose their `cnodetype` and an
//! [`AstNode`] whose range lies inside the block. The theorem variant additionally carries
//! its proof steps and, co-indexed with them, the goal list left after each step.

use super::range::Range;
use super::term::{Param, Term, TermTemplate};
use super::token::Token;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CNodeType {
    Type,
    Term,
    Axiom,
    Thm,
}

impl CNodeType {
    pub fn keyword(self) -> &'static str {
        match self {
            CNodeType::Type => "type",
            CNodeType::Term => "term",
            CNodeType::Axiom => "axiom",
            CNodeType::Thm => "thm",
        }
    }
}

impl fmt::Display for CNodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Source extent of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AstNode {
    pub range: Range,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "cnodetype", rename_all = "lowercase")]
pub enum CNode {
    Type(TypeCNode),
    Term(TermCNode),
    Axiom(AxiomCNode),
    Thm(ThmCNode),
}

impl CNode {
    pub fn cnodetype(&self) -> CNodeType {
        match self {
            CNode::Type(_) => CNodeType::Type,
            CNode::Term(_) => CNodeType::Term,
            CNode::Axiom(_) => CNodeType::Axiom,
            CNode::Thm(_) => CNodeType::Thm,
        }
    }

    pub fn ast_node(&self) -> &AstNode {
        match self {
            CNode::Type(node) => &node.ast_node,
            CNode::Term(node) => &node.ast_node,
            CNode::Axiom(node) => &node.ast_node,
            CNode::Thm(node) => &node.ast_node,
        }
    }

    pub fn range(&self) -> &Range {
        &self.ast_node().range
    }

    pub fn as_thm(&self) -> Option<&ThmCNode> {
        match self {
            CNode::Thm(thm) => Some(thm),
            _ => None,
        }
    }
}

/// `type a b c`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCNode {
    pub ast_node: AstNode,
    pub names: Vec<String>,
}

/// `term TYPE NAME(params) { body }`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermCNode {
    pub ast_node: AstNode,
    pub name: String,
    pub type_name: String,
    pub params: Vec<Param>,
    pub template: TermTemplate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl TermCNode {
    pub fn is_constant(&self) -> bool {
        self.params.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxiomCNode {
    pub ast_node: AstNode,
    pub name: String,
    pub params: Vec<Param>,
    pub targets: Vec<Term>,
    pub assumptions: Vec<Term>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThmCNode {
    pub ast_node: AstNode,
    pub name: String,
    pub params: Vec<Param>,
    pub targets: Vec<Term>,
    pub assumptions: Vec<Term>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Range of the `= { ... }` block, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_block: Option<Range>,
    pub proofs: Vec<Proof>,
    pub proof_process: Vec<Vec<Term>>,
}

impl ThmCNode {
    /// Goals left after the last step, or the statement's targets when there are no steps.
    pub fn remaining_goals(&self) -> &[Term] {
        self.proof_process
            .last()
            .map(Vec::as_slice)
            .unwrap_or(&self.targets)
    }

    /// A theorem is proved when it has a proof block, no step failed validation, and no
    /// goal is left over.
    pub fn is_proved(&self) -> bool {
        self.proof_block.is_some()
            && self.proofs.iter().all(|proof| proof.diff_error.is_none())
            && self.remaining_goals().is_empty()
    }

    /// Index of the step whose lines include `line`.
    pub fn proof_index_at_line(&self, line: usize) -> Option<usize> {
        self.proofs
            .iter()
            .position(|proof| proof.range.contains_line(line))
    }
}

/// One proof step: a rule applied to argument terms.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    pub root: Token,
    pub children: Vec<Term>,
    pub targets: Vec<Term>,
    pub assumptions: Vec<Term>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_error: Option<Vec<String>>,
    pub range: Range,
}

//! Text rendering of the proof state under the cursor
//!
//! The proof panel shows two things for the step on the cursor line: the step itself, as
//! the instantiated rule it applies, and the goals left after it.

use crate::follow::ast::{CNode, ThmCNode};
use serde::Serialize;

const QED: &str = "Q.E.D";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofStateView {
    pub theorem: String,
    pub step: usize,
    /// ```text
    /// thm mp(p, q) {
    ///   |- q
    ///   -| p
    ///   diff ...
    /// }
    /// ```
    pub operation: String,
    /// One `|- goal` line per remaining goal, or `Q.E.D`.
    pub goals: String,
}

/// The state for the proof step that spans `line`, if any.
pub fn proof_state_at(cnodes: &[CNode], line: usize) -> Option<ProofStateView> {
    let thm = cnodes
        .iter()
        .filter_map(CNode::as_thm)
        .find(|thm| thm.ast_node.range.contains_line(line))?;
    let step = thm.proof_index_at_line(line)?;
    Some(render_step(thm, step))
}

fn render_step(thm: &ThmCNode, step: usize) -> ProofStateView {
    let proof = &thm.proofs[step];
    let children: Vec<&str> = proof
        .children
        .iter()
        .map(|child| child.term_content.as_str())
        .collect();

    let mut lines = vec![format!("thm {}({}) {{", proof.root.content, children.join(", "))];
    lines.extend(proof.targets.iter().map(|t| format!("  |- {}", t.term_content)));
    lines.extend(proof.assumptions.iter().map(|a| format!("  -| {}", a.term_content)));
    if let Some(diff) = proof.diff_error.as_ref().filter(|diff| !diff.is_empty()) {
        lines.push(format!("  diff {}", diff.join(" ")));
    }
    lines.push("}".to_string());

    let goals = match thm.proof_process.get(step) {
        Some(goals) if !goals.is_empty() => goals
            .iter()
            .map(|goal| format!("|- {}", goal.term_content))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => QED.to_string(),
    };

    ProofStateView {
        theorem: thm.name.clone(),
        step,
        operation: lines.join("\n"),
        goals,
    }
}

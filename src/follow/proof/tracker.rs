//! Goal-state machine for one theorem

use super::validator::ProofValidator;
use crate::follow::ast::{ThmCNode, Term};

/// A theorem with its proof process filled in.
#[derive(Debug, Clone)]
pub struct Tracked {
    pub node: ThmCNode,
    /// Steps the validator rejected.
    pub invalid_steps: Vec<usize>,
}

/// Run every step of `thm` through `validator`.
///
/// Steps that already carry a `diff_error` (they could not be elaborated) and steps the
/// validator rejects leave the state unchanged. Either way one state is recorded per step,
/// so `proofs` and `proof_process` stay co-indexed.
pub fn track(mut thm: ThmCNode, validator: &dyn ProofValidator) -> Tracked {
    let mut goals: Vec<Term> = thm.targets.clone();
    let mut process = Vec::with_capacity(thm.proofs.len());
    let mut invalid_steps = Vec::new();

    for (index, proof) in thm.proofs.iter_mut().enumerate() {
        if proof.diff_error.is_none() {
            let outcome = validator.apply(&goals, proof, &thm.assumptions);
            if outcome.is_valid() {
                goals = outcome.goals;
            } else {
                proof.diff_error = Some(outcome.diff);
                invalid_steps.push(index);
            }
        }
        process.push(goals.clone());
    }

    thm.proof_process = process;
    Tracked {
        node: thm,
        invalid_steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::follow::ast::CNode;
    use crate::follow::lexing::{normalize_source, tokenize};
    use crate::follow::parsing::parse;
    use crate::follow::proof::GoalMatchingValidator;

    fn tracked(source: &str) -> Tracked {
        let tokens = tokenize(&normalize_source(source));
        let output = parse(&tokens);
        let thm = output
            .cnodes
            .into_iter()
            .rev()
            .find_map(|node| match node {
                CNode::Thm(thm) => Some(thm),
                _ => None,
            })
            .unwrap();
        track(thm, &GoalMatchingValidator)
    }

    const PRELUDE: &str = "\
type prop
term prop imp(prop p0, prop p1) { (p0 -> p1) }
axiom mp(prop p0, prop p1) {
  |- p1
  -| p0
  -| imp(p0, p1)
}
axiom a1(prop p0, prop p1) {
  |- imp(p0, imp(p1, p0))
}
axiom a2(prop p0, prop p1, prop p2) {
  |- imp(imp(p0, imp(p1, p2)), imp(imp(p0, p1), imp(p0, p2)))
}
";

    #[test]
    fn test_identity_proof_closes_all_goals() {
        let source = format!(
            "{}thm id(prop p) {{\n  |- imp(p, p)\n}} = {{\n  mp(imp(p, imp(p, p)), imp(p, p))\n  mp(imp(p, imp(imp(p, p), p)), imp(imp(p, imp(p, p)), imp(p, p)))\n  a2(p, imp(p, p), p)\n  a1(p, imp(p, p))\n  a1(p, p)\n}}\n",
            PRELUDE
        );
        let tracked = tracked(&source);
        let thm = &tracked.node;
        assert_eq!(thm.proofs.len(), 5);
        assert_eq!(thm.proof_process.len(), 5);
        assert!(tracked.invalid_steps.is_empty());
        assert_eq!(thm.proof_process[0].len(), 2);
        assert!(thm.proof_process[4].is_empty());
        assert!(thm.is_proved());
    }

    #[test]
    fn test_invalid_step_keeps_state_and_tracking_continues() {
        let source = format!(
            "{}thm t(prop p, prop q) {{\n  |- imp(p, imp(q, p))\n}} = {{\n  a1(q, p)\n  a1(p, q)\n}}\n",
            PRELUDE
        );
        let tracked = tracked(&source);
        let thm = &tracked.node;
        assert_eq!(tracked.invalid_steps, vec![0]);
        assert_eq!(
            thm.proofs[0].diff_error,
            Some(vec!["(q -> (p -> q))".to_string()])
        );
        assert_eq!(thm.proof_process[0], thm.targets);
        assert!(thm.proof_process[1].is_empty());
        assert!(!thm.is_proved());
    }

    #[test]
    fn test_hypotheses_discharge_assumptions() {
        let source = format!(
            "{}thm t(prop p, prop q) {{\n  |- q\n  -| p\n  -| imp(p, q)\n}} = {{\n  mp(p, q)\n}}\n",
            PRELUDE
        );
        let thm = tracked(&source).node;
        assert!(thm.proof_process[0].is_empty());
    }

    #[test]
    fn test_no_proof_block() {
        let source = format!("{}thm t(prop p) {{\n  |- imp(p, p)\n}}\n", PRELUDE);
        let thm = tracked(&source).node;
        assert!(thm.proofs.is_empty());
        assert!(thm.proof_process.is_empty());
        assert_eq!(thm.remaining_goals(), thm.targets.as_slice());
    }
}

//! Step validation

use crate::follow::ast::{Proof, Term};

/// Result of applying one step to a goal list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Goals after the step. Only meaningful when `diff` is empty.
    pub goals: Vec<Term>,
    /// Why the step does not apply; empty when it does.
    pub diff: Vec<String>,
}

impl StepOutcome {
    pub fn applied(goals: Vec<Term>) -> Self {
        Self {
            goals,
            diff: Vec::new(),
        }
    }

    pub fn rejected(diff: Vec<String>) -> Self {
        Self {
            goals: Vec::new(),
            diff,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.diff.is_empty()
    }
}

/// Decides whether a step transforms the current goals, and into what.
///
/// `step.targets` and `step.assumptions` are the cited rule's statements already
/// instantiated with the step's arguments. `hypotheses` are the theorem's own assumptions.
pub trait ProofValidator: Send + Sync {
    fn apply(&self, goals: &[Term], step: &Proof, hypotheses: &[Term]) -> StepOutcome;
}

/// Backward reasoning by goal matching.
///
/// Every target of the step must be an open goal. The first matched goal is replaced, in
/// place, by the step's assumptions that are neither hypotheses nor still-open goals; the
/// other matched goals are closed.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoalMatchingValidator;

impl ProofValidator for GoalMatchingValidator {
    fn apply(&self, goals: &[Term], step: &Proof, hypotheses: &[Term]) -> StepOutcome {
        let mut matched: Vec<usize> = Vec::new();
        let mut diff = Vec::new();
        for target in &step.targets {
            let position = goals
                .iter()
                .enumerate()
                .position(|(index, goal)| goal == target && !matched.contains(&index));
            match position {
                Some(index) => matched.push(index),
                None => diff.push(target.term_content.clone()),
            }
        }
        if !diff.is_empty() {
            return StepOutcome::rejected(diff);
        }
        let Some(&first) = matched.iter().min() else {
            return StepOutcome::rejected(vec!["step proves nothing".to_string()]);
        };

        let open: Vec<&Term> = goals
            .iter()
            .enumerate()
            .filter(|(index, _)| !matched.contains(index))
            .map(|(_, goal)| goal)
            .collect();
        let mut subgoals: Vec<Term> = Vec::new();
        for assumption in &step.assumptions {
            if hypotheses.contains(assumption)
                || open.contains(&assumption)
                || subgoals.contains(assumption)
            {
                continue;
            }
            subgoals.push(assumption.clone());
        }

        let mut next = Vec::with_capacity(goals.len() + subgoals.len());
        for (index, goal) in goals.iter().enumerate() {
            if index == first {
                next.append(&mut subgoals);
            } else if !matched.contains(&index) {
                next.push(goal.clone());
            }
        }
        StepOutcome::applied(next)
    }
}

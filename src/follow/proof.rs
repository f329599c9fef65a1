//! Proof-state tracking
//!
//!     A theorem's proof is a sequence of steps, each citing an axiom or an earlier theorem
//!     with concrete arguments. Starting from the theorem's targets, the tracker feeds every
//!     step to a [`ProofValidator`] and records the goal list after it, so that
//!     `proof_process[i]` is the state left by `proofs[i]`.
//!
//!     The validator is the only place that knows what makes a step valid. The default,
//!     [`GoalMatchingValidator`], matches the step's instantiated targets against the open
//!     goals; hosts with different rule semantics plug in their own.
//!
//!     A failing step is recorded in its `diff_error` and leaves the state unchanged; tracking
//!     always continues with the next step.

pub mod tracker;
pub mod validator;
pub mod view;

pub use tracker::{track, Tracked};
pub use validator::{GoalMatchingValidator, ProofValidator, StepOutcome};
pub use view::{proof_state_at, ProofStateView};

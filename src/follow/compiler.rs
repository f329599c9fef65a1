//! Block compiler
//!
//! [`Compiler::compile`] runs the whole pipeline on one block and returns a [`CompileInfo`]:
//!
//! 1. normalize and tokenize the text
//! 2. parse and elaborate into nodes, collecting raw diagnostics and token refinements
//! 3. track the proof state of every theorem through the configured validator
//! 4. apply the refinements, producing the final token stream
//! 5. compute suggestions
//!
//! Compilation is total. Every problem in the text is reported as data in
//! [`CompileInfo::errors`]; nothing here returns an error or panics on user input.

use crate::follow::ast::{detokenize, CNode, Error, ErrorKind, Token};
use crate::follow::config::CompilerConfig;
use crate::follow::lexing::{normalize_source, tokenize};
use crate::follow::parsing::{parse, RawError, ThmSite};
use crate::follow::proof::{proof_state_at, track, GoalMatchingValidator, ProofStateView, ProofValidator};
use crate::follow::suggestion::{rename_source_at, suggest, Suggestion, SuggestionContext};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Result of compiling one block.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileInfo {
    pub tokens: Vec<Token>,
    #[serde(rename = "cNodes")]
    pub cnodes: Vec<CNode>,
    pub errors: Vec<Error>,
    pub suggestions: Vec<Suggestion>,
}

impl CompileInfo {
    /// The normalized text the tokens cover.
    pub fn source(&self) -> String {
        detokenize(&self.tokens)
    }

    pub fn token_at(&self, offset: usize) -> Option<&Token> {
        self.tokens
            .iter()
            .find(|token| token.range.span().contains(&offset))
    }

    /// What a rename at `offset` would rename.
    pub fn rename_source_at(&self, offset: usize) -> Option<&str> {
        rename_source_at(&self.tokens, offset)
    }

    pub fn proof_state_at(&self, line: usize) -> Option<ProofStateView> {
        proof_state_at(&self.cnodes, line)
    }

    /// Suggestions whose primary edit touches `line`.
    pub fn suggestions_at_line(&self, line: usize) -> impl Iterator<Item = &Suggestion> {
        self.suggestions
            .iter()
            .filter(move |suggestion| suggestion.range.contains_line(line))
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub struct Compiler {
    config: CompilerConfig,
    validator: Box<dyn ProofValidator>,
}

impl fmt::Debug for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self::with_validator(config, Box::new(GoalMatchingValidator))
    }

    pub fn with_validator(config: CompilerConfig, validator: Box<dyn ProofValidator>) -> Self {
        Self { config, validator }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn compile(&self, text: &str) -> CompileInfo {
        let source = normalize_source(text);
        let initial = tokenize(&source);
        let mut parsed = parse(&initial);
        let mut errors: Vec<RawError> = std::mem::take(&mut parsed.errors);

        let sites: HashMap<usize, &ThmSite> =
            parsed.theorems.iter().map(|site| (site.node, site)).collect();
        let mut cnodes = Vec::with_capacity(parsed.cnodes.len());
        for (position, node) in std::mem::take(&mut parsed.cnodes).into_iter().enumerate() {
            let CNode::Thm(thm) = node else {
                cnodes.push(node);
                continue;
            };
            let tracked = track(thm, self.validator.as_ref());
            if let Some(site) = sites.get(&position) {
                for step in &tracked.invalid_steps {
                    if let Some(&index) = site.step_indices.get(*step) {
                        errors.push(RawError::new(index, ErrorKind::InvalidProofStep));
                    }
                }
                if self.config.proof.report_incomplete && !tracked.node.remaining_goals().is_empty() {
                    let anchor = site.name_index.unwrap_or(site.keyword_index);
                    errors.push(RawError::new(anchor, ErrorKind::ProofIncomplete));
                }
            }
            cnodes.push(CNode::Thm(tracked.node));
        }
        errors.sort();
        errors.dedup();

        let tokens = parsed.refinement.apply(&initial, &errors);
        for (position, node) in cnodes.iter_mut().enumerate() {
            let (CNode::Thm(thm), Some(site)) = (node, sites.get(&position)) else {
                continue;
            };
            for (proof, index) in thm.proofs.iter_mut().zip(&site.step_indices) {
                if let Some(token) = tokens.get(*index) {
                    proof.root = token.clone();
                }
            }
        }

        let errors: Vec<Error> = errors
            .iter()
            .filter_map(|error| {
                tokens
                    .get(error.index)
                    .map(|token| Error::new(token.clone(), error.kind))
            })
            .collect();

        let suggestions = suggest(
            &SuggestionContext {
                tokens: &tokens,
                cnodes: &cnodes,
                parsed: &parsed,
            },
            &self.config.suggestions,
        );

        debug!(
            tokens = tokens.len(),
            cnodes = cnodes.len(),
            errors = errors.len(),
            suggestions = suggestions.len(),
            "compiled block"
        );

        CompileInfo {
            tokens,
            cnodes,
            errors,
            suggestions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::follow::ast::TokenType;

    #[test]
    fn test_empty_block() {
        let info = Compiler::default().compile("");
        assert_eq!(info.tokens.len(), 1);
        assert_eq!(info.tokens[0].content, "\n");
        assert!(info.errors.is_empty());
        assert!(info.suggestions.is_empty());
    }

    #[test]
    fn test_lone_closing_brace() {
        let info = Compiler::default().compile("}");
        assert!(!info.tokens.is_empty());
        assert_eq!(info.errors.len(), 1);
        assert_eq!(info.errors[0].kind, ErrorKind::BracketMismatch);
        assert!(info.errors[0].message().contains("bracket mismatch"));
        assert!(info.tokens[0].error);
    }

    #[test]
    fn test_incomplete_theorem() {
        let info = Compiler::default().compile("type prop\nthm t(prop p) {\n  |- p\n}");
        assert_eq!(info.errors.len(), 1);
        assert_eq!(info.errors[0].kind, ErrorKind::ProofIncomplete);
        assert_eq!(info.errors[0].token.content, "t");
        assert_eq!(info.errors[0].token.token_type, TokenType::ThmName);
    }

    #[test]
    fn test_incomplete_theorem_can_be_silenced() {
        let mut config = CompilerConfig::default();
        config.proof.report_incomplete = false;
        let info = Compiler::new(config).compile("type prop\nthm t(prop p) {\n  |- p\n}");
        assert!(info.errors.is_empty());
    }

    #[test]
    fn test_invalid_step_marks_root_token() {
        let source = "type prop\naxiom refl(prop p) {\n  |- p\n}\nthm t(prop p, prop q) {\n  |- p\n} = {\n  refl(q)\n}";
        let info = Compiler::default().compile(source);
        let kinds: Vec<ErrorKind> = info.errors.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ErrorKind::ProofIncomplete, ErrorKind::InvalidProofStep]);
        let thm = info.cnodes[2].as_thm().unwrap();
        assert!(thm.proofs[0].root.error);
        assert_eq!(thm.proofs[0].root.token_type, TokenType::AxiomName);
    }

    #[test]
    fn test_custom_validator_is_used() {
        struct AcceptAll;
        impl ProofValidator for AcceptAll {
            fn apply(
                &self,
                _goals: &[crate::follow::ast::Term],
                _step: &crate::follow::ast::Proof,
                _hypotheses: &[crate::follow::ast::Term],
            ) -> crate::follow::proof::StepOutcome {
                crate::follow::proof::StepOutcome::applied(Vec::new())
            }
        }
        let source = "type prop\naxiom refl(prop p) {\n  |- p\n}\nthm t(prop p, prop q) {\n  |- p\n} = {\n  refl(q)\n}";
        let info = Compiler::with_validator(CompilerConfig::default(), Box::new(AcceptAll)).compile(source);
        assert!(info.errors.is_empty());
        assert!(info.cnodes[2].as_thm().unwrap().is_proved());
    }

    #[test]
    fn test_source_round_trip() {
        let info = Compiler::default().compile("type prop");
        assert_eq!(info.source(), "type prop\n");
        assert_eq!(info.token_at(6).map(|t| t.content.as_str()), Some("prop"));
    }
}

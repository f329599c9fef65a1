//! Token refinement
//!
//! The parser never touches the token stream it reads. What it learns about tokens is
//! recorded here as overrides keyed by token index, and [`Refinement::apply`] produces the
//! final stream: refined types, doc comments on names and on their uses, and the `error`
//! flag on every token a diagnostic points at.

use super::RawError;
use crate::follow::ast::{Token, TokenType};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Refinement {
    kinds: HashMap<usize, TokenType>,
    comments: HashMap<usize, String>,
}

impl Refinement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&mut self, index: usize, token_type: TokenType) {
        self.kinds.insert(index, token_type);
    }

    pub fn comment(&mut self, index: usize, comment: Option<&String>) {
        if let Some(comment) = comment {
            self.comments.insert(index, comment.clone());
        }
    }

    pub fn apply(&self, tokens: &[Token], errors: &[RawError]) -> Vec<Token> {
        let mut refined: Vec<Token> = tokens
            .iter()
            .enumerate()
            .map(|(index, token)| {
                let mut token = token.clone();
                if let Some(kind) = self.kinds.get(&index) {
                    token.token_type = *kind;
                }
                if let Some(comment) = self.comments.get(&index) {
                    token.comment = Some(comment.clone());
                }
                token
            })
            .collect();
        for error in errors {
            if let Some(token) = refined.get_mut(error.index) {
                token.error = true;
            }
        }
        refined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::follow::ast::ErrorKind;
    use crate::follow::lexing::tokenize;

    #[test]
    fn test_apply_leaves_input_untouched() {
        let tokens = tokenize("type prop\n");
        let mut refinement = Refinement::new();
        refinement.classify(2, TokenType::TypeName);
        refinement.comment(2, Some(&"propositions".to_string()));
        let refined = refinement.apply(&tokens, &[RawError::new(0, ErrorKind::UnexpectedToken)]);

        assert_eq!(tokens[2].token_type, TokenType::Word);
        assert_eq!(refined[2].token_type, TokenType::TypeName);
        assert_eq!(refined[2].comment.as_deref(), Some("propositions"));
        assert!(refined[0].error);
        assert!(!tokens[0].error);
    }
}

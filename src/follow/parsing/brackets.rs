//! Bracket balance check
//!
//! Runs over the whole token stream independently of the declaration parser, which skips
//! stray closers without reporting them. A closer that matches an opener further down the
//! stack closes it and reports the openers in between as unclosed.

use super::RawError;
use crate::follow::ast::{ErrorKind, Token, TokenType};

fn opener_for(closer: &str) -> Option<&'static str> {
    match closer {
        ")" => Some("("),
        "}" => Some("{"),
        _ => None,
    }
}

pub(crate) fn check_brackets(tokens: &[Token]) -> Vec<RawError> {
    let mut errors = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    for (index, token) in tokens.iter().enumerate() {
        if token.token_type != TokenType::Sep {
            continue;
        }
        match token.content.as_str() {
            "(" | "{" => stack.push(index),
            closer => {
                let Some(opener) = opener_for(closer) else {
                    continue;
                };
                match stack.iter().rposition(|&open| tokens[open].content == opener) {
                    Some(position) => {
                        for &unclosed in &stack[position + 1..] {
                            errors.push(RawError::new(unclosed, ErrorKind::BracketMismatch));
                        }
                        stack.truncate(position);
                    }
                    None => errors.push(RawError::new(index, ErrorKind::BracketMismatch)),
                }
            }
        }
    }

    errors.extend(
        stack
            .into_iter()
            .map(|index| RawError::new(index, ErrorKind::BracketMismatch)),
    );
    errors.sort_by_key(|error| error.index);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::follow::lexing::tokenize;

    fn mismatched(source: &str) -> Vec<String> {
        let tokens = tokenize(source);
        check_brackets(&tokens)
            .into_iter()
            .map(|e| format!("{}@{}", tokens[e.index].content, tokens[e.index].range.start.offset))
            .collect()
    }

    #[test]
    fn test_balanced() {
        assert!(mismatched("thm a(prop p) { |- imp(p, p) } = { }\n").is_empty());
    }

    #[test]
    fn test_lone_closer() {
        assert_eq!(mismatched("}\n"), vec!["}@0"]);
    }

    #[test]
    fn test_unclosed_opener() {
        assert_eq!(mismatched("thm a {\n"), vec!["{@6"]);
    }

    #[test]
    fn test_closer_skips_unclosed_paren() {
        assert_eq!(mismatched("{ f( }\n"), vec!["(@3"]);
    }
}

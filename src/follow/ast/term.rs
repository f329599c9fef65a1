//! Elaborated terms
//!
//! A [`Term`] is either a reference to a declaration parameter or the application of a
//! declared term to arguments (constants are applications with no arguments). Besides the
//! structure it carries its type and `term_content`, the display form obtained by
//! substituting the arguments into the term's declared body, e.g. `imp(p0, p1)` with body
//! `(p0 -> p1)` displays as `(p0 -> p1)`.
//!
//! Equality is structural: ranges and display strings are ignored, so the same term written
//! in two places compares equal. The `Display` impl prints the source form that can be
//! pasted back into a block.

use super::range::Range;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "termType", rename_all = "camelCase")]
pub enum TermKind {
    Arg { name: String },
    App { name: String, args: Vec<Term> },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    #[serde(flatten)]
    pub kind: TermKind,
    pub type_name: String,
    pub term_content: String,
    pub range: Range,
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && self.kind == other.kind
    }
}

impl Eq for Term {}

impl Term {
    pub fn arg(name: impl Into<String>, type_name: impl Into<String>, range: Range) -> Self {
        let name = name.into();
        Self {
            term_content: name.clone(),
            kind: TermKind::Arg { name },
            type_name: type_name.into(),
            range,
        }
    }

    pub fn app(
        name: impl Into<String>,
        args: Vec<Term>,
        type_name: impl Into<String>,
        term_content: impl Into<String>,
        range: Range,
    ) -> Self {
        Self {
            kind: TermKind::App {
                name: name.into(),
                args,
            },
            type_name: type_name.into(),
            term_content: term_content.into(),
            range,
        }
    }

    pub fn name(&self) -> &str {
        match &self.kind {
            TermKind::Arg { name } | TermKind::App { name, .. } => name,
        }
    }

    pub fn args(&self) -> &[Term] {
        match &self.kind {
            TermKind::Arg { .. } => &[],
            TermKind::App { args, .. } => args,
        }
    }

    pub fn is_arg(&self) -> bool {
        matches!(self.kind, TermKind::Arg { .. })
    }

    /// Argument names in order of first appearance.
    pub fn arg_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_arg_names(&mut names);
        names
    }

    fn collect_arg_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match &self.kind {
            TermKind::Arg { name } => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            TermKind::App { args, .. } => {
                for arg in args {
                    arg.collect_arg_names(names);
                }
            }
        }
    }

    /// First-order matching of `self` (a rule statement whose arguments are the rule's
    /// parameters) against a concrete `target`. Bindings already present must agree.
    pub fn match_against(&self, target: &Term, bindings: &mut HashMap<String, Term>) -> bool {
        if self.type_name != target.type_name {
            return false;
        }
        match (&self.kind, &target.kind) {
            (TermKind::Arg { name }, _) => match bindings.get(name) {
                Some(bound) => bound == target,
                None => {
                    bindings.insert(name.clone(), target.clone());
                    true
                }
            },
            (
                TermKind::App { name, args },
                TermKind::App {
                    name: target_name,
                    args: target_args,
                },
            ) => {
                name == target_name
                    && args.len() == target_args.len()
                    && args
                        .iter()
                        .zip(target_args)
                        .all(|(pattern, arg)| pattern.match_against(arg, bindings))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TermKind::Arg { name } => f.write_str(name),
            TermKind::App { name, args } if args.is_empty() => f.write_str(name),
            TermKind::App { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// A declared parameter `TYPE NAME`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    pub type_name: String,
    pub name: String,
    pub range: Range,
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.type_name, self.name)
    }
}

/// Piece of a term body: literal text or a slot for the n-th parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TemplatePiece {
    Text(String),
    Param(usize),
}

/// The display body of a term declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TermTemplate {
    pub pieces: Vec<TemplatePiece>,
}

impl TermTemplate {
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Render the body with `args` substituted. An empty body falls back to the source
    /// form `name(arg, ...)` built from the arguments' display forms.
    pub fn render(&self, name: &str, args: &[Term]) -> String {
        if self.pieces.is_empty() {
            if args.is_empty() {
                return name.to_string();
            }
            let inner: Vec<&str> = args.iter().map(|arg| arg.term_content.as_str()).collect();
            return format!("{}({})", name, inner.join(", "));
        }
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                TemplatePiece::Text(text) => out.push_str(text),
                TemplatePiece::Param(index) => match args.get(*index) {
                    Some(arg) => out.push_str(&arg.term_content),
                    None => out.push('?'),
                },
            }
        }
        out
    }
}

//! Declarations visible to the rest of a block
//!
//! Types, terms and rules (axioms and theorems) share one namespace. Each entry remembers
//! its declaration order so that a theorem only sees what was declared before it.

use crate::follow::ast::{Param, Range, Term, TermKind, TermTemplate, TokenType};
use std::collections::HashMap;
use std::fmt::Write as _;

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub comment: Option<String>,
    pub order: usize,
}

#[derive(Debug, Clone)]
pub struct TermDef {
    pub name: String,
    pub type_name: String,
    pub params: Vec<Param>,
    pub template: TermTemplate,
    pub comment: Option<String>,
    pub order: usize,
}

impl TermDef {
    pub fn token_type(&self) -> TokenType {
        if self.params.is_empty() {
            TokenType::ConstName
        } else {
            TokenType::TermName
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Axiom,
    Thm,
}

impl RuleKind {
    pub fn keyword(self) -> &'static str {
        match self {
            RuleKind::Axiom => "axiom",
            RuleKind::Thm => "thm",
        }
    }

    pub fn token_type(self) -> TokenType {
        match self {
            RuleKind::Axiom => TokenType::AxiomName,
            RuleKind::Thm => TokenType::ThmName,
        }
    }
}

/// An axiom or theorem that proof steps can cite.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub kind: RuleKind,
    pub params: Vec<Param>,
    pub targets: Vec<Term>,
    pub assumptions: Vec<Term>,
    pub comment: Option<String>,
    pub order: usize,
}

impl Rule {
    /// Multi-line rendering used in completion docs:
    ///
    /// ```text
    /// // comment
    /// axiom mp(prop p0, prop p1) {
    ///   |- p1
    ///   -| p0
    /// }
    /// ```
    pub fn describe(&self) -> String {
        let mut out = String::new();
        if let Some(comment) = &self.comment {
            for line in comment.lines() {
                let _ = writeln!(out, "// {}", line);
            }
        }
        let _ = write!(out, "{} {}", self.kind.keyword(), self.name);
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
            let _ = write!(out, "({})", params.join(", "));
        }
        out.push_str(" {\n");
        for target in &self.targets {
            let _ = writeln!(out, "  |- {}", target.term_content);
        }
        for assumption in &self.assumptions {
            let _ = writeln!(out, "  -| {}", assumption.term_content);
        }
        out.push('}');
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub types: HashMap<String, TypeDecl>,
    pub terms: HashMap<String, TermDef>,
    pub rules: HashMap<String, Rule>,
    next_order: usize,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.types.contains_key(name)
            || self.terms.contains_key(name)
            || self.rules.contains_key(name)
    }

    /// Hand out the next declaration order number.
    pub fn next_order(&mut self) -> usize {
        let order = self.next_order;
        self.next_order += 1;
        order
    }

    pub fn add_type(&mut self, name: String, comment: Option<String>, order: usize) {
        self.types
            .insert(name.clone(), TypeDecl { name, comment, order });
    }

    pub fn add_term(&mut self, term: TermDef) {
        self.terms.insert(term.name.clone(), term);
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.insert(rule.name.clone(), rule);
    }

    /// Rules declared before `order`, in declaration order.
    pub fn rules_before(&self, order: usize) -> Vec<&Rule> {
        let mut rules: Vec<&Rule> = self
            .rules
            .values()
            .filter(|rule| rule.order < order)
            .collect();
        rules.sort_by_key(|rule| rule.order);
        rules
    }

    pub fn type_names(&self) -> Vec<String> {
        let mut types: Vec<&TypeDecl> = self.types.values().collect();
        types.sort_by_key(|decl| decl.order);
        types.into_iter().map(|decl| decl.name.clone()).collect()
    }

    pub fn term_names(&self) -> Vec<String> {
        let mut terms: Vec<&TermDef> = self.terms.values().collect();
        terms.sort_by_key(|def| def.order);
        terms.into_iter().map(|def| def.name.clone()).collect()
    }

    pub fn rule_names(&self) -> Vec<String> {
        self.rules_before(usize::MAX)
            .into_iter()
            .map(|rule| rule.name.clone())
            .collect()
    }

    /// Display form of `name(args)`, through the term's template when it is known.
    pub fn render(&self, name: &str, args: &[Term]) -> String {
        match self.terms.get(name) {
            Some(def) => def.template.render(name, args),
            None => TermTemplate::default().render(name, args),
        }
    }

    /// Replace the parameters of a rule statement by the bound terms. Every produced node
    /// takes `range`, the span of the step that caused the instantiation.
    pub fn instantiate(&self, term: &Term, bindings: &HashMap<String, Term>, range: Range) -> Term {
        match &term.kind {
            TermKind::Arg { name } => match bindings.get(name) {
                Some(bound) => bound.clone(),
                None => Term::arg(name.clone(), term.type_name.clone(), range),
            },
            TermKind::App { name, args } => {
                let args: Vec<Term> = args
                    .iter()
                    .map(|arg| self.instantiate(arg, bindings, range))
                    .collect();
                let content = self.render(name, &args);
                Term::app(name.clone(), args, term.type_name.clone(), content, range)
            }
        }
    }
}

//! Declaration parser
//!
//! Recursive descent over the significant tokens (everything except whitespace and
//! comments). Each `parse_*` method consumes one declaration and pushes its node; on a
//! malformed construct it records a [`RawError`] and either skips the offending token or
//! synchronizes on the next declaration keyword.

use super::brackets::check_brackets;
use super::refine::Refinement;
use super::scope::{Rule, RuleKind, Scope, TermDef};
use super::terms::{parse_term, SyntaxTerm};
use super::{ParseOutput, ProofInsert, RawError, ThmSite, Unresolved};
use crate::follow::ast::{
    AstNode, AxiomCNode, CNode, ErrorKind, Param, Proof, Range, TemplatePiece, Term, TermCNode,
    TermTemplate, ThmCNode, Token, TokenType, TypeCNode,
};
use crate::follow::lexing::DECLARATION_KEYWORDS;
use std::collections::HashMap;
use std::ops::Range as IndexRange;

/// Deepest argument-list nesting a term or step may have. Deeper spans are reported and
/// never handed to the term grammar or the elaborator, which both recurse per level.
const MAX_TERM_DEPTH: usize = 64;

/// Parse and elaborate a token stream.
pub fn parse(tokens: &[Token]) -> ParseOutput {
    Parser::new(tokens).run()
}

struct Parser<'a> {
    tokens: &'a [Token],
    significant: Vec<usize>,
    pos: usize,
    scope: Scope,
    refinement: Refinement,
    errors: Vec<RawError>,
    cnodes: Vec<CNode>,
    theorems: Vec<ThmSite>,
    unresolved: Vec<Unresolved>,
    stray_words: Vec<usize>,
}

/// Significant tokens of one term or step.
struct TermSpan {
    indices: Vec<usize>,
    too_deep: bool,
}

/// Statements of an axiom or theorem.
#[derive(Default)]
struct Statements {
    targets: Vec<Term>,
    assumptions: Vec<Term>,
    saw_target: bool,
    close: Option<usize>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        let significant = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| !token.token_type.is_trivia())
            .map(|(index, _)| index)
            .collect();
        Self {
            tokens,
            significant,
            pos: 0,
            scope: Scope::new(),
            refinement: Refinement::new(),
            errors: Vec::new(),
            cnodes: Vec::new(),
            theorems: Vec::new(),
            unresolved: Vec::new(),
            stray_words: Vec::new(),
        }
    }

    fn run(mut self) -> ParseOutput {
        for (index, token) in self.tokens.iter().enumerate() {
            if token.error {
                self.errors.push(RawError::new(index, ErrorKind::UnknownToken));
            }
        }
        self.errors.extend(check_brackets(self.tokens));

        while let Some(index) = self.peek() {
            match self.declaration_keyword() {
                Some("type") => self.parse_type(),
                Some("term") => self.parse_term_decl(),
                Some("axiom") => self.parse_rule(RuleKind::Axiom),
                Some("thm") => self.parse_rule(RuleKind::Thm),
                _ => {
                    if self.at_word() {
                        self.stray_words.push(index);
                    }
                    self.skip_unexpected();
                    self.synchronize();
                }
            }
        }

        self.errors.sort();
        self.errors.dedup();
        ParseOutput {
            cnodes: self.cnodes,
            scope: self.scope,
            refinement: self.refinement,
            errors: self.errors,
            theorems: self.theorems,
            unresolved: self.unresolved,
            stray_words: self.stray_words,
        }
    }

    // ----- cursor -----

    fn peek(&self) -> Option<usize> {
        self.significant.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<usize> {
        let index = self.peek()?;
        self.pos += 1;
        Some(index)
    }

    fn content(&self, index: usize) -> &'a str {
        &self.tokens[index].content
    }

    fn at(&self, text: &str) -> bool {
        self.peek().is_some_and(|index| {
            let token = &self.tokens[index];
            matches!(token.token_type, TokenType::Sep | TokenType::Key) && token.content == text
        })
    }

    fn eat(&mut self, text: &str) -> Option<usize> {
        if self.at(text) {
            self.bump()
        } else {
            None
        }
    }

    fn at_word(&self) -> bool {
        self.peek().is_some_and(|index| {
            let token = &self.tokens[index];
            token.token_type == TokenType::Word && !token.error
        })
    }

    fn declaration_keyword(&self) -> Option<&'a str> {
        let index = self.peek()?;
        let token = &self.tokens[index];
        if token.token_type != TokenType::Key {
            return None;
        }
        DECLARATION_KEYWORDS
            .iter()
            .find(|keyword| **keyword == token.content)
            .copied()
    }

    fn at_declaration(&self) -> bool {
        self.declaration_keyword().is_some()
    }

    /// Tokens that end a term or step span.
    fn at_boundary(&self) -> bool {
        self.at_declaration()
            || self.at("{")
            || self.at("}")
            || self.at("|-")
            || self.at("-|")
            || self.at("=")
    }

    fn synchronize(&mut self) {
        while self.peek().is_some() && !self.at_declaration() {
            self.pos += 1;
        }
    }

    /// Step over a token that has no place here. Stray closers and lexer errors are
    /// already reported by their own passes.
    fn skip_unexpected(&mut self) {
        if let Some(index) = self.bump() {
            let token = &self.tokens[index];
            let closer = token.token_type == TokenType::Sep && matches!(token.content.as_str(), ")" | "}");
            if !token.error && !closer {
                self.error(index, ErrorKind::UnexpectedToken);
            }
        }
    }

    // ----- diagnostics -----

    fn error(&mut self, index: usize, kind: ErrorKind) {
        self.errors.push(RawError::new(index, kind));
    }

    /// Report at the current token, or at the last significant one at end of input.
    fn error_here(&mut self, kind: ErrorKind) {
        let index = self
            .peek()
            .or_else(|| self.significant.last().copied())
            .or_else(|| self.tokens.len().checked_sub(1));
        if let Some(index) = index {
            self.error(index, kind);
        }
    }

    fn unresolved(&mut self, index: usize, kind: ErrorKind, candidates: Vec<String>) {
        self.error(index, kind);
        self.unresolved.push(Unresolved {
            index,
            kind,
            candidates,
        });
    }

    // ----- ranges -----

    fn range(&self, first: usize, last: usize) -> Range {
        Range::new(self.tokens[first].range.start, self.tokens[last].range.end)
    }

    fn span_range(&self, span: &IndexRange<usize>) -> Range {
        self.range(span.start, span.end.saturating_sub(1).max(span.start))
    }

    fn node(&self, first: usize, last: usize) -> AstNode {
        AstNode {
            range: self.range(first, last),
        }
    }

    fn last_consumed(&self, fallback: usize) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|pos| self.significant.get(pos).copied())
            .map_or(fallback, |index| index.max(fallback))
    }

    // ----- doc comments -----

    /// Consecutive `//` lines, each on a line of its own, directly above the keyword.
    /// Returns the joined comment text and the start of the first line.
    fn doc_comment(&self, keyword: usize) -> (Option<String>, usize) {
        let mut lines = Vec::new();
        let mut leading = keyword;
        let mut newlines = 0;
        let mut index = keyword;
        while index > 0 {
            index -= 1;
            let token = &self.tokens[index];
            match token.token_type {
                TokenType::Ignore => {
                    newlines += token.content.matches('\n').count();
                    if newlines > 1 {
                        break;
                    }
                }
                TokenType::Comment if self.starts_line(index) => {
                    lines.push(token.content.trim_start_matches('/').trim().to_string());
                    leading = index;
                    newlines = 0;
                }
                _ => break,
            }
        }
        if lines.is_empty() {
            return (None, keyword);
        }
        lines.reverse();
        (Some(lines.join("\n")), leading)
    }

    fn starts_line(&self, index: usize) -> bool {
        self.tokens[..index]
            .iter()
            .rev()
            .find(|token| !(token.token_type == TokenType::Ignore && !token.content.contains('\n')))
            .map_or(true, |token| token.token_type == TokenType::Ignore)
    }

    // ----- names -----

    fn visible_names(&self, params: &[Param]) -> Vec<String> {
        let mut names: Vec<String> = params.iter().map(|param| param.name.clone()).collect();
        names.extend(self.scope.term_names());
        names
    }

    fn resolve_type(&mut self, index: usize) -> String {
        let name = self.content(index);
        match self.scope.types.get(name) {
            Some(decl) => {
                let comment = decl.comment.clone();
                self.refinement.classify(index, TokenType::TypeName);
                self.refinement.comment(index, comment.as_ref());
            }
            None => {
                let candidates = self.scope.type_names();
                self.unresolved(index, ErrorKind::UnknownType, candidates);
            }
        }
        name.to_string()
    }

    // ----- declarations -----

    fn parse_type(&mut self) {
        let Some(keyword) = self.bump() else {
            return;
        };
        let (comment, _) = self.doc_comment(keyword);
        let mut names = Vec::new();
        let mut last = keyword;
        let line = self.tokens[keyword].range.start.line;

        // Names end with the keyword's line, so a word starting the next line is left for
        // the declaration loop
        while self.at_word()
            && self
                .peek()
                .is_some_and(|index| self.tokens[index].range.start.line == line)
        {
            let Some(index) = self.bump() else {
                break;
            };
            last = index;
            let name = self.content(index);
            if self.scope.is_declared(name) {
                self.error(index, ErrorKind::DuplicateName);
                continue;
            }
            let order = self.scope.next_order();
            self.scope.add_type(name.to_string(), comment.clone(), order);
            self.refinement.classify(index, TokenType::TypeName);
            self.refinement.comment(index, comment.as_ref());
            names.push(name.to_string());
        }
        if last == keyword {
            self.error(keyword, ErrorKind::MissingName);
        }

        self.cnodes.push(CNode::Type(TypeCNode {
            ast_node: self.node(keyword, last),
            names,
        }));
    }

    fn parse_params(&mut self) -> Vec<Param> {
        let mut params: Vec<Param> = Vec::new();
        if self.eat("(").is_none() {
            return params;
        }
        loop {
            if self.eat(")").is_some() {
                break;
            }
            if self.peek().is_none() || self.at("{") || self.at_declaration() {
                self.error_here(ErrorKind::MissingCloseParen);
                break;
            }
            if !self.at_word() {
                self.skip_unexpected();
                continue;
            }
            let Some(type_index) = self.bump() else {
                break;
            };
            let type_name = self.resolve_type(type_index);
            if self.at_word() {
                if let Some(name_index) = self.bump() {
                    let name = self.content(name_index);
                    self.refinement.classify(name_index, TokenType::ArgName);
                    if params.iter().any(|param| param.name == name) {
                        self.error(name_index, ErrorKind::DuplicateParam);
                    } else {
                        params.push(Param {
                            type_name,
                            name: name.to_string(),
                            range: self.range(type_index, name_index),
                        });
                    }
                }
            } else {
                self.error_here(ErrorKind::MissingName);
            }
            if self.eat(",").is_none() && !self.at(")") && self.at_word() {
                self.error_here(ErrorKind::UnexpectedToken);
            }
        }
        params
    }

    fn parse_term_decl(&mut self) {
        let Some(keyword) = self.bump() else {
            return;
        };
        let (comment, _) = self.doc_comment(keyword);
        let order = self.scope.next_order();

        if !self.at_word() {
            self.error_here(ErrorKind::MissingType);
            self.synchronize();
            return;
        }
        let Some(type_index) = self.bump() else {
            return;
        };
        let type_name = self.resolve_type(type_index);

        if !self.at_word() {
            self.error_here(ErrorKind::MissingName);
            self.synchronize();
            return;
        }
        let Some(name_index) = self.bump() else {
            return;
        };
        let name = self.content(name_index).to_string();
        let duplicate = self.scope.is_declared(&name);
        if duplicate {
            self.error(name_index, ErrorKind::DuplicateName);
        }

        let params = self.parse_params();
        let kind = if params.is_empty() {
            TokenType::ConstName
        } else {
            TokenType::TermName
        };
        self.refinement.classify(name_index, kind);
        self.refinement.comment(name_index, comment.as_ref());

        let template = match self.eat("{") {
            Some(open) => self.term_body(open, &params),
            None => {
                self.error_here(ErrorKind::MissingOpenBrace);
                TermTemplate::default()
            }
        };
        let last = self.last_consumed(name_index);

        if !duplicate {
            self.scope.add_term(TermDef {
                name: name.clone(),
                type_name: type_name.clone(),
                params: params.clone(),
                template: template.clone(),
                comment: comment.clone(),
                order,
            });
        }
        self.cnodes.push(CNode::Term(TermCNode {
            ast_node: self.node(keyword, last),
            name,
            type_name,
            params,
            template,
            comment,
        }));
    }

    /// Consume a term body up to its matching `}` and build the display template.
    fn term_body(&mut self, open: usize, params: &[Param]) -> TermTemplate {
        let mut depth = 0usize;
        let mut end = open + 1;
        while let Some(index) = self.peek() {
            if depth == 0 && self.at_declaration() {
                break;
            }
            let token = &self.tokens[index];
            if token.token_type == TokenType::Sep && token.content == "{" {
                depth += 1;
            } else if token.token_type == TokenType::Sep && token.content == "}" {
                if depth == 0 {
                    self.pos += 1;
                    end = index;
                    break;
                }
                depth -= 1;
            } else if token.token_type == TokenType::Word
                && params.iter().any(|param| param.name == token.content)
            {
                self.refinement.classify(index, TokenType::ArgName);
            }
            self.pos += 1;
            end = index + 1;
        }
        template_of(&self.tokens[open + 1..end.max(open + 1)], params)
    }

    fn parse_rule(&mut self, kind: RuleKind) {
        let Some(keyword) = self.bump() else {
            return;
        };
        let (comment, leading) = self.doc_comment(keyword);
        let order = self.scope.next_order();

        let name_index = if self.at_word() {
            self.bump()
        } else {
            self.error_here(ErrorKind::MissingName);
            None
        };
        let name = name_index.map(|index| self.content(index).to_string());
        let mut duplicate = false;
        if let (Some(index), Some(name)) = (name_index, name.as_deref()) {
            duplicate = self.scope.is_declared(name);
            if duplicate {
                self.error(index, ErrorKind::DuplicateName);
            }
            self.refinement.classify(index, kind.token_type());
            self.refinement.comment(index, comment.as_ref());
        }

        let params = self.parse_params();
        let statements = self.statements(&params, name_index.unwrap_or(keyword));
        let rule = Rule {
            name: name.clone().unwrap_or_default(),
            kind,
            params: params.clone(),
            targets: statements.targets.clone(),
            assumptions: statements.assumptions.clone(),
            comment: comment.clone(),
            order,
        };

        match kind {
            RuleKind::Axiom => {
                let last = self.last_consumed(keyword);
                self.cnodes.push(CNode::Axiom(AxiomCNode {
                    ast_node: self.node(keyword, last),
                    name: rule.name.clone(),
                    params,
                    targets: statements.targets,
                    assumptions: statements.assumptions,
                    comment,
                }));
            }
            RuleKind::Thm => {
                let mut insert = statements
                    .close
                    .map(|close| ProofInsert::NewBlock(self.tokens[close].range.end));
                let mut proofs = Vec::new();
                let mut step_indices = Vec::new();
                let mut proof_block = None;

                if let Some(equals) = self.eat("=") {
                    match self.eat("{") {
                        Some(open) => {
                            insert = Some(ProofInsert::AfterOpenBrace(self.tokens[open].range.end));
                            loop {
                                if self.eat("}").is_some()
                                    || self.peek().is_none()
                                    || self.at_declaration()
                                {
                                    break;
                                }
                                if !self.at_word() {
                                    self.skip_unexpected();
                                    continue;
                                }
                                let (proof, root, last) = self.proof_step(&params);
                                insert = Some(ProofInsert::AfterStep(self.tokens[last].range.end));
                                proofs.push(proof);
                                step_indices.push(root);
                            }
                        }
                        None => {
                            insert = Some(ProofInsert::AfterEquals(self.tokens[equals].range.end));
                            self.error_here(ErrorKind::MissingOpenBrace);
                        }
                    }
                    let last = self.last_consumed(equals);
                    proof_block = Some(self.range(equals, last));
                }

                let last = self.last_consumed(keyword);
                self.theorems.push(ThmSite {
                    node: self.cnodes.len(),
                    order,
                    keyword_index: keyword,
                    name_index,
                    leading: self.tokens[leading].range.start,
                    step_indices,
                    insert,
                });
                self.cnodes.push(CNode::Thm(ThmCNode {
                    ast_node: self.node(keyword, last),
                    name: rule.name.clone(),
                    params,
                    targets: statements.targets,
                    assumptions: statements.assumptions,
                    comment,
                    proof_block,
                    proofs,
                    proof_process: Vec::new(),
                }));
            }
        }

        // Registered last so that a theorem cannot cite itself
        if name.is_some() && !duplicate {
            self.scope.add_rule(rule);
        }
    }

    fn statements(&mut self, params: &[Param], anchor: usize) -> Statements {
        let mut statements = Statements::default();
        if self.eat("{").is_none() {
            self.error_here(ErrorKind::MissingOpenBrace);
            return statements;
        }
        loop {
            if let Some(close) = self.eat("}") {
                statements.close = Some(close);
                break;
            }
            if self.peek().is_none() || self.at_declaration() {
                break;
            }
            let target = self.at("|-");
            if !target && !self.at("-|") {
                self.skip_unexpected();
                continue;
            }
            self.pos += 1;
            statements.saw_target |= target;
            if let Some(term) = self.statement_term(params) {
                if target {
                    statements.targets.push(term);
                } else {
                    statements.assumptions.push(term);
                }
            }
        }
        if !statements.saw_target {
            self.error(anchor, ErrorKind::MissingTarget);
        }
        statements
    }

    // ----- terms -----

    /// Significant token indices of the term starting at the current word: the word and,
    /// when a `(` follows, everything up to its matching `)`. The first `(` nested past
    /// [`MAX_TERM_DEPTH`] is reported and the rest of the span is consumed unparsed.
    fn collect_term_span(&mut self) -> TermSpan {
        let mut span = TermSpan {
            indices: Vec::new(),
            too_deep: false,
        };
        let Some(first) = self.bump() else {
            return span;
        };
        span.indices.push(first);
        if !self.at("(") {
            return span;
        }
        let mut depth = 0usize;
        while let Some(index) = self.peek() {
            if self.at_boundary() {
                break;
            }
            if self.at("(") {
                depth += 1;
                if depth > MAX_TERM_DEPTH && !span.too_deep {
                    self.error(index, ErrorKind::UnexpectedToken);
                    span.too_deep = true;
                }
            } else if self.at(")") {
                depth = depth.saturating_sub(1);
            }
            span.indices.push(index);
            self.pos += 1;
            if depth == 0 {
                break;
            }
        }
        span
    }

    fn syntax_term(&mut self, indices: &[usize]) -> Option<SyntaxTerm> {
        match parse_term(self.tokens, indices) {
            Ok(syntax) => Some(syntax),
            Err((index, kind)) => {
                if !self.tokens[index].error {
                    self.error(index, kind);
                }
                None
            }
        }
    }

    fn statement_term(&mut self, params: &[Param]) -> Option<Term> {
        if !self.at_word() {
            self.error_here(ErrorKind::MissingName);
            return None;
        }
        let span = self.collect_term_span();
        if span.too_deep {
            return None;
        }
        let syntax = self.syntax_term(&span.indices)?;
        self.elaborate_term(&syntax, params)
    }

    fn elaborate_term(&mut self, syntax: &SyntaxTerm, params: &[Param]) -> Option<Term> {
        let index = syntax.name_index;
        let range = self.span_range(&syntax.span);

        if let Some(param) = params.iter().find(|param| param.name == syntax.name) {
            self.refinement.classify(index, TokenType::ArgName);
            if syntax.args.is_some() {
                self.error(index, ErrorKind::ArgumentCount);
                return None;
            }
            return Some(Term::arg(param.name.clone(), param.type_name.clone(), range));
        }

        let Some(def) = self.scope.terms.get(&syntax.name).cloned() else {
            let candidates = self.visible_names(params);
            self.unresolved(index, ErrorKind::UnknownName, candidates);
            for arg in syntax.args.iter().flatten() {
                self.elaborate_term(arg, params);
            }
            return None;
        };
        self.refinement.classify(index, def.token_type());
        self.refinement.comment(index, def.comment.as_ref());

        let syntax_args = syntax.args.as_deref().unwrap_or(&[]);
        let args: Vec<Option<Term>> = syntax_args
            .iter()
            .map(|arg| self.elaborate_term(arg, params))
            .collect();
        if args.len() != def.params.len() {
            self.error(index, ErrorKind::ArgumentCount);
            return None;
        }

        let mut elaborated = Vec::with_capacity(args.len());
        let mut well_formed = true;
        for ((arg, syntax_arg), param) in args.into_iter().zip(syntax_args).zip(&def.params) {
            match arg {
                Some(arg) if arg.type_name == param.type_name => elaborated.push(arg),
                Some(_) => {
                    self.error(syntax_arg.name_index, ErrorKind::TypeMismatch);
                    well_formed = false;
                }
                None => well_formed = false,
            }
        }
        if !well_formed {
            return None;
        }
        let content = def.template.render(&def.name, &elaborated);
        Some(Term::app(def.name, elaborated, def.type_name, content, range))
    }

    // ----- proofs -----

    /// Parse one step. Returns the proof, the root token index and the last token index.
    fn proof_step(&mut self, params: &[Param]) -> (Proof, usize, usize) {
        let span = self.collect_term_span();
        let root = span.indices.first().copied().unwrap_or(0);
        let last = span.indices.last().copied().unwrap_or(root);
        let range = self.range(root, last);
        let name = self.content(root);
        let mut diff = Vec::new();

        let rule = self.scope.rules.get(name).cloned();
        match &rule {
            Some(rule) => {
                self.refinement.classify(root, rule.kind.token_type());
                self.refinement.comment(root, rule.comment.as_ref());
            }
            None => {
                let candidates = self.scope.rule_names();
                self.unresolved(root, ErrorKind::UnknownRule, candidates);
                diff.push(format!("unknown rule {}", name));
            }
        }

        let syntax = if span.too_deep {
            None
        } else {
            self.syntax_term(&span.indices)
        };
        let syntax_args = syntax
            .as_ref()
            .and_then(|syntax| syntax.args.clone())
            .unwrap_or_default();
        if syntax.is_none() {
            diff.push("malformed step".to_string());
        }
        let mut children = Vec::new();
        for arg in &syntax_args {
            match self.elaborate_term(arg, params) {
                Some(term) => children.push(term),
                None => diff.push(format!("ill-formed argument at {}", self.content(arg.name_index))),
            }
        }

        let mut targets = Vec::new();
        let mut assumptions = Vec::new();
        if let Some(rule) = rule.as_ref().filter(|_| diff.is_empty()) {
            if rule.params.len() != children.len() {
                self.error(root, ErrorKind::ArgumentCount);
                diff.push(format!(
                    "{} expects {} arguments, found {}",
                    rule.name,
                    rule.params.len(),
                    children.len()
                ));
            } else {
                for ((child, syntax_arg), param) in children.iter().zip(&syntax_args).zip(&rule.params) {
                    if child.type_name != param.type_name {
                        self.error(syntax_arg.name_index, ErrorKind::TypeMismatch);
                        diff.push(format!(
                            "{} is {}, expected {}",
                            child.term_content, child.type_name, param.type_name
                        ));
                    }
                }
            }
            if diff.is_empty() {
                let bindings: HashMap<String, Term> = rule
                    .params
                    .iter()
                    .map(|param| param.name.clone())
                    .zip(children.iter().cloned())
                    .collect();
                targets = rule
                    .targets
                    .iter()
                    .map(|term| self.scope.instantiate(term, &bindings, range))
                    .collect();
                assumptions = rule
                    .assumptions
                    .iter()
                    .map(|term| self.scope.instantiate(term, &bindings, range))
                    .collect();
            }
        }

        let proof = Proof {
            root: self.tokens[root].clone(),
            children,
            targets,
            assumptions,
            diff_error: (!diff.is_empty()).then_some(diff),
            range,
        };
        (proof, root, last)
    }
}

/// Display template of a term body: surrounding whitespace trimmed, comments dropped,
/// parameter words turned into slots.
fn template_of(body: &[Token], params: &[Param]) -> TermTemplate {
    let first = body.iter().position(|token| !token.token_type.is_trivia());
    let last = body.iter().rposition(|token| !token.token_type.is_trivia());
    let (Some(first), Some(last)) = (first, last) else {
        return TermTemplate::default();
    };

    let mut pieces: Vec<TemplatePiece> = Vec::new();
    for token in &body[first..=last] {
        if token.token_type == TokenType::Comment {
            continue;
        }
        let slot = (token.token_type == TokenType::Word)
            .then(|| params.iter().position(|param| param.name == token.content))
            .flatten();
        match (slot, pieces.last_mut()) {
            (Some(slot), _) => pieces.push(TemplatePiece::Param(slot)),
            (None, Some(TemplatePiece::Text(text))) => text.push_str(&token.content),
            (None, _) => pieces.push(TemplatePiece::Text(token.content.clone())),
        }
    }
    TermTemplate { pieces }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::follow::lexing::{normalize_source, tokenize};

    const PRELUDE: &str = "\
type prop
// implication
term prop imp(prop p0, prop p1) { (p0 -> p1) }
axiom mp(prop p0, prop p1) {
  |- p1
  -| p0
  -| imp(p0, p1)
}
axiom a1(prop p0, prop p1) {
  |- imp(p0, imp(p1, p0))
}
";

    fn parse_source(source: &str) -> (Vec<Token>, ParseOutput) {
        let tokens = tokenize(&normalize_source(source));
        let output = parse(&tokens);
        (tokens, output)
    }

    fn kinds(tokens: &[Token], output: &ParseOutput) -> Vec<(String, ErrorKind)> {
        output
            .errors
            .iter()
            .map(|e| (tokens[e.index].content.clone(), e.kind))
            .collect()
    }

    #[test]
    fn test_prelude_is_clean() {
        let (tokens, output) = parse_source(PRELUDE);
        assert_eq!(kinds(&tokens, &output), vec![]);
        assert_eq!(output.cnodes.len(), 4);
        assert!(output.scope.rules.contains_key("mp"));
    }

    #[test]
    fn test_term_template() {
        let (_, output) = parse_source(PRELUDE);
        let CNode::Term(imp) = &output.cnodes[1] else {
            panic!("expected a term node");
        };
        assert_eq!(imp.comment.as_deref(), Some("implication"));
        assert_eq!(
            imp.template.pieces,
            vec![
                TemplatePiece::Text("(".into()),
                TemplatePiece::Param(0),
                TemplatePiece::Text(" -> ".into()),
                TemplatePiece::Param(1),
                TemplatePiece::Text(")".into()),
            ]
        );
    }

    #[test]
    fn test_refinement_classifies_names() {
        let (tokens, output) = parse_source(PRELUDE);
        let refined = output.refinement.apply(&tokens, &output.errors);
        let kind_of = |content: &str| {
            refined
                .iter()
                .find(|t| t.content == content)
                .map(|t| t.token_type)
        };
        assert_eq!(kind_of("prop"), Some(TokenType::TypeName));
        assert_eq!(kind_of("imp"), Some(TokenType::TermName));
        assert_eq!(kind_of("p0"), Some(TokenType::ArgName));
        assert_eq!(kind_of("mp"), Some(TokenType::AxiomName));
        let imp_use = refined
            .iter()
            .filter(|t| t.content == "imp")
            .last()
            .unwrap();
        assert_eq!(imp_use.comment.as_deref(), Some("implication"));
    }

    #[test]
    fn test_proof_steps_are_instantiated() {
        let source = format!(
            "{}thm t(prop p) {{\n  |- imp(p, imp(p, p))\n}} = {{\n  a1(p, p)\n}}\n",
            PRELUDE
        );
        let (tokens, output) = parse_source(&source);
        assert_eq!(kinds(&tokens, &output), vec![]);
        let thm = output.cnodes.last().unwrap().as_thm().unwrap();
        assert_eq!(thm.proofs.len(), 1);
        assert_eq!(thm.proofs[0].targets[0].term_content, "(p -> (p -> p))");
        assert!(thm.proofs[0].diff_error.is_none());
        assert!(thm.proof_block.is_some());
        let site = &output.theorems[0];
        assert!(matches!(site.insert, Some(ProofInsert::AfterStep(_))));
    }

    #[test]
    fn test_unknown_names_are_reported_and_parsing_continues() {
        let (tokens, output) = parse_source("type prop\naxiom a {\n  |- q\n}\ntype set\n");
        assert_eq!(
            kinds(&tokens, &output),
            vec![("q".to_string(), ErrorKind::UnknownName)]
        );
        assert_eq!(output.cnodes.len(), 3);
        assert_eq!(output.unresolved.len(), 1);
    }

    #[test]
    fn test_recovers_at_next_declaration() {
        let (tokens, output) = parse_source("term\ntype prop\n");
        assert_eq!(
            kinds(&tokens, &output),
            vec![("type".to_string(), ErrorKind::MissingType)]
        );
        assert!(output.scope.types.contains_key("prop"));
    }

    #[test]
    fn test_theorem_cannot_cite_itself() {
        let source = format!("{}thm t(prop p) {{\n  |- p\n}} = {{\n  t(p)\n}}\n", PRELUDE);
        let (tokens, output) = parse_source(&source);
        assert_eq!(
            kinds(&tokens, &output),
            vec![("t".to_string(), ErrorKind::UnknownRule)]
        );
        let thm = output.cnodes.last().unwrap().as_thm().unwrap();
        assert!(thm.proofs[0].diff_error.is_some());
    }

    #[test]
    fn test_argument_count_and_type_mismatch() {
        let source = "type prop set\nterm prop n(prop a) { ~a }\nterm set e { e }\naxiom x(prop p) {\n  |- n(p, p)\n  -| n(e)\n}\n";
        let (tokens, output) = parse_source(source);
        assert_eq!(
            kinds(&tokens, &output),
            vec![
                ("n".to_string(), ErrorKind::ArgumentCount),
                ("e".to_string(), ErrorKind::TypeMismatch),
            ]
        );
    }

    #[test]
    fn test_missing_target() {
        let (tokens, output) = parse_source("axiom a {\n}\n");
        assert_eq!(
            kinds(&tokens, &output),
            vec![("a".to_string(), ErrorKind::MissingTarget)]
        );
    }

    #[test]
    fn test_doc_comment_requires_adjacent_lines() {
        let (_, output) = parse_source("// one\n// two\ntype prop\n\n// detached\n\ntype set\n");
        assert_eq!(
            output.scope.types["prop"].comment.as_deref(),
            Some("one\ntwo")
        );
        assert_eq!(output.scope.types["set"].comment, None);
    }

    #[test]
    fn test_trailing_comment_is_not_a_doc_comment() {
        let (_, output) = parse_source("type prop // props\ntype set\n");
        assert_eq!(output.scope.types["set"].comment, None);
    }

    #[test]
    fn test_stray_words_are_recorded() {
        let (tokens, output) = parse_source("th\n");
        assert_eq!(output.stray_words.len(), 1);
        assert_eq!(
            kinds(&tokens, &output),
            vec![("th".to_string(), ErrorKind::UnexpectedToken)]
        );
    }

    #[test]
    fn test_type_names_stop_at_line_end() {
        let (tokens, output) = parse_source("type prop\nte\n");
        assert_eq!(output.scope.types.len(), 1);
        assert!(output.scope.types.contains_key("prop"));
        assert_eq!(output.stray_words.len(), 1);
        assert_eq!(
            kinds(&tokens, &output),
            vec![("te".to_string(), ErrorKind::UnexpectedToken)]
        );
    }

    fn nested(depth: usize) -> String {
        format!("{}p{}", "imp(p, ".repeat(depth), ")".repeat(depth))
    }

    #[test]
    fn test_nesting_up_to_limit_elaborates() {
        let source = format!(
            "{}axiom deep(prop p) {{\n  |- {}\n}}\n",
            PRELUDE,
            nested(MAX_TERM_DEPTH)
        );
        let (tokens, output) = parse_source(&source);
        assert_eq!(kinds(&tokens, &output), vec![]);
        assert_eq!(output.cnodes.len(), 5);
    }

    #[test]
    fn test_nesting_past_limit_is_reported() {
        let source = format!(
            "{}axiom deep(prop p) {{\n  |- {}\n}}\ntype set\n",
            PRELUDE,
            nested(5000)
        );
        let (tokens, output) = parse_source(&source);
        let errors = kinds(&tokens, &output);
        assert_eq!(errors[0], ("(".to_string(), ErrorKind::UnexpectedToken));
        // The rest of the block still parses
        assert!(output.scope.types.contains_key("set"));
    }
}

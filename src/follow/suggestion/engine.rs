//! Suggestion engine
//!
//! Suggestions are computed for the whole block; the host decides which ones to show by
//! their distance to the caret. Four sources, in this order:
//!
//! - next proof steps: rules whose target matches a theorem's first open goal
//! - lemma extraction: cite a fresh lemma for that goal, declaring it above the theorem
//! - name repair: declared names close to an unresolved reference
//! - keyword completion: a stray word that starts a declaration keyword
//!
//! Steps that leave rule parameters unbound come after the lemma, and their doc names the
//! placeholders to fill in.

use super::edit::{Suggestion, TextEdit};
use crate::follow::ast::{CNode, ErrorKind, Param, Term, ThmCNode, Token};
use crate::follow::config::SuggestionConfig;
use crate::follow::lexing::DECLARATION_KEYWORDS;
use crate::follow::parsing::{ParseOutput, ProofInsert, Rule, Scope, ThmSite};
use std::collections::HashMap;

/// Everything the engine reads. `tokens` and `cnodes` are the final, refined outputs;
/// `parsed` supplies the scope and token-level bookkeeping.
pub struct SuggestionContext<'a> {
    pub tokens: &'a [Token],
    pub cnodes: &'a [CNode],
    pub parsed: &'a ParseOutput,
}

pub fn suggest(context: &SuggestionContext<'_>, config: &SuggestionConfig) -> Vec<Suggestion> {
    if !config.enabled || config.max == 0 {
        return Vec::new();
    }
    let mut suggestions = Vec::new();
    for site in &context.parsed.theorems {
        let Some(thm) = context.cnodes.get(site.node).and_then(CNode::as_thm) else {
            continue;
        };
        let (complete, partial) = next_steps(&context.parsed.scope, site, thm);
        suggestions.extend(complete);
        if config.lemma_extraction {
            suggestions.extend(extract_lemma(&context.parsed.scope, site, thm));
        }
        suggestions.extend(partial);
    }
    suggestions.extend(name_repairs(context));
    suggestions.extend(keyword_completions(context));
    suggestions.truncate(config.max);
    suggestions
}

fn insert_step(insert: ProofInsert, step: &str) -> TextEdit {
    match insert {
        ProofInsert::AfterStep(at) | ProofInsert::AfterOpenBrace(at) => {
            TextEdit::insert(at, format!("\n  {}", step))
        }
        ProofInsert::NewBlock(at) => TextEdit::insert(at, format!(" = {{\n  {}\n}}", step)),
        ProofInsert::AfterEquals(at) => TextEdit::insert(at, format!(" {{\n  {}\n}}", step)),
    }
}

fn step_text(name: &str, args: &[String]) -> String {
    if args.is_empty() {
        name.to_string()
    } else {
        format!("{}({})", name, args.join(", "))
    }
}

struct Candidate<'r> {
    rule: &'r Rule,
    args: Vec<String>,
    unbound: Vec<&'r str>,
    subgoals: usize,
}

/// Match `goal` against the targets of `rule`; parameters the match leaves unbound keep
/// their names.
fn candidate<'r>(scope: &Scope, rule: &'r Rule, goal: &Term, hypotheses: &[Term]) -> Option<Candidate<'r>> {
    rule.targets.iter().find_map(|target| {
        let mut bindings: HashMap<String, Term> = HashMap::new();
        if !target.match_against(goal, &mut bindings) {
            return None;
        }
        let args: Vec<String> = rule
            .params
            .iter()
            .map(|param| {
                bindings
                    .get(&param.name)
                    .map_or_else(|| param.name.clone(), |term| term.to_string())
            })
            .collect();
        let unbound: Vec<&str> = rule
            .params
            .iter()
            .filter(|param| !bindings.contains_key(&param.name))
            .map(|param| param.name.as_str())
            .collect();
        let subgoals = rule
            .assumptions
            .iter()
            .map(|assumption| scope.instantiate(assumption, &bindings, goal.range))
            .filter(|assumption| !hypotheses.contains(assumption))
            .count();
        Some(Candidate {
            rule,
            args,
            unbound,
            subgoals,
        })
    })
}

/// Proposed steps, split into those with every parameter bound and those with
/// placeholders left.
fn next_steps(scope: &Scope, site: &ThmSite, thm: &ThmCNode) -> (Vec<Suggestion>, Vec<Suggestion>) {
    let (Some(insert), Some(goal)) = (site.insert, thm.remaining_goals().first()) else {
        return (Vec::new(), Vec::new());
    };
    let mut candidates: Vec<Candidate> = scope
        .rules_before(site.order)
        .into_iter()
        .filter_map(|rule| candidate(scope, rule, goal, &thm.assumptions))
        .collect();
    // Stable: declaration order breaks ties
    candidates.sort_by_key(|candidate| (candidate.unbound.len(), candidate.subgoals));

    let (complete, partial): (Vec<Candidate>, Vec<Candidate>) = candidates
        .into_iter()
        .partition(|candidate| candidate.unbound.is_empty());
    let render = |candidates: Vec<Candidate>| -> Vec<Suggestion> {
        candidates
            .into_iter()
            .map(|candidate| {
                let step = step_text(&candidate.rule.name, &candidate.args);
                let edit = insert_step(insert, &step);
                let doc = if candidate.unbound.is_empty() {
                    candidate.rule.describe()
                } else {
                    format!(
                        "// fill in {}\n{}",
                        candidate.unbound.join(", "),
                        candidate.rule.describe()
                    )
                };
                Suggestion::new(step, edit.range, edit.new_text).with_doc(doc)
            })
            .collect()
    };
    (render(complete), render(partial))
}

fn lemma_name(scope: &Scope, theorem: &str) -> String {
    let base = format!("{}_lemma", theorem);
    if !scope.is_declared(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{}{}", base, n))
        .find(|name| !scope.is_declared(name))
        .unwrap_or_else(|| base.clone())
}

fn extract_lemma(scope: &Scope, site: &ThmSite, thm: &ThmCNode) -> Option<Suggestion> {
    let insert = site.insert?;
    let goal = thm.remaining_goals().first()?;
    if thm.name.is_empty() {
        return None;
    }

    let used = goal.arg_names();
    let params: Vec<&Param> = thm
        .params
        .iter()
        .filter(|param| used.contains(&param.name.as_str()))
        .collect();
    let name = lemma_name(scope, &thm.name);
    let args: Vec<String> = params.iter().map(|param| param.name.clone()).collect();
    let signature: Vec<String> = params.iter().map(|param| param.to_string()).collect();

    let head = if signature.is_empty() {
        format!("thm {}", name)
    } else {
        format!("thm {}({})", name, signature.join(", "))
    };
    let declaration = format!("{} {{\n  |- {}\n}} = {{\n}}\n\n", head, goal);
    let step = step_text(&name, &args);
    let edit = insert_step(insert, &step);

    Some(
        Suggestion::new(format!("{} (new lemma)", step), edit.range, edit.new_text)
            .with_doc(declaration.trim_end().to_string())
            .with_additional_edit(TextEdit::insert(site.leading, declaration)),
    )
}

fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut rest = haystack.chars();
    needle.chars().all(|c| rest.any(|h| h == c))
}

fn name_repairs(context: &SuggestionContext<'_>) -> Vec<Suggestion> {
    let scope = &context.parsed.scope;
    let mut suggestions = Vec::new();
    for unresolved in &context.parsed.unresolved {
        let Some(token) = context.tokens.get(unresolved.index) else {
            continue;
        };
        let written = token.content.as_str();
        let mut matches: Vec<&String> = unresolved
            .candidates
            .iter()
            .filter(|candidate| candidate.as_str() != written)
            .filter(|candidate| {
                candidate.starts_with(written)
                    || written.starts_with(candidate.as_str())
                    || is_subsequence(written, candidate)
            })
            .collect();
        matches.sort_by_key(|candidate| {
            (
                !candidate.starts_with(written),
                candidate.len().abs_diff(written.len()),
            )
        });
        matches.dedup();

        for candidate in matches.into_iter().take(3) {
            let doc = match unresolved.kind {
                ErrorKind::UnknownRule => scope
                    .rules
                    .get(candidate)
                    .map(Rule::describe)
                    .unwrap_or_default(),
                ErrorKind::UnknownType => format!("type {}", candidate),
                _ => scope
                    .terms
                    .get(candidate)
                    .map(|def| {
                        let params: Vec<String> = def.params.iter().map(|p| p.to_string()).collect();
                        if params.is_empty() {
                            format!("term {} {}", def.type_name, def.name)
                        } else {
                            format!("term {} {}({})", def.type_name, def.name, params.join(", "))
                        }
                    })
                    .unwrap_or_else(|| format!("parameter {}", candidate)),
            };
            suggestions.push(Suggestion::new(candidate.clone(), token.range, candidate.clone()).with_doc(doc));
        }
    }
    suggestions
}

fn keyword_syntax(keyword: &str) -> &'static str {
    match keyword {
        "type" => "type NAME ...",
        "term" => "term TYPE NAME(TYPE ARG, ...) { body }",
        "axiom" => "axiom NAME(TYPE ARG, ...) {\n  |- target\n  -| assumption\n}",
        _ => "thm NAME(TYPE ARG, ...) {\n  |- target\n} = {\n  step\n}",
    }
}

fn keyword_completions(context: &SuggestionContext<'_>) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();
    for &index in &context.parsed.stray_words {
        let Some(token) = context.tokens.get(index) else {
            continue;
        };
        for keyword in DECLARATION_KEYWORDS {
            if keyword.starts_with(token.content.as_str()) && *keyword != token.content {
                suggestions.push(
                    Suggestion::new(*keyword, token.range, *keyword).with_doc(keyword_syntax(keyword)),
                );
            }
        }
    }
    suggestions
}

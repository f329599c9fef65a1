//! Suggestions on real blocks, applied back to the text they were computed for

use follow::follow::ast::{CNode, ErrorKind};
use follow::follow::suggestion::{apply_suggestion, rename, RenameError, Suggestion};
use follow::{CompileInfo, Compiler, CompilerConfig};

const PRELUDE: &str = include_str!("fixtures/prelude.follow");

fn unproved_block() -> String {
    format!("{}\nthm self_imp(prop p) {{\n  |- imp(p, imp(p, p))\n}}", PRELUDE)
}

fn compile(source: &str) -> CompileInfo {
    Compiler::default().compile(source)
}

fn labels(suggestions: &[Suggestion]) -> Vec<&str> {
    suggestions.iter().map(|s| s.label.as_str()).collect()
}

#[test]
fn test_next_steps_are_ranked() {
    let info = compile(&unproved_block());
    assert_eq!(
        labels(&info.suggestions),
        vec![
            "a1(p, p)",
            "self_imp_lemma(p) (new lemma)",
            "mp(p0, imp(p, imp(p, p)))",
        ]
    );
    let first = &info.suggestions[0];
    assert_eq!(first.new_text, " = {\n  a1(p, p)\n}");
    assert!(first.range.is_empty());
    assert!(first.doc.starts_with("axiom a1(prop p0, prop p1) {"));
    // Placeholders are named in the doc so they are not mistaken for theorem params
    let partial = &info.suggestions[2];
    assert!(partial.doc.starts_with("// fill in p0\naxiom mp("), "{}", partial.doc);
}

#[test]
fn test_applying_next_step_proves_theorem() {
    let info = compile(&unproved_block());
    let applied = apply_suggestion(&info.source(), &info.suggestions[0]).unwrap();
    assert_eq!(
        applied.text.len(),
        info.source().len() + info.suggestions[0].new_text.len()
    );
    assert_eq!(&applied.text[..applied.cursor], {
        let end = info.suggestions[0].range.start.offset;
        format!("{}{}", &info.source()[..end], info.suggestions[0].new_text)
    });

    let after = compile(&applied.text);
    assert!(after.errors.is_empty(), "{:?}", after.errors);
    let thm = after.cnodes.iter().filter_map(CNode::as_thm).last().unwrap();
    assert!(thm.is_proved());
}

#[test]
fn test_step_after_bare_equals_opens_block() {
    let source = format!("{}\nthm t(prop p) {{\n  |- imp(p, imp(p, p))\n}} =", PRELUDE);
    let info = compile(&source);
    assert!(info.errors.iter().any(|e| e.kind == ErrorKind::MissingOpenBrace));
    let first = &info.suggestions[0];
    assert_eq!(first.label, "a1(p, p)");
    assert_eq!(first.new_text, " {\n  a1(p, p)\n}");

    let applied = apply_suggestion(&info.source(), first).unwrap();
    assert!(applied.text.contains("} = {\n  a1(p, p)\n}"), "{}", applied.text);
    let after = compile(&applied.text);
    assert!(after.errors.is_empty(), "{:?}", after.errors);
    assert!(after.cnodes.iter().filter_map(CNode::as_thm).last().unwrap().is_proved());
}

#[test]
fn test_lemma_extraction_declares_lemma_above() {
    let info = compile(&unproved_block());
    let lemma = info
        .suggestions
        .iter()
        .find(|s| s.label.ends_with("(new lemma)"))
        .unwrap();
    assert_eq!(lemma.additional_text_edits.len(), 1);
    assert_eq!(
        lemma.additional_text_edits[0].new_text,
        "thm self_imp_lemma(prop p) {\n  |- imp(p, imp(p, p))\n} = {\n}\n\n"
    );
    assert!(lemma.additional_text_edits[0].range.start.offset < lemma.range.start.offset);

    let applied = apply_suggestion(&info.source(), lemma).unwrap();
    let added: usize = lemma.edits().iter().map(|edit| edit.new_text.len()).sum();
    assert_eq!(applied.text.len(), info.source().len() + added);

    let after = compile(&applied.text);
    let names: Vec<&str> = after
        .cnodes
        .iter()
        .filter_map(CNode::as_thm)
        .map(|thm| thm.name.as_str())
        .collect();
    assert_eq!(names, vec!["self_imp_lemma", "self_imp"]);
    assert!(after.cnodes.iter().filter_map(CNode::as_thm).last().unwrap().is_proved());
    // The new lemma itself still needs a proof
    assert_eq!(after.errors.len(), 1);
    assert_eq!(after.errors[0].kind, ErrorKind::ProofIncomplete);
    assert_eq!(after.errors[0].token.content, "self_imp_lemma");
}

#[test]
fn test_lemma_name_avoids_collisions() {
    let source = format!(
        "{}\nthm self_imp_lemma(prop p) {{\n  |- p\n}} = {{\n}}\nthm self_imp(prop p) {{\n  |- imp(p, imp(p, p))\n}}",
        PRELUDE
    );
    let info = compile(&source);
    assert!(labels(&info.suggestions).contains(&"self_imp_lemma2(p) (new lemma)"));
}

#[test]
fn test_steps_append_after_last_step() {
    let source = format!("{}\nthm t(prop p) {{\n  |- imp(p, imp(p, p))\n}} = {{\n}}", PRELUDE);
    let info = compile(&source);
    let first = &info.suggestions[0];
    assert_eq!(first.label, "a1(p, p)");
    assert_eq!(first.new_text, "\n  a1(p, p)");

    let after = compile(&apply_suggestion(&info.source(), first).unwrap().text);
    assert!(after.errors.is_empty(), "{:?}", after.errors);
}

#[test]
fn test_name_repair() {
    let source = format!("{}\naxiom bad(prop p) {{\n  |- im(p, p)\n}}", PRELUDE);
    let info = compile(&source);
    let repair = info.suggestions.iter().find(|s| s.label == "imp").unwrap();
    assert_eq!(repair.new_text, "imp");
    assert!(repair.doc.starts_with("term prop imp("));

    let after = compile(&apply_suggestion(&info.source(), repair).unwrap().text);
    assert!(after.errors.is_empty(), "{:?}", after.errors);
}

#[test]
fn test_keyword_completion() {
    let info = compile("ax");
    assert_eq!(labels(&info.suggestions), vec!["axiom"]);
    assert_eq!(info.suggestions[0].range.start.offset, 0);
    assert_eq!(info.suggestions[0].range.end.offset, 2);
}

#[test]
fn test_keyword_completion_on_line_after_type() {
    let info = compile("type prop\nte");
    assert_eq!(labels(&info.suggestions), vec!["term"]);
    assert_eq!(info.suggestions[0].range.start.line, 1);
}

#[test]
fn test_suggestions_can_be_disabled() {
    let mut config = CompilerConfig::default();
    config.suggestions.enabled = false;
    assert!(Compiler::new(config).compile(&unproved_block()).suggestions.is_empty());

    let mut config = CompilerConfig::default();
    config.suggestions.max = 1;
    assert_eq!(Compiler::new(config).compile(&unproved_block()).suggestions.len(), 1);

    let mut config = CompilerConfig::default();
    config.suggestions.lemma_extraction = false;
    let info = Compiler::new(config).compile(&unproved_block());
    assert!(info.suggestions.iter().all(|s| s.additional_text_edits.is_empty()));
}

#[test]
fn test_suggestions_at_line() {
    let info = compile(&unproved_block());
    let close_line = info.source().lines().count() - 1;
    assert_eq!(info.suggestions_at_line(close_line).count(), 3);
    assert_eq!(info.suggestions_at_line(0).count(), 0);
}

#[test]
fn test_rename_every_occurrence() {
    let source = "type foo\naxiom a(foo x) {\n  |- x\n}\nthm b(foo y) {\n  |- y\n}";
    let renamed = rename(source, "foo", "bar").unwrap();
    assert_eq!(
        renamed,
        "type bar\naxiom a(bar x) {\n  |- x\n}\nthm b(bar y) {\n  |- y\n}"
    );
    assert!(!renamed.contains("foo"));
}

#[test]
fn test_rename_rejects_bad_names() {
    let source = "type foo";
    assert_eq!(rename(source, "foo", ""), Err(RenameError::Empty));
    assert_eq!(rename(source, "foo", "thm"), Err(RenameError::Reserved("thm".into())));
    assert!(matches!(rename(source, "foo", "a b"), Err(RenameError::InvalidName(_))));
    assert!(matches!(rename(source, "nope", "bar"), Err(RenameError::NotFound(_))));
}

#[test]
fn test_rename_source_at_caret() {
    let info = compile("type foo\n");
    assert_eq!(info.rename_source_at(6), Some("foo"));
    // A caret right after a word still touches it
    assert_eq!(info.rename_source_at(4), Some("type"));
    assert_eq!(info.rename_source_at(100), None);
}

//! Registry behaviour as seen by a host editor

use follow::follow::ast::ErrorKind;
use follow::{CacheKey, CacheKeyError, CompilerConfig, CompilerRegistry};
use proptest::prelude::*;
use rstest::rstest;
use std::collections::BTreeSet;
use std::sync::Arc;

fn key(space: &str, note: &str, block: &str) -> CacheKey {
    CacheKey::new(space, note, block).unwrap()
}

#[test]
fn test_compile_overwrites_block() {
    let mut registry = CompilerRegistry::default();
    registry.compile("s", "n", "b", "type prop").unwrap();
    let second = registry.compile("s", "n", "b", "}").unwrap();

    let stored = registry.get(&key("s", "n", "b")).unwrap();
    assert!(Arc::ptr_eq(&stored, &second));
    assert_eq!(stored.errors[0].kind, ErrorKind::BracketMismatch);
}

#[test]
fn test_blocks_are_independent() {
    let mut registry = CompilerRegistry::default();
    registry.compile("s", "n", "b1", "type prop").unwrap();
    registry.compile("s", "n", "b2", "}").unwrap();
    registry.compile("s", "m", "b1", "type other").unwrap();

    assert!(!registry.get(&key("s", "n", "b1")).unwrap().has_errors());
    assert!(registry.get(&key("s", "n", "b2")).unwrap().has_errors());
    assert_eq!(registry.get(&key("s", "m", "b1")).unwrap().source(), "type other\n");
    // Declarations do not leak between blocks
    let info = registry
        .compile("s", "n", "b3", "axiom a(prop p) {\n  |- p\n}")
        .unwrap();
    assert_eq!(info.errors[0].kind, ErrorKind::UnknownType);
}

#[rstest]
#[case::space("", "n", "b", CacheKeyError::MissingSpace)]
#[case::note("s", "", "b", CacheKeyError::MissingNote)]
#[case::block("s", "n", "", CacheKeyError::MissingBlock)]
fn test_missing_ids_are_rejected(
    #[case] space: &str,
    #[case] note: &str,
    #[case] block: &str,
    #[case] expected: CacheKeyError,
) {
    let mut registry = CompilerRegistry::default();
    assert_eq!(
        registry.compile(space, note, block, "type prop").unwrap_err(),
        expected
    );
    assert!(registry.space_ids().is_empty());
}

#[test]
fn test_prune_levels() {
    let mut registry = CompilerRegistry::default();
    for (space, note, block) in [
        ("s", "n", "b1"),
        ("s", "n", "b2"),
        ("s", "m", "b1"),
        ("t", "n", "b9"),
    ] {
        registry.compile(space, note, block, "type prop").unwrap();
    }

    registry.prune_blocks("n", &["b1"]);
    assert_eq!(registry.block_ids("n"), vec!["b1"]);
    assert!(registry.get(&key("t", "n", "b9")).is_none());
    assert!(registry.get(&key("s", "m", "b1")).is_some());

    registry.prune_notes("s", &["m"]);
    assert_eq!(registry.note_ids("s"), vec!["m"]);
    assert!(registry.get(&key("s", "n", "b1")).is_none());

    let before = registry.compiler("t");
    registry.prune_spaces(&["s"]);
    assert_eq!(registry.space_ids(), vec!["s"]);
    assert!(!Arc::ptr_eq(&before, &registry.compiler("t")));
}

#[test]
fn test_factory_receives_space_id() {
    let mut registry = CompilerRegistry::with_factory(|space| {
        let mut config = CompilerConfig::default();
        config.proof.report_incomplete = space != "quiet";
        follow::Compiler::new(config)
    });
    let source = "type prop\nthm t(prop p) {\n  |- p\n}";
    assert!(registry.compile("loud", "n", "b", source).unwrap().has_errors());
    assert!(!registry.compile("quiet", "n", "b", source).unwrap().has_errors());
}

#[test]
fn test_out_of_order_commits_keep_latest() {
    let mut registry = CompilerRegistry::default();
    let block = key("s", "n", "b");
    let compiler = registry.compiler("s");

    let tickets: Vec<_> = (0..3).map(|_| registry.begin(&block)).collect();
    let mut tickets = tickets.into_iter();
    let (first, second, third) = (
        tickets.next().unwrap(),
        tickets.next().unwrap(),
        tickets.next().unwrap(),
    );

    // Only the last call made may store its result, whatever order they finish in
    assert!(!registry.commit(second, Arc::new(compiler.compile("type two"))));
    assert!(!registry.commit(first, Arc::new(compiler.compile("type one"))));
    assert!(registry.get(&block).is_none());
    assert!(registry.commit(third, Arc::new(compiler.compile("type three"))));
    assert_eq!(registry.get(&block).unwrap().source(), "type three\n");

    // A call made after a stored result supersedes it too
    let stale = registry.begin(&block);
    let fresh = registry.begin(&block);
    assert!(!registry.commit(stale, Arc::new(compiler.compile("type four"))));
    assert_eq!(registry.get(&block).unwrap().source(), "type three\n");
    assert!(registry.commit(fresh, Arc::new(compiler.compile("type five"))));
    assert_eq!(registry.get(&block).unwrap().source(), "type five\n");
}

proptest! {
    #[test]
    fn test_prune_blocks_keeps_exactly_live(
        blocks in prop::collection::btree_set("[a-d]", 0..5),
        live in prop::collection::vec("[a-f]", 0..5),
    ) {
        let mut registry = CompilerRegistry::default();
        for block in &blocks {
            registry.compile("s", "n", block, "type prop").unwrap();
        }
        registry.prune_blocks("n", live.as_slice());

        let expected: BTreeSet<&str> = blocks
            .iter()
            .map(String::as_str)
            .filter(|block| live.iter().any(|l| l.as_str() == *block))
            .collect();
        let kept: BTreeSet<&str> = registry.block_ids("n").into_iter().collect();
        prop_assert_eq!(kept, expected);
    }
}

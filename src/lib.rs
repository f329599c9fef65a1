//! # follow
//!
//! Language service for follow proof blocks embedded in notes.
//!
//! A host editor hands the source of one block at a time to
//! [`CompilerRegistry::compile`](follow::cache::CompilerRegistry::compile) and gets back a
//! [`CompileInfo`](follow::compiler::CompileInfo): the token stream used for highlighting,
//! the elaborated declarations with their proof states, diagnostics, and completion
//! proposals. The pipeline never fails on malformed input; every problem comes back as data.
//!
//! File Layout
//!
//! src/follow
//!   ├── ast          Ranges, tokens, terms, compiled nodes and diagnostics
//!   ├── lexing       Source normalization and the logos tokenizer
//!   ├── parsing      Declaration parser, term grammar, scope and token refinement
//!   ├── proof        Goal tracking and the pluggable step validator
//!   ├── suggestion   Completion proposals, text edits and rename
//!   ├── compiler     The per-space compiler running the whole pipeline
//!   ├── cache        Space → note → block registry of compile results
//!   └── config       YAML configuration

pub mod follow;

pub use follow::cache::{CacheKey, CacheKeyError, CompilerRegistry};
pub use follow::compiler::{CompileInfo, Compiler};
pub use follow::config::CompilerConfig;

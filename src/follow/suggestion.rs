//! Completion suggestions, edit application and rename
//!
//! - [`engine`]: computes the suggestions of a block
//! - [`edit`]: the suggestion and text-edit types, and splicing them into text
//! - [`rename`]: non-scope-aware rename over the token stream

pub mod edit;
pub mod engine;
pub mod rename;

pub use edit::{apply_edits, apply_suggestion, Applied, EditError, Suggestion, TextEdit};
pub use engine::{suggest, SuggestionContext};
pub use rename::{rename, rename_source_at, rename_tokens, validate_name, RenameError};

//! Suggestions and the edits they carry
//!
//! A [`Suggestion`] is a primary edit plus optional additional edits elsewhere in the block.
//! All edits are expressed against the text the suggestion was computed from and must not
//! overlap. [`apply_suggestion`] sorts them by start offset and splices them in one pass.

use crate::follow::ast::Range;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

impl TextEdit {
    pub fn new(range: Range, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }

    pub fn insert(at: crate::follow::ast::Position, new_text: impl Into<String>) -> Self {
        Self::new(Range::empty(at), new_text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Short text for a completion list.
    pub label: String,
    pub range: Range,
    pub new_text: String,
    /// Rendered declaration or statement the suggestion refers to.
    pub doc: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_text_edits: Vec<TextEdit>,
}

impl Suggestion {
    pub fn new(label: impl Into<String>, range: Range, new_text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            range,
            new_text: new_text.into(),
            doc: String::new(),
            additional_text_edits: Vec::new(),
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn with_additional_edit(mut self, edit: TextEdit) -> Self {
        self.additional_text_edits.push(edit);
        self
    }

    pub fn primary_edit(&self) -> TextEdit {
        TextEdit::new(self.range, self.new_text.clone())
    }

    /// Primary edit first, then the additional ones.
    pub fn edits(&self) -> Vec<TextEdit> {
        let mut edits = vec![self.primary_edit()];
        edits.extend(self.additional_text_edits.iter().cloned());
        edits
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("edit {range} ends past the end of the text ({len} bytes)")]
    OutOfBounds { range: Range, len: usize },
    #[error("edit {range} does not fall on character boundaries")]
    NotCharBoundary { range: Range },
    #[error("edits {first} and {second} overlap")]
    Overlap { first: Range, second: Range },
}

/// Text after applying a suggestion, and where the cursor goes: right after the primary
/// edit's new text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub text: String,
    pub cursor: usize,
}

pub fn apply_suggestion(text: &str, suggestion: &Suggestion) -> Result<Applied, EditError> {
    splice(text, suggestion.edits())
}

/// Apply a batch of non-overlapping edits.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> Result<String, EditError> {
    splice(text, edits.to_vec()).map(|applied| applied.text)
}

fn splice(text: &str, edits: Vec<TextEdit>) -> Result<Applied, EditError> {
    let mut edits: Vec<(usize, TextEdit)> = edits.into_iter().enumerate().collect();
    // Stable, so insertions at the same offset keep their given order
    edits.sort_by_key(|(_, edit)| edit.range.start.offset);

    for (_, edit) in &edits {
        let span = edit.range.span();
        if span.end > text.len() || span.start > span.end {
            return Err(EditError::OutOfBounds {
                range: edit.range,
                len: text.len(),
            });
        }
        if !text.is_char_boundary(span.start) || !text.is_char_boundary(span.end) {
            return Err(EditError::NotCharBoundary { range: edit.range });
        }
    }
    for pair in edits.windows(2) {
        let (first, second) = (&pair[0].1, &pair[1].1);
        if first.range.end.offset > second.range.start.offset {
            return Err(EditError::Overlap {
                first: first.range,
                second: second.range,
            });
        }
    }

    let mut result = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut previous = 0;
    for (order, edit) in &edits {
        let span = edit.range.span();
        result.push_str(&text[previous..span.start]);
        result.push_str(&edit.new_text);
        if *order == 0 {
            cursor = result.len();
        }
        previous = span.end;
    }
    result.push_str(&text[previous..]);
    Ok(Applied {
        text: result,
        cursor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::follow::ast::SourceLocation;

    fn range(text: &str, span: std::ops::Range<usize>) -> Range {
        SourceLocation::new(text).range(&span)
    }

    #[test]
    fn test_primary_and_additional_edits_are_spliced_in_offset_order() {
        let text = "thm b {\n}\n";
        let suggestion = Suggestion::new("b", range(text, 7..7), " x")
            .with_additional_edit(TextEdit::new(range(text, 0..0), "thm a\n"));
        let applied = apply_suggestion(text, &suggestion).unwrap();
        assert_eq!(applied.text, "thm a\nthm b { x\n}\n");
        assert_eq!(applied.cursor, "thm a\nthm b { x".len());
    }

    #[test]
    fn test_replacement() {
        let text = "type prp\n";
        let suggestion = Suggestion::new("prop", range(text, 5..8), "prop");
        assert_eq!(apply_suggestion(text, &suggestion).unwrap().text, "type prop\n");
    }

    #[test]
    fn test_overlap_is_rejected() {
        let text = "abcdef";
        let suggestion = Suggestion::new("x", range(text, 1..4), "x")
            .with_additional_edit(TextEdit::new(range(text, 3..5), "y"));
        assert!(matches!(
            apply_suggestion(text, &suggestion),
            Err(EditError::Overlap { .. })
        ));
    }

    #[test]
    fn test_out_of_bounds_is_rejected() {
        let long = "abcdefgh";
        let suggestion = Suggestion::new("x", range(long, 2..8), "x");
        assert!(matches!(
            apply_suggestion("abc", &suggestion),
            Err(EditError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_adjacent_edits_are_fine() {
        let text = "abcdef";
        let edits = [
            TextEdit::new(range(text, 3..6), "Z"),
            TextEdit::new(range(text, 0..3), "Y"),
        ];
        assert_eq!(apply_edits(text, &edits).unwrap(), "YZ");
    }
}

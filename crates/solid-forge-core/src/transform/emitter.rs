//! Source emission
//!
//! The merge stages describe their changes as byte-range edits against the
//! original text; emission splices them in from the end backwards. Statements
//! no edit touches are reproduced byte-for-byte. An overlapping or
//! out-of-bounds edit can only come from a bug in edit construction and
//! fails hard.

use crate::error::{Result, SolidForgeError};

/// One byte-range edit. Insertions have `start == end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Edit {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            start: at,
            end: at,
            text: text.into(),
        }
    }

    pub fn replace(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Apply edits to the source text
pub fn emit(source: &str, mut edits: Vec<Edit>) -> Result<String> {
    edits.sort_by_key(|e| (e.start, e.end));

    for edit in &edits {
        if edit.start > edit.end || edit.end > source.len() {
            return Err(emit_error(&format!(
                "edit {}..{} outside source of length {}",
                edit.start,
                edit.end,
                source.len()
            )));
        }
        if !source.is_char_boundary(edit.start) || !source.is_char_boundary(edit.end) {
            return Err(emit_error(&format!(
                "edit {}..{} not on a character boundary",
                edit.start, edit.end
            )));
        }
    }
    for pair in edits.windows(2) {
        if pair[1].start < pair[0].end {
            return Err(emit_error(&format!(
                "overlapping edits {}..{} and {}..{}",
                pair[0].start, pair[0].end, pair[1].start, pair[1].end
            )));
        }
    }

    let mut output = source.to_string();
    for edit in edits.iter().rev() {
        output.replace_range(edit.start..edit.end, &edit.text);
    }
    Ok(output)
}

fn emit_error(message: &str) -> SolidForgeError {
    SolidForgeError::Emit {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_replace() {
        let out = emit(
            "plugins: []",
            vec![
                Edit::insert(10, "UnoCss()"),
                Edit::replace(0, 7, "plugins"),
            ],
        )
        .unwrap();
        assert_eq!(out, "plugins: [UnoCss()]");
    }

    #[test]
    fn test_no_edits_is_identity() {
        assert_eq!(emit("export default {};", vec![]).unwrap(), "export default {};");
    }

    #[test]
    fn test_out_of_order_edits_are_sorted() {
        let out = emit(
            "abcdef",
            vec![Edit::insert(6, "!"), Edit::insert(0, ">")],
        )
        .unwrap();
        assert_eq!(out, ">abcdef!");
    }

    #[test]
    fn test_overlapping_edits_fail() {
        let err = emit(
            "abcdef",
            vec![Edit::replace(0, 4, "x"), Edit::replace(2, 6, "y")],
        )
        .unwrap_err();
        assert!(matches!(err, SolidForgeError::Emit { .. }));
    }

    #[test]
    fn test_out_of_bounds_edit_fails() {
        let err = emit("abc", vec![Edit::insert(9, "x")]).unwrap_err();
        assert!(matches!(err, SolidForgeError::Emit { .. }));
    }
}

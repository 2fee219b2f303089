//! Algebraic properties of the span editor, checked with proptest.

use proptest::prelude::*;
use uplift::{apply_edits, TextEdit};

/// A printable-ASCII source plus a set of non-overlapping edits against it.
///
/// Edits are built by pairing sorted, deduplicated offsets, which makes
/// overlap impossible by construction. ASCII keeps every offset on a char
/// boundary.
fn edit_plan() -> impl Strategy<Value = (String, Vec<TextEdit>)> {
    "[ -~]{0,80}".prop_flat_map(|source| {
        let len = source.len();
        (
            Just(source),
            proptest::collection::vec(0..=len, 0..8),
            proptest::collection::vec("[ -~]{0,6}", 4),
        )
            .prop_map(|(source, mut offsets, replacements)| {
                offsets.sort_unstable();
                offsets.dedup();
                let edits = offsets
                    .chunks_exact(2)
                    .zip(replacements)
                    .map(|(span, replacement)| TextEdit::replace(span[0], span[1], replacement))
                    .collect();
                (source, edits)
            })
    })
}

proptest! {
    #[test]
    fn result_length_matches_the_arithmetic((source, edits) in edit_plan()) {
        let removed: usize = edits.iter().map(|e| e.end - e.start).sum();
        let inserted: usize = edits.iter().map(|e| e.replacement.len()).sum();

        let result = apply_edits(&source, &edits).unwrap();
        prop_assert_eq!(result.len(), source.len() - removed + inserted);
    }

    #[test]
    fn supplied_order_is_irrelevant((source, edits) in edit_plan()) {
        let mut reversed = edits.clone();
        reversed.reverse();

        let forward = apply_edits(&source, &edits).unwrap();
        let backward = apply_edits(&source, &reversed).unwrap();
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn text_outside_the_spans_is_preserved((source, edits) in edit_plan()) {
        let result = apply_edits(&source, &edits).unwrap();

        if let Some(first) = edits.first() {
            prop_assert_eq!(&result[..first.start], &source[..first.start]);
        }
        if let Some(last) = edits.last() {
            let tail = source.len() - last.end;
            prop_assert_eq!(&result[result.len() - tail..], &source[last.end..]);
        }
    }

    #[test]
    fn empty_edit_set_is_identity(source in "[ -~]{0,120}") {
        prop_assert_eq!(apply_edits(&source, &[]).unwrap(), source);
    }

    #[test]
    fn pure_deletions_shrink_to_the_survivors((source, edits) in edit_plan()) {
        let deletions: Vec<TextEdit> = edits
            .iter()
            .map(|e| TextEdit::delete(e.start, e.end))
            .collect();

        let result = apply_edits(&source, &deletions).unwrap();

        let mut expected = String::new();
        let mut cursor = 0;
        for edit in &deletions {
            expected.push_str(&source[cursor..edit.start]);
            cursor = edit.end;
        }
        expected.push_str(&source[cursor..]);
        prop_assert_eq!(result, expected);
    }
}

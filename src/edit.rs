use thiserror::Error;

/// The fundamental edit primitive: a byte-span replacement against an
/// immutable source buffer.
///
/// All high-level operations (declaration removal, tag renames, attribute
/// removal) compile down to this single primitive. Intelligence lives in
/// span acquisition, not in application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Starting byte offset (inclusive) into the original buffer
    pub start: usize,
    /// Ending byte offset (exclusive) into the original buffer
    pub end: usize,
    /// Replacement text for `[start, end)`
    pub replacement: String,
}

impl TextEdit {
    /// Replace `[start, end)` with `replacement`.
    pub fn replace(start: usize, end: usize, replacement: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
        }
    }

    /// Delete `[start, end)`.
    pub fn delete(start: usize, end: usize) -> Self {
        Self::replace(start, end, "")
    }

    /// Insert `text` at `at` without removing anything.
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(at, at, text)
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("invalid span {start}..{end} in buffer of length {len}")]
    InvalidSpan {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("span {start}..{end} does not fall on character boundaries")]
    NotCharBoundary { start: usize, end: usize },

    #[error("overlapping edit spans: {first_start}..{first_end} and {second_start}..{second_end}")]
    Overlap {
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },
}

/// Outcome of one rewrite operation against a source buffer.
///
/// Absent targets are not errors: the operation reports `Unchanged` and the
/// caller keeps the original buffer. Only `Changed` carries a new buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a Rewrite carries the new buffer and must be inspected"]
pub enum Rewrite {
    /// The operation produced a new buffer.
    Changed(String),
    /// The target was absent; the buffer is untouched.
    Unchanged,
}

impl Rewrite {
    pub fn is_changed(&self) -> bool {
        matches!(self, Rewrite::Changed(_))
    }

    /// The new buffer, if any.
    pub fn into_changed(self) -> Option<String> {
        match self {
            Rewrite::Changed(text) => Some(text),
            Rewrite::Unchanged => None,
        }
    }

    /// The resulting buffer, falling back to `original` when unchanged.
    pub fn into_source(self, original: &str) -> String {
        match self {
            Rewrite::Changed(text) => text,
            Rewrite::Unchanged => original.to_string(),
        }
    }
}

/// Apply a set of non-overlapping edits to `source` and return the new
/// buffer.
///
/// The supplied order is irrelevant; edits are sorted by start offset
/// internally so every span is spliced against original-buffer coordinates.
/// Overlapping spans are a contract violation and are rejected before any
/// text is rewritten, so the caller never observes a half-edited buffer.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> Result<String, EditError> {
    if edits.is_empty() {
        return Ok(source.to_string());
    }

    for edit in edits {
        validate_span(source, edit)?;
    }

    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by_key(|e| (e.start, e.end));

    for window in ordered.windows(2) {
        let (earlier, later) = (window[0], window[1]);
        if earlier.end > later.start {
            return Err(EditError::Overlap {
                first_start: earlier.start,
                first_end: earlier.end,
                second_start: later.start,
                second_end: later.end,
            });
        }
    }

    let removed: usize = ordered.iter().map(|e| e.end - e.start).sum();
    let inserted: usize = ordered.iter().map(|e| e.replacement.len()).sum();
    let mut out = String::with_capacity(source.len() - removed + inserted);

    let mut cursor = 0;
    for edit in ordered {
        out.push_str(&source[cursor..edit.start]);
        out.push_str(&edit.replacement);
        cursor = edit.end;
    }
    out.push_str(&source[cursor..]);

    Ok(out)
}

fn validate_span(source: &str, edit: &TextEdit) -> Result<(), EditError> {
    if edit.start > edit.end || edit.end > source.len() {
        return Err(EditError::InvalidSpan {
            start: edit.start,
            end: edit.end,
            len: source.len(),
        });
    }
    if !source.is_char_boundary(edit.start) || !source.is_char_boundary(edit.end) {
        return Err(EditError::NotCharBoundary {
            start: edit.start,
            end: edit.end,
        });
    }
    Ok(())
}

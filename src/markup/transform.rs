use crate::edit::{apply_edits, Rewrite, TextEdit};
use crate::markup::errors::MarkupError;
use crate::markup::scanner::{find_tag_matches, TagMatch};
use tracing::info;

/// What to do with every occurrence of a matched element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOperation {
    /// Rename the element, open and close tag alike; attributes and content
    /// are untouched.
    Rename { to: String },
    /// Delete the full element span, content included.
    RemoveElement,
    /// Remove one attribute assignment (`name="v"`, `[name]="e"` or
    /// `(name)="e"`) from the open tag's attribute region.
    RemoveAttribute { name: String },
}

/// Apply `op` to every occurrence of `tag` in `markup`.
///
/// All spans are computed against the original buffer and applied in a
/// single pass, so rewritten text is never re-scanned and nested occurrences
/// cannot be processed twice.
pub fn transform_markup(
    markup: &str,
    tag: &str,
    op: &TagOperation,
) -> Result<Rewrite, MarkupError> {
    let matches = find_tag_matches(markup, tag)?;
    if matches.is_empty() {
        info!(tag, "no matching elements, skipping");
        return Ok(Rewrite::Unchanged);
    }

    let mut edits = Vec::new();
    match op {
        TagOperation::Rename { to } => {
            for m in &matches {
                edits.push(TextEdit::replace(m.open_start + 1, m.name_end, to.clone()));
                if let Some(close) = m.close {
                    edits.push(TextEdit::replace(
                        close.start + 2,
                        close.end - 1,
                        to.clone(),
                    ));
                }
            }
        }
        TagOperation::RemoveElement => {
            // Outermost occurrences only: an inner span is already covered
            // by the deletion of its parent.
            for m in matches
                .iter()
                .filter(|m| !matches.iter().any(|outer| m.is_inside(outer)))
            {
                edits.push(TextEdit::delete(m.open_start, m.full_end()));
            }
        }
        TagOperation::RemoveAttribute { name } => {
            for m in &matches {
                if let Some((start, end)) = attribute_span(markup, m, name) {
                    edits.push(TextEdit::delete(start, end));
                }
            }
        }
    }

    if edits.is_empty() {
        info!(tag, "elements matched but nothing to rewrite, skipping");
        return Ok(Rewrite::Unchanged);
    }

    Ok(Rewrite::Changed(apply_edits(markup, &edits)?))
}

/// Span of the first matching attribute assignment within one open tag,
/// one preceding whitespace run included.
fn attribute_span(markup: &str, m: &TagMatch, name: &str) -> Option<(usize, usize)> {
    let (region_start, region_end) = m.attr_region();
    let bytes = markup.as_bytes();
    let mut i = region_start;

    while i < region_end {
        let ws_start = i;
        while i < region_end && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= region_end {
            break;
        }

        let tok_start = i;
        while i < region_end && bytes[i] != b'=' && !bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let name_end = i;

        if i < region_end && bytes[i] == b'=' {
            i += 1;
            while i < region_end && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i < region_end && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i];
                i += 1;
                while i < region_end && bytes[i] != quote {
                    i += 1;
                }
                if i < region_end {
                    i += 1;
                }
            } else {
                while i < region_end && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
            }
        }

        if strip_binding(&markup[tok_start..name_end]) == name {
            return Some((ws_start, i));
        }
    }

    None
}

/// `[name]`, `(name)` and `[(name)]` all bind the same attribute name.
fn strip_binding(token: &str) -> &str {
    let token = token
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .unwrap_or(token);
    token
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(token)
}

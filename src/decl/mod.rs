//! Structural declaration editors for TypeScript sources.
//!
//! Each operation parses the file, walks the tree for its target construct,
//! computes exact removal spans (including adjacent separators and
//! whitespace), and applies them through the span editor. An absent target
//! is an idempotent no-op; a matched target with a missing child construct
//! is a structural violation and fails the file.

pub mod errors;
pub mod implements;
pub mod imports;
pub mod methods;

pub use errors::DeclError;
pub use implements::remove_interface_from_implements;
pub use imports::remove_import_specifier;
pub use methods::remove_empty_method;

use tree_sitter::Node;

/// Removal span for one entry of a comma-separated list, following the
/// first/middle/last positional rule.
///
/// `children` is the container's full children list, separator tokens
/// included. Prefers consuming the comma after the entry (plus the blanks
/// that follow it); a last entry consumes the comma before it instead. The
/// caller handles the sole-entry case before calling this.
pub(crate) fn entry_removal_span(
    source: &str,
    children: &[Node<'_>],
    entry: Node<'_>,
    construct: &'static str,
) -> Result<(usize, usize), errors::DeclError> {
    let index = children
        .iter()
        .position(|n| n.id() == entry.id())
        .ok_or(errors::DeclError::MissingConstruct { construct })?;

    if let Some(comma) = children[index + 1..].iter().find(|n| n.kind() == ",") {
        let end = skip_blanks(source, comma.end_byte());
        return Ok((entry.start_byte(), end));
    }

    if let Some(comma) = children[..index].iter().rev().find(|n| n.kind() == ",") {
        return Ok((comma.start_byte(), entry.end_byte()));
    }

    Err(errors::DeclError::MissingConstruct { construct })
}

/// Advance past spaces and tabs (never line terminators).
pub(crate) fn skip_blanks(source: &str, mut at: usize) -> usize {
    let bytes = source.as_bytes();
    while at < bytes.len() && (bytes[at] == b' ' || bytes[at] == b'\t') {
        at += 1;
    }
    at
}

/// Extend `end` past trailing blanks and one line terminator.
pub(crate) fn consume_line_end(source: &str, end: usize) -> usize {
    let end = skip_blanks(source, end);
    let rest = &source[end..];
    if rest.starts_with("\r\n") {
        end + 2
    } else if rest.starts_with('\n') {
        end + 1
    } else {
        end
    }
}

/// Walk `start` back to the beginning of its line when everything before it
/// on that line is whitespace, so a removed construct takes its indentation
/// with it.
pub(crate) fn rewind_to_line_start(source: &str, start: usize) -> usize {
    let bytes = source.as_bytes();
    let line_start = source[..start]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    if bytes[line_start..start]
        .iter()
        .all(|b| *b == b' ' || *b == b'\t')
    {
        line_start
    } else {
        start
    }
}

/// The unquoted value of a string literal node (`'pkg'` -> `pkg`).
pub(crate) fn string_literal_value<'s>(source: &'s str, node: Node<'_>) -> &'s str {
    let text = &source[node.byte_range()];
    text.strip_prefix(['\'', '"', '`'])
        .and_then(|t| t.strip_suffix(['\'', '"', '`']))
        .unwrap_or(text)
}

//! Tag-pair location in component template markup.
//!
//! This is a deliberate simplification over a full markup parser: component
//! templates are well-formed, so candidate tags are found by scanning for
//! `<name` plus a boundary character, and the matching close tag is found
//! with explicit nesting-depth tracking. Quoted attribute values are honored
//! when looking for the end of an open tag, so a `>` inside a binding
//! expression does not terminate it.

use crate::markup::errors::MarkupError;

/// Byte span of the close tag `</name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseTag {
    pub start: usize,
    pub end: usize,
}

/// One located element occurrence: open tag, attribute region, and the
/// matching close tag unless self-closing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatch {
    /// Byte offset of the open tag's `<`
    pub open_start: usize,
    /// Byte offset just past `<name`
    pub name_end: usize,
    /// Byte offset just past the open tag's `>` (or `/>`)
    pub open_end: usize,
    pub self_closing: bool,
    pub close: Option<CloseTag>,
}

impl TagMatch {
    /// The attribute region: everything between the tag name and the
    /// closing `>` / `/>`.
    pub fn attr_region(&self) -> (usize, usize) {
        let end = if self.self_closing {
            self.open_end - 2
        } else {
            self.open_end - 1
        };
        (self.name_end, end)
    }

    /// End of the full element span, content and close tag included.
    pub fn full_end(&self) -> usize {
        self.close.map(|c| c.end).unwrap_or(self.open_end)
    }

    /// Whether this occurrence lies strictly inside `other`.
    pub fn is_inside(&self, other: &TagMatch) -> bool {
        self.open_start > other.open_start && self.full_end() <= other.full_end()
    }
}

/// Locate every occurrence of `tag` in `markup`, nested ones included.
///
/// A candidate is `<tag` followed by a boundary (whitespace, `>` or `/`),
/// which keeps `lux-side-nav` from matching inside `lux-side-nav-item`.
/// A non-self-closing occurrence with no matching close tag is a structural
/// violation.
pub fn find_tag_matches(markup: &str, tag: &str) -> Result<Vec<TagMatch>, MarkupError> {
    let mut matches = Vec::new();
    let mut pos = 0;

    while let Some(open_start) = next_open_candidate(markup, pos, tag) {
        let name_end = open_start + 1 + tag.len();
        let Some((open_end, self_closing)) = parse_open_tag(markup, name_end) else {
            return Err(MarkupError::UnclosedElement {
                tag: tag.to_string(),
                offset: open_start,
            });
        };

        let close = if self_closing {
            None
        } else {
            Some(matching_close(markup, open_end, tag).ok_or_else(|| {
                MarkupError::UnclosedElement {
                    tag: tag.to_string(),
                    offset: open_start,
                }
            })?)
        };

        matches.push(TagMatch {
            open_start,
            name_end,
            open_end,
            self_closing,
            close,
        });
        pos = open_end;
    }

    Ok(matches)
}

/// First `<tag` occurrence at or after `from` whose name ends at a boundary.
fn next_open_candidate(markup: &str, from: usize, tag: &str) -> Option<usize> {
    let mut search = from;
    while let Some(offset) = markup[search..].find('<') {
        let at = search + offset;
        let rest = &markup[at + 1..];
        if rest.starts_with(tag) {
            match rest[tag.len()..].chars().next() {
                Some(c) if c.is_whitespace() || c == '>' || c == '/' => return Some(at),
                _ => {}
            }
        }
        search = at + 1;
    }
    None
}

/// Scan the attribute region for the terminating `>`, honoring quotes.
///
/// Returns (offset past `>`, self-closing) or `None` when the tag never
/// terminates.
fn parse_open_tag(markup: &str, name_end: usize) -> Option<(usize, bool)> {
    let bytes = markup.as_bytes();
    let mut quote: Option<u8> = None;

    for (i, &b) in bytes.iter().enumerate().skip(name_end) {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => {
                    let self_closing = i > name_end && bytes[i - 1] == b'/';
                    return Some((i + 1, self_closing));
                }
                _ => {}
            },
        }
    }

    None
}

/// Find the true close tag for an open tag ending at `open_end`.
///
/// Inner same-named opens increment the depth (unless self-closing); a
/// close tag at depth zero is the match, otherwise it decrements.
fn matching_close(markup: &str, open_end: usize, tag: &str) -> Option<CloseTag> {
    let close_pat_len = tag.len() + 3;
    let mut pos = open_end;
    let mut depth = 0usize;

    loop {
        let next_close = find_close(markup, pos, tag);
        let next_open = next_open_candidate(markup, pos, tag);

        match (next_open, next_close) {
            (Some(open), Some(close)) if open < close => {
                let name_end = open + 1 + tag.len();
                let (inner_end, inner_self_closing) = parse_open_tag(markup, name_end)?;
                if !inner_self_closing {
                    depth += 1;
                }
                pos = inner_end;
            }
            (_, Some(close)) => {
                if depth == 0 {
                    return Some(CloseTag {
                        start: close,
                        end: close + close_pat_len,
                    });
                }
                depth -= 1;
                pos = close + close_pat_len;
            }
            (_, None) => return None,
        }
    }
}

fn find_close(markup: &str, from: usize, tag: &str) -> Option<usize> {
    let pat = format!("</{tag}>");
    markup[from..].find(&pat).map(|o| from + o)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_pair() {
        let markup = "<lux-card>hello</lux-card>";
        let matches = find_tag_matches(markup, "lux-card").unwrap();
        assert_eq!(matches.len(), 1);

        let m = &matches[0];
        assert_eq!(m.open_start, 0);
        assert_eq!(m.open_end, 10);
        assert!(!m.self_closing);
        assert_eq!(m.close, Some(CloseTag { start: 15, end: 26 }));
    }

    #[test]
    fn self_closing_has_no_close() {
        let matches = find_tag_matches("<lux-divider/>", "lux-divider").unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].self_closing);
        assert_eq!(matches[0].close, None);
    }

    #[test]
    fn name_boundary_rejects_longer_tags() {
        let markup = "<lux-side-nav-item>x</lux-side-nav-item>";
        let matches = find_tag_matches(markup, "lux-side-nav").unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn nested_same_named_elements_track_depth() {
        let markup = "<x><x></x></x>";
        let matches = find_tag_matches(markup, "x").unwrap();
        assert_eq!(matches.len(), 2);

        // outer closes at the second </x>
        assert_eq!(matches[0].open_start, 0);
        assert_eq!(matches[0].close, Some(CloseTag { start: 10, end: 14 }));
        // inner closes at the first
        assert_eq!(matches[1].open_start, 3);
        assert_eq!(matches[1].close, Some(CloseTag { start: 6, end: 10 }));
        assert!(matches[1].is_inside(&matches[0]));
    }

    #[test]
    fn self_closing_inner_does_not_consume_the_close() {
        let markup = "<x>a<x/>b</x>";
        let matches = find_tag_matches(markup, "x").unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].close, Some(CloseTag { start: 9, end: 13 }));
    }

    #[test]
    fn gt_inside_quoted_attribute_value() {
        let markup = r#"<lux-table [filter]="a > b">rows</lux-table>"#;
        let matches = find_tag_matches(markup, "lux-table").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].open_end, 28);
    }

    #[test]
    fn multi_line_open_tag() {
        let markup = "<lux-input\n  luxLabel=\"Name\"\n  required>\n</lux-input>";
        let matches = find_tag_matches(markup, "lux-input").unwrap();
        assert_eq!(matches.len(), 1);
        let (attr_start, attr_end) = matches[0].attr_region();
        assert!(markup[attr_start..attr_end].contains("luxLabel"));
    }

    #[test]
    fn unclosed_element_is_an_error() {
        let result = find_tag_matches("<x>never closed", "x");
        assert!(matches!(
            result,
            Err(MarkupError::UnclosedElement { offset: 0, .. })
        ));
    }

    #[test]
    fn unterminated_open_tag_is_an_error() {
        let result = find_tag_matches("<x attr=\"v\"", "x");
        assert!(matches!(result, Err(MarkupError::UnclosedElement { .. })));
    }
}

use crate::decl::errors::DeclError;
use crate::decl::entry_removal_span;
use crate::edit::{apply_edits, Rewrite, TextEdit};
use crate::pool::with_parser;
use crate::tree::{children_of, find_all_by_kind, flatten};
use tracing::{debug, info};
use tree_sitter::Node;

/// Remove `interface` from a class's implements clause.
///
/// A middle entry goes together with one adjacent comma (preferring the one
/// that follows); the sole entry takes the whole `implements X` clause with
/// it, leaving a bare class header or an `extends` clause intact.
pub fn remove_interface_from_implements(
    source: &str,
    interface: &str,
) -> Result<Rewrite, DeclError> {
    let parsed = with_parser(|p| p.parse_strict(source))??;
    let nodes = flatten(parsed.root_node());

    for clause in find_all_by_kind(&nodes, "implements_clause") {
        let children = children_of(clause);
        let entries: Vec<Node<'_>> = children.iter().filter(|c| c.is_named()).copied().collect();

        let Some(entry) = entries
            .iter()
            .copied()
            .find(|e| entry_names_interface(source, *e, interface))
        else {
            continue;
        };

        if entries.len() == 1 {
            let start = rewind_whitespace(source, clause.start_byte());
            let end = clause.end_byte();
            debug!(interface, start, end, "removing whole implements clause");
            return Ok(Rewrite::Changed(apply_edits(
                source,
                &[TextEdit::delete(start, end)],
            )?));
        }

        let (start, end) = entry_removal_span(
            source,
            &children,
            entry,
            "separator comma in implements clause",
        )?;
        debug!(interface, start, end, "removing implements entry");
        return Ok(Rewrite::Changed(apply_edits(
            source,
            &[TextEdit::delete(start, end)],
        )?));
    }

    info!(interface, "no implements entry found, skipping");
    Ok(Rewrite::Unchanged)
}

/// An entry names the interface either directly (`OnInit`) or as the base of
/// a generic instantiation (`LuxFilter<Item>`).
fn entry_names_interface(source: &str, entry: Node<'_>, interface: &str) -> bool {
    if &source[entry.byte_range()] == interface {
        return true;
    }
    entry
        .child_by_field_name("name")
        .is_some_and(|n| &source[n.byte_range()] == interface)
}

fn rewind_whitespace(source: &str, mut at: usize) -> usize {
    let bytes = source.as_bytes();
    while at > 0 && bytes[at - 1].is_ascii_whitespace() {
        at -= 1;
    }
    at
}

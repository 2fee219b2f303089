use crate::decl::errors::DeclError;
use crate::decl::{consume_line_end, entry_removal_span, string_literal_value};
use crate::edit::{apply_edits, Rewrite, TextEdit};
use crate::pool::with_parser;
use crate::tree::{children_of, find_all_by_kind, flatten};
use tracing::{debug, info};
use tree_sitter::Node;

/// Remove one named-import specifier (or a whole bare import) for `package`.
///
/// - Exactly one named specifier: the entire import statement is removed,
///   trailing line terminator included.
/// - Several specifiers: the matching entry is removed along with one
///   adjacent comma, preferring the comma that follows it.
/// - `specifier` of `None` removes a bare side-effecting `import 'pkg';`
///   statement and nothing else.
///
/// An import or specifier that is not present is a no-op.
pub fn remove_import_specifier(
    source: &str,
    package: &str,
    specifier: Option<&str>,
) -> Result<Rewrite, DeclError> {
    let parsed = with_parser(|p| p.parse_strict(source))??;
    let nodes = flatten(parsed.root_node());

    let import = find_all_by_kind(&nodes, "import_statement")
        .into_iter()
        .find(|n| {
            n.child_by_field_name("source")
                .is_some_and(|s| string_literal_value(source, s) == package)
        });

    let Some(import) = import else {
        info!(package, "no import declaration found, skipping");
        return Ok(Rewrite::Unchanged);
    };

    let clause = children_of(import)
        .into_iter()
        .find(|c| c.kind() == "import_clause");

    let Some(name) = specifier else {
        // Only the bare side-effecting form is removed without a specifier.
        if clause.is_none() {
            return remove_statement(source, import);
        }
        info!(package, "import has bindings, nothing to remove");
        return Ok(Rewrite::Unchanged);
    };

    let named_imports = clause
        .map(children_of)
        .unwrap_or_default()
        .into_iter()
        .find(|c| c.kind() == "named_imports");

    let Some(named_imports) = named_imports else {
        info!(package, name, "import has no named bindings, skipping");
        return Ok(Rewrite::Unchanged);
    };

    let children = children_of(named_imports);
    let entries: Vec<Node<'_>> = children
        .iter()
        .filter(|c| c.kind() == "import_specifier")
        .copied()
        .collect();

    let Some(entry) = entries.iter().copied().find(|e| {
        e.child_by_field_name("name")
            .is_some_and(|n| &source[n.byte_range()] == name)
    }) else {
        info!(package, name, "specifier not imported, skipping");
        return Ok(Rewrite::Unchanged);
    };

    if entries.len() == 1 {
        return remove_statement(source, import);
    }

    let (start, end) =
        entry_removal_span(source, &children, entry, "separator comma in named imports")?;
    debug!(package, name, start, end, "removing import specifier");
    Ok(Rewrite::Changed(apply_edits(
        source,
        &[TextEdit::delete(start, end)],
    )?))
}

fn remove_statement(source: &str, import: Node<'_>) -> Result<Rewrite, DeclError> {
    let start = import.start_byte();
    let end = consume_line_end(source, import.end_byte());
    debug!(start, end, "removing whole import statement");
    Ok(Rewrite::Changed(apply_edits(
        source,
        &[TextEdit::delete(start, end)],
    )?))
}

//! Read-only traversal helpers over a parsed syntax tree.
//!
//! The editors never mutate a tree; they flatten it, pick out the nodes they
//! need, and compute byte spans from those nodes. Everything here works
//! against the minimal node capabilities (kind, byte span, children, parent),
//! so nothing below depends on grammar specifics.

use std::collections::VecDeque;
use tree_sitter::Node;

/// Flatten a tree into a breadth-first list of all nodes, root included.
///
/// Anonymous token nodes (braces, commas, keywords) are kept: the span
/// computations in the declaration editors need to see separators, not just
/// named constructs.
pub fn flatten(root: Node<'_>) -> Vec<Node<'_>> {
    let mut nodes = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back(root);

    while let Some(node) = queue.pop_front() {
        nodes.push(node);
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            queue.push_back(child);
        }
    }

    nodes
}

/// Find the first node of `kind` whose source text satisfies `predicate`.
pub fn find_by_kind_and_text<'t, P>(
    nodes: &[Node<'t>],
    source: &str,
    kind: &str,
    predicate: P,
) -> Option<Node<'t>>
where
    P: Fn(&str) -> bool,
{
    nodes
        .iter()
        .find(|n| n.kind() == kind && predicate(&source[n.byte_range()]))
        .copied()
}

/// All nodes of a given kind, in flattened order.
pub fn find_all_by_kind<'t>(nodes: &[Node<'t>], kind: &str) -> Vec<Node<'t>> {
    nodes.iter().filter(|n| n.kind() == kind).copied().collect()
}

/// All children of `node`, anonymous tokens included.
pub fn children_of(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Siblings of `node`, re-derived from its parent's children list.
///
/// With a `kind_filter`, the list is narrowed to children of that kind (e.g.
/// only the `import_specifier` entries of a named-imports list, skipping the
/// comma tokens). Returns an empty list for the root.
pub fn siblings_of<'t>(node: Node<'t>, kind_filter: Option<&str>) -> Vec<Node<'t>> {
    let Some(parent) = node.parent() else {
        return Vec::new();
    };
    children_of(parent)
        .into_iter()
        .filter(|c| kind_filter.is_none_or(|k| c.kind() == k))
        .collect()
}

/// The sibling immediately before `node` in its parent's (optionally
/// kind-filtered) children list, or `None` at the front or for the root.
pub fn prev_sibling<'t>(node: Node<'t>, kind_filter: Option<&str>) -> Option<Node<'t>> {
    let siblings = siblings_of(node, kind_filter);
    let index = position_of(&siblings, node)?;
    index.checked_sub(1).map(|i| siblings[i])
}

/// The sibling immediately after `node`, under the same rules as
/// [`prev_sibling`].
pub fn next_sibling<'t>(node: Node<'t>, kind_filter: Option<&str>) -> Option<Node<'t>> {
    let siblings = siblings_of(node, kind_filter);
    let index = position_of(&siblings, node)?;
    siblings.get(index + 1).copied()
}

fn position_of(nodes: &[Node<'_>], node: Node<'_>) -> Option<usize> {
    nodes.iter().position(|n| n.id() == node.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parser::TsParser;

    const SOURCE: &str = "import { Component, OnInit } from '@angular/core';\n";

    #[test]
    fn flatten_starts_at_root_and_covers_the_tree() {
        let mut parser = TsParser::new().unwrap();
        let parsed = parser.parse_with_source(SOURCE).unwrap();
        let nodes = flatten(parsed.root_node());

        assert_eq!(nodes[0].kind(), "program");
        assert!(nodes.iter().any(|n| n.kind() == "import_statement"));
        assert!(nodes.iter().any(|n| n.kind() == "import_specifier"));
        // breadth-first: every node appears no earlier than its parent
        for (i, node) in nodes.iter().enumerate() {
            if let Some(parent) = node.parent() {
                let parent_pos = nodes.iter().position(|n| n.id() == parent.id()).unwrap();
                assert!(parent_pos < i);
            }
        }
    }

    #[test]
    fn find_specifier_by_text() {
        let mut parser = TsParser::new().unwrap();
        let parsed = parser.parse_with_source(SOURCE).unwrap();
        let nodes = flatten(parsed.root_node());

        let on_init =
            find_by_kind_and_text(&nodes, SOURCE, "import_specifier", |t| t == "OnInit");
        assert!(on_init.is_some());
        let absent =
            find_by_kind_and_text(&nodes, SOURCE, "import_specifier", |t| t == "DoCheck");
        assert!(absent.is_none());
    }

    #[test]
    fn siblings_with_kind_filter_skip_commas() {
        let mut parser = TsParser::new().unwrap();
        let parsed = parser.parse_with_source(SOURCE).unwrap();
        let nodes = flatten(parsed.root_node());

        let on_init =
            find_by_kind_and_text(&nodes, SOURCE, "import_specifier", |t| t == "OnInit").unwrap();

        let entries = siblings_of(on_init, Some("import_specifier"));
        assert_eq!(entries.len(), 2);

        let unfiltered = siblings_of(on_init, None);
        // braces, first specifier, comma, second specifier
        assert!(unfiltered.len() > entries.len());
    }

    #[test]
    fn prev_and_next_sibling_indexing() {
        let mut parser = TsParser::new().unwrap();
        let parsed = parser.parse_with_source(SOURCE).unwrap();
        let nodes = flatten(parsed.root_node());

        let component =
            find_by_kind_and_text(&nodes, SOURCE, "import_specifier", |t| t == "Component")
                .unwrap();
        let on_init =
            find_by_kind_and_text(&nodes, SOURCE, "import_specifier", |t| t == "OnInit").unwrap();

        let next = next_sibling(component, Some("import_specifier")).unwrap();
        assert_eq!(next.id(), on_init.id());
        assert!(prev_sibling(component, Some("import_specifier")).is_none());

        let prev = prev_sibling(on_init, Some("import_specifier")).unwrap();
        assert_eq!(prev.id(), component.id());
        assert!(next_sibling(on_init, Some("import_specifier")).is_none());
    }

    #[test]
    fn root_has_no_siblings() {
        let mut parser = TsParser::new().unwrap();
        let parsed = parser.parse_with_source(SOURCE).unwrap();
        let root = parsed.root_node();

        assert!(siblings_of(root, None).is_empty());
        assert!(prev_sibling(root, None).is_none());
        assert!(next_sibling(root, None).is_none());
    }
}

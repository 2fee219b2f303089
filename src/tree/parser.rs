use crate::tree::errors::ParseError;
use ast_grep_language::{LanguageExt, SupportLang};
use tree_sitter::{Parser, Tree};

/// Tree-sitter parser wrapper for TypeScript component sources.
pub struct TsParser {
    parser: Parser,
}

impl TsParser {
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        // Get the tree-sitter Language from ast-grep-language
        let ts_lang = SupportLang::TypeScript.get_ts_language();
        parser
            .set_language(&ts_lang)
            .map_err(|_| ParseError::LanguageSet)?;

        Ok(Self { parser })
    }

    /// Parse source code into a tree-sitter Tree.
    pub fn parse(&mut self, source: &str) -> Result<Tree, ParseError> {
        self.parser
            .parse(source, None)
            .ok_or(ParseError::ParseFailed)
    }

    /// Parse source code and return the tree along with the source.
    pub fn parse_with_source<'a>(
        &mut self,
        source: &'a str,
    ) -> Result<ParsedSource<'a>, ParseError> {
        let tree = self.parse(source)?;
        Ok(ParsedSource { source, tree })
    }

    /// Parse, rejecting sources whose tree contains ERROR or MISSING nodes.
    ///
    /// The structural editors work from exact byte spans; an ERROR node means
    /// the spans around it cannot be trusted, so malformed input is fatal
    /// rather than best-effort.
    pub fn parse_strict<'a>(&mut self, source: &'a str) -> Result<ParsedSource<'a>, ParseError> {
        let parsed = self.parse_with_source(source)?;
        let errors = parsed.error_nodes();
        if let Some(first) = errors.first() {
            return Err(ParseError::Malformed {
                count: errors.len(),
                first_start: first.byte_start,
                first_end: first.byte_end,
            });
        }
        Ok(parsed)
    }
}

impl Default for TsParser {
    fn default() -> Self {
        Self::new().expect("failed to create default TsParser")
    }
}

/// A parsed source file with its tree-sitter tree.
pub struct ParsedSource<'a> {
    pub source: &'a str,
    pub tree: Tree,
}

impl<'a> ParsedSource<'a> {
    /// Get the root node of the tree.
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Check if the tree contains any ERROR nodes.
    pub fn has_errors(&self) -> bool {
        has_error_nodes(self.tree.root_node())
    }

    /// Get all ERROR nodes in the tree.
    pub fn error_nodes(&self) -> Vec<ErrorNode> {
        let mut errors = Vec::new();
        collect_error_nodes(self.tree.root_node(), &mut errors);
        errors
    }

    /// Extract text for a node's byte range.
    pub fn node_text(&self, node: tree_sitter::Node<'_>) -> &'a str {
        &self.source[node.byte_range()]
    }
}

/// Information about an ERROR node in the parse tree.
#[derive(Debug, Clone)]
pub struct ErrorNode {
    pub byte_start: usize,
    pub byte_end: usize,
}

fn has_error_nodes(node: tree_sitter::Node<'_>) -> bool {
    if node.is_error() || node.is_missing() {
        return true;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if has_error_nodes(child) {
            return true;
        }
    }

    false
}

fn collect_error_nodes(node: tree_sitter::Node<'_>, errors: &mut Vec<ErrorNode>) {
    if node.is_error() || node.is_missing() {
        errors.push(ErrorNode {
            byte_start: node.start_byte(),
            byte_end: node.end_byte(),
        });
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_typescript() {
        let mut parser = TsParser::new().unwrap();
        let source = "export class AppComponent { title = 'app'; }";
        let parsed = parser.parse_with_source(source).unwrap();

        assert!(!parsed.has_errors());
        assert_eq!(parsed.root_node().kind(), "program");
    }

    #[test]
    fn parse_invalid_typescript() {
        let mut parser = TsParser::new().unwrap();
        let source = "class { {";
        let parsed = parser.parse_with_source(source).unwrap();

        assert!(parsed.has_errors());
        assert!(!parsed.error_nodes().is_empty());
    }

    #[test]
    fn strict_parse_rejects_malformed_source() {
        let mut parser = TsParser::new().unwrap();
        let result = parser.parse_strict("import { from ;;;");
        assert!(matches!(result, Err(ParseError::Malformed { .. })));
    }

    #[test]
    fn strict_parse_accepts_decorated_class() {
        let mut parser = TsParser::new().unwrap();
        let source = r#"
import { Component } from '@angular/core';

@Component({
  selector: 'app-root',
  templateUrl: './app.component.html',
})
export class AppComponent {}
"#;
        let parsed = parser.parse_strict(source).unwrap();
        assert_eq!(parsed.root_node().kind(), "program");
    }
}

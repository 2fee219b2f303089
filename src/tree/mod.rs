//! Tree-sitter integration for structural TypeScript queries.
//!
//! This module provides CST-based span location using tree-sitter, enabling
//! precise byte-span extraction for TypeScript constructs without losing
//! comments or formatting.

pub mod errors;
pub mod parser;
pub mod walker;

pub use errors::ParseError;
pub use parser::{ParsedSource, TsParser};
pub use walker::{
    children_of, find_all_by_kind, find_by_kind_and_text, flatten, next_sibling, prev_sibling,
    siblings_of,
};

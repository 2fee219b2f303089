//! Uplift: automated migration engine for UI component library consumers
//!
//! A migration system built on byte-span replacement primitives, with
//! tree-sitter for structural TypeScript edits and a depth-tracking scanner
//! for template markup.
//!
//! # Architecture
//!
//! All edit operations compile down to a single primitive: [`TextEdit`],
//! a byte-span replacement against an immutable source buffer. Intelligence
//! lives in span acquisition (via the tree walker, the markup scanner, the
//! manifest reader), not in the application logic.
//!
//! Migrations run against a [`stage::StagedTree`]: every rewrite is staged
//! in memory, later reads see earlier staged edits, and nothing reaches
//! disk until the tree is committed with atomic writes.
//!
//! # Example
//!
//! ```no_run
//! use uplift::decl::remove_import_specifier;
//!
//! let source = "import { Component, OnInit } from '@angular/core';\n";
//! let rewrite = remove_import_specifier(source, "@angular/core", Some("OnInit"))?;
//! assert_eq!(
//!     rewrite.into_source(source),
//!     "import { Component } from '@angular/core';\n"
//! );
//! # Ok::<(), uplift::decl::DeclError>(())
//! ```

pub mod decl;
pub mod edit;
pub mod manifest;
pub mod markup;
pub mod pool;
pub mod recipe;
pub mod safety;
pub mod stage;
pub mod tree;

// Re-exports
pub use decl::{
    remove_empty_method, remove_import_specifier, remove_interface_from_implements, DeclError,
};
pub use edit::{apply_edits, EditError, Rewrite, TextEdit};
pub use manifest::{bump_dependency, dependency_version, ManifestError};
pub use markup::{transform_markup, MarkupError, TagOperation};
pub use recipe::{
    apply_migration, load_from_path, load_from_str, ApplicationError, ConfigError, MigrationConfig,
    StepResult,
};
pub use safety::{ProjectGuard, SafetyError};
pub use stage::{for_each_matching_file, StageError, StagedTree};
pub use tree::{ParseError, TsParser};

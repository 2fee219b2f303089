//! Declarative migration recipes.
//!
//! A migration is a TOML file: metadata naming the library whose installed
//! version gates it, plus an ordered list of steps that compile down to the
//! core transformers. The applicator runs the steps over a staged tree.

pub mod applicator;
pub mod loader;
pub mod schema;
pub mod version;

pub use applicator::{apply_migration, ApplicationError, StepResult};
pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{Metadata, MigrationConfig, StepAction, StepDefinition, ValidationError};
pub use version::{declared_to_version, matches_requirement, VersionError};

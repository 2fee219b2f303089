//! Template markup transformations for theme migrations.
//!
//! Elements are located by scanning, not by a full markup parse: component
//! templates are well-formed, and explicit nesting-depth tracking is what
//! keeps same-named nested elements (common after nav-menu renames) from
//! being corrupted.

pub mod errors;
pub mod scanner;
pub mod transform;

pub use errors::MarkupError;
pub use scanner::{find_tag_matches, CloseTag, TagMatch};
pub use transform::{transform_markup, TagOperation};

//! `package.json` dependency lookup and version bumps.
//!
//! Manifests are parsed as JSON values with key order preserved, mutated,
//! and re-serialized with the standard two-space npm style. Dependency
//! bumps only touch packages that are already declared; a missing package
//! is a logged no-op, like every other absent target.

use crate::edit::Rewrite;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

const DEPENDENCY_SECTIONS: &[&str] = &["dependencies", "devDependencies"];

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("invalid manifest JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("manifest root is not an object")]
    NotAnObject,
}

/// The declared version range of `package`, searching `dependencies` then
/// `devDependencies`.
pub fn dependency_version(manifest: &str, package: &str) -> Result<Option<String>, ManifestError> {
    let root: Value = serde_json::from_str(manifest)?;
    let object = root.as_object().ok_or(ManifestError::NotAnObject)?;

    for section in DEPENDENCY_SECTIONS {
        if let Some(version) = object
            .get(*section)
            .and_then(|s| s.as_object())
            .and_then(|s| s.get(package))
            .and_then(|v| v.as_str())
        {
            return Ok(Some(version.to_string()));
        }
    }

    Ok(None)
}

/// Set the declared version of `package` to `version` in whichever
/// dependency section declares it.
pub fn bump_dependency(
    manifest: &str,
    package: &str,
    version: &str,
) -> Result<Rewrite, ManifestError> {
    let mut root: Value = serde_json::from_str(manifest)?;
    if !root.is_object() {
        return Err(ManifestError::NotAnObject);
    }

    let mut changed = false;
    for section in DEPENDENCY_SECTIONS {
        let Some(deps) = root.get_mut(*section).and_then(|s| s.as_object_mut()) else {
            continue;
        };
        if let Some(entry) = deps.get_mut(package) {
            if entry.as_str() == Some(version) {
                info!(package, version, "dependency already at target version");
                return Ok(Rewrite::Unchanged);
            }
            *entry = Value::String(version.to_string());
            changed = true;
            break;
        }
    }

    if !changed {
        info!(package, "dependency not declared, skipping bump");
        return Ok(Rewrite::Unchanged);
    }

    let mut out = serde_json::to_string_pretty(&root)?;
    out.push('\n');
    Ok(Rewrite::Changed(out))
}

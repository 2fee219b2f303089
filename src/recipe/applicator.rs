//! Migration applicator: runs a migration's steps over a staged tree.
//!
//! The gate reads the installed library version from `package.json` and
//! skips the whole migration when it falls outside the declared range. Steps
//! then run in order; a transform failure on one file is logged and the
//! remaining files of that step still run, but the failed step aborts the
//! steps after it.

use crate::decl::{
    remove_empty_method, remove_import_specifier, remove_interface_from_implements, DeclError,
};
use crate::edit::Rewrite;
use crate::manifest::{bump_dependency, dependency_version, ManifestError};
use crate::markup::{transform_markup, MarkupError, TagOperation};
use crate::recipe::schema::{MigrationConfig, StepAction};
use crate::recipe::version::{declared_to_version, matches_requirement, VersionError};
use crate::stage::{for_each_matching_file, StageError, StagedTree};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

const MANIFEST_FILE: &str = "package.json";

/// Result of applying a single migration step.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "StepResult should be checked for applied/skipped"]
pub enum StepResult {
    /// The step rewrote `files` files (or staged one file operation).
    Applied { files: usize },
    /// Every target was already absent; nothing changed.
    Unchanged,
    /// The migration's version gate did not match.
    SkippedVersion { reason: String },
    /// An earlier step failed, so this one never ran.
    NotRun,
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepResult::Applied { files } => write!(f, "applied ({files} file(s))"),
            StepResult::Unchanged => write!(f, "nothing to do"),
            StepResult::SkippedVersion { reason } => write!(f, "skipped (version): {reason}"),
            StepResult::NotRun => write!(f, "not run (earlier step failed)"),
        }
    }
}

/// Errors during migration application.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("version error: {0}")]
    Version(#[from] VersionError),

    #[error("project has no {MANIFEST_FILE}")]
    MissingManifest,

    #[error("{file}: {source}")]
    Manifest {
        file: PathBuf,
        #[source]
        source: ManifestError,
    },

    #[error("{file}: {source}")]
    Source {
        file: PathBuf,
        #[source]
        source: DeclError,
    },

    #[error("{file}: {source}")]
    Markup {
        file: PathBuf,
        #[source]
        source: MarkupError,
    },

    #[error(transparent)]
    Stage(#[from] StageError),
}

/// Apply a migration to a staged project tree.
///
/// Returns one `(step id, result)` entry per step. Setup failures (no
/// manifest, unparseable versions) fail the whole call instead, since no
/// step can meaningfully run without the gate.
pub fn apply_migration(
    config: &MigrationConfig,
    tree: &mut StagedTree,
) -> Result<Vec<(String, Result<StepResult, ApplicationError>)>, ApplicationError> {
    let manifest = tree
        .read(MANIFEST_FILE)?
        .ok_or(ApplicationError::MissingManifest)?;

    let declared = dependency_version(&manifest, &config.meta.package).map_err(|source| {
        ApplicationError::Manifest {
            file: PathBuf::from(MANIFEST_FILE),
            source,
        }
    })?;

    let Some(declared) = declared else {
        let reason = format!("{} is not installed", config.meta.package);
        info!(migration = %config.meta.name, %reason, "skipping migration");
        return Ok(skip_all(config, reason));
    };

    let installed = declared_to_version(&declared);
    if !matches_requirement(installed, config.meta.version_range.as_deref())? {
        let range = config.meta.version_range.as_deref().unwrap_or("").trim();
        let reason = format!(
            "installed {} {installed} does not satisfy version_range {range}",
            config.meta.package
        );
        info!(migration = %config.meta.name, %reason, "skipping migration");
        return Ok(skip_all(config, reason));
    }

    info!(
        migration = %config.meta.name,
        package = %config.meta.package,
        installed,
        "applying migration"
    );

    let mut results = Vec::with_capacity(config.steps.len());
    let mut aborted = false;

    for step in &config.steps {
        if aborted {
            results.push((step.id.clone(), Ok(StepResult::NotRun)));
            continue;
        }

        let result = apply_step(&step.action, &config.meta.source_root, tree);
        match &result {
            Ok(outcome) => info!(step = %step.id, %outcome, "step finished"),
            Err(e) => {
                error!(step = %step.id, error = %e, "step failed, aborting remaining steps");
                aborted = true;
            }
        }
        results.push((step.id.clone(), result));
    }

    Ok(results)
}

fn skip_all(
    config: &MigrationConfig,
    reason: String,
) -> Vec<(String, Result<StepResult, ApplicationError>)> {
    config
        .steps
        .iter()
        .map(|step| {
            (
                step.id.clone(),
                Ok(StepResult::SkippedVersion {
                    reason: reason.clone(),
                }),
            )
        })
        .collect()
}

fn apply_step(
    action: &StepAction,
    source_root: &str,
    tree: &mut StagedTree,
) -> Result<StepResult, ApplicationError> {
    match action {
        StepAction::BumpDependency { package, version } => {
            let manifest = tree
                .read(MANIFEST_FILE)?
                .ok_or(ApplicationError::MissingManifest)?;
            match bump_dependency(&manifest, package, version).map_err(|source| {
                ApplicationError::Manifest {
                    file: PathBuf::from(MANIFEST_FILE),
                    source,
                }
            })? {
                Rewrite::Changed(new_manifest) => {
                    tree.overwrite(MANIFEST_FILE, new_manifest)?;
                    Ok(StepResult::Applied { files: 1 })
                }
                Rewrite::Unchanged => Ok(StepResult::Unchanged),
            }
        }

        StepAction::RemoveImport {
            suffix,
            package,
            specifier,
        } => rewrite_files(tree, source_root, suffix, |path, content| {
            remove_import_specifier(content, package, specifier.as_deref()).map_err(|source| {
                ApplicationError::Source {
                    file: path.to_path_buf(),
                    source,
                }
            })
        }),

        StepAction::RemoveImplements { suffix, interface } => {
            rewrite_files(tree, source_root, suffix, |path, content| {
                remove_interface_from_implements(content, interface).map_err(|source| {
                    ApplicationError::Source {
                        file: path.to_path_buf(),
                        source,
                    }
                })
            })
        }

        StepAction::RemoveEmptyMethod {
            suffix,
            method,
            lifecycle_package,
        } => rewrite_files(tree, source_root, suffix, |path, content| {
            remove_empty_method(content, method, lifecycle_package).map_err(|source| {
                ApplicationError::Source {
                    file: path.to_path_buf(),
                    source,
                }
            })
        }),

        StepAction::RenameElement { suffix, from, to } => {
            let op = TagOperation::Rename { to: to.clone() };
            markup_step(tree, source_root, suffix, from, &op)
        }

        StepAction::RemoveElement { suffix, tag } => {
            markup_step(tree, source_root, suffix, tag, &TagOperation::RemoveElement)
        }

        StepAction::RemoveAttribute {
            suffix,
            tag,
            attribute,
        } => {
            let op = TagOperation::RemoveAttribute {
                name: attribute.clone(),
            };
            markup_step(tree, source_root, suffix, tag, &op)
        }

        StepAction::DeleteFile { path } => {
            if tree.delete(path)? {
                Ok(StepResult::Applied { files: 1 })
            } else {
                info!(path = %path, "file already absent, skipping delete");
                Ok(StepResult::Unchanged)
            }
        }

        StepAction::MoveFile { from, to } => {
            if tree.rename(from, to)? {
                Ok(StepResult::Applied { files: 1 })
            } else {
                info!(from = %from, "file already absent, skipping move");
                Ok(StepResult::Unchanged)
            }
        }
    }
}

fn markup_step(
    tree: &mut StagedTree,
    source_root: &str,
    suffix: &str,
    tag: &str,
    op: &TagOperation,
) -> Result<StepResult, ApplicationError> {
    rewrite_files(tree, source_root, suffix, |path, content| {
        transform_markup(content, tag, op).map_err(|source| ApplicationError::Markup {
            file: path.to_path_buf(),
            source,
        })
    })
}

/// Drive a rewrite over every suffix-matched file under `source_root`.
///
/// A failed file is logged and skipped so the remaining files still get
/// their rewrite; the first failure is then surfaced as the step's error.
fn rewrite_files<F>(
    tree: &mut StagedTree,
    source_root: &str,
    suffix: &str,
    mut transform: F,
) -> Result<StepResult, ApplicationError>
where
    F: FnMut(&Path, &str) -> Result<Rewrite, ApplicationError>,
{
    let mut failures = Vec::new();

    let rewritten = for_each_matching_file::<ApplicationError, _>(
        tree,
        source_root,
        suffix,
        |path, content| match transform(path, content) {
            Ok(rewrite) => Ok(rewrite.into_changed()),
            Err(e) => {
                error!(file = %path.display(), error = %e, "transform failed, continuing with remaining files");
                failures.push(e);
                Ok(None)
            }
        },
    )?;

    if let Some(first) = failures.into_iter().next() {
        return Err(first);
    }

    if rewritten > 0 {
        Ok(StepResult::Applied { files: rewritten })
    } else {
        Ok(StepResult::Unchanged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::loader::load_from_str;
    use std::fs;

    const MANIFEST: &str = r#"{
  "name": "demo-app",
  "dependencies": {
    "@angular/core": "^14.2.0",
    "@lux/components": "^10.8.0"
  }
}
"#;

    const COMPONENT_TS: &str = r#"import { Component, OnInit } from '@angular/core';

@Component({
  selector: 'app-shell',
  templateUrl: './shell.component.html',
})
export class ShellComponent implements OnInit {
  ngOnInit() { }
}
"#;

    const COMPONENT_HTML: &str = r#"<lux-side-nav>
  <lux-side-nav-item luxLabel="Home"></lux-side-nav-item>
</lux-side-nav>
"#;

    const MIGRATION: &str = r#"
[meta]
name = "v11-upgrade"
package = "@lux/components"
version_range = ">=10.0.0, <11.0.0"

[[steps]]
id = "bump-components"
type = "bump-dependency"
package = "@lux/components"
version = "11.0.0"

[[steps]]
id = "drop-empty-oninit"
type = "remove-empty-method"
suffix = ".component.ts"
method = "ngOnInit"

[[steps]]
id = "rename-side-nav"
type = "rename-element"
suffix = ".component.html"
from = "lux-side-nav"
to = "lux-app-header-ac-nav-menu"

[[steps]]
id = "rename-side-nav-item"
type = "rename-element"
suffix = ".component.html"
from = "lux-side-nav-item"
to = "lux-app-header-ac-nav-menu-item"

[[steps]]
id = "retire-legacy-theme"
type = "delete-file"
path = "src/theming/legacy.scss"
"#;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/app")).unwrap();
        fs::create_dir_all(dir.path().join("src/theming")).unwrap();
        fs::write(dir.path().join("package.json"), MANIFEST).unwrap();
        fs::write(
            dir.path().join("src/app/shell.component.ts"),
            COMPONENT_TS,
        )
        .unwrap();
        fs::write(
            dir.path().join("src/app/shell.component.html"),
            COMPONENT_HTML,
        )
        .unwrap();
        fs::write(dir.path().join("src/theming/legacy.scss"), "body {}\n").unwrap();
        dir
    }

    #[test]
    fn full_migration_applies_in_order() {
        let dir = project();
        let mut tree = StagedTree::new(dir.path()).unwrap();
        let config = load_from_str(MIGRATION).unwrap();

        let results = apply_migration(&config, &mut tree).unwrap();
        assert_eq!(results.len(), 5);
        for (id, result) in &results {
            assert!(
                matches!(result, Ok(StepResult::Applied { .. })),
                "step {id} was not applied: {result:?}"
            );
        }

        let manifest = tree.read("package.json").unwrap().unwrap();
        assert!(manifest.contains("\"@lux/components\": \"11.0.0\""));

        let ts = tree.read("src/app/shell.component.ts").unwrap().unwrap();
        assert!(!ts.contains("OnInit"));
        assert!(ts.contains("import { Component } from '@angular/core';"));

        let html = tree.read("src/app/shell.component.html").unwrap().unwrap();
        assert!(html.contains("<lux-app-header-ac-nav-menu>"));
        assert!(html.contains("<lux-app-header-ac-nav-menu-item luxLabel=\"Home\">"));
        assert!(!html.contains("lux-side-nav"));

        assert!(!tree.exists("src/theming/legacy.scss"));
    }

    #[test]
    fn version_gate_skips_everything() {
        let dir = project();
        let mut tree = StagedTree::new(dir.path()).unwrap();
        let mut config = load_from_str(MIGRATION).unwrap();
        config.meta.version_range = Some(">=11.0.0, <12.0.0".to_string());

        let results = apply_migration(&config, &mut tree).unwrap();
        for (_, result) in &results {
            assert!(matches!(result, Ok(StepResult::SkippedVersion { .. })));
        }
        assert!(!tree.is_dirty());
    }

    #[test]
    fn uninstalled_package_skips_everything() {
        let dir = project();
        let mut tree = StagedTree::new(dir.path()).unwrap();
        let mut config = load_from_str(MIGRATION).unwrap();
        config.meta.package = "@lux/theming".to_string();

        let results = apply_migration(&config, &mut tree).unwrap();
        assert!(results.iter().all(|(_, r)| matches!(
            r,
            Ok(StepResult::SkippedVersion { reason }) if reason.contains("not installed")
        )));
    }

    #[test]
    fn missing_manifest_fails_the_migration() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        let mut tree = StagedTree::new(dir.path()).unwrap();
        let config = load_from_str(MIGRATION).unwrap();

        let result = apply_migration(&config, &mut tree);
        assert!(matches!(result, Err(ApplicationError::MissingManifest)));
    }

    #[test]
    fn failed_step_aborts_the_chain() {
        let dir = project();
        // malformed component: the remove-empty-method step will fail
        fs::write(
            dir.path().join("src/app/shell.component.ts"),
            "export class {{{",
        )
        .unwrap();
        let mut tree = StagedTree::new(dir.path()).unwrap();
        let config = load_from_str(MIGRATION).unwrap();

        let results = apply_migration(&config, &mut tree).unwrap();
        assert!(matches!(results[0].1, Ok(StepResult::Applied { .. })));
        assert!(matches!(
            results[1].1,
            Err(ApplicationError::Source { .. })
        ));
        // later steps are skipped, not run
        assert!(matches!(results[2].1, Ok(StepResult::NotRun)));
    }

    #[test]
    fn rerun_is_idempotent() {
        let dir = project();
        let config = load_from_str(MIGRATION).unwrap();

        let mut tree = StagedTree::new(dir.path()).unwrap();
        let _ = apply_migration(&config, &mut tree).unwrap();
        let guard = crate::safety::ProjectGuard::new(dir.path()).unwrap();
        tree.commit(&guard).unwrap();

        // the version gate now rejects the bumped manifest
        let mut second = StagedTree::new(dir.path()).unwrap();
        let results = apply_migration(&config, &mut second).unwrap();
        assert!(results
            .iter()
            .all(|(_, r)| matches!(r, Ok(StepResult::SkippedVersion { .. }))));
        assert!(!second.is_dirty());
    }
}

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Directories a migration must never write into.
const FORBIDDEN_DIRS: &[&str] = &["node_modules", ".git", "dist", ".angular"];

/// Project safety checks to prevent a migration from editing files outside
/// the consumer project being upgraded.
#[derive(Debug, Clone)]
pub struct ProjectGuard {
    /// Absolute path to the project root
    project_root: PathBuf,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("path is outside project: {path} (project: {project})")]
    OutsideProject { path: PathBuf, project: PathBuf },

    #[error("path is in a vendored or generated directory: {path} ({dir}/)")]
    ForbiddenDir { path: PathBuf, dir: String },

    #[error("failed to canonicalize project root: {0}")]
    Canonicalize(#[from] std::io::Error),
}

impl ProjectGuard {
    /// Create a new guard for the given project root.
    ///
    /// The root is canonicalized so symlinked checkouts are handled
    /// correctly. Individual target paths are validated lexically, because
    /// staged files may not exist on disk yet.
    pub fn new(project_root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        let project_root = project_root.as_ref().canonicalize()?;
        Ok(Self { project_root })
    }

    /// Check that a path is safe to write.
    ///
    /// Returns the absolute path within the project if safe. Relative paths
    /// are resolved against the project root; `..` components and absolute
    /// paths pointing elsewhere are rejected, as is anything under a
    /// vendored or generated directory.
    pub fn validate_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        };

        let mut normalized = PathBuf::new();
        for component in absolute.components() {
            match component {
                Component::ParentDir => {
                    if !normalized.pop() {
                        return Err(SafetyError::OutsideProject {
                            path: absolute.clone(),
                            project: self.project_root.clone(),
                        });
                    }
                }
                Component::CurDir => {}
                other => normalized.push(other),
            }
        }

        if !normalized.starts_with(&self.project_root) {
            return Err(SafetyError::OutsideProject {
                path: normalized,
                project: self.project_root.clone(),
            });
        }

        let inside = normalized
            .strip_prefix(&self.project_root)
            .expect("starts_with checked above");
        for component in inside.components() {
            if let Component::Normal(name) = component {
                if let Some(dir) = FORBIDDEN_DIRS.iter().find(|d| name == **d) {
                    return Err(SafetyError::ForbiddenDir {
                        path: normalized.clone(),
                        dir: (*dir).to_string(),
                    });
                }
            }
        }

        Ok(normalized)
    }

    /// Get the project root.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn path_inside_project_is_accepted() {
        let temp_dir = tempfile::tempdir().unwrap();
        let guard = ProjectGuard::new(temp_dir.path()).unwrap();

        let result = guard.validate_path("src/app/app.component.ts");
        assert!(result.is_ok());
    }

    #[test]
    fn new_file_without_disk_presence_is_accepted() {
        let temp_dir = tempfile::tempdir().unwrap();
        let guard = ProjectGuard::new(temp_dir.path()).unwrap();

        let result = guard.validate_path("src/theming/new-theme.scss");
        assert!(result.is_ok());
    }

    #[test]
    fn absolute_path_outside_project_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let guard = ProjectGuard::new(temp_dir.path()).unwrap();

        let result = guard.validate_path(other.path().join("file.ts"));
        assert!(matches!(result, Err(SafetyError::OutsideProject { .. })));
    }

    #[test]
    fn parent_traversal_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let project = temp_dir.path().join("project");
        fs::create_dir_all(&project).unwrap();
        let guard = ProjectGuard::new(&project).unwrap();

        let result = guard.validate_path("../outside.ts");
        assert!(matches!(result, Err(SafetyError::OutsideProject { .. })));
    }

    #[test]
    fn vendored_directories_are_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let guard = ProjectGuard::new(temp_dir.path()).unwrap();

        for dir in ["node_modules/lib/index.js", ".git/config", "dist/main.js"] {
            let result = guard.validate_path(dir);
            assert!(matches!(result, Err(SafetyError::ForbiddenDir { .. })));
        }
    }
}

//! The staged file tree: an in-memory overlay over a consumer project.
//!
//! Every mutation a migration performs is staged here first; reads see the
//! cumulative effect of all earlier staged edits in the run, and nothing
//! touches disk until [`StagedTree::commit`]. One logical writer (the
//! active migration chain) exists at a time, so there is no locking.

pub mod driver;

pub use driver::for_each_matching_file;

use crate::safety::{ProjectGuard, SafetyError};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Directory names never visited when scanning a project.
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git", "dist", ".angular"];

#[derive(Error, Debug)]
pub enum StageError {
    #[error("project root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("path escapes the project root: {0}")]
    OutsideRoot(PathBuf),

    #[error("file is not valid UTF-8: {0}")]
    NonUtf8(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Safety(#[from] SafetyError),

    #[error("failed to walk project tree: {0}")]
    Walk(#[from] walkdir::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Staged {
    Written(String),
    Deleted,
}

/// Counts reported by [`StagedTree::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitStats {
    pub written: usize,
    pub deleted: usize,
}

/// An in-memory, commit-before-write view of a project's files.
#[derive(Debug)]
pub struct StagedTree {
    root: PathBuf,
    overlay: BTreeMap<PathBuf, Staged>,
}

impl StagedTree {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StageError> {
        let root = root.as_ref();
        let root = root.canonicalize().map_err(|source| StageError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        if !root.is_dir() {
            return Err(StageError::NotADirectory(root));
        }
        Ok(Self {
            root,
            overlay: BTreeMap::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current content of a file, staged edits included. `None` when the
    /// file does not exist (or has been staged for deletion).
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Option<String>, StageError> {
        let rel = self.relative(path.as_ref())?;
        match self.overlay.get(&rel) {
            Some(Staged::Written(content)) => Ok(Some(content.clone())),
            Some(Staged::Deleted) => Ok(None),
            None => self.read_disk(&rel),
        }
    }

    /// The on-disk content, ignoring staged edits. Used for diffing staged
    /// changes against the committed state.
    pub fn original(&self, path: impl AsRef<Path>) -> Result<Option<String>, StageError> {
        let rel = self.relative(path.as_ref())?;
        self.read_disk(&rel)
    }

    /// Stage new content for a file, creating it if necessary.
    pub fn overwrite(
        &mut self,
        path: impl AsRef<Path>,
        content: impl Into<String>,
    ) -> Result<(), StageError> {
        let rel = self.relative(path.as_ref())?;
        debug!(path = %rel.display(), "staging write");
        self.overlay.insert(rel, Staged::Written(content.into()));
        Ok(())
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        let Ok(rel) = self.relative(path.as_ref()) else {
            return false;
        };
        match self.overlay.get(&rel) {
            Some(Staged::Written(_)) => true,
            Some(Staged::Deleted) => false,
            None => self.root.join(&rel).is_file(),
        }
    }

    /// Stage a deletion. Deleting a file that does not exist is a no-op;
    /// returns whether the file was present.
    pub fn delete(&mut self, path: impl AsRef<Path>) -> Result<bool, StageError> {
        let rel = self.relative(path.as_ref())?;
        let existed = self.exists(&rel);
        if existed {
            debug!(path = %rel.display(), "staging delete");
            self.overlay.insert(rel, Staged::Deleted);
        }
        Ok(existed)
    }

    /// Stage a move. A missing source is a no-op; returns whether the move
    /// was staged.
    pub fn rename(
        &mut self,
        from: impl AsRef<Path>,
        to: impl AsRef<Path>,
    ) -> Result<bool, StageError> {
        let Some(content) = self.read(from.as_ref())? else {
            return Ok(false);
        };
        self.overwrite(to, content)?;
        self.delete(from)?;
        Ok(true)
    }

    /// Every file under `prefix`, staged creations included and staged
    /// deletions excluded. Paths are project-relative and sorted, so the
    /// traversal order is stable across repeated runs against the same
    /// tree state.
    pub fn list(&self, prefix: impl AsRef<Path>) -> Result<Vec<PathBuf>, StageError> {
        let prefix = prefix.as_ref();
        let mut files = Vec::new();

        let walk_root = self.root.join(prefix);
        if walk_root.is_dir() {
            let walker = WalkDir::new(&walk_root).into_iter().filter_entry(|e| {
                e.file_name()
                    .to_str()
                    .map(|n| !SKIPPED_DIRS.contains(&n))
                    .unwrap_or(true)
            });
            for entry in walker {
                let entry = entry?;
                if entry.file_type().is_file() {
                    let rel = entry
                        .path()
                        .strip_prefix(&self.root)
                        .expect("walk stays under root")
                        .to_path_buf();
                    files.push(rel);
                }
            }
        }

        for (path, staged) in &self.overlay {
            match staged {
                Staged::Written(_) if path.starts_with(prefix) => files.push(path.clone()),
                _ => {}
            }
        }

        files.sort();
        files.dedup();
        files.retain(|p| !matches!(self.overlay.get(p), Some(Staged::Deleted)));
        Ok(files)
    }

    /// Staged changes, for status/diff reporting. `None` content marks a
    /// deletion.
    pub fn changes(&self) -> impl Iterator<Item = (&Path, Option<&str>)> {
        self.overlay.iter().map(|(path, staged)| {
            let content = match staged {
                Staged::Written(c) => Some(c.as_str()),
                Staged::Deleted => None,
            };
            (path.as_path(), content)
        })
    }

    pub fn is_dirty(&self) -> bool {
        !self.overlay.is_empty()
    }

    /// Flush all staged changes to disk and clear the overlay.
    ///
    /// Every target path is validated against the guard first; writes use
    /// tempfile + fsync + rename so a crash never leaves a torn file.
    pub fn commit(&mut self, guard: &ProjectGuard) -> Result<CommitStats, StageError> {
        let mut stats = CommitStats::default();

        for (rel, staged) in &self.overlay {
            let absolute = guard.validate_path(self.root.join(rel))?;
            match staged {
                Staged::Written(content) => {
                    if let Some(parent) = absolute.parent() {
                        fs::create_dir_all(parent).map_err(|source| StageError::Io {
                            path: parent.to_path_buf(),
                            source,
                        })?;
                    }
                    atomic_write(&absolute, content.as_bytes())?;
                    stats.written += 1;
                }
                Staged::Deleted => {
                    match fs::remove_file(&absolute) {
                        Ok(()) => stats.deleted += 1,
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                        Err(source) => {
                            return Err(StageError::Io {
                                path: absolute,
                                source,
                            })
                        }
                    }
                }
            }
        }

        self.overlay.clear();
        Ok(stats)
    }

    fn read_disk(&self, rel: &Path) -> Result<Option<String>, StageError> {
        let absolute = self.root.join(rel);
        match fs::read(&absolute) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StageError::NonUtf8(rel.to_path_buf())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StageError::Io {
                path: absolute,
                source,
            }),
        }
    }

    /// Normalize to a project-relative path, rejecting traversal out of the
    /// root.
    fn relative(&self, path: &Path) -> Result<PathBuf, StageError> {
        let path = match path.strip_prefix(&self.root) {
            Ok(stripped) => stripped,
            Err(_) if path.is_absolute() => {
                return Err(StageError::OutsideRoot(path.to_path_buf()))
            }
            Err(_) => path,
        };

        let mut normalized = PathBuf::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                _ => return Err(StageError::OutsideRoot(path.to_path_buf())),
            }
        }
        Ok(normalized)
    }
}

/// Atomic file write: tempfile + fsync + rename.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), StageError> {
    let parent = path.parent().ok_or_else(|| StageError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no parent"),
    })?;

    let io_err = |source| StageError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
    temp.write_all(content).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|e| io_err(e.error))?;

    Ok(())
}

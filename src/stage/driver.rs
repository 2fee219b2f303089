//! File iteration driver: suffix-matched traversal with a rewrite callback.

use crate::stage::{StageError, StagedTree};
use std::path::Path;
use tracing::debug;

/// Visit every file under `prefix` whose name ends with `suffix`, invoking
/// `callback` with the staged content.
///
/// The suffix is a plain name-suffix match, not a glob, so both a specific
/// file name (`polyfills.ts`) and a generic extension (`.component.html`)
/// work. The callback alone decides whether content is written back: when it
/// returns `Some`, the driver stages the new content verbatim, with no
/// diffing at this layer. Returns the number of files rewritten.
pub fn for_each_matching_file<E, F>(
    tree: &mut StagedTree,
    prefix: impl AsRef<Path>,
    suffix: &str,
    mut callback: F,
) -> Result<usize, E>
where
    E: From<StageError>,
    F: FnMut(&Path, &str) -> Result<Option<String>, E>,
{
    let files = tree.list(prefix.as_ref()).map_err(E::from)?;
    let mut rewritten = 0;

    for path in files {
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.ends_with(suffix))
            .unwrap_or(false);
        if !matches {
            continue;
        }

        let Some(content) = tree.read(&path).map_err(E::from)? else {
            continue;
        };

        if let Some(new_content) = callback(&path, &content)? {
            debug!(path = %path.display(), "callback rewrote file");
            tree.overwrite(&path, new_content).map_err(E::from)?;
            rewritten += 1;
        }
    }

    Ok(rewritten)
}

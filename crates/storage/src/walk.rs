//! Recursive directory listing shared by the directory-backed stores.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Walks `root` recursively and returns relative file paths.
///
/// Paths use `/` as separator on every platform and come back sorted.
/// `keep(relative, is_dir)` prunes entries: a rejected directory is not
/// descended into. Symbolic links are followed; a link back to one of its own
/// ancestors is skipped. A missing `root` yields an empty list.
pub(crate) fn walk_files<F>(root: &Path, mut keep: F) -> std::io::Result<Vec<String>>
where
    F: FnMut(&str, bool) -> bool,
{
    let mut files = Vec::new();
    if !root.exists() {
        return Ok(files);
    }
    let mut ancestors = HashSet::from([root.canonicalize()?]);
    walk_dir(root, root, &mut keep, &mut ancestors, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk_dir<F>(
    root: &Path,
    current: &Path,
    keep: &mut F,
    ancestors: &mut HashSet<PathBuf>,
    files: &mut Vec<String>,
) -> std::io::Result<()>
where
    F: FnMut(&str, bool) -> bool,
{
    for entry in std::fs::read_dir(current)? {
        let entry = entry?;
        let path = entry.path();

        let rel_path = path.strip_prefix(root).map_err(std::io::Error::other)?;
        let rel_str = rel_path.to_string_lossy().replace('\\', "/");

        // Follows symlinks, unlike `DirEntry::metadata`.
        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %rel_str, "skipping dangling symlink");
                continue;
            }
            Err(e) => return Err(e),
        };

        if metadata.is_dir() {
            if !keep(&rel_str, true) {
                continue;
            }
            let real = path.canonicalize()?;
            if !ancestors.insert(real.clone()) {
                warn!(path = %rel_str, "skipping symlink loop");
                continue;
            }
            walk_dir(root, &path, keep, ancestors, files)?;
            ancestors.remove(&real);
        } else if metadata.is_file() && keep(&rel_str, false) {
            files.push(rel_str);
        }
    }

    Ok(())
}

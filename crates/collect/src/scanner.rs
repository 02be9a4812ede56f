//! Source enumeration.

use fastcollect_storage::LocalSource;
use tracing::debug;

use crate::error::CollectError;
use crate::ignore::IgnorePatterns;

/// Lists the files of `source` that survive `ignore`, sorted.
///
/// Ignored directories are pruned without descending into them.
pub fn scan_source(
    source: &LocalSource,
    ignore: &IgnorePatterns,
) -> Result<Vec<String>, CollectError> {
    let files = source.list_files(|relative, is_dir| {
        let ignored = ignore.is_ignored(relative, is_dir);
        if ignored {
            debug!(path = relative, "ignored");
        }
        !ignored
    })?;
    debug!(root = %source.root().display(), files = files.len(), "scanned source");
    Ok(files)
}

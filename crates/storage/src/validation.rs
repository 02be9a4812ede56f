use std::path::{Component, Path};

use crate::error::{StorageError, StorageResult};

/// Validates that an object key or source path stays inside its root.
///
/// Rejects:
/// - Empty keys and keys naming a directory (trailing `/`)
/// - Absolute paths (Unix `/` or Windows `C:\`)
/// - Parent directory traversal (`..`)
/// - Windows prefix components (`C:`, `\\server`)
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidPath("empty path".into()));
    }
    if key.ends_with('/') {
        return Err(StorageError::InvalidPath(format!(
            "directory key not allowed: {key}"
        )));
    }

    let path = Path::new(key);

    if path.is_absolute() {
        return Err(StorageError::InvalidPath(format!(
            "absolute path not allowed: {key}"
        )));
    }

    for component in path.components() {
        match component {
            Component::ParentDir => {
                return Err(StorageError::InvalidPath(format!(
                    "parent directory traversal not allowed: {key}"
                )));
            }
            Component::Prefix(_) | Component::RootDir => {
                return Err(StorageError::InvalidPath(format!(
                    "absolute path not allowed: {key}"
                )));
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }

    Ok(())
}

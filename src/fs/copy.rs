//! Copy and removal helpers for staging and publishing.
//!
//! Entries may be regular files or whole directory trees. Regular files keep
//! their permission bits, which matters for published executables.

use crate::error::{BuildError, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Copy a file or a directory tree from `src` to `dst`.
///
/// Parent directories of `dst` are created as needed. Directory trees are
/// copied recursively; symlinks inside them are followed.
pub fn copy_entry(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            BuildError::io(
                format!("failed to create directory '{}'", parent.display()),
                e,
            )
        })?;
    }

    if src.is_dir() {
        copy_tree(src, dst)
    } else {
        copy_file(src, dst)
    }
}

fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).map_err(|e| {
        BuildError::io(
            format!("failed to copy '{}' to '{}'", src.display(), dst.display()),
            e,
        )
    })?;
    Ok(())
}

fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|e| {
            BuildError::io(format!("failed to walk '{}'", src.display()), e.into())
        })?;

        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| BuildError::io("failed to relativize path", std::io::Error::other(e)))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| {
                BuildError::io(
                    format!("failed to create directory '{}'", target.display()),
                    e,
                )
            })?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Remove a file or directory tree. A missing path is not an error.
pub fn remove_entry(path: &Path) -> Result<()> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => Err(e),
    };
    result.map_err(|e| BuildError::io(format!("failed to remove '{}'", path.display()), e))
}

/// Destroy `path` if it exists and recreate it as an empty directory.
pub fn recreate_dir(path: &Path) -> Result<()> {
    remove_entry(path)?;
    fs::create_dir_all(path).map_err(|e| {
        BuildError::io(
            format!("failed to create directory '{}'", path.display()),
            e,
        )
    })
}

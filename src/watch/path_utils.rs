// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::{Path, PathBuf};

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Tries a direct `strip_prefix(root)` first. If that fails (symlinked
/// prefixes such as `/private/var` on macOS), both sides are canonicalized
/// and compared again. Paths of removed files cannot be canonicalized, so
/// for those the parent directory is canonicalized instead.
///
/// Returns `None` if the path cannot be related to `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slashes(rel));
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = canonicalize_lenient(path)?;
    path_canon.strip_prefix(&root_canon).ok().map(to_slashes)
}

fn canonicalize_lenient(path: &Path) -> Option<PathBuf> {
    if let Ok(p) = path.canonicalize() {
        return Some(p);
    }
    let parent = path.parent()?.canonicalize().ok()?;
    Some(parent.join(path.file_name()?))
}

fn to_slashes(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

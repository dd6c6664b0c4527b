// src/pathset.rs

//! Glob-based input selection shared by the copy transforms, the package
//! task and the watch bindings.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::fs::FileSystem;

/// Include/exclude patterns plus a destination directory.
///
/// Patterns are relative to the project root. An exclusion wins over any
/// inclusion matching the same path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSet {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub destination: PathBuf,
}

impl PathSet {
    pub fn new(
        include: Vec<String>,
        exclude: Vec<String>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            include,
            exclude,
            destination: destination.into(),
        }
    }

    /// Compile the patterns into a matcher.
    pub fn compile(&self) -> Result<PathSetMatcher> {
        let include = build_globset(&self.include).context("building include globset")?;
        let exclude = if self.exclude.is_empty() {
            None
        } else {
            Some(build_globset(&self.exclude).context("building exclude globset")?)
        };
        let base = self
            .include
            .first()
            .map(|p| glob_base(p))
            .unwrap_or_default();

        Ok(PathSetMatcher {
            include,
            exclude,
            base,
        })
    }
}

/// Compiled form of a [`PathSet`].
#[derive(Clone)]
pub struct PathSetMatcher {
    include: GlobSet,
    exclude: Option<GlobSet>,
    base: PathBuf,
}

impl fmt::Debug for PathSetMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathSetMatcher")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl PathSetMatcher {
    /// Directory that outputs are made relative to.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Returns true if `rel_path` (relative to the project root, forward
    /// slashes) is included and not excluded.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include.is_match(rel_path) {
            return false;
        }
        !self.is_excluded(rel_path)
    }

    pub fn is_excluded(&self, rel_path: &str) -> bool {
        self.exclude
            .as_ref()
            .map(|set| set.is_match(rel_path))
            .unwrap_or(false)
    }
}

/// A file selected by a path set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchedFile {
    /// Absolute (or root-joined) source path.
    pub source: PathBuf,
    /// Path relative to the matcher's base; joined onto the destination.
    pub relative: PathBuf,
}

/// Literal directory prefix of a glob, e.g. `src/images/**/*.png` → `src/images`.
pub fn glob_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    let mut parts = pattern.split('/').peekable();
    while let Some(part) = parts.next() {
        if part.contains(['*', '?', '[', '{']) {
            break;
        }
        // The last literal segment names a file, not a directory.
        if parts.peek().is_none() {
            break;
        }
        if !part.is_empty() && part != "." {
            base.push(part);
        }
    }
    base
}

/// Collect all files under `root` selected by `matcher`, sorted by path.
///
/// Only the matcher's base directory is walked, and directories that are
/// themselves excluded are not descended into.
pub fn collect_matching_files(
    fs: &dyn FileSystem,
    root: &Path,
    matcher: &PathSetMatcher,
) -> Result<Vec<MatchedFile>> {
    let start = if matcher.base().as_os_str().is_empty() {
        root.to_path_buf()
    } else {
        root.join(matcher.base())
    };
    let mut files = Vec::new();
    if !fs.is_dir(&start) {
        return Ok(files);
    }

    let mut stack = vec![start];
    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            let Some(rel) = relative_to(root, &path) else {
                continue;
            };
            if fs.is_dir(&path) {
                if !matcher.is_excluded(&rel) {
                    stack.push(path);
                }
            } else if fs.is_file(&path) && matcher.matches(&rel) {
                let relative = Path::new(&rel)
                    .strip_prefix(matcher.base())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| PathBuf::from(&rel));
                files.push(MatchedFile {
                    source: path,
                    relative,
                });
            }
        }
    }

    files.sort();
    Ok(files)
}

fn relative_to(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// Build a GlobSet from simple string patterns.
pub(crate) fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

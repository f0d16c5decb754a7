//! Source resolution.
//!
//! A logical source name `p` expands to two globs, `p.*` and the bare `p`,
//! so that one name matches either an extensioned file (`sol.cpp`) or an
//! extensionless file or directory (`gen/`). A name written with a trailing
//! `/` only ever matches directories, through the bare form. Globs are
//! matched against the task directory; `*` never crosses a `/`.

use crate::error::{BuildError, Result};
use globset::{GlobBuilder, GlobMatcher};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A resolved, existing source entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePath {
    /// Absolute path on disk.
    path: PathBuf,
    /// Path relative to the task directory, used in messages.
    relative: PathBuf,
    /// Name the entry carries once staged.
    name: String,
}

impl SourcePath {
    pub fn new(task_dir: &Path, relative: PathBuf) -> Self {
        let name = relative
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            path: task_dir.join(&relative),
            relative,
            name,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn relative(&self) -> &Path {
        &self.relative
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.path.is_dir()
    }
}

/// Resolve one logical source name to every entry matching `{glob}.*` or `{glob}`.
///
/// Matches of each form are sorted by path; the union keeps form order and
/// lists each path once.
pub fn resolve_glob(task_dir: &Path, glob: &str) -> Result<Vec<SourcePath>> {
    let directory = glob.trim_end_matches('/');
    let forms = if directory.is_empty() || directory.len() == glob.len() {
        vec![format!("{}.*", glob), glob.to_string()]
    } else {
        vec![directory.to_string()]
    };
    let dirs_only = forms.len() == 1;

    let mut result: Vec<SourcePath> = Vec::new();
    for pattern in forms {
        for relative in match_pattern(task_dir, &pattern)? {
            let source = SourcePath::new(task_dir, relative);
            if dirs_only && !source.is_dir() {
                continue;
            }
            if !result.contains(&source) {
                result.push(source);
            }
        }
    }

    if result.is_empty() {
        return Err(BuildError::NoSourceMatch {
            pattern: glob.to_string(),
        });
    }
    Ok(result)
}

/// Resolve every pattern and concatenate the results, first-seen order, no duplicates.
pub fn resolve_sources(task_dir: &Path, patterns: &[String]) -> Result<Vec<SourcePath>> {
    let mut sources: Vec<SourcePath> = Vec::new();
    for pattern in patterns {
        for source in resolve_glob(task_dir, pattern)? {
            if !sources.contains(&source) {
                sources.push(source);
            }
        }
    }
    Ok(sources)
}

/// Reject a source set that mixes directories and regular files.
pub fn check_source_kinds(sources: &[SourcePath]) -> Result<()> {
    let dirs = sources.iter().any(|s| s.is_dir());
    let files = sources.iter().any(|s| s.path().is_file());
    if dirs && files {
        return Err(BuildError::MixedSourceKinds {
            paths: sources.iter().map(|s| s.relative().to_path_buf()).collect(),
        });
    }
    Ok(())
}

/// Reject a source set holding more than one directory.
pub fn check_single_directory(sources: &[SourcePath]) -> Result<()> {
    if sources.len() > 1 && sources.iter().any(|s| s.is_dir()) {
        return Err(BuildError::MultipleDirectories {
            paths: sources.iter().map(|s| s.relative().to_path_buf()).collect(),
        });
    }
    Ok(())
}

/// Drop entries whose path was already seen, keeping first-seen order.
///
/// An extra file may also be reached through the main sources; it is staged once.
pub fn dedup_by_path(sources: Vec<SourcePath>) -> Vec<SourcePath> {
    let mut unique: Vec<SourcePath> = Vec::with_capacity(sources.len());
    for source in sources {
        if !unique.iter().any(|seen| seen.path() == source.path()) {
            unique.push(source);
        }
    }
    unique
}

/// Reject two distinct sources that would be staged under the same name.
pub fn check_unique_names(sources: &[SourcePath]) -> Result<()> {
    for (i, source) in sources.iter().enumerate() {
        let mut clashing: Vec<PathBuf> = Vec::new();
        for other in &sources[i..] {
            if other.name() == source.name() && !clashing.iter().any(|p| p == other.relative()) {
                clashing.push(other.relative().to_path_buf());
            }
        }
        if clashing.len() > 1 {
            return Err(BuildError::DuplicateStagedName {
                name: source.name().to_string(),
                paths: clashing,
            });
        }
    }
    Ok(())
}

/// Match a single glob against the task directory, returning relative paths.
fn match_pattern(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let normalized = pattern.trim().replace('\\', "/");
    let normalized = normalized.trim_start_matches("./");
    let matcher = compile(normalized)?;

    let components: Vec<&str> = normalized.split('/').filter(|c| !c.is_empty()).collect();
    let recursive = components.iter().any(|c| c.contains("**"));

    let mut walker = WalkDir::new(root).min_depth(1);
    if !recursive {
        walker = walker.max_depth(components.len());
    }

    let mut matches = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| visible(e, &components))
    {
        let entry = entry.map_err(|e| {
            BuildError::io(format!("failed to search '{}'", root.display()), e.into())
        })?;
        let relative = match entry.path().strip_prefix(root) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        if matcher.is_match(to_slash(relative)) {
            matches.push(relative.to_path_buf());
        }
    }

    matches.sort();
    Ok(matches)
}

fn compile(pattern: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| BuildError::Config(format!("invalid source glob '{}': {}", pattern, e)))
}

/// Hidden entries are only visited when the pattern names them explicitly.
fn visible(entry: &DirEntry, components: &[&str]) -> bool {
    let name = entry.file_name().to_string_lossy();
    if !name.starts_with('.') {
        return true;
    }
    components
        .get(entry.depth().saturating_sub(1))
        .is_some_and(|c| c.starts_with('.'))
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

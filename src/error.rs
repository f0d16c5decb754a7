//! Error types for taskbuild.
//!
//! Uses thiserror for derive macros. Every variant produces a user-actionable
//! message; path-related variants list the offending paths indented on their
//! own lines.

use crate::exit_codes;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for taskbuild operations.
///
/// Most variants are recoverable build failures that abort only the current
/// job. [`BuildError::is_fault`] singles out the ones that indicate a defect in
/// taskbuild itself rather than in the task being built.
#[derive(Error, Debug)]
pub enum BuildError {
    /// A declared source glob matched nothing.
    #[error("No paths matching '{pattern}'.")]
    NoSourceMatch { pattern: String },

    /// Resolved sources contain both regular files and directories.
    #[error("Mixed files and directories for sources:\n{}", format_paths(.paths))]
    MixedSourceKinds { paths: Vec<PathBuf> },

    /// More than one directory was given as sources.
    #[error("Only a single directory may be built, got:\n{}", format_paths(.paths))]
    MultipleDirectories { paths: Vec<PathBuf> },

    /// Auto-detection found no applicable strategy.
    #[error("No applicable build strategy for [{section}] with sources:\n{}", format_paths(.paths))]
    NoApplicableStrategy { section: String, paths: Vec<PathBuf> },

    /// Auto-detection found several applicable strategies (catalog defect).
    #[error("Multiple strategies applicable: {}", .names.join(" "))]
    AmbiguousStrategy { names: Vec<&'static str> },

    /// An extra-file category matched a directory.
    #[error("{category} matched directory '{}'.", .path.display())]
    ExtraFileIsDirectory { category: String, path: PathBuf },

    /// Two sources would be staged under the same file name.
    #[error("Several sources would be staged as '{name}':\n{}", format_paths(.paths))]
    DuplicateStagedName { name: String, paths: Vec<PathBuf> },

    /// A strategy reported an artifact path outside the staging directory.
    #[error("Build of '{program}' produced an artifact outside the staging directory: '{}'", .path.display())]
    UnsafeArtifactPath { program: String, path: PathBuf },

    /// A strategy reported an artifact that does not exist.
    #[error("Build of '{program}' did not produce '{}'", .path.display())]
    MissingArtifact { program: String, path: PathBuf },

    /// A script source is not runnable as-is.
    #[error("{0}")]
    InvalidScript(String),

    /// A required external tool is not installed.
    #[error("Missing tool: {tool}")]
    MissingTool { tool: String },

    /// The toolchain exited with a non-zero status.
    #[error("Compilation of {program} failed.\n{output}")]
    CompilationFailed { program: String, output: String },

    /// A judge helper could not be prepared.
    #[error("Judge preparation failed: {0}")]
    JudgePreparation(String),

    /// Some jobs of a run failed; each failure has already been reported.
    #[error("{failed} of {total} jobs failed")]
    JobsFailed { failed: usize, total: usize },

    /// The task configuration is invalid.
    #[error("{0}")]
    Config(String),

    /// Another process holds the staging lock.
    #[error("Staging area is locked: {0}")]
    StagingLocked(String),

    /// Unexpected filesystem failure.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    /// Wrap an I/O error with a description of what was being attempted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        BuildError::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether this error is a fault in taskbuild rather than in the task.
    ///
    /// Faults abort the whole job run instead of failing one job.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            BuildError::AmbiguousStrategy { .. } | BuildError::Io { .. }
        )
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::Config(_) => exit_codes::USER_ERROR,
            BuildError::StagingLocked(_) => exit_codes::LOCK_FAILURE,
            e if e.is_fault() => exit_codes::INTERNAL_FAULT,
            _ => exit_codes::BUILD_FAILURE,
        }
    }
}

/// Render a path list one path per line, indented by four spaces.
pub fn format_paths<P: AsRef<Path>>(paths: &[P]) -> String {
    paths
        .iter()
        .map(|p| format!("    {}", p.as_ref().display()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indent every line of `text` by four spaces.
pub fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result type alias for taskbuild operations.
pub type Result<T> = std::result::Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_has_user_exit_code() {
        let err = BuildError::Config("unknown strategy".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
        assert!(!err.is_fault());
    }

    #[test]
    fn ambiguous_strategy_is_fault() {
        let err = BuildError::AmbiguousStrategy {
            names: vec!["python", "script"],
        };
        assert!(err.is_fault());
        assert_eq!(err.exit_code(), exit_codes::INTERNAL_FAULT);
        assert_eq!(err.to_string(), "Multiple strategies applicable: python script");
    }

    #[test]
    fn recoverable_failures_have_build_exit_code() {
        let err = BuildError::NoSourceMatch {
            pattern: "gen".to_string(),
        };
        assert!(!err.is_fault());
        assert_eq!(err.exit_code(), exit_codes::BUILD_FAILURE);
        assert_eq!(err.to_string(), "No paths matching 'gen'.");
    }

    #[test]
    fn staging_locked_has_lock_exit_code() {
        let err = BuildError::StagingLocked("held by ci@runner".to_string());
        assert_eq!(err.exit_code(), exit_codes::LOCK_FAILURE);
    }

    #[test]
    fn mixed_sources_lists_every_path_indented() {
        let err = BuildError::MixedSourceKinds {
            paths: vec![PathBuf::from("gen"), PathBuf::from("gen.py")],
        };
        assert_eq!(
            err.to_string(),
            "Mixed files and directories for sources:\n    gen\n    gen.py"
        );
    }

    #[test]
    fn no_applicable_strategy_names_section() {
        let err = BuildError::NoApplicableStrategy {
            section: "build_sol".to_string(),
            paths: vec![PathBuf::from("sol.xyz")],
        };
        let msg = err.to_string();
        assert!(msg.contains("[build_sol]"));
        assert!(msg.contains("    sol.xyz"));
    }

    #[test]
    fn indent_prefixes_each_line() {
        assert_eq!(indent("a\nb"), "    a\n    b");
    }
}

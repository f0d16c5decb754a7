//! Configuration types: build sections, run sections and output-check modes.

use crate::build::{ALL_STRATEGIES, Strategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How contestant output is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutCheck {
    /// Byte-for-byte comparison with the reference output (default).
    #[default]
    Diff,
    /// A custom judge program built from the task sources.
    Judge,
    /// The pre-built token judge.
    Tokens,
    /// The pre-built shuffle judge.
    Shuffle,
}

/// Strategy selection for a build section: a named strategy or auto-detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StrategyChoice {
    /// Pick the single applicable strategy among the auto-eligible ones.
    #[default]
    Auto,
    /// Use this strategy without running applicability checks.
    Explicit(Strategy),
}

impl StrategyChoice {
    /// Parse a strategy choice: `auto` or any catalog strategy name.
    pub fn parse(s: &str) -> Option<Self> {
        if s == "auto" {
            return Some(Self::Auto);
        }
        Strategy::from_name(s).map(Self::Explicit)
    }

    pub fn name(&self) -> &'static str {
        match self {
            StrategyChoice::Auto => "auto",
            StrategyChoice::Explicit(strategy) => strategy.name(),
        }
    }
}

impl TryFrom<String> for StrategyChoice {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(value.trim()).ok_or_else(|| {
            let known: Vec<&str> = ALL_STRATEGIES.iter().map(|s| s.name()).collect();
            format!(
                "unknown build strategy '{}' (expected 'auto' or one of: {})",
                value,
                known.join(", ")
            )
        })
    }
}

impl From<StrategyChoice> for String {
    fn from(value: StrategyChoice) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for StrategyChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declarative description of one program to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSection {
    /// Name of the built program; the published target is `<build_dir>/<program_name>`.
    pub program_name: String,

    /// Source globs relative to the task directory. Each pattern `p` matches
    /// both `p.*` and `p`.
    pub sources: Vec<String>,

    /// Explicit strategy name or `auto`.
    #[serde(default)]
    pub strategy: StrategyChoice,

    /// Extra-file globs keyed by the category a strategy declares (e.g. `headers_cpp`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_files: BTreeMap<String, Vec<String>>,

    /// Human-readable section identifier, assigned when the config is loaded.
    #[serde(skip)]
    pub section_name: String,
}

impl BuildSection {
    /// Create an auto-detected build section named `build_<program_name>`.
    pub fn new(program_name: impl Into<String>, sources: Vec<String>) -> Self {
        let program_name = program_name.into();
        Self {
            section_name: section_name_for(&program_name),
            program_name,
            sources,
            strategy: StrategyChoice::Auto,
            extra_files: BTreeMap::new(),
        }
    }

    /// Use an explicit strategy instead of auto-detection.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = StrategyChoice::Explicit(strategy);
        self
    }

    /// Add glob patterns for an extra-file category.
    pub fn with_extra_files(mut self, category: impl Into<String>, patterns: Vec<String>) -> Self {
        self.extra_files
            .entry(category.into())
            .or_default()
            .extend(patterns);
        self
    }

    /// Glob patterns listed for an extra-file category (empty if absent).
    pub fn extra_patterns(&self, category: &str) -> &[String] {
        self.extra_files
            .get(category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Final path component of the program name; the name strategies build to.
    pub fn target_name(&self) -> &str {
        self.program_name
            .rsplit('/')
            .next()
            .unwrap_or(&self.program_name)
    }
}

pub(crate) fn section_name_for(program_name: &str) -> String {
    format!("build_{}", program_name)
}

/// A runnable program of the task: how to build it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub build: BuildSection,
}

/// A declared contestant solution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolutionConfig {
    /// Run section of the solution; a solution without one is not built.
    pub run: Option<RunConfig>,

    /// Whether this is the reference solution.
    pub primary: bool,
}

// Default value functions for serde
pub(crate) fn default_build_dir() -> String {
    "build".to_string()
}
pub(crate) fn default_staging_lock_stale_minutes() -> u32 {
    60
}

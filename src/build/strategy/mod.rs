//! The build strategy catalog.
//!
//! A strategy is a classifier plus a builder for one toolchain family. The
//! catalog is closed: every strategy is a variant of [`Strategy`], listed in
//! [`ALL_STRATEGIES`]. [`AUTO_STRATEGIES`] is the ordered subset consulted by
//! auto-detection; its predicates are pairwise disjoint, so at most one can
//! match any source set. Strategies that overlap others (`script`) must be
//! requested by name.

mod toolchain;


use super::sources::{SourcePath, check_single_directory};
use crate::config::{BuildSection, StrategyChoice};
use crate::env::Env;
use crate::error::{BuildError, Result};
use std::fmt;
use std::path::{Path, PathBuf};

pub use toolchain::{FAILURE_MAX_CHARS, FAILURE_MAX_LINES};

/// A build strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strategy {
    /// A single Python script.
    Python,
    /// A single shell script.
    Shell,
    /// Any single file with a shebang line.
    Script,
    /// C sources compiled with gcc.
    C,
    /// C++ sources compiled with g++.
    Cpp,
    /// A single Pascal source compiled with fpc.
    Pascal,
    /// A directory with a Makefile.
    Make,
    /// A directory with a Cargo project.
    Cargo,
}

/// Every strategy, in catalog order.
pub const ALL_STRATEGIES: &[Strategy] = &[
    Strategy::Python,
    Strategy::Shell,
    Strategy::Script,
    Strategy::C,
    Strategy::Cpp,
    Strategy::Pascal,
    Strategy::Make,
    Strategy::Cargo,
];

/// Strategies considered by auto-detection, in evaluation order.
pub const AUTO_STRATEGIES: &[Strategy] = &[
    Strategy::Python,
    Strategy::Shell,
    Strategy::C,
    Strategy::Cpp,
    Strategy::Pascal,
    Strategy::Make,
    Strategy::Cargo,
];

const C_SOURCES: &[&str] = &[".c"];
const C_FILES: &[&str] = &[".c", ".h"];
const CPP_SOURCES: &[&str] = &[".cpp", ".cc"];
const CPP_FILES: &[&str] = &[".cpp", ".cc", ".hpp", ".h"];

/// Everything a strategy needs to build one program inside the staging directory.
#[derive(Debug)]
pub struct BuildInput<'a> {
    pub section: &'a BuildSection,
    pub env: &'a Env,
    /// The staging directory; the working directory of every toolchain call.
    pub staging_dir: &'a Path,
    /// Staged names of the main sources.
    pub sources: Vec<String>,
    /// Staged names of the extra files.
    pub extras: Vec<String>,
}

impl BuildInput<'_> {
    fn target(&self) -> &str {
        self.section.target_name()
    }

    fn single_source(&self) -> Result<&str> {
        match self.sources.as_slice() {
            [only] => Ok(only.as_str()),
            _ => Err(BuildError::InvalidScript(format!(
                "Expected exactly one source for {}, got {}",
                self.section.program_name,
                self.sources.len()
            ))),
        }
    }

    fn sources_with_suffix(&self, suffixes: &[&str]) -> Vec<String> {
        self.sources
            .iter()
            .filter(|s| has_suffix(s, suffixes))
            .cloned()
            .collect()
    }

    fn color_flag(&self) -> String {
        if self.env.plain {
            "-fdiagnostics-color=never".to_string()
        } else {
            "-fdiagnostics-color=always".to_string()
        }
    }
}

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Python => "python",
            Strategy::Shell => "shell",
            Strategy::Script => "script",
            Strategy::C => "c",
            Strategy::Cpp => "cpp",
            Strategy::Pascal => "pascal",
            Strategy::Make => "make",
            Strategy::Cargo => "cargo",
        }
    }

    /// Look a strategy up by name in the full catalog.
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_STRATEGIES.iter().copied().find(|s| s.name() == name)
    }

    /// Extra-file categories this strategy stages next to its sources.
    pub fn extra_files(self) -> &'static [&'static str] {
        match self {
            Strategy::Python => &["extras_py"],
            Strategy::C => &["headers_c"],
            Strategy::Cpp => &["headers_cpp"],
            _ => &[],
        }
    }

    /// Whether this strategy can build the given resolved sources.
    ///
    /// Files are classified by name; a single directory by its contents.
    /// Several directories cannot be built by any strategy.
    pub fn applicable(self, _section: &BuildSection, sources: &[PathBuf]) -> Result<bool> {
        let directories = sources.iter().filter(|p| p.is_dir()).count();
        if directories == 0 {
            Ok(self.applicable_on_files(sources))
        } else if sources.len() == 1 {
            Ok(self.applicable_on_directory(&sources[0]))
        } else {
            Err(BuildError::MultipleDirectories {
                paths: sources.to_vec(),
            })
        }
    }

    fn applicable_on_files(self, files: &[PathBuf]) -> bool {
        let names: Vec<String> = files
            .iter()
            .map(|f| {
                f.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default()
            })
            .collect();
        match self {
            Strategy::Python => single_with_suffix(&names, ".py"),
            Strategy::Shell => single_with_suffix(&names, ".sh"),
            Strategy::Script => names.len() == 1,
            Strategy::C => all_with_one_of(&names, C_FILES, C_SOURCES),
            Strategy::Cpp => all_with_one_of(&names, CPP_FILES, CPP_SOURCES),
            Strategy::Pascal => single_with_suffix(&names, ".pas"),
            Strategy::Make | Strategy::Cargo => false,
        }
    }

    fn applicable_on_directory(self, directory: &Path) -> bool {
        match self {
            Strategy::Make => directory.join("Makefile").is_file(),
            Strategy::Cargo => directory.join("Cargo.toml").is_file(),
            _ => false,
        }
    }

    /// Build the staged sources, returning the artifact path relative to the staging directory.
    pub fn build(self, input: &BuildInput<'_>) -> Result<PathBuf> {
        let program = input.section.program_name.as_str();
        let target = input.target().to_string();

        match self {
            Strategy::Python | Strategy::Shell | Strategy::Script => {
                toolchain::build_script(input.staging_dir, input.single_source()?)
            }
            Strategy::C => {
                let mut args = vec!["gcc".to_string()];
                args.extend(input.sources_with_suffix(C_SOURCES));
                args.extend(
                    ["-o", target.as_str(), "-std=c17", "-O2", "-Wall", "-lm", "-Wshadow"]
                        .map(String::from),
                );
                args.push(input.color_flag());
                toolchain::run_compilation(&args, program, input.staging_dir)?;
                Ok(PathBuf::from(target))
            }
            Strategy::Cpp => {
                let mut args = vec!["g++".to_string()];
                args.extend(input.sources_with_suffix(CPP_SOURCES));
                args.extend(
                    ["-o", target.as_str(), "-std=c++20", "-O2", "-Wall", "-lm", "-Wshadow"]
                        .map(String::from),
                );
                args.push(input.color_flag());
                toolchain::run_compilation(&args, program, input.staging_dir)?;
                Ok(PathBuf::from(target))
            }
            Strategy::Pascal => {
                let source = input.single_source()?;
                let args = [
                    "fpc".to_string(),
                    "-gl".to_string(),
                    "-O3".to_string(),
                    "-Sg".to_string(),
                    format!("-o{}", target),
                    source.to_string(),
                ];
                toolchain::run_compilation(&args, program, input.staging_dir)?;
                Ok(PathBuf::from(target))
            }
            Strategy::Make => {
                let dir = input.single_source()?;
                toolchain::run_compilation(
                    &["make".to_string()],
                    program,
                    &input.staging_dir.join(dir),
                )?;
                Ok(Path::new(dir).join("target"))
            }
            Strategy::Cargo => {
                let dir = input.single_source()?;
                let args = ["cargo", "build", "--release", "--quiet"].map(String::from);
                toolchain::run_compilation(&args, program, &input.staging_dir.join(dir))?;
                Ok(Path::new(dir).join("target").join("release").join(target))
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every extra-file category declared by some strategy.
pub fn known_extra_categories() -> Vec<&'static str> {
    let mut categories: Vec<&'static str> = ALL_STRATEGIES
        .iter()
        .flat_map(|s| s.extra_files().iter().copied())
        .collect();
    categories.sort_unstable();
    categories.dedup();
    categories
}

/// Pick the strategy for a build section: the named one, or the single
/// applicable auto-eligible one.
pub fn select_strategy(section: &BuildSection, sources: &[SourcePath]) -> Result<Strategy> {
    match section.strategy {
        StrategyChoice::Explicit(strategy) => Ok(strategy),
        StrategyChoice::Auto => detect_strategy(AUTO_STRATEGIES, section, sources),
    }
}

/// Find the single strategy among `candidates` applicable to `sources`.
///
/// No match is a build failure. More than one match means the candidates
/// overlap, which is a defect of the catalog rather than of the task, and is
/// reported as [`BuildError::AmbiguousStrategy`].
pub fn detect_strategy(
    candidates: &[Strategy],
    section: &BuildSection,
    sources: &[SourcePath],
) -> Result<Strategy> {
    check_single_directory(sources)?;

    let paths: Vec<PathBuf> = sources.iter().map(|s| s.path().to_path_buf()).collect();
    let mut applicable = Vec::new();
    for &strategy in candidates {
        if strategy.applicable(section, &paths)? {
            applicable.push(strategy);
        }
    }

    match applicable.as_slice() {
        [] => Err(BuildError::NoApplicableStrategy {
            section: section.section_name.clone(),
            paths: sources.iter().map(|s| s.relative().to_path_buf()).collect(),
        }),
        [only] => Ok(*only),
        _ => Err(BuildError::AmbiguousStrategy {
            names: applicable.iter().map(|s| s.name()).collect(),
        }),
    }
}

fn has_suffix(name: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|suffix| name.ends_with(suffix))
}

fn single_with_suffix(names: &[String], suffix: &str) -> bool {
    matches!(names, [only] if only.ends_with(suffix))
}

/// All names end with one of `allowed`, and at least one with one of `required`.
fn all_with_one_of(names: &[String], allowed: &[&str], required: &[&str]) -> bool {
    names.iter().all(|n| has_suffix(n, allowed)) && names.iter().any(|n| has_suffix(n, required))
}

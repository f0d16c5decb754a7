//! Building a single program: resolve, select, stage, invoke, publish.

use super::sources::{
    SourcePath, check_single_directory, check_source_kinds, check_unique_names, dedup_by_path,
    resolve_sources,
};
use super::staging::StagingArea;
use super::strategy::{BuildInput, Strategy, select_strategy};
use crate::access::AccessTracker;
use crate::config::BuildSection;
use crate::context::TaskContext;
use crate::env::Env;
use crate::error::{BuildError, Result};
use crate::fs::{copy_entry, remove_entry};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltProgram {
    pub program_name: String,
    pub strategy: Strategy,
    /// Logical names of everything copied into staging, main sources first.
    pub staged: Vec<String>,
    /// Absolute path of the published target.
    pub target: PathBuf,
}

/// Builds programs of one task, one at a time.
#[derive(Debug)]
pub struct ProgramBuilder<'a> {
    ctx: &'a TaskContext,
    env: &'a Env,
}

impl<'a> ProgramBuilder<'a> {
    pub fn new(ctx: &'a TaskContext, env: &'a Env) -> Self {
        Self { ctx, env }
    }

    /// Build the program described by `section` and publish it to
    /// `<build_dir>/<program_name>`.
    ///
    /// Everything that can be checked without touching the filesystem state
    /// (source resolution, kind check, strategy selection, extra files) is
    /// checked before the staging area is acquired. Once the published
    /// target has been removed, any failure leaves it absent.
    pub fn build(
        &self,
        section: &BuildSection,
        tracker: &mut dyn AccessTracker,
    ) -> Result<BuiltProgram> {
        let sources = resolve_sources(&self.ctx.task_dir, &section.sources)?;
        check_source_kinds(&sources)?;
        check_single_directory(&sources)?;

        let strategy = select_strategy(section, &sources)?;
        let extras = self.resolve_extras(section, strategy)?;

        let all = dedup_by_path(sources.iter().chain(&extras).cloned().collect());
        check_unique_names(&all)?;

        info!(
            "Building '{}' using build strategy '{}'.",
            section.program_name, strategy
        );

        let staging = StagingArea::acquire(self.ctx, &format!("build {}", section.program_name))?;
        for source in &all {
            staging.stage(source)?;
            tracker.access(source.path());
        }

        let target = self.ctx.target_path(&section.program_name);
        prepare_target(&target)?;

        let input = BuildInput {
            section,
            env: self.env,
            staging_dir: staging.path(),
            sources: sources.iter().map(|s| s.name().to_string()).collect(),
            extras: extras.iter().map(|s| s.name().to_string()).collect(),
        };
        let artifact = strategy.build(&input)?;
        let artifact = locate_artifact(staging.path(), &artifact, &section.program_name)?;

        debug!(
            artifact = %artifact.display(),
            target = %target.display(),
            "publishing"
        );
        copy_entry(&artifact, &target)?;
        tracker.access(&target);

        Ok(BuiltProgram {
            program_name: section.program_name.clone(),
            strategy,
            staged: all.iter().map(|s| s.name().to_string()).collect(),
            target,
        })
    }

    /// Resolve the extra files of every category `strategy` declares.
    fn resolve_extras(&self, section: &BuildSection, strategy: Strategy) -> Result<Vec<SourcePath>> {
        let mut extras = Vec::new();
        for &category in strategy.extra_files() {
            let patterns = section.extra_patterns(category);
            if patterns.is_empty() {
                continue;
            }
            for extra in resolve_sources(&self.ctx.task_dir, patterns)? {
                if extra.is_dir() {
                    return Err(BuildError::ExtraFileIsDirectory {
                        category: category.to_string(),
                        path: extra.relative().to_path_buf(),
                    });
                }
                extras.push(extra);
            }
        }
        Ok(extras)
    }
}

/// Remove the previous target and make sure its parent exists.
fn prepare_target(target: &Path) -> Result<()> {
    remove_entry(target)?;
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            BuildError::io(
                format!("failed to create directory '{}'", parent.display()),
                e,
            )
        })?;
    }
    Ok(())
}

/// Resolve an artifact path reported by a strategy, refusing anything that
/// does not stay inside the staging directory.
fn locate_artifact(staging_dir: &Path, artifact: &Path, program: &str) -> Result<PathBuf> {
    let contained = artifact
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && artifact.components().any(|c| matches!(c, Component::Normal(_)));
    if !contained {
        return Err(BuildError::UnsafeArtifactPath {
            program: program.to_string(),
            path: artifact.to_path_buf(),
        });
    }

    let path = staging_dir.join(artifact);
    if !path.exists() {
        return Err(BuildError::MissingArtifact {
            program: program.to_string(),
            path: artifact.to_path_buf(),
        });
    }
    Ok(path)
}

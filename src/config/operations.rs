//! Config loading, validation, and utility operations.

use super::model::TaskConfig;
use super::types::{BuildSection, StrategyChoice, section_name_for};
use crate::build::known_extra_categories;
use crate::context::{STAGING_DIR, STAGING_LOCK};
use crate::error::{BuildError, Result};
use std::path::{Component, Path};

impl TaskConfig {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored.
    ///
    /// # Returns
    ///
    /// * `Ok(TaskConfig)` - Successfully loaded and validated config
    /// * `Err(BuildError::Config)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            BuildError::Config(format!(
                "failed to read task config '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string, assign section names and validate.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut config: TaskConfig = serde_yaml::from_str(yaml)
            .map_err(|e| BuildError::Config(format!("failed to parse task config YAML: {}", e)))?;

        config.assign_section_names();
        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| BuildError::Config(format!("failed to serialize task config: {}", e)))
    }

    /// Every build section declared in the config, solutions included.
    pub fn build_sections(&self) -> Vec<&BuildSection> {
        let mut sections: Vec<&BuildSection> = [&self.generator, &self.validator, &self.out_judge]
            .into_iter()
            .flatten()
            .map(|run| &run.build)
            .collect();
        sections.extend(
            self.solutions
                .values()
                .filter_map(|s| s.run.as_ref())
                .map(|run| &run.build),
        );
        sections
    }

    fn assign_section_names(&mut self) {
        let runs = [&mut self.generator, &mut self.validator, &mut self.out_judge]
            .into_iter()
            .flatten()
            .chain(self.solutions.values_mut().filter_map(|s| s.run.as_mut()));
        for run in runs {
            run.build.section_name = section_name_for(&run.build.program_name);
        }
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `build_dir` must be a non-empty relative path without `..`
    /// - `staging_lock_stale_minutes` must be positive
    /// - every build section must pass [`validate_build_section`]
    pub fn validate(&self) -> Result<()> {
        if !is_contained_relative(&self.build_dir) {
            return Err(BuildError::Config(format!(
                "config validation failed: build_dir must be a relative path inside the task (found '{}')",
                self.build_dir
            )));
        }

        if self.staging_lock_stale_minutes == 0 {
            return Err(BuildError::Config(
                "config validation failed: staging_lock_stale_minutes must be greater than 0"
                    .to_string(),
            ));
        }

        for section in self.build_sections() {
            validate_build_section(section)?;
        }

        Ok(())
    }
}

/// Validate a single build section.
///
/// - `program_name` must be a non-empty relative path without `..`, and must
///   not land on the staging directory or its lock
/// - `sources` must contain at least one non-blank pattern
/// - extra-file categories must be declared by the explicit strategy, or by
///   some catalog strategy when the strategy is `auto`
pub fn validate_build_section(section: &BuildSection) -> Result<()> {
    let label = if section.section_name.is_empty() {
        section_name_for(&section.program_name)
    } else {
        section.section_name.clone()
    };

    if !is_contained_relative(&section.program_name) {
        return Err(BuildError::Config(format!(
            "config validation failed: [{}] program_name must be a relative path inside the build directory (found '{}')",
            label, section.program_name
        )));
    }

    if let Some(reserved) = reserved_entry(&section.program_name) {
        return Err(BuildError::Config(format!(
            "config validation failed: [{}] program_name must not use the reserved build entry '{}'",
            label, reserved
        )));
    }

    if section.sources.is_empty() {
        return Err(BuildError::Config(format!(
            "config validation failed: [{}] sources must not be empty",
            label
        )));
    }

    if section.sources.iter().any(|s| s.trim().is_empty()) {
        return Err(BuildError::Config(format!(
            "config validation failed: [{}] sources entries must be non-empty",
            label
        )));
    }

    for category in section.extra_files.keys() {
        let allowed = match section.strategy {
            StrategyChoice::Explicit(strategy) => strategy.extra_files().contains(&category.as_str()),
            StrategyChoice::Auto => known_extra_categories().contains(&category.as_str()),
        };
        if !allowed {
            return Err(BuildError::Config(format!(
                "config validation failed: [{}] extra file category '{}' is not used by strategy '{}'",
                label, category, section.strategy
            )));
        }
    }

    Ok(())
}

fn is_contained_relative(path: &str) -> bool {
    let path = Path::new(path);
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && path.components().any(|c| matches!(c, Component::Normal(_)))
}

/// The staging entry a program name would overwrite, if any.
fn reserved_entry(path: &str) -> Option<&'static str> {
    let first = Path::new(path).components().find_map(|c| match c {
        Component::Normal(name) => Some(name),
        _ => None,
    })?;
    [STAGING_DIR, STAGING_LOCK]
        .into_iter()
        .find(|reserved| first == *reserved)
}

//! TaskConfig struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Build-relevant configuration of a task.
///
/// This struct represents the contents of `task.yaml` in the task directory.
/// Unknown fields in the YAML are ignored so the file can carry sections
/// consumed by other pipeline stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    // =========================================================================
    // Layout settings
    // =========================================================================
    /// Build-output directory relative to the task directory (default: "build").
    #[serde(default = "default_build_dir")]
    pub build_dir: String,

    /// Minutes after which a leftover staging lock is reclaimed.
    #[serde(default = "default_staging_lock_stale_minutes")]
    pub staging_lock_stale_minutes: u32,

    /// Directory holding the pre-built `judge-token` and `judge-shuffle` helpers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge_tools_dir: Option<String>,

    // =========================================================================
    // Programs
    // =========================================================================
    /// Input generator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<RunConfig>,

    /// Input validator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<RunConfig>,

    /// Output checking mode.
    #[serde(default)]
    pub out_check: OutCheck,

    /// Custom judge, used when `out_check` is `judge`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_judge: Option<RunConfig>,

    /// Declared solutions keyed by name.
    #[serde(default)]
    pub solutions: BTreeMap<String, SolutionConfig>,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            build_dir: default_build_dir(),
            staging_lock_stale_minutes: default_staging_lock_stale_minutes(),
            judge_tools_dir: None,
            generator: None,
            validator: None,
            out_check: OutCheck::default(),
            out_judge: None,
            solutions: BTreeMap::new(),
        }
    }
}

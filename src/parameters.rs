//! Converter settings: JSON file first, then environment overrides.

use crate::{
    DEFAULT_TARGET_PANEL,
    empty_well_filler::EmptyWellStyle,
    error::{ErrorCode, PlateError},
    plate_template::TemplateLayout,
    target_panel::{TargetAssignment, TargetPanel},
};
use serde::{Deserialize, Serialize};

pub const ENV_REPLICATES: &str = "PLATE384_REPLICATES";
pub const ENV_EMPTY_SAMPLE_NAME: &str = "PLATE384_EMPTY_SAMPLE_NAME";
pub const ENV_OUTPUT_SUFFIX: &str = "PLATE384_OUTPUT_SUFFIX";

pub const DEFAULT_OUTPUT_SUFFIX: &str = "-384Well.csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterParameters {
    /// Replicate selector as typed by the user; unknown values disable expansion.
    pub replicate_mode: String,
    pub template: TemplateLayout,
    pub skip_blank_samples: bool,
    pub sort_output: bool,
    pub empty_wells: EmptyWellStyle,
    pub output_suffix: String,
    /// Empty means the built-in panel.
    pub targets: Vec<TargetAssignment>,
    pub include_empty_in_averages: bool,
}

impl Default for ConverterParameters {
    fn default() -> Self {
        Self {
            replicate_mode: "triplicates".to_string(),
            template: TemplateLayout::default(),
            skip_blank_samples: false,
            sort_output: false,
            empty_wells: EmptyWellStyle::default(),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            targets: vec![],
            include_empty_in_averages: false,
        }
    }
}

fn normalized_non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .and_then(|v| normalized_non_empty(&v))
}

impl ConverterParameters {
    pub fn load_from_path(path: &str) -> Result<Self, PlateError> {
        let text = std::fs::read_to_string(path).map_err(|e| PlateError {
            code: ErrorCode::Io,
            message: format!("Could not read config file '{path}': {e}"),
        })?;
        serde_json::from_str(&text).map_err(|e| PlateError {
            code: ErrorCode::InvalidInput,
            message: format!("Could not parse config JSON '{path}': {e}"),
        })
    }

    /// Loads `path` if given, otherwise the defaults, then applies the
    /// process environment.
    pub fn resolve(path: Option<&str>) -> Result<Self, PlateError> {
        let mut ret = match path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };
        ret.apply_overrides(env_value);
        Ok(ret)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(ENV_REPLICATES).and_then(|v| normalized_non_empty(&v)) {
            self.replicate_mode = value;
        }
        if let Some(value) = lookup(ENV_EMPTY_SAMPLE_NAME).and_then(|v| normalized_non_empty(&v)) {
            self.empty_wells.sample_name = value;
        }
        if let Some(value) = lookup(ENV_OUTPUT_SUFFIX).and_then(|v| normalized_non_empty(&v)) {
            self.output_suffix = value;
        }
    }

    pub fn target_panel(&self) -> TargetPanel {
        if self.targets.is_empty() {
            DEFAULT_TARGET_PANEL.clone()
        } else {
            TargetPanel::from_assignments(&self.targets)
        }
    }
}

//! Machine-readable contracts shared by the plate384 library and its front ends.

use serde::{Deserialize, Serialize};

/// Section marker written on the first line of a sample setup sheet.
pub const SAMPLE_SETUP_MARKER: &str = "[Sample Setup]";

/// Column header of a sample setup sheet, in output order.
pub const SAMPLE_SETUP_HEADER: [&str; 13] = [
    "Well",
    "Well Position",
    "Sample Name",
    "Sample Color",
    "Biogroup Name",
    "Biogroup Color",
    "Target Name",
    "Target Color",
    "Task",
    "Reporter",
    "Quencher",
    "Quantity",
    "Comments",
];

pub const PROTOCOL_VERSION: &str = "v1";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplicateMode {
    Duplicates,
    Triplicates,
}

impl ReplicateMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Duplicates => "duplicates",
            Self::Triplicates => "triplicates",
        }
    }

    /// Accepts the selector values written by users and config files.
    pub fn parse(text: &str) -> Option<Self> {
        let norm = text.trim().to_ascii_lowercase();
        match norm.as_str() {
            "duplicates" | "duplicate" => Some(Self::Duplicates),
            "triplicates" | "triplicate" => Some(Self::Triplicates),
            _ => None,
        }
    }

    /// Number of filled 384-well slots per source well.
    pub fn replicate_count(self) -> usize {
        match self {
            Self::Duplicates => 2,
            Self::Triplicates => 3,
        }
    }
}

/// One line of a sample setup sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRow {
    #[serde(rename = "Well")]
    pub well: Option<u32>,
    #[serde(rename = "Well Position")]
    pub well_position: String,
    #[serde(rename = "Sample Name")]
    pub sample_name: String,
    #[serde(rename = "Sample Color")]
    pub sample_color: String,
    #[serde(rename = "Biogroup Name")]
    pub biogroup_name: String,
    #[serde(rename = "Biogroup Color")]
    pub biogroup_color: String,
    #[serde(rename = "Target Name")]
    pub target_name: String,
    #[serde(rename = "Target Color")]
    pub target_color: String,
    #[serde(rename = "Task")]
    pub task: String,
    #[serde(rename = "Reporter")]
    pub reporter: String,
    #[serde(rename = "Quencher")]
    pub quencher: String,
    #[serde(rename = "Quantity")]
    pub quantity: String,
    #[serde(rename = "Comments")]
    pub comments: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub protocol_version: String,
    pub supported_commands: Vec<String>,
    pub replicate_modes: Vec<ReplicateMode>,
    pub sample_setup_header: Vec<String>,
}

impl Capabilities {
    pub fn current() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            supported_commands: vec![
                "capabilities".to_string(),
                "show-config".to_string(),
                "convert".to_string(),
                "average".to_string(),
            ],
            replicate_modes: vec![ReplicateMode::Duplicates, ReplicateMode::Triplicates],
            sample_setup_header: SAMPLE_SETUP_HEADER.iter().map(|s| s.to_string()).collect(),
        }
    }
}

//! Assay targets and the reporter dye that detects each of them.

use anyhow::{Result, anyhow};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fs;

/// Built-in panel, taken from the reference 384-well template.
pub const DEFAULT_PANEL: [(&str, &str); 5] = [
    ("CT/UP", "VIC"),
    ("IC", "ROX"),
    ("MG/TV", "QUASAR 705"),
    ("NG/TP", "FAM"),
    ("UU/MH", "CY5"),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetAssignment {
    pub target: String,
    pub reporter: String,
}

/// Ordered targets with index-aligned reporters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPanel {
    targets: Vec<String>,
    reporters: Vec<String>,
}

impl Default for TargetPanel {
    fn default() -> Self {
        Self::from_pairs(
            DEFAULT_PANEL
                .iter()
                .map(|(t, r)| (t.to_string(), r.to_string())),
        )
    }
}

impl TargetPanel {
    /// Keeps both lists as given, even when their lengths differ.
    pub fn from_lists(targets: Vec<String>, reporters: Vec<String>) -> Self {
        Self { targets, reporters }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let (targets, reporters) = pairs.into_iter().unzip();
        Self { targets, reporters }
    }

    pub fn from_assignments(assignments: &[TargetAssignment]) -> Self {
        Self::from_pairs(
            assignments
                .iter()
                .map(|a| (a.target.clone(), a.reporter.clone())),
        )
    }

    /// Reads `target,reporter` lines. An optional header line starting with
    /// `Target` is skipped, as are blank lines.
    pub fn from_csv_text(text: &str) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());
        let mut pairs = vec![];
        for (lnum, record) in rdr.records().enumerate() {
            let record = record?;
            let target = record.get(0).unwrap_or_default();
            if target.is_empty() && record.iter().all(|f| f.is_empty()) {
                continue;
            }
            if lnum == 0 && target.to_ascii_lowercase().starts_with("target") {
                continue;
            }
            let reporter = record
                .get(1)
                .filter(|r| !r.is_empty())
                .ok_or_else(|| anyhow!("Target '{target}' in record {} has no reporter", lnum + 1))?;
            pairs.push((target.to_string(), reporter.to_string()));
        }
        if pairs.is_empty() {
            return Err(anyhow!("Target panel contains no targets"));
        }
        Ok(Self::from_pairs(pairs))
    }

    pub fn from_csv_path(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow!("Could not read target panel '{path}': {e}"))?;
        Self::from_csv_text(&text).map_err(|e| anyhow!("Bad target panel '{path}': {e}"))
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn reporters(&self) -> &[String] {
        &self.reporters
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn is_aligned(&self) -> bool {
        self.targets.len() == self.reporters.len()
    }

    pub fn mismatch_warning(&self) -> Option<String> {
        if self.is_aligned() {
            return None;
        }
        Some(format!(
            "{} targets but {} reporters; unmatched entries get a blank reporter or are ignored",
            self.targets.len(),
            self.reporters.len()
        ))
    }
}

/// Splits a comma separated list of names. Blank entries keep their slot so
/// parallel lists stay index-aligned; only a trailing comma is dropped.
pub fn parse_name_list(text: &str) -> Vec<String> {
    let mut ret: Vec<String> = text.split(',').map(|s| s.trim().to_string()).collect();
    if ret.last().is_some_and(|s| s.is_empty()) {
        ret.pop();
    }
    ret
}

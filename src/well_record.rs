//! Per-sample well records and the functions that expand and flatten them.

use crate::{
    coordinate_mapper::{WellPosition, map_source_well},
    error::PlateError,
    target_panel::TargetPanel,
};
use plate384_protocol::{OutputRow, ReplicateMode};
use serde::{Deserialize, Serialize};

/// A 384-well destination. Placeholder wells carry no well number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedWell {
    pub position: WellPosition,
    pub well_number: Option<u32>,
}

/// One sample of the 96-well template and everything needed to write its
/// sample setup lines.
///
/// Targets and reporters are owned by the record; cloning a record yields
/// fully independent lists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WellRecord {
    pub sample_name: String,
    pub sample_color: String,
    pub biogroup_name: String,
    pub biogroup_color: String,
    pub target_color: String,
    pub task: String,
    pub quencher: String,
    pub quantity: String,
    pub comments: String,
    pub well96_number: usize,
    pub well96_position: WellPosition,
    pub targets: Vec<String>,
    pub reporters: Vec<String>,
    pub(crate) resolved: Vec<ResolvedWell>,
}

impl WellRecord {
    pub fn new(
        well96_number: usize,
        sample_name: &str,
        well96_position: WellPosition,
        panel: &TargetPanel,
    ) -> Self {
        Self {
            sample_name: sample_name.to_string(),
            sample_color: String::new(),
            biogroup_name: String::new(),
            biogroup_color: String::new(),
            target_color: String::new(),
            task: String::new(),
            quencher: String::new(),
            quantity: String::new(),
            comments: String::new(),
            well96_number,
            well96_position,
            targets: panel.targets().to_vec(),
            reporters: panel.reporters().to_vec(),
            resolved: vec![],
        }
    }

    pub fn is_resolved(&self) -> bool {
        !self.resolved.is_empty()
    }

    pub fn resolved(&self) -> &[ResolvedWell] {
        &self.resolved
    }

    pub fn well384_positions(&self) -> Vec<WellPosition> {
        self.resolved.iter().map(|r| r.position).collect()
    }

    pub fn well_numbers(&self) -> Vec<Option<u32>> {
        self.resolved.iter().map(|r| r.well_number).collect()
    }
}

/// Resolves the 384-well destinations of `record`. A record is expanded at
/// most once.
pub fn expand_replicates(record: &mut WellRecord, mode: ReplicateMode) -> Result<(), PlateError> {
    if record.is_resolved() {
        return Err(PlateError::invalid_input(format!(
            "Well {} ('{}') has already been expanded",
            record.well96_position, record.sample_name
        )));
    }
    record.resolved = map_source_well(record.well96_position, mode)?
        .into_iter()
        .map(|mapped| ResolvedWell {
            position: mapped.position,
            well_number: Some(mapped.well_number),
        })
        .collect();
    Ok(())
}

/// One output row per destination well and target. Reporters are matched to
/// targets by index; a missing reporter leaves the field blank.
pub fn flatten_record(record: &WellRecord) -> Vec<OutputRow> {
    let mut ret = Vec::with_capacity(record.resolved.len() * record.targets.len());
    for resolved in &record.resolved {
        for (idx, target) in record.targets.iter().enumerate() {
            ret.push(OutputRow {
                well: resolved.well_number,
                well_position: resolved.position.label(),
                sample_name: record.sample_name.clone(),
                sample_color: record.sample_color.clone(),
                biogroup_name: record.biogroup_name.clone(),
                biogroup_color: record.biogroup_color.clone(),
                target_name: target.clone(),
                target_color: record.target_color.clone(),
                task: record.task.clone(),
                reporter: record.reporters.get(idx).cloned().unwrap_or_default(),
                quencher: record.quencher.clone(),
                quantity: record.quantity.clone(),
                comments: record.comments.clone(),
            });
        }
    }
    ret
}

pub fn flatten_records<'a>(records: impl IntoIterator<Item = &'a WellRecord>) -> Vec<OutputRow> {
    records.into_iter().flat_map(flatten_record).collect()
}

//! Averaging replicate Ct values from an instrument results export.

use crate::{
    empty_well_filler::EMPTY_SAMPLE_NAME,
    error::PlateError,
    parameters::ConverterParameters,
    plate_template::line_records,
};
use csv::{StringRecord, WriterBuilder};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::{collections::HashMap, io::Write};

const SAMPLE_COLUMN: &str = "sample name";
const TARGET_COLUMN: &str = "target name";
const CT_COLUMNS: [&str; 2] = ["ct", "cq"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AverageOptions {
    pub empty_sample_name: String,
    pub include_empty: bool,
}

impl Default for AverageOptions {
    fn default() -> Self {
        Self {
            empty_sample_name: EMPTY_SAMPLE_NAME.to_string(),
            include_empty: false,
        }
    }
}

impl From<&ConverterParameters> for AverageOptions {
    fn from(params: &ConverterParameters) -> Self {
        Self {
            empty_sample_name: params.empty_wells.sample_name.clone(),
            include_empty: params.include_empty_in_averages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicateSummary {
    #[serde(rename = "Sample Name")]
    pub sample_name: String,
    #[serde(rename = "Target Name")]
    pub target_name: String,
    /// Wells with a numeric Ct.
    #[serde(rename = "Replicates")]
    pub replicate_count: usize,
    #[serde(rename = "Undetermined")]
    pub undetermined_count: usize,
    #[serde(rename = "Ct Mean")]
    pub mean_ct: Option<f64>,
    #[serde(rename = "Ct SD")]
    pub std_dev_ct: Option<f64>,
}

struct ResultColumns {
    sample: usize,
    target: usize,
    ct: usize,
}

impl ResultColumns {
    fn detect(record: &StringRecord) -> Option<Self> {
        let find = |names: &[&str]| {
            record
                .iter()
                .position(|f| names.contains(&f.trim().to_lowercase().as_str()))
        };
        Some(Self {
            sample: find(&[SAMPLE_COLUMN])?,
            target: find(&[TARGET_COLUMN])?,
            ct: find(&CT_COLUMNS)?,
        })
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[derive(Default)]
struct Group {
    sample_name: String,
    target_name: String,
    values: Vec<f64>,
    undetermined: usize,
}

impl Group {
    fn summarize(self) -> ReplicateSummary {
        let mean_ct = if self.values.is_empty() {
            None
        } else {
            Some(round3(self.values.iter().mean()))
        };
        let std_dev_ct = if self.values.len() < 2 {
            None
        } else {
            Some(round3(self.values.iter().std_dev()))
        };
        ReplicateSummary {
            sample_name: self.sample_name,
            target_name: self.target_name,
            replicate_count: self.values.len(),
            undetermined_count: self.undetermined,
            mean_ct,
            std_dev_ct,
        }
    }
}

/// Groups result lines by sample and target, in first-seen order.
///
/// The table starts at the first line naming the sample, target and Ct
/// columns and ends at a blank line or the next `[Section]` marker.
/// Non-numeric Ct values such as `Undetermined` are counted, not averaged.
pub fn average_results_csv(
    text: &str,
    options: &AverageOptions,
) -> Result<Vec<ReplicateSummary>, PlateError> {
    let mut columns: Option<ResultColumns> = None;
    let mut groups: Vec<Group> = vec![];
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut skipped = 0;

    for record in line_records(text)? {
        if columns.is_none() {
            columns = ResultColumns::detect(&record);
            continue;
        }
        let Some(cols) = columns.as_ref() else {
            continue;
        };
        let first = record.get(0).map(|s| s.trim()).unwrap_or_default();
        if record.iter().all(|f| f.trim().is_empty()) || first.starts_with('[') {
            break;
        }
        let sample = record.get(cols.sample).map(|s| s.trim()).unwrap_or_default();
        let target = record.get(cols.target).map(|s| s.trim()).unwrap_or_default();
        if sample.is_empty() || target.is_empty() {
            skipped += 1;
            continue;
        }
        if !options.include_empty && sample.eq_ignore_ascii_case(&options.empty_sample_name) {
            skipped += 1;
            continue;
        }
        let key = (sample.to_string(), target.to_string());
        let idx = *index.entry(key).or_insert_with(|| {
            groups.push(Group {
                sample_name: sample.to_string(),
                target_name: target.to_string(),
                ..Group::default()
            });
            groups.len() - 1
        });
        let group = &mut groups[idx];
        match record
            .get(cols.ct)
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
        {
            Some(value) => group.values.push(value),
            None => group.undetermined += 1,
        }
    }

    if columns.is_none() {
        return Err(PlateError::invalid_input(
            "No results table found: need 'Sample Name', 'Target Name' and 'CT' columns",
        ));
    }
    debug!("Skipped {skipped} result lines without a usable sample");
    let ret: Vec<ReplicateSummary> = groups.into_iter().map(Group::summarize).collect();
    info!("Averaged {} sample/target groups", ret.len());
    Ok(ret)
}

pub fn average_results_path(
    path: &str,
    options: &AverageOptions,
) -> Result<Vec<ReplicateSummary>, PlateError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        let mut err = PlateError::from(e);
        err.message = format!("Could not read results '{path}': {}", err.message);
        err
    })?;
    average_results_csv(&text, options)
}

pub fn write_summary_csv<W: Write>(
    summaries: &[ReplicateSummary],
    writer: W,
) -> Result<(), PlateError> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
    for summary in summaries {
        wtr.serialize(summary)?;
    }
    wtr.flush()?;
    Ok(())
}

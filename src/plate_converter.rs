//! Turns a 96-well template grid into 384-well sample setup rows.

use crate::{
    coordinate_mapper::{PlateFormat, WellPosition},
    empty_well_filler::fill_empty_wells,
    error::PlateError,
    parameters::ConverterParameters,
    plate_template::PlateGrid,
    target_panel::TargetPanel,
    well_record::{WellRecord, expand_replicates, flatten_record, flatten_records},
};
use itertools::Itertools;
use log::{debug, info, warn};
use plate384_protocol::{OutputRow, ReplicateMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionReport {
    pub replicate_mode: Option<ReplicateMode>,
    pub sample_count: usize,
    pub empty_well_count: usize,
    pub row_count: usize,
    pub warnings: Vec<String>,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Conversion {
    pub records: Vec<WellRecord>,
    pub empty_records: Vec<WellRecord>,
    pub rows: Vec<OutputRow>,
    pub report: ConversionReport,
}

/// One unresolved record per grid cell, row-major, numbered from 1.
pub fn convert_to_wells(grid: &PlateGrid, panel: &TargetPanel, skip_blank: bool) -> Vec<WellRecord> {
    grid.cells()
        .filter(|(_, name)| !(skip_blank && name.is_empty()))
        .enumerate()
        .map(|(idx, (position, name))| WellRecord::new(idx + 1, name, position, panel))
        .collect()
}

fn position_sort_key(row: &OutputRow) -> Option<(u8, u8)> {
    WellPosition::parse(&row.well_position, PlateFormat::Plate384)
        .ok()
        .map(|pos| (pos.row_letter() as u8, pos.column()))
}

/// Orders rows by row letter, then numeric column. Rows without a readable
/// position keep their slot; rows sharing a position keep their order.
pub fn sort_rows_by_position(rows: &mut [OutputRow]) {
    let slots: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| position_sort_key(row).is_some())
        .map(|(idx, _)| idx)
        .collect();
    let sorted: Vec<OutputRow> = slots
        .iter()
        .map(|&idx| rows[idx].clone())
        .sorted_by_key(position_sort_key)
        .collect();
    for (slot, row) in slots.into_iter().zip(sorted) {
        rows[slot] = row;
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlateConverter {
    params: ConverterParameters,
}

impl PlateConverter {
    pub fn new(params: ConverterParameters) -> Self {
        Self { params }
    }

    pub fn parameters(&self) -> &ConverterParameters {
        &self.params
    }

    pub fn convert(&self, grid: &PlateGrid, panel: &TargetPanel) -> Result<Conversion, PlateError> {
        let mut report = ConversionReport::default();
        if let Some(warning) = panel.mismatch_warning() {
            warn!("{warning}");
            report.warnings.push(warning);
        }
        if panel.is_empty() {
            let warning = "Target panel is empty, no sample setup rows will be written".to_string();
            warn!("{warning}");
            report.warnings.push(warning);
        }

        let mut records = convert_to_wells(grid, panel, self.params.skip_blank_samples);
        report.sample_count = records.len();
        debug!(
            "Read {} samples from {} template cells",
            records.len(),
            grid.cell_count()
        );

        let mut empty_records = vec![];
        let mut rows = vec![];
        match ReplicateMode::parse(&self.params.replicate_mode) {
            Some(mode) => {
                report.replicate_mode = Some(mode);
                debug!(
                    "Placing each sample in {} of 4 quadrant wells",
                    mode.replicate_count()
                );
                for record in records.iter_mut() {
                    expand_replicates(record, mode)?;
                    let empties = fill_empty_wells(record, mode, &self.params.empty_wells)?;
                    rows.extend(flatten_record(record));
                    rows.extend(flatten_records(&empties));
                    empty_records.extend(empties);
                }
            }
            None => {
                let warning = format!(
                    "No replicate function available for '{}', expected one of: {}",
                    self.params.replicate_mode,
                    [ReplicateMode::Duplicates, ReplicateMode::Triplicates]
                        .iter()
                        .map(|m| m.as_str())
                        .join(", ")
                );
                warn!("{warning}");
                report.warnings.push(warning);
            }
        }

        if self.params.sort_output {
            sort_rows_by_position(&mut rows);
            report
                .messages
                .push("Sorted rows by 384-well position".to_string());
        }

        report.empty_well_count = empty_records.len();
        report.row_count = rows.len();
        let summary = format!(
            "Converted {} samples into {} rows ({} empty wells)",
            report.sample_count, report.row_count, report.empty_well_count
        );
        info!("{summary}");
        report.messages.push(summary);

        Ok(Conversion {
            records,
            empty_records,
            rows,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn grid(rows: &[&[&str]]) -> PlateGrid {
        PlateGrid::from_rows(rows.iter().map(|r| strings(r)).collect()).unwrap()
    }

    fn converter(mode: &str) -> PlateConverter {
        PlateConverter::new(ConverterParameters {
            replicate_mode: mode.to_string(),
            ..ConverterParameters::default()
        })
    }

    fn row_at(position: &str) -> OutputRow {
        OutputRow {
            well_position: position.to_string(),
            ..OutputRow::default()
        }
    }

    #[test]
    fn test_single_sample_triplicates() {
        let panel = TargetPanel::from_lists(strings(&["T1", "T2"]), strings(&["R1", "R2"]));
        let conv = converter("triplicates")
            .convert(&grid(&[&["S1"]]), &panel)
            .unwrap();
        assert_eq!(conv.rows.len(), 8);
        assert_eq!(conv.report.row_count, 8);
        assert_eq!(conv.report.empty_well_count, 1);

        let sample: Vec<(String, String, Option<u32>)> = conv
            .rows
            .iter()
            .filter(|r| r.sample_name == "S1")
            .map(|r| (r.well_position.clone(), r.target_name.clone(), r.well))
            .collect();
        assert_eq!(
            sample,
            vec![
                ("A1".to_string(), "T1".to_string(), Some(1)),
                ("A1".to_string(), "T2".to_string(), Some(1)),
                ("A2".to_string(), "T1".to_string(), Some(2)),
                ("A2".to_string(), "T2".to_string(), Some(2)),
                ("B2".to_string(), "T1".to_string(), Some(26)),
                ("B2".to_string(), "T2".to_string(), Some(26)),
            ]
        );
        let empty: Vec<&OutputRow> = conv.rows.iter().filter(|r| r.sample_name == "EMPTY").collect();
        assert_eq!(empty.len(), 2);
        assert!(empty.iter().all(|r| r.well_position == "B1" && r.well.is_none()));
        assert_eq!(empty[1].reporter, "R2");
    }

    #[test]
    fn test_duplicates_counts() {
        let panel = TargetPanel::default();
        let conv = converter("duplicates")
            .convert(&grid(&[&["S1", "S2"], &["S3"]]), &panel)
            .unwrap();
        assert_eq!(conv.records.len(), 3);
        assert_eq!(conv.empty_records.len(), 6);
        assert_eq!(conv.rows.len(), 3 * 2 * 5 + 6 * 5);
        assert!(conv.records.iter().all(|r| r.well384_positions().len() == 2));
    }

    #[test]
    fn test_source_numbering_is_sequential() {
        let conv = converter("triplicates")
            .convert(&grid(&[&["S1", "S2"], &["S3"]]), &TargetPanel::default())
            .unwrap();
        let numbers: Vec<usize> = conv.records.iter().map(|r| r.well96_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(conv.records[2].well96_position.label(), "B1");
    }

    #[test]
    fn test_skip_blank_samples() {
        let g = grid(&[&["S1", "", "S3"]]);
        let panel = TargetPanel::default();
        assert_eq!(convert_to_wells(&g, &panel, false).len(), 3);
        let kept = convert_to_wells(&g, &panel, true);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].well96_number, 2);
        assert_eq!(kept[1].well96_position.label(), "A3");
    }

    #[test]
    fn test_unknown_mode_yields_no_rows() {
        let conv = converter("quadruplicates")
            .convert(&grid(&[&["S1"]]), &TargetPanel::default())
            .unwrap();
        assert!(conv.rows.is_empty());
        assert!(conv.empty_records.is_empty());
        assert_eq!(conv.records.len(), 1);
        assert!(!conv.records[0].is_resolved());
        assert_eq!(conv.report.replicate_mode, None);
        assert_eq!(conv.report.warnings.len(), 1);
    }

    #[test]
    fn test_conversion_is_repeatable() {
        let g = grid(&[&["S1", "S2", "S3"], &["S4"]]);
        let panel = TargetPanel::default();
        let c = converter("triplicates");
        let first = c.convert(&g, &panel).unwrap();
        let second = c.convert(&g, &panel).unwrap();
        assert_eq!(first.rows, second.rows);
    }

    #[test]
    fn test_mismatched_panel_warns() {
        let panel = TargetPanel::from_lists(strings(&["T1", "T2"]), strings(&["R1"]));
        let conv = converter("triplicates")
            .convert(&grid(&[&["S1"]]), &panel)
            .unwrap();
        assert_eq!(conv.rows.len(), 8);
        assert_eq!(conv.report.warnings.len(), 1);
        assert!(conv.rows.iter().filter(|r| r.target_name == "T2").all(|r| r.reporter.is_empty()));
    }

    #[test]
    fn test_sort_rows_by_position() {
        let mut rows = vec![
            row_at("B1"),
            row_at("A10"),
            row_at("garbage"),
            row_at("A2"),
            row_at("A1"),
        ];
        sort_rows_by_position(&mut rows);
        let order: Vec<&str> = rows.iter().map(|r| r.well_position.as_str()).collect();
        assert_eq!(order, vec!["A1", "A2", "garbage", "A10", "B1"]);
    }

    #[test]
    fn test_sort_is_stable_for_targets() {
        let params = ConverterParameters {
            sort_output: true,
            ..ConverterParameters::default()
        };
        let panel = TargetPanel::from_lists(strings(&["T1", "T2"]), strings(&["R1", "R2"]));
        let conv = PlateConverter::new(params)
            .convert(&grid(&[&["S1", "S2"]]), &panel)
            .unwrap();
        let order: Vec<(String, String)> = conv
            .rows
            .iter()
            .map(|r| (r.well_position.clone(), r.target_name.clone()))
            .collect();
        assert_eq!(order[0], ("A1".to_string(), "T1".to_string()));
        assert_eq!(order[1], ("A1".to_string(), "T2".to_string()));
        assert_eq!(order[2], ("A2".to_string(), "T1".to_string()));
        assert_eq!(order[4], ("A3".to_string(), "T1".to_string()));
        assert_eq!(order[8], ("B1".to_string(), "T1".to_string()));
        assert_eq!(order.last().unwrap().0, "B4");
        assert!(conv.report.messages.iter().any(|m| m.contains("Sorted")));
    }

    #[test]
    fn test_template_to_sample_setup() {
        use crate::{plate_template::TemplateLayout, sample_setup::sample_setup_to_string};
        let template = "Plate,,\n,1,2\nA,S1,S2\n";
        let g = PlateGrid::from_template_csv(template, &TemplateLayout::default()).unwrap();
        let panel = TargetPanel::from_lists(strings(&["T1"]), strings(&["FAM"]));
        let conv = converter("triplicates").convert(&g, &panel).unwrap();
        let text = sample_setup_to_string(&conv.rows).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2 + 8);
        assert_eq!(lines[2], "1,A1,S1,,,,T1,,,FAM,,,");
        assert_eq!(lines[4], "26,B2,S1,,,,T1,,,FAM,,,");
        assert_eq!(lines[5], ",B1,EMPTY,\"RGB(255,255,255)\",,,T1,,,FAM,,,");
        assert_eq!(lines[6], "3,A3,S2,,,,T1,,,FAM,,,");
    }
}

use crate::{
    coordinate_mapper::unfilled_positions,
    error::PlateError,
    well_record::{ResolvedWell, WellRecord},
};
use plate384_protocol::ReplicateMode;
use serde::{Deserialize, Serialize};

pub const EMPTY_SAMPLE_NAME: &str = "EMPTY";
pub const EMPTY_SAMPLE_COLOR: &str = "RGB(255,255,255)";

/// How placeholder wells are labelled in the sample setup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmptyWellStyle {
    pub sample_name: String,
    pub sample_color: String,
}

impl Default for EmptyWellStyle {
    fn default() -> Self {
        Self {
            sample_name: EMPTY_SAMPLE_NAME.to_string(),
            sample_color: EMPTY_SAMPLE_COLOR.to_string(),
        }
    }
}

/// Placeholder records for the quadrant slots that `mode` leaves free around
/// `source`: bottom-left for triplicates, bottom-left and bottom-right for
/// duplicates. Placeholders keep the assay of `source` but get no well number.
pub fn fill_empty_wells(
    source: &WellRecord,
    mode: ReplicateMode,
    style: &EmptyWellStyle,
) -> Result<Vec<WellRecord>, PlateError> {
    Ok(unfilled_positions(source.well96_position, mode)?
        .into_iter()
        .map(|position| {
            let mut placeholder = source.clone();
            placeholder.sample_name = style.sample_name.clone();
            placeholder.sample_color = style.sample_color.clone();
            placeholder.resolved = vec![ResolvedWell {
                position,
                well_number: None,
            }];
            placeholder
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        coordinate_mapper::{PlateFormat, WellPosition},
        target_panel::TargetPanel,
        well_record::flatten_record,
    };

    fn source(well: &str) -> WellRecord {
        let pos = WellPosition::parse(well, PlateFormat::Plate96).unwrap();
        WellRecord::new(7, "S7", pos, &TargetPanel::default())
    }

    #[test]
    fn test_triplicates_fill_bottom_left() {
        let empties = fill_empty_wells(&source("A1"), ReplicateMode::Triplicates, &EmptyWellStyle::default())
            .unwrap();
        assert_eq!(empties.len(), 1);
        let empty = &empties[0];
        assert_eq!(empty.sample_name, "EMPTY");
        assert_eq!(empty.sample_color, EMPTY_SAMPLE_COLOR);
        assert_eq!(empty.well384_positions()[0].label(), "B1");
        assert_eq!(empty.well_numbers(), vec![None]);
        assert_eq!(empty.targets, TargetPanel::default().targets());
    }

    #[test]
    fn test_duplicates_fill_bottom_row() {
        let empties = fill_empty_wells(&source("H12"), ReplicateMode::Duplicates, &EmptyWellStyle::default())
            .unwrap();
        let labels: Vec<String> = empties
            .iter()
            .map(|e| e.well384_positions()[0].label())
            .collect();
        assert_eq!(labels, vec!["P23", "P24"]);
        assert!(empties.iter().all(|e| e.resolved().len() == 1));
    }

    #[test]
    fn test_custom_style_and_blank_well_number() {
        let style = EmptyWellStyle {
            sample_name: "NTC".to_string(),
            sample_color: "RGB(0,0,0)".to_string(),
        };
        let empties = fill_empty_wells(&source("B2"), ReplicateMode::Triplicates, &style).unwrap();
        let rows = flatten_record(&empties[0]);
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.sample_name == "NTC"));
        assert!(rows.iter().all(|r| r.well.is_none()));
        assert!(rows.iter().all(|r| r.well_position == "D3"));
    }
}

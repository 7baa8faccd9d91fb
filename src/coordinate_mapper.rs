//! 96-well to 384-well coordinate mapping.
//!
//! A 384-well plate holds four interleaved 96-well quadrants. Every source
//! well owns a 2x2 block on the denser plate: source row offset `R` covers
//! destination rows `2R` and `2R+1`, source column `C` covers destination
//! columns `2C-1` and `2C`.

use crate::error::PlateError;
use plate384_protocol::ReplicateMode;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::LazyLock};

static WELL_POSITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z])0*([0-9]{1,3})$").expect("Well position regex does not compile")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlateFormat {
    Plate96,
    Plate384,
}

impl PlateFormat {
    pub fn rows(self) -> u8 {
        match self {
            Self::Plate96 => 8,
            Self::Plate384 => 16,
        }
    }

    pub fn columns(self) -> u8 {
        match self {
            Self::Plate96 => 12,
            Self::Plate384 => 24,
        }
    }

    pub fn contains(self, position: WellPosition) -> bool {
        position.row < self.rows() && position.column >= 1 && position.column <= self.columns()
    }
}

#[derive(Deserialize)]
struct RawWellPosition {
    row: u8,
    column: u8,
}

/// A well on a plate: zero-based row offset from `A` and one-based column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawWellPosition")]
pub struct WellPosition {
    row: u8,
    column: u8,
}

impl TryFrom<RawWellPosition> for WellPosition {
    type Error = PlateError;

    // The 384-well plate is the widest format in use.
    fn try_from(raw: RawWellPosition) -> Result<Self, Self::Error> {
        Self::new(raw.row, raw.column, PlateFormat::Plate384)
    }
}

impl WellPosition {
    pub fn new(row: u8, column: u8, format: PlateFormat) -> Result<Self, PlateError> {
        let ret = Self { row, column };
        if !format.contains(ret) {
            return Err(PlateError::invalid_input(format!(
                "Well row {row}/column {column} is outside a {format:?} plate"
            )));
        }
        Ok(ret)
    }

    /// Parses labels such as `A1`, `h12` or `B07`.
    pub fn parse(text: &str, format: PlateFormat) -> Result<Self, PlateError> {
        let text = text.trim();
        let caps = WELL_POSITION_RE
            .captures(text)
            .ok_or_else(|| PlateError::invalid_input(format!("Malformed well position '{text}'")))?;
        let letter = caps[1].as_bytes()[0].to_ascii_uppercase();
        let column: u8 = caps[2]
            .parse()
            .map_err(|_| PlateError::invalid_input(format!("Malformed well column in '{text}'")))?;
        Self::new(letter - b'A', column, format)
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn column(&self) -> u8 {
        self.column
    }

    pub fn row_letter(&self) -> char {
        (b'A' + self.row) as char
    }

    pub fn label(&self) -> String {
        format!("{}{}", self.row_letter(), self.column)
    }

    /// Linear, one-based well number counted row by row.
    pub fn well_number(&self, format: PlateFormat) -> u32 {
        self.row as u32 * format.columns() as u32 + self.column as u32
    }
}

impl fmt::Display for WellPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_letter(), self.column)
    }
}

/// The 2x2 block a 96-well source occupies on the 384-well plate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuadrantBlock {
    pub top_row: u8,
    pub bottom_row: u8,
    pub start_column: u8,
    pub end_column: u8,
}

impl QuadrantBlock {
    pub fn for_source(source: WellPosition) -> Result<Self, PlateError> {
        if !PlateFormat::Plate96.contains(source) {
            return Err(PlateError::invalid_input(format!(
                "Source well {source} is not on a 96-well plate"
            )));
        }
        let top_row = source.row * 2;
        let end_column = source.column * 2;
        Ok(Self {
            top_row,
            bottom_row: top_row + 1,
            start_column: end_column - 1,
            end_column,
        })
    }

    fn at(row: u8, column: u8) -> WellPosition {
        // Rows 0..=15 and columns 1..=24 by construction from a 96-well source.
        WellPosition { row, column }
    }

    pub fn top_left(&self) -> WellPosition {
        Self::at(self.top_row, self.start_column)
    }

    pub fn top_right(&self) -> WellPosition {
        Self::at(self.top_row, self.end_column)
    }

    pub fn bottom_left(&self) -> WellPosition {
        Self::at(self.bottom_row, self.start_column)
    }

    pub fn bottom_right(&self) -> WellPosition {
        Self::at(self.bottom_row, self.end_column)
    }

    pub fn filled(&self, mode: ReplicateMode) -> Vec<WellPosition> {
        match mode {
            ReplicateMode::Triplicates => {
                vec![self.top_left(), self.top_right(), self.bottom_right()]
            }
            ReplicateMode::Duplicates => vec![self.top_left(), self.top_right()],
        }
    }

    pub fn unfilled(&self, mode: ReplicateMode) -> Vec<WellPosition> {
        match mode {
            ReplicateMode::Triplicates => vec![self.bottom_left()],
            ReplicateMode::Duplicates => vec![self.bottom_left(), self.bottom_right()],
        }
    }
}

/// A resolved 384-well destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedWell {
    pub position: WellPosition,
    pub well_number: u32,
}

/// Destination wells for `source` under `mode`, in top-left, top-right,
/// bottom-right order.
pub fn map_source_well(
    source: WellPosition,
    mode: ReplicateMode,
) -> Result<Vec<MappedWell>, PlateError> {
    let block = QuadrantBlock::for_source(source)?;
    Ok(block
        .filled(mode)
        .into_iter()
        .map(|position| MappedWell {
            position,
            well_number: position.well_number(PlateFormat::Plate384),
        })
        .collect())
}

/// The quadrant slots `mode` leaves free for `source`.
pub fn unfilled_positions(
    source: WellPosition,
    mode: ReplicateMode,
) -> Result<Vec<WellPosition>, PlateError> {
    Ok(QuadrantBlock::for_source(source)?.unfilled(mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p96(text: &str) -> WellPosition {
        WellPosition::parse(text, PlateFormat::Plate96).unwrap()
    }

    fn labels(wells: &[MappedWell]) -> Vec<String> {
        wells.iter().map(|w| w.position.label()).collect()
    }

    fn numbers(wells: &[MappedWell]) -> Vec<u32> {
        wells.iter().map(|w| w.well_number).collect()
    }

    #[test]
    fn test_deserialize_rejects_off_plate_rows() {
        let pos: WellPosition = serde_json::from_str(r#"{"row":15,"column":24}"#).unwrap();
        assert_eq!(pos.label(), "P24");
        assert!(serde_json::from_str::<WellPosition>(r#"{"row":200,"column":1}"#).is_err());
        assert!(serde_json::from_str::<WellPosition>(r#"{"row":0,"column":0}"#).is_err());
    }

    #[test]
    fn test_parse_positions() {
        let pos = p96("h12");
        assert_eq!(pos.row(), 7);
        assert_eq!(pos.column(), 12);
        assert_eq!(pos.label(), "H12");
        assert_eq!(p96("B07").label(), "B7");
        assert!(WellPosition::parse("I1", PlateFormat::Plate96).is_err());
        assert!(WellPosition::parse("A13", PlateFormat::Plate96).is_err());
        assert!(WellPosition::parse("A0", PlateFormat::Plate96).is_err());
        assert!(WellPosition::parse("1A", PlateFormat::Plate96).is_err());
        assert!(WellPosition::parse("", PlateFormat::Plate96).is_err());
        assert!(WellPosition::parse("P24", PlateFormat::Plate384).is_ok());
        assert!(WellPosition::parse("Q1", PlateFormat::Plate384).is_err());
    }

    #[test]
    fn test_triplicates_a1() {
        let wells = map_source_well(p96("A1"), ReplicateMode::Triplicates).unwrap();
        assert_eq!(labels(&wells), vec!["A1", "A2", "B2"]);
        assert_eq!(numbers(&wells), vec![1, 2, 26]);
    }

    #[test]
    fn test_triplicates_h12() {
        let wells = map_source_well(p96("H12"), ReplicateMode::Triplicates).unwrap();
        assert_eq!(labels(&wells), vec!["O23", "O24", "P24"]);
        assert_eq!(numbers(&wells), vec![359, 360, 384]);
    }

    #[test]
    fn test_duplicates_use_distinct_columns() {
        let wells = map_source_well(p96("C5"), ReplicateMode::Duplicates).unwrap();
        assert_eq!(labels(&wells), vec!["E9", "E10"]);
        assert_eq!(numbers(&wells), vec![4 * 24 + 9, 4 * 24 + 10]);
    }

    #[test]
    fn test_every_source_well_maps_fully() {
        for row in 0..8 {
            for column in 1..=12 {
                let source = WellPosition::new(row, column, PlateFormat::Plate96).unwrap();
                for mode in [ReplicateMode::Duplicates, ReplicateMode::Triplicates] {
                    let wells = map_source_well(source, mode).unwrap();
                    assert_eq!(wells.len(), mode.replicate_count());
                    for well in &wells {
                        assert!(PlateFormat::Plate384.contains(well.position));
                        assert!((1..=384).contains(&well.well_number));
                    }
                    let free = unfilled_positions(source, mode).unwrap();
                    assert_eq!(free.len() + wells.len(), 4);
                    assert!(free.iter().all(|f| wells.iter().all(|w| w.position != *f)));
                }
            }
        }
    }

    #[test]
    fn test_unfilled_slots() {
        let free = unfilled_positions(p96("A1"), ReplicateMode::Triplicates).unwrap();
        assert_eq!(free, vec![WellPosition { row: 1, column: 1 }]);
        let free = unfilled_positions(p96("A1"), ReplicateMode::Duplicates).unwrap();
        let free: Vec<String> = free.iter().map(|p| p.label()).collect();
        assert_eq!(free, vec!["B1", "B2"]);
    }

    #[test]
    fn test_rejects_384_only_source() {
        let source = WellPosition::parse("J20", PlateFormat::Plate384).unwrap();
        assert!(map_source_well(source, ReplicateMode::Triplicates).is_err());
    }
}

//! Reading the 96-well template sheet.

use crate::{
    coordinate_mapper::{PlateFormat, WellPosition},
    error::PlateError,
};
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};

/// Where the sample block sits inside a template sheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateLayout {
    /// Lines above row `A` (title, column numbers).
    pub header_rows: usize,
    /// Cells left of column `1` (row letters).
    pub label_columns: usize,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            header_rows: 2,
            label_columns: 1,
        }
    }
}

/// Parses `text` one physical line at a time. Blank lines come back as
/// empty records, so record `N` is always line `N + 1`.
pub(crate) fn line_records(text: &str) -> Result<Vec<StringRecord>, PlateError> {
    text.lines()
        .map(|line| -> Result<StringRecord, PlateError> {
            let mut rdr = ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_reader(line.as_bytes());
            Ok(rdr.records().next().transpose()?.unwrap_or_default())
        })
        .collect()
}

#[derive(Deserialize)]
struct RawPlateGrid {
    rows: Vec<Vec<String>>,
}

/// Sample names laid out as on a 96-well plate, row `A` first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPlateGrid")]
pub struct PlateGrid {
    rows: Vec<Vec<String>>,
}

impl TryFrom<RawPlateGrid> for PlateGrid {
    type Error = PlateError;

    fn try_from(raw: RawPlateGrid) -> Result<Self, Self::Error> {
        Self::from_rows(raw.rows)
    }
}

impl PlateGrid {
    pub fn from_rows(rows: Vec<Vec<String>>) -> Result<Self, PlateError> {
        let rows_max = PlateFormat::Plate96.rows() as usize;
        let columns_max = PlateFormat::Plate96.columns() as usize;
        if rows.len() > rows_max {
            return Err(PlateError::invalid_input(format!(
                "Template has {} sample rows, a 96-well plate has {rows_max}",
                rows.len()
            )));
        }
        let mut ret = Vec::with_capacity(rows.len());
        for (idx, row) in rows.into_iter().enumerate() {
            let mut row: Vec<String> = row.into_iter().map(|s| s.trim().to_string()).collect();
            while row.last().is_some_and(|s| s.is_empty()) {
                row.pop();
            }
            if row.len() > columns_max {
                return Err(PlateError::invalid_input(format!(
                    "Template row {} has {} sample columns, a 96-well plate has {columns_max}",
                    (b'A' + idx as u8) as char,
                    row.len()
                )));
            }
            ret.push(row);
        }
        Ok(Self { rows: ret })
    }

    pub fn from_template_csv(text: &str, layout: &TemplateLayout) -> Result<Self, PlateError> {
        let rows = line_records(text)?
            .into_iter()
            .skip(layout.header_rows)
            .take(PlateFormat::Plate96.rows() as usize)
            .map(|record| {
                record
                    .iter()
                    .skip(layout.label_columns)
                    .map(|s| s.to_string())
                    .collect()
            })
            .collect();
        Self::from_rows(rows)
    }

    pub fn from_template_path(path: &str, layout: &TemplateLayout) -> Result<Self, PlateError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            let mut err = PlateError::from(e);
            err.message = format!("Could not read template '{path}': {}", err.message);
            err
        })?;
        Self::from_template_csv(&text, layout).map_err(|e| PlateError {
            code: e.code,
            message: format!("Bad template '{path}': {}", e.message),
        })
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Every cell in row-major order with its 96-well position.
    pub fn cells(&self) -> impl Iterator<Item = (WellPosition, &str)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells.iter().enumerate().filter_map(move |(column, name)| {
                WellPosition::new(row as u8, column as u8 + 1, PlateFormat::Plate96)
                    .ok()
                    .map(|pos| (pos, name.as_str()))
            })
        })
    }

    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(|r| r.len()).sum()
    }
}

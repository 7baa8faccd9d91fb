//! Writing `[Sample Setup]` sheets for instrument import.

use crate::{error::PlateError, parameters::DEFAULT_OUTPUT_SUFFIX};
use csv::WriterBuilder;
use plate384_protocol::{OutputRow, SAMPLE_SETUP_HEADER, SAMPLE_SETUP_MARKER};
use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

/// Marker line, column header, then one line per row.
pub fn write_sample_setup<W: Write>(rows: &[OutputRow], writer: W) -> Result<(), PlateError> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);
    wtr.write_record([SAMPLE_SETUP_MARKER])?;
    wtr.write_record(SAMPLE_SETUP_HEADER)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn sample_setup_to_string(rows: &[OutputRow]) -> Result<String, PlateError> {
    let mut buffer = vec![];
    write_sample_setup(rows, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| format!("Sample setup is not UTF-8: {e}").into())
}

pub fn write_sample_setup_file(rows: &[OutputRow], path: &Path) -> Result<(), PlateError> {
    let file = File::create(path).map_err(|e| {
        let mut err = PlateError::from(e);
        err.message = format!("Could not create '{}': {}", path.display(), err.message);
        err
    })?;
    write_sample_setup(rows, file)
}

/// `plate.csv` becomes `plate-384Well.csv` next to the input; names without
/// a `.csv` extension get the suffix appended.
pub fn output_file_name(input: &Path, suffix: &str) -> PathBuf {
    let suffix = if suffix.is_empty() {
        DEFAULT_OUTPUT_SUFFIX
    } else {
        suffix
    };
    let file_name = input
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem = match file_name.strip_suffix(".csv") {
        Some(stem) => stem.to_string(),
        None => file_name,
    };
    input.with_file_name(format!("{stem}{suffix}"))
}

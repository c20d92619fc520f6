//! CSV encoding of a report.

use std::path::Path;

use csv::StringRecord;

use super::Report;
use crate::error::ReportError;

/// Lets spreadsheet applications detect UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub(super) fn read(path: &Path) -> Result<Report, ReportError> {
    let read_err = |source| ReportError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(read_err)?;
    let header: StringRecord = reader
        .headers()
        .map_err(read_err)?
        .iter()
        .enumerate()
        .map(|(i, field)| if i == 0 { field.trim_start_matches('\u{feff}') } else { field })
        .collect();
    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_err)?;

    Ok(Report { header, rows })
}

pub(super) fn render(report: &Report, path: &Path) -> Result<Vec<u8>, ReportError> {
    let write_err = |source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut wtr = csv::Writer::from_writer(UTF8_BOM.to_vec());
    wtr.write_record(&report.header)
        .map_err(|e| write_err(e.into()))?;
    for row in &report.rows {
        wtr.write_record(row).map_err(|e| write_err(e.into()))?;
    }
    wtr.into_inner().map_err(|e| write_err(e.into_error()))
}

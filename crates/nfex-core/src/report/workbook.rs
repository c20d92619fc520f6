//! xlsx encoding of a report.

use std::iter;
use std::path::Path;

use calamine::{Reader, Xlsx, open_workbook};
use csv::StringRecord;
use rust_xlsxwriter::Workbook;

use super::{Report, SHEET_NAME};
use crate::error::ReportError;

/// Read the report sheet, or the first sheet of a workbook without one.
pub(super) fn read(path: &Path) -> Result<Report, ReportError> {
    let read_err = |source| ReportError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook: Xlsx<_> = open_workbook(path).map_err(read_err)?;
    let names = workbook.sheet_names();
    let Some(sheet) = names
        .iter()
        .find(|name| name.as_str() == SHEET_NAME)
        .or_else(|| names.first())
    else {
        return Ok(Report {
            header: StringRecord::new(),
            rows: Vec::new(),
        });
    };

    let range = workbook.worksheet_range(sheet).map_err(read_err)?;
    let mut rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect::<StringRecord>());
    let header = rows.next().unwrap_or_default();

    Ok(Report {
        header,
        rows: rows.collect(),
    })
}

/// Every cell is written as a string so values stay verbatim.
pub(super) fn render(report: &Report, path: &Path) -> Result<Vec<u8>, ReportError> {
    let render_err = |source| ReportError::Render {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).map_err(render_err)?;

    let records = iter::once(&report.header).chain(&report.rows);
    for (row, record) in (0u32..).zip(records) {
        for (col, value) in (0u16..).zip(record.iter()) {
            worksheet.write_string(row, col, value).map_err(render_err)?;
        }
    }
    worksheet.autofit();

    workbook.save_to_buffer().map_err(render_err)
}

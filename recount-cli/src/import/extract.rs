//! Read one named sheet into field-value records

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};

use super::record::{cell_to_value, Record};

/// Read a sheet's rows in source order. The first row supplies the field
/// names; fully empty rows are dropped.
///
/// Fails when the workbook cannot be opened or the sheet does not exist;
/// callers catch this per entity type so other sheets still run.
pub fn read_sheet(path: &Path, sheet: &str) -> Result<Vec<Record>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("Failed to read sheet: {}", sheet))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|c| match c {
                Data::String(s) => s.trim().to_string(),
                other => other.to_string().trim().to_string(),
            })
            .collect(),
        None => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    for (idx, row) in rows.enumerate() {
        let mut fields = HashMap::new();
        for (col, cell) in row.iter().enumerate() {
            let header = match headers.get(col) {
                Some(h) if !h.is_empty() => h,
                _ => continue,
            };
            fields.insert(header.clone(), cell_to_value(cell));
        }

        // Header row is row 1; data starts at row 2
        let record = Record::new(idx + 2, fields);
        if record.is_empty() {
            continue;
        }
        records.push(record);
    }

    Ok(records)
}

//! Workbook export and console rendering of extracted records.

use std::path::{Path, PathBuf};

use chrono::Local;
use rust_xlsxwriter::{Format, Workbook};
use tracing::debug;

use crate::error::Result;
use crate::extract::PriceRecord;

/// Column order and header labels of the output sheet.
pub const HEADERS: [&str; 6] = [
    "Rank",
    "Name",
    "Price",
    "24h Change",
    "Market Cap",
    "Timestamp",
];

const FILENAME_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Write `records` to `crypto_prices_<YYYYMMDD_HHMMSS>.xlsx` under `dir`
/// and return the file's path.
///
/// The filename is taken from the wall clock at export time, so two runs
/// within the same second write to the same file and the later one wins.
pub fn write_workbook(records: &[PriceRecord], dir: &Path) -> Result<PathBuf> {
    let filename = format!(
        "crypto_prices_{}.xlsx",
        Local::now().format(FILENAME_TIMESTAMP_FORMAT)
    );
    let path = dir.join(filename);

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();

    for (col, label) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *label, &bold)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_number(row, 0, record.rank)?;
        sheet.write_string(row, 1, record.name.as_str())?;
        sheet.write_string(row, 2, record.price.as_str())?;
        sheet.write_string(row, 3, record.change_24h.as_str())?;
        sheet.write_string(row, 4, record.market_cap.as_str())?;
        sheet.write_string(row, 5, record.timestamp.as_str())?;
    }

    sheet.set_column_width(0, 6)?;
    sheet.set_column_width(1, 18)?;
    sheet.set_column_width(2, 14)?;
    sheet.set_column_width(3, 12)?;
    sheet.set_column_width(4, 16)?;
    sheet.set_column_width(5, 20)?;

    workbook.save(&path)?;
    debug!("wrote {} records to {}", records.len(), path.display());
    Ok(path)
}

/// Render records as an aligned plain-text table, one line per record
/// plus a header line. Column widths fit the longest cell.
pub fn render_table(records: &[PriceRecord]) -> String {
    let rows: Vec<[String; 6]> = records.iter().map(record_cells).collect();

    let mut widths: [usize; 6] = [0; 6];
    for (i, header) in HEADERS.iter().enumerate() {
        widths[i] = header.len();
    }
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut out = String::new();
    render_row(&mut out, &HEADERS.map(str::to_string), &widths);
    for row in &rows {
        render_row(&mut out, row, &widths);
    }
    out
}

fn record_cells(record: &PriceRecord) -> [String; 6] {
    [
        record.rank.to_string(),
        record.name.clone(),
        record.price.clone(),
        record.change_24h.clone(),
        record.market_cap.clone(),
        record.timestamp.clone(),
    ]
}

fn render_row(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let line = cells
        .iter()
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

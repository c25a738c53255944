//! Tabular parser for earnings spreadsheets.
//!
//! Accepts either a workbook (xlsx/xls/xlsb/ods, read with calamine) or
//! delimiter-separated text. The first row is the header; the six columns
//! the pipeline needs are located by exact, case-sensitive name and every
//! other column is ignored.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use chrono::NaiveDate;
use tracing::debug;

use crate::error::{Result, ScorecardError};

/// Sheet written by the FactSet add-in; never holds earnings rows.
pub const CACHE_SHEET: &str = "__FDSCACHE__";

pub const COL_TICKER: &str = "TICKERS";
pub const COL_COMPANY: &str = "COMPANY";
pub const COL_SECTOR: &str = "SECTOR";
pub const COL_DATE: &str = "EPS_ACTUAL_DATE";
pub const COL_ACTUAL: &str = "EPS_ACTUAL";
pub const COL_ESTIMATE: &str = "EPS_ESTIMATE";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const DELIMITERS: [u8; 4] = [b',', b'\t', b';', b'|'];

/// A loosely-typed spreadsheet cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    fn from_data(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
            // The workbook's date system (1900 or 1904) travels with the cell.
            Data::DateTime(dt) => dt
                .as_datetime()
                .map(|dt| Cell::Date(dt.date()))
                .unwrap_or(Cell::Empty),
        }
    }

    fn from_field(field: &str) -> Self {
        if field.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(field.to_string())
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// One data row, projected onto the six columns the pipeline reads.
///
/// Columns missing from the header stay [`Cell::Empty`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub ticker: Cell,
    pub company: Cell,
    pub sector: Cell,
    pub eps_actual_date: Cell,
    pub eps_actual: Cell,
    pub eps_estimate: Cell,
}

/// How the bytes will be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Workbook,
    Delimited(u8),
}

/// Column positions resolved from the header row.
#[derive(Debug, Default)]
struct HeaderMap {
    ticker: Option<usize>,
    company: Option<usize>,
    sector: Option<usize>,
    eps_actual_date: Option<usize>,
    eps_actual: Option<usize>,
    eps_estimate: Option<usize>,
}

impl HeaderMap {
    fn from_header(cells: &[Cell]) -> Self {
        let mut map = HeaderMap::default();

        for (idx, cell) in cells.iter().enumerate() {
            let Cell::Text(name) = cell else { continue };
            let slot = match name.trim() {
                COL_TICKER => &mut map.ticker,
                COL_COMPANY => &mut map.company,
                COL_SECTOR => &mut map.sector,
                COL_DATE => &mut map.eps_actual_date,
                COL_ACTUAL => &mut map.eps_actual,
                COL_ESTIMATE => &mut map.eps_estimate,
                _ => continue,
            };
            // First matching column wins.
            slot.get_or_insert(idx);
        }

        map
    }

    fn project(&self, cells: &[Cell]) -> RawRow {
        let pick = |idx: Option<usize>| {
            idx.and_then(|i| cells.get(i))
                .cloned()
                .unwrap_or_default()
        };

        RawRow {
            ticker: pick(self.ticker),
            company: pick(self.company),
            sector: pick(self.sector),
            eps_actual_date: pick(self.eps_actual_date),
            eps_actual: pick(self.eps_actual),
            eps_estimate: pick(self.eps_estimate),
        }
    }
}

/// Reads the dataset into raw rows, auto-detecting workbook vs. text.
///
/// # Errors
///
/// Returns [`ScorecardError::Parse`] when the workbook is corrupt, has no
/// sheets, or the text is not valid UTF-8.
pub fn parse_table(bytes: &[u8]) -> Result<Vec<RawRow>> {
    let format = detect_format(bytes);
    debug!(?format, bytes = bytes.len(), "Parsing table");

    match format {
        TableFormat::Workbook => parse_workbook(bytes),
        TableFormat::Delimited(delimiter) => parse_delimited(strip_bom(bytes), delimiter),
    }
}

/// Chooses a reader from the leading bytes.
pub fn detect_format(bytes: &[u8]) -> TableFormat {
    if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
        return TableFormat::Workbook;
    }
    TableFormat::Delimited(sniff_delimiter(strip_bom(bytes)))
}

/// Picks the candidate delimiter that occurs most often on the first line.
/// Ties resolve in the order `,` `\t` `;` `|`; no candidate means `,`.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();

    let mut best = (b',', 0usize);
    for delimiter in DELIMITERS {
        let count = first_line.iter().filter(|b| **b == delimiter).count();
        if count > best.1 {
            best = (delimiter, count);
        }
    }
    best.0
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// The first sheet that is not the FactSet cache, or the first sheet when
/// every sheet carries that name.
pub fn select_sheet(names: &[String]) -> Option<&str> {
    names
        .iter()
        .find(|name| name.as_str() != CACHE_SHEET)
        .or_else(|| names.first())
        .map(String::as_str)
}

fn parse_workbook(bytes: &[u8]) -> Result<Vec<RawRow>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ScorecardError::parse(format!("unreadable workbook: {e}")))?;

    let names = workbook.sheet_names();
    let sheet = select_sheet(&names)
        .ok_or_else(|| ScorecardError::parse("workbook contains no sheets"))?
        .to_string();
    debug!(sheet = %sheet, sheets = names.len(), "Selected worksheet");

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| ScorecardError::parse(format!("cannot read sheet '{sheet}': {e}")))?;

    Ok(rows_from_grid(
        range
            .rows()
            .map(|row| row.iter().map(Cell::from_data).collect()),
    ))
}

fn parse_delimited(bytes: &[u8], delimiter: u8) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ScorecardError::parse(e.to_string()))?;
        grid.push(record.iter().map(Cell::from_field).collect::<Vec<_>>());
    }

    Ok(rows_from_grid(grid))
}

/// Treats the first row as the header and projects every non-blank row
/// after it.
fn rows_from_grid<I>(grid: I) -> Vec<RawRow>
where
    I: IntoIterator<Item = Vec<Cell>>,
{
    let mut grid = grid.into_iter();
    let Some(header) = grid.next() else {
        return Vec::new();
    };
    let header = HeaderMap::from_header(&header);

    grid.filter(|cells| !cells.iter().all(Cell::is_blank))
        .map(|cells| header.project(&cells))
        .collect()
}

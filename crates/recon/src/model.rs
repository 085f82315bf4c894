use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Serialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Input tables
// ---------------------------------------------------------------------------

/// A parsed wide table: one header row, string cells.
///
/// Rows may be ragged; [`Table::cell`] reads past the end as an empty cell.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Build a table from string literals. Mostly useful for fixtures.
    pub fn from_rows(name: &str, headers: &[&str], rows: &[&[&str]]) -> Self {
        Self::new(
            name,
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    /// Read delimited text (first line = headers). Cells are whitespace-trimmed.
    pub fn from_delimited(name: &str, text: &str, delimiter: u8) -> Result<Self, ReconError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| ReconError::Io(format!("{name}: {e}")))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| ReconError::Io(format!("{name}: {e}")))?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        Ok(Self::new(name, headers, rows))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Result<usize, ReconError> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| ReconError::MissingColumn {
                table: self.name.clone(),
                column: column.into(),
            })
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, column: &str) -> Result<Vec<&str>, ReconError> {
        let idx = self.column_index(column)?;
        Ok((0..self.rows.len()).map(|r| self.cell(r, idx)).collect())
    }
}

/// Read a file as UTF-8, falling back to Windows-1252 (World Bank exports are
/// often ANSI-encoded).
pub fn read_text_file(path: &Path) -> Result<String, ReconError> {
    let mut file = std::fs::File::open(path).map_err(|e| ReconError::Io(e.to_string()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| ReconError::Io(e.to_string()))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

// ---------------------------------------------------------------------------
// Registry entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryRecord {
    pub code: String,
    pub long_name: String,
    pub region: String,
    pub is_aggregate: bool,
}

// ---------------------------------------------------------------------------
// Annual series
// ---------------------------------------------------------------------------

/// Sparse `year -> value` mapping. `None` is an explicit missing observation,
/// never zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnualSeries {
    values: BTreeMap<i32, Option<f64>>,
}

impl AnnualSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absent years and explicit missing values read the same.
    pub fn get(&self, year: i32) -> Option<f64> {
        self.values.get(&year).copied().flatten()
    }

    pub fn contains_year(&self, year: i32) -> bool {
        self.values.contains_key(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.values.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(i32, Option<f64>)> for AnnualSeries {
    fn from_iter<T: IntoIterator<Item = (i32, Option<f64>)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

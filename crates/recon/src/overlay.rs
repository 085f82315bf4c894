use std::collections::HashMap;
use std::path::Path;

use crate::config::OverlayColumns;
use crate::error::ReconError;
use crate::model::{read_text_file, Table};

/// Hand-curated substitutions for colloquial names the matcher gets wrong.
///
/// Loaded once at startup and immutable afterwards. Loading fails closed: a
/// missing or malformed table is an error, never an empty overlay.
#[derive(Debug, Clone, Default)]
pub struct EdgeCaseOverlay {
    substitutions: HashMap<String, String>,
}

impl EdgeCaseOverlay {
    pub fn new(substitutions: HashMap<String, String>) -> Self {
        Self { substitutions }
    }

    pub fn from_table(table: &Table, columns: &OverlayColumns) -> Result<Self, ReconError> {
        let raw_idx = table
            .column_index(&columns.raw)
            .map_err(|e| ReconError::OverlayLoad(e.to_string()))?;
        let sub_idx = table
            .column_index(&columns.substitute)
            .map_err(|e| ReconError::OverlayLoad(e.to_string()))?;

        let mut substitutions = HashMap::new();
        for row in 0..table.len() {
            let raw = table.cell(row, raw_idx);
            let substitute = table.cell(row, sub_idx);
            if raw.is_empty() || substitute.is_empty() {
                return Err(ReconError::OverlayLoad(format!(
                    "row {}: both '{}' and '{}' are required",
                    row + 1,
                    columns.raw,
                    columns.substitute
                )));
            }
            if let Some(previous) = substitutions.insert(raw.to_string(), substitute.to_string()) {
                if previous != substitute {
                    return Err(ReconError::OverlayLoad(format!(
                        "'{raw}' maps to both '{previous}' and '{substitute}'"
                    )));
                }
            }
        }

        log::debug!("overlay: {} substitutions", substitutions.len());
        Ok(Self { substitutions })
    }

    pub fn from_delimited(
        text: &str,
        delimiter: u8,
        columns: &OverlayColumns,
    ) -> Result<Self, ReconError> {
        let table = Table::from_delimited("overlay", text, delimiter)
            .map_err(|e| ReconError::OverlayLoad(e.to_string()))?;
        Self::from_table(&table, columns)
    }

    pub fn load(path: &Path, delimiter: u8, columns: &OverlayColumns) -> Result<Self, ReconError> {
        let text = read_text_file(path)
            .map_err(|e| ReconError::OverlayLoad(format!("{}: {e}", path.display())))?;
        Self::from_delimited(&text, delimiter, columns)
    }

    /// Substitute if `raw_name` is a known edge case, pass through otherwise.
    pub fn apply<'a>(&'a self, raw_name: &'a str) -> &'a str {
        self.substitutions
            .get(raw_name)
            .map(String::as_str)
            .unwrap_or(raw_name)
    }

    pub fn len(&self) -> usize {
        self.substitutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.substitutions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EDGE_CASES: &str = "\
Colloquial Name\tOfficial Name
Korea\tKorea, Rep.
Slovak Republic\tSlovak Republic
People's Republic of China\tChina
";

    #[test]
    fn apply_substitutes_known_names() {
        let overlay =
            EdgeCaseOverlay::from_delimited(EDGE_CASES, b'\t', &OverlayColumns::default()).unwrap();
        assert_eq!(overlay.len(), 3);
        assert_eq!(overlay.apply("Korea"), "Korea, Rep.");
        assert_eq!(overlay.apply("People's Republic of China"), "China");
    }

    #[test]
    fn apply_passes_unknown_names_through() {
        let overlay = EdgeCaseOverlay::default();
        assert!(overlay.is_empty());
        assert_eq!(overlay.apply("Norway"), "Norway");
    }

    #[test]
    fn header_only_table_is_empty_not_error() {
        let overlay = EdgeCaseOverlay::from_delimited(
            "Colloquial Name\tOfficial Name\n",
            b'\t',
            &OverlayColumns::default(),
        )
        .unwrap();
        assert!(overlay.is_empty());
    }

    #[test]
    fn wrong_delimiter_fails_closed() {
        // read with ',' the whole header is one column
        let err = EdgeCaseOverlay::from_delimited(EDGE_CASES, b',', &OverlayColumns::default())
            .unwrap_err();
        assert!(matches!(err, ReconError::OverlayLoad(_)));
    }

    #[test]
    fn empty_source_fails_closed() {
        let err =
            EdgeCaseOverlay::from_delimited("", b'\t', &OverlayColumns::default()).unwrap_err();
        assert!(matches!(err, ReconError::OverlayLoad(_)));
    }

    #[test]
    fn blank_substitute_rejected() {
        let text = "Colloquial Name\tOfficial Name\nKorea\t\n";
        let err = EdgeCaseOverlay::from_delimited(text, b'\t', &OverlayColumns::default())
            .unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn conflicting_duplicates_rejected() {
        let text = "Colloquial Name\tOfficial Name\nKorea\tKorea, Rep.\nKorea\tKorea, Dem. People's Rep.\n";
        let err = EdgeCaseOverlay::from_delimited(text, b'\t', &OverlayColumns::default())
            .unwrap_err();
        assert!(matches!(err, ReconError::OverlayLoad(_)));
    }

    #[test]
    fn missing_file_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        let err = EdgeCaseOverlay::load(
            &dir.path().join("absent.txt"),
            b'\t',
            &OverlayColumns::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ReconError::OverlayLoad(ref msg) if msg.contains("absent.txt")));
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edge_cases.txt");
        std::fs::write(&path, EDGE_CASES).unwrap();
        let overlay = EdgeCaseOverlay::load(&path, b'\t', &OverlayColumns::default()).unwrap();
        assert_eq!(overlay.apply("Korea"), "Korea, Rep.");
    }
}

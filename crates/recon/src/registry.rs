use std::collections::{BTreeSet, HashMap};

use crate::config::MetadataColumns;
use crate::error::{LookupKind, ReconError};
use crate::model::{CountryRecord, Table};
use crate::resolver::UNRESOLVED_CODE;

/// Substrings that mark a region label as geographic.
pub const CONTINENT_DESCRIPTORS: [&str; 6] =
    ["Africa", "America", "Asia", "Europe", "Pacific", "Middle East"];

/// True if `region` names (part of) a continent, e.g. "Middle East & North Africa".
/// "World", organisational groupings and empty labels are not.
pub fn is_continental_region(region: &str) -> bool {
    CONTINENT_DESCRIPTORS.iter().any(|token| region.contains(token))
}

/// Canonical country table, built once from the GDP metadata and read-only after.
///
/// Records keep their source order; code and long name are each unique and
/// indexed for constant-time lookup.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    records: Vec<CountryRecord>,
    by_code: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    regions: BTreeSet<String>,
}

impl Registry {
    /// Build from `(code, long_name, region)` triples. Rows with an empty code are
    /// skipped (trailing footer lines in exported metadata).
    pub fn from_rows<I, S>(rows: I) -> Result<Self, ReconError>
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: Into<String>,
    {
        let mut registry = Registry::default();

        for (code, long_name, region) in rows {
            let code: String = code.into();
            let long_name: String = long_name.into();
            let region: String = region.into();

            if code.is_empty() {
                continue;
            }
            if code == UNRESOLVED_CODE {
                return Err(ReconError::ReservedCode(code));
            }
            if registry.by_code.contains_key(&code) {
                return Err(ReconError::DuplicateCode(code));
            }
            if registry.by_name.contains_key(&long_name) {
                return Err(ReconError::DuplicateName(long_name));
            }

            let is_aggregate = !is_continental_region(&region);
            if !is_aggregate {
                registry.regions.insert(region.clone());
            }

            let idx = registry.records.len();
            registry.by_code.insert(code.clone(), idx);
            registry.by_name.insert(long_name.clone(), idx);
            registry.records.push(CountryRecord {
                code,
                long_name,
                region,
                is_aggregate,
            });
        }

        log::debug!(
            "registry: {} records, {} regions",
            registry.records.len(),
            registry.regions.len()
        );
        Ok(registry)
    }

    /// Build from a metadata table using the configured column names.
    pub fn from_table(table: &Table, columns: &MetadataColumns) -> Result<Self, ReconError> {
        let code_idx = table.column_index(&columns.code)?;
        let name_idx = table.column_index(&columns.name)?;
        let region_idx = table.column_index(&columns.region)?;

        Self::from_rows((0..table.len()).map(|row| {
            (
                table.cell(row, code_idx),
                table.cell(row, name_idx),
                table.cell(row, region_idx),
            )
        }))
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    pub fn has_name(&self, long_name: &str) -> bool {
        self.by_name.contains_key(long_name)
    }

    pub fn lookup_by_code(&self, code: &str) -> Result<&CountryRecord, ReconError> {
        self.by_code
            .get(code)
            .map(|&idx| &self.records[idx])
            .ok_or_else(|| ReconError::NotFound {
                kind: LookupKind::Code,
                key: code.into(),
            })
    }

    pub fn lookup_by_name(&self, long_name: &str) -> Result<&CountryRecord, ReconError> {
        self.by_name
            .get(long_name)
            .map(|&idx| &self.records[idx])
            .ok_or_else(|| ReconError::NotFound {
                kind: LookupKind::Name,
                key: long_name.into(),
            })
    }

    pub fn region_of(&self, code: &str) -> Result<&str, ReconError> {
        self.lookup_by_code(code).map(|r| r.region.as_str())
    }

    pub fn long_name_of(&self, code: &str) -> Result<&str, ReconError> {
        self.lookup_by_code(code).map(|r| r.long_name.as_str())
    }

    /// Codes in registry order.
    pub fn all_codes(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.code.as_str()).collect()
    }

    /// Geographic regions only; aggregate labels are filtered out at build time.
    pub fn all_regions(&self) -> &BTreeSet<String> {
        &self.regions
    }

    pub fn records(&self) -> &[CountryRecord] {
        &self.records
    }

    /// Non-aggregate records, in registry order.
    pub fn countries(&self) -> impl Iterator<Item = &CountryRecord> {
        self.records.iter().filter(|r| !r.is_aggregate)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

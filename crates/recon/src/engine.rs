use std::collections::HashSet;
use std::path::Path;

use crate::compare::{electricity_comparison, ComparisonRow};
use crate::config::{SourceFile, WorldmixConfig};
use crate::dataset::{EnergyDataset, GdpDataset};
use crate::error::ReconError;
use crate::join::{common_codes, common_codes_sanitized};
use crate::matcher::NameMatcher;
use crate::model::{read_text_file, Table};
use crate::overlay::EdgeCaseOverlay;
use crate::registry::Registry;
use crate::resolver::CodeResolver;

/// Everything a comparison needs, loaded once and read-only afterwards.
///
/// Build order: registry from metadata, overlay, resolver over both, then the
/// energy rows are tagged with codes through that resolver.
#[derive(Debug, Clone)]
pub struct Datasets {
    pub registry: Registry,
    pub overlay: EdgeCaseOverlay,
    pub matcher: NameMatcher,
    pub gdp: GdpDataset,
    pub energy: EnergyDataset,
}

impl Datasets {
    pub fn from_tables(
        config: &WorldmixConfig,
        metadata: &Table,
        overlay: EdgeCaseOverlay,
        gdp: Table,
        energy: Table,
        verbose: bool,
    ) -> Result<Self, ReconError> {
        let registry = Registry::from_table(metadata, &config.metadata)?;
        let matcher = NameMatcher::new(config.matcher.max_truncations);
        let gdp = GdpDataset::from_table(gdp, &config.gdp)?;
        let energy = {
            let resolver = CodeResolver::new(&registry, &overlay, matcher);
            EnergyDataset::from_table(energy, &config.energy, &resolver, verbose)?
        };

        Ok(Self {
            registry,
            overlay,
            matcher,
            gdp,
            energy,
        })
    }

    /// Read every source named in `config`, relative to `base_dir`.
    pub fn load(
        config: &WorldmixConfig,
        base_dir: &Path,
        verbose: bool,
    ) -> Result<Self, ReconError> {
        let sources = &config.sources;
        let overlay = EdgeCaseOverlay::load(
            &base_dir.join(&sources.overlay.path),
            sources.overlay.delimiter_byte()?,
            &config.overlay,
        )?;
        let metadata = load_table("metadata", base_dir, &sources.metadata)?;
        let gdp = load_table("gdp", base_dir, &sources.gdp)?;
        let energy = load_table("energy", base_dir, &sources.energy)?;

        Self::from_tables(config, &metadata, overlay, gdp, energy, verbose)
    }

    pub fn resolver(&self) -> CodeResolver<'_> {
        CodeResolver::new(&self.registry, &self.overlay, self.matcher)
    }

    /// Codes with data on both sides, in GDP-table order.
    pub fn common_codes(&self) -> Vec<String> {
        common_codes(&self.gdp, &self.energy)
    }

    pub fn common_codes_sanitized(&self, aggregate_code: &str) -> Result<Vec<String>, ReconError> {
        common_codes_sanitized(&self.gdp, &self.energy, aggregate_code)
    }

    /// Comparison rows for every usable country: the sanitized common codes,
    /// minus any other registry aggregate both datasets happen to carry.
    pub fn electricity_comparison(
        &self,
        config: &WorldmixConfig,
        year: i32,
    ) -> Result<Vec<ComparisonRow>, ReconError> {
        let countries: HashSet<&str> =
            self.registry.countries().map(|r| r.code.as_str()).collect();
        let codes: Vec<String> = self
            .common_codes_sanitized(&config.join.aggregate_code)?
            .into_iter()
            .filter(|code| countries.contains(code.as_str()))
            .collect();
        electricity_comparison(
            year,
            &codes,
            &self.gdp,
            &self.registry,
            &self.energy,
            &config.compare.gdp_series,
        )
    }
}

fn load_table(name: &str, base_dir: &Path, source: &SourceFile) -> Result<Table, ReconError> {
    let path = base_dir.join(&source.path);
    let text = read_text_file(&path)
        .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))?;
    Table::from_delimited(name, &text, source.delimiter_byte()?)
}

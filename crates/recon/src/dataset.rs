use std::collections::HashMap;

use crate::config::{EnergyConfig, GdpConfig};
use crate::error::{LookupKind, ReconError};
use crate::join::CodeSource;
use crate::model::{AnnualSeries, Table};
use crate::registry::CONTINENT_DESCRIPTORS;
use crate::resolver::CodeResolver;
use crate::series::{normalize_cell, recognize_energy_year, recognize_gdp_year};

/// Flow holding per-product electricity generation in the energy balances.
pub const ELECTRICITY_OUTPUT_FLOW: &str = "Electricity output (GWh)";

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// A wide, annually-resolved table keyed by country code.
///
/// Implementors supply the code extractor and year recognizer for their
/// dataset's layout; row selection and series building are shared.
pub trait TabularDataset {
    fn table(&self) -> &Table;

    /// Country code of a row, empty when the row has none.
    fn code_for_row(&self, row: usize) -> &str;

    fn recognize_year(&self, label: &str) -> Option<i32>;

    fn missing_tokens(&self) -> &[String];

    fn has_code(&self, code: &str) -> bool {
        (0..self.table().len()).any(|row| self.code_for_row(row) == code)
    }

    /// `(column index, year)` for every year column, in header order.
    fn year_columns(&self) -> Vec<(usize, i32)> {
        self.table()
            .headers
            .iter()
            .enumerate()
            .filter_map(|(idx, label)| self.recognize_year(label).map(|year| (idx, year)))
            .collect()
    }

    /// Row indices for `code`; fails if the dataset does not offer the code.
    fn rows_for_code(&self, code: &str) -> Result<Vec<usize>, ReconError> {
        if !self.has_code(code) {
            return Err(ReconError::NotFound {
                kind: LookupKind::Code,
                key: code.into(),
            });
        }
        Ok((0..self.table().len())
            .filter(|&row| self.code_for_row(row) == code)
            .collect())
    }

    /// One year's cell of `row`; only that cell is normalized. A year the
    /// table has no column for reads as missing.
    fn value_for_row(&self, row: usize, year: i32) -> Result<Option<f64>, ReconError> {
        let table = self.table();
        match self.year_columns().into_iter().find(|&(_, y)| y == year) {
            Some((col, _)) => {
                normalize_cell(table.cell(row, col), self.missing_tokens(), &table.headers[col])
            }
            None => Ok(None),
        }
    }

    fn series_for_row(&self, row: usize) -> Result<AnnualSeries, ReconError> {
        let table = self.table();
        let tokens = self.missing_tokens();
        self.year_columns()
            .into_iter()
            .map(|(col, year)| {
                normalize_cell(table.cell(row, col), tokens, &table.headers[col])
                    .map(|value| (year, value))
            })
            .collect()
    }
}

fn unique_in_order<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for value in values {
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// GDP (World Bank wide export)
// ---------------------------------------------------------------------------

/// One row per (country, series); year columns labelled `2020 [YR2020]`.
#[derive(Debug, Clone)]
pub struct GdpDataset {
    table: Table,
    code_idx: usize,
    series_name_idx: usize,
    series_code_idx: usize,
    missing_tokens: Vec<String>,
}

impl GdpDataset {
    pub fn from_table(table: Table, config: &GdpConfig) -> Result<Self, ReconError> {
        let code_idx = table.column_index(&config.code_column)?;
        let series_name_idx = table.column_index(&config.series_name_column)?;
        let series_code_idx = table.column_index(&config.series_code_column)?;

        log::debug!("gdp: {} rows", table.len());
        Ok(Self {
            table,
            code_idx,
            series_name_idx,
            series_code_idx,
            missing_tokens: config.missing_tokens.clone(),
        })
    }

    /// Series for `code` by series name. An unknown code is an error; a known
    /// code without that series yields an empty (all-missing) series.
    pub fn series(&self, code: &str, series_name: &str) -> Result<AnnualSeries, ReconError> {
        self.series_where(code, self.series_name_idx, series_name)
    }

    pub fn series_by_code(
        &self,
        code: &str,
        series_code: &str,
    ) -> Result<AnnualSeries, ReconError> {
        self.series_where(code, self.series_code_idx, series_code)
    }

    /// Value of one series for one year, reading only that year's cell.
    pub fn value(
        &self,
        code: &str,
        series_name: &str,
        year: i32,
    ) -> Result<Option<f64>, ReconError> {
        match self.row_where(code, self.series_name_idx, series_name)? {
            Some(row) => self.value_for_row(row, year),
            None => Ok(None),
        }
    }

    fn series_where(
        &self,
        code: &str,
        col: usize,
        wanted: &str,
    ) -> Result<AnnualSeries, ReconError> {
        match self.row_where(code, col, wanted)? {
            Some(row) => self.series_for_row(row),
            None => Ok(AnnualSeries::new()),
        }
    }

    fn row_where(&self, code: &str, col: usize, wanted: &str) -> Result<Option<usize>, ReconError> {
        Ok(self
            .rows_for_code(code)?
            .into_iter()
            .find(|&row| self.table.cell(row, col) == wanted))
    }

    pub fn series_names(&self) -> Vec<&str> {
        unique_in_order((0..self.table.len()).map(|row| self.table.cell(row, self.series_name_idx)))
    }
}

impl TabularDataset for GdpDataset {
    fn table(&self) -> &Table {
        &self.table
    }

    fn code_for_row(&self, row: usize) -> &str {
        self.table.cell(row, self.code_idx)
    }

    fn recognize_year(&self, label: &str) -> Option<i32> {
        recognize_gdp_year(label)
    }

    fn missing_tokens(&self) -> &[String] {
        &self.missing_tokens
    }
}

impl CodeSource for GdpDataset {
    fn available_codes(&self) -> Vec<&str> {
        unique_in_order((0..self.table.len()).map(|row| self.code_for_row(row)))
    }
}

// ---------------------------------------------------------------------------
// Energy balances (IEA wide export)
// ---------------------------------------------------------------------------

/// One row per (country, flow, product); integer year labels. Rows carry
/// colloquial country names, resolved to codes once at construction.
#[derive(Debug, Clone)]
pub struct EnergyDataset {
    table: Table,
    country_idx: usize,
    flow_idx: usize,
    product_idx: usize,
    missing_tokens: Vec<String>,
    year_ceiling: i32,
    row_codes: Vec<String>,
    /// code -> colloquial name, in first-insertion order
    colloquial: Vec<(String, String)>,
    colloquial_index: HashMap<String, usize>,
}

impl EnergyDataset {
    /// Tag every row with a code, then build the colloquial dictionary from
    /// the physical country names. `verbose` only affects dictionary logging.
    pub fn from_table(
        table: Table,
        config: &EnergyConfig,
        resolver: &CodeResolver<'_>,
        verbose: bool,
    ) -> Result<Self, ReconError> {
        let country_idx = table.column_index(&config.country_column)?;
        let flow_idx = table.column_index(&config.flow_column)?;
        let product_idx = table.column_index(&config.product_column)?;

        let row_codes: Vec<String> = (0..table.len())
            .map(|row| resolver.resolve(table.cell(row, country_idx), false).to_string())
            .collect();

        let mut dataset = Self {
            table,
            country_idx,
            flow_idx,
            product_idx,
            missing_tokens: config.missing_tokens.clone(),
            year_ceiling: config.year_ceiling,
            row_codes,
            colloquial: Vec::new(),
            colloquial_index: HashMap::new(),
        };

        let names: Vec<String> =
            filter_country_names(&dataset.country_names(), config.excluded_terms.as_slice())
                .into_iter()
                .map(str::to_string)
                .collect();
        for name in names {
            let code = resolver.resolve(&name, verbose).to_string();
            match dataset.colloquial_index.get(&code) {
                Some(&idx) => dataset.colloquial[idx].1 = name,
                None => {
                    dataset
                        .colloquial_index
                        .insert(code.clone(), dataset.colloquial.len());
                    dataset.colloquial.push((code, name));
                }
            }
        }

        log::debug!(
            "energy: {} rows, {} countries",
            dataset.table.len(),
            dataset.colloquial.len()
        );
        Ok(dataset)
    }

    /// Every distinct country name, in first-seen order.
    pub fn country_names(&self) -> Vec<&str> {
        unique_in_order((0..self.table.len()).map(|row| self.table.cell(row, self.country_idx)))
    }

    pub fn colloquial_name(&self, code: &str) -> Result<&str, ReconError> {
        self.colloquial_index
            .get(code)
            .map(|&idx| self.colloquial[idx].1.as_str())
            .ok_or_else(|| ReconError::NotFound {
                kind: LookupKind::Code,
                key: code.into(),
            })
    }

    pub fn flows(&self) -> Vec<&str> {
        unique_in_order((0..self.table.len()).map(|row| self.table.cell(row, self.flow_idx)))
    }

    pub fn products(&self) -> Vec<&str> {
        unique_in_order((0..self.table.len()).map(|row| self.table.cell(row, self.product_idx)))
    }

    pub fn flow_rows(&self, code: &str, flow: &str) -> Result<Vec<usize>, ReconError> {
        Ok(self
            .rows_for_code(code)?
            .into_iter()
            .filter(|&row| self.table.cell(row, self.flow_idx) == flow)
            .collect())
    }

    pub fn product_and_flow_rows(
        &self,
        code: &str,
        product: &str,
        flow: &str,
    ) -> Result<Vec<usize>, ReconError> {
        Ok(self
            .flow_rows(code, flow)?
            .into_iter()
            .filter(|&row| self.table.cell(row, self.product_idx) == product)
            .collect())
    }

    pub fn electricity_output_rows(&self, code: &str) -> Result<Vec<usize>, ReconError> {
        self.flow_rows(code, ELECTRICITY_OUTPUT_FLOW)
    }

    /// Series for one (flow, product) of `code`; empty when the combination has
    /// no row.
    pub fn series(
        &self,
        code: &str,
        flow: &str,
        product: &str,
    ) -> Result<AnnualSeries, ReconError> {
        match self.product_and_flow_rows(code, product, flow)?.first() {
            Some(&row) => self.series_for_row(row),
            None => Ok(AnnualSeries::new()),
        }
    }

    /// One (flow, product) value of `code` for `year`, reading only that cell.
    pub fn value(
        &self,
        code: &str,
        flow: &str,
        product: &str,
        year: i32,
    ) -> Result<Option<f64>, ReconError> {
        match self.product_and_flow_rows(code, product, flow)?.first() {
            Some(&row) => self.value_for_row(row, year),
            None => Ok(None),
        }
    }
}

impl TabularDataset for EnergyDataset {
    fn table(&self) -> &Table {
        &self.table
    }

    fn code_for_row(&self, row: usize) -> &str {
        self.row_codes.get(row).map(String::as_str).unwrap_or("")
    }

    fn recognize_year(&self, label: &str) -> Option<i32> {
        recognize_energy_year(label, self.year_ceiling)
    }

    fn missing_tokens(&self) -> &[String] {
        &self.missing_tokens
    }

    /// Only codes in the colloquial dictionary are offered.
    fn has_code(&self, code: &str) -> bool {
        self.colloquial_index.contains_key(code)
    }
}

impl CodeSource for EnergyDataset {
    fn available_codes(&self) -> Vec<&str> {
        self.colloquial.iter().map(|(code, _)| code.as_str()).collect()
    }
}

/// Drop non-physical entries: bare continent names and anything containing an
/// excluded term (`IEA`, `OECD`, ...).
pub fn filter_country_names<'a, T: AsRef<str>>(
    names: &[&'a str],
    excluded_terms: &[T],
) -> Vec<&'a str> {
    names
        .iter()
        .copied()
        .filter(|name| !CONTINENT_DESCRIPTORS.contains(name))
        .filter(|name| !excluded_terms.iter().any(|term| name.contains(term.as_ref())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::NameMatcher;
    use crate::overlay::EdgeCaseOverlay;
    use crate::registry::Registry;
    use crate::resolver::UNRESOLVED_CODE;

    fn gdp() -> GdpDataset {
        let table = Table::from_rows(
            "gdp",
            &["Country Name", "Country Code", "Series Name", "Series Code", "2019 [YR2019]", "2020 [YR2020]"],
            &[
                &["France", "FRA", "GDP per capita (constant 2015 US$)", "NY.GDP.PCAP.KD", "38912.3", "35786.1"],
                &["France", "FRA", "GDP (constant 2015 US$)", "NY.GDP.MKTP.KD", "2.6e12", ".."],
                &["World", "WLD", "GDP per capita (constant 2015 US$)", "NY.GDP.PCAP.KD", "11038.2", ".."],
                &["Data from database: World Development Indicators", "", "", "", "", ""],
            ],
        );
        GdpDataset::from_table(table, &GdpConfig::default()).unwrap()
    }

    #[test]
    fn gdp_series_by_name_and_code() {
        let gdp = gdp();
        let s = gdp.series("FRA", "GDP per capita (constant 2015 US$)").unwrap();
        assert_eq!(s.get(2019), Some(38912.3));
        assert_eq!(s.get(2020), Some(35786.1));

        let s = gdp.series_by_code("FRA", "NY.GDP.MKTP.KD").unwrap();
        assert_eq!(s.get(2019), Some(2.6e12));
        assert_eq!(s.get(2020), None);
        assert!(s.contains_year(2020));
    }

    #[test]
    fn gdp_unknown_code_and_unknown_series() {
        let gdp = gdp();
        assert!(matches!(
            gdp.series("DEU", "GDP (constant 2015 US$)"),
            Err(ReconError::NotFound { .. })
        ));
        assert!(gdp.series("WLD", "GDP (constant 2015 US$)").unwrap().is_empty());
    }

    #[test]
    fn gdp_codes_skip_footer_rows() {
        let gdp = gdp();
        assert_eq!(gdp.available_codes(), vec!["FRA", "WLD"]);
        assert_eq!(gdp.year_columns(), vec![(4, 2019), (5, 2020)]);
        assert_eq!(gdp.series_names().len(), 2);
    }

    #[test]
    fn gdp_value_reads_only_requested_year() {
        let table = Table::from_rows(
            "gdp",
            &["Country Code", "Series Name", "Series Code", "2019 [YR2019]", "2020 [YR2020]"],
            &[&["FRA", "GDP", "G", "lots", "35786.1"]],
        );
        let gdp = GdpDataset::from_table(table, &GdpConfig::default()).unwrap();
        assert_eq!(gdp.value("FRA", "GDP", 2020).unwrap(), Some(35786.1));
        assert!(gdp.value("FRA", "GDP", 2019).is_err());
        assert_eq!(gdp.value("FRA", "GDP", 1850).unwrap(), None);
        assert_eq!(gdp.value("FRA", "Population", 2020).unwrap(), None);
    }

    #[test]
    fn gdp_bad_cell_surfaces_as_error() {
        let table = Table::from_rows(
            "gdp",
            &["Country Code", "Series Name", "Series Code", "2020 [YR2020]"],
            &[&["FRA", "GDP", "G", "lots"]],
        );
        let gdp = GdpDataset::from_table(table, &GdpConfig::default()).unwrap();
        assert!(matches!(gdp.series("FRA", "GDP"), Err(ReconError::ValueParse { .. })));
    }

    fn energy_table() -> Table {
        Table::from_rows(
            "energy",
            &["Country", "Product", "Flow", "NoCountry", "2019", "2020", "99999"],
            &[
                &["France", "Total", ELECTRICITY_OUTPUT_FLOW, "1", "570000", "531000", "0"],
                &["France", "Nuclear", ELECTRICITY_OUTPUT_FLOW, "1", "399000", "353000", "0"],
                &["France", "Total", "Total final consumption (PJ)", "1", "6100", "..", "0"],
                &["Norway", "Total", ELECTRICITY_OUTPUT_FLOW, "2", "135000", "154000", "0"],
                &["World", "Total", ELECTRICITY_OUTPUT_FLOW, "3", "27000000", "26800000", "0"],
                &["OECD Total", "Total", ELECTRICITY_OUTPUT_FLOW, "4", "11000000", "10600000", "0"],
                &["Europe", "Total", ELECTRICITY_OUTPUT_FLOW, "5", "4000000", "3900000", "0"],
            ],
        )
    }

    fn registry() -> Registry {
        Registry::from_rows([
            ("FRA", "France", "Europe & Central Asia"),
            ("NOR", "Norway", "Europe & Central Asia"),
            ("WLD", "World", ""),
        ])
        .unwrap()
    }

    #[test]
    fn energy_rows_tagged_and_dictionary_filtered() {
        let reg = registry();
        let overlay = EdgeCaseOverlay::default();
        let resolver = CodeResolver::new(&reg, &overlay, NameMatcher::default());
        let energy =
            EnergyDataset::from_table(energy_table(), &EnergyConfig::default(), &resolver, false)
                .unwrap();

        assert_eq!(energy.code_for_row(0), "FRA");
        assert_eq!(energy.code_for_row(5), UNRESOLVED_CODE);
        // OECD Total and the bare continent are filtered before the dictionary
        assert_eq!(energy.available_codes(), vec!["FRA", "NOR", "WLD"]);
        assert_eq!(energy.colloquial_name("NOR").unwrap(), "Norway");
        assert!(energy.colloquial_name(UNRESOLVED_CODE).is_err());
        assert!(matches!(energy.rows_for_code("XXX"), Err(ReconError::NotFound { .. })));
    }

    #[test]
    fn energy_year_columns_respect_ceiling() {
        let reg = registry();
        let overlay = EdgeCaseOverlay::default();
        let resolver = CodeResolver::new(&reg, &overlay, NameMatcher::default());
        let energy =
            EnergyDataset::from_table(energy_table(), &EnergyConfig::default(), &resolver, false)
                .unwrap();
        assert_eq!(energy.year_columns(), vec![(4, 2019), (5, 2020)]);
    }

    #[test]
    fn energy_flow_product_queries() {
        let reg = registry();
        let overlay = EdgeCaseOverlay::default();
        let resolver = CodeResolver::new(&reg, &overlay, NameMatcher::default());
        let energy =
            EnergyDataset::from_table(energy_table(), &EnergyConfig::default(), &resolver, false)
                .unwrap();

        assert_eq!(energy.electricity_output_rows("FRA").unwrap(), vec![0, 1]);
        assert_eq!(
            energy.product_and_flow_rows("FRA", "Nuclear", ELECTRICITY_OUTPUT_FLOW).unwrap(),
            vec![1]
        );
        let nuclear = energy.series("FRA", ELECTRICITY_OUTPUT_FLOW, "Nuclear").unwrap();
        assert_eq!(nuclear.get(2020), Some(353000.0));
        let tfc = energy.series("FRA", "Total final consumption (PJ)", "Total").unwrap();
        assert_eq!(tfc.get(2020), None);
        assert!(energy
            .series("NOR", ELECTRICITY_OUTPUT_FLOW, "Nuclear")
            .unwrap()
            .is_empty());
        assert_eq!(energy.flows().len(), 2);
        assert_eq!(energy.products(), vec!["Total", "Nuclear"]);
    }

    #[test]
    fn filter_drops_continents_and_excluded_terms() {
        let names = ["France", "Africa", "IEA Total", "Non-OECD Asia", "Asia Pacific", "World"];
        let kept = filter_country_names(&names, &["IEA", "OECD"]);
        assert_eq!(kept, vec!["France", "Asia Pacific", "World"]);
    }

    #[test]
    fn later_name_overwrites_dictionary_entry() {
        let reg = Registry::from_rows([("KOR", "Korea, Rep.", "East Asia & Pacific")]).unwrap();
        let overlay = EdgeCaseOverlay::default();
        let resolver = CodeResolver::new(&reg, &overlay, NameMatcher::default());
        let table = Table::from_rows(
            "energy",
            &["Country", "Flow", "Product", "2020"],
            &[&["Korea", "F", "P", "1"], &["Korea, Rep.", "F", "P", "2"]],
        );
        let energy =
            EnergyDataset::from_table(table, &EnergyConfig::default(), &resolver, false).unwrap();
        assert_eq!(energy.available_codes(), vec!["KOR"]);
        assert_eq!(energy.colloquial_name("KOR").unwrap(), "Korea, Rep.");
    }
}

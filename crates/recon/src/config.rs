use serde::Deserialize;

use crate::error::ReconError;
use crate::resolver::UNRESOLVED_CODE;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct WorldmixConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub sources: SourcesConfig,
    #[serde(default)]
    pub metadata: MetadataColumns,
    #[serde(default)]
    pub overlay: OverlayColumns,
    #[serde(default)]
    pub gdp: GdpConfig,
    #[serde(default)]
    pub energy: EnergyConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub join: JoinConfig,
    #[serde(default)]
    pub compare: CompareConfig,
}

fn default_name() -> String {
    "worldmix".into()
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Input files. Paths are relative to the config file's directory.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub metadata: SourceFile,
    pub overlay: SourceFile,
    pub gdp: SourceFile,
    pub energy: SourceFile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceFile {
    pub path: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_delimiter() -> char {
    ','
}

impl SourceFile {
    pub fn delimiter_byte(&self) -> Result<u8, ReconError> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                ReconError::ConfigValidation(format!(
                    "source '{}': delimiter must be a single ASCII character",
                    self.path
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Column mappings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct MetadataColumns {
    #[serde(default = "default_code_column")]
    pub code: String,
    #[serde(default = "default_name_column")]
    pub name: String,
    #[serde(default = "default_region_column")]
    pub region: String,
}

impl Default for MetadataColumns {
    fn default() -> Self {
        Self {
            code: default_code_column(),
            name: default_name_column(),
            region: default_region_column(),
        }
    }
}

fn default_code_column() -> String {
    "Country Code".into()
}

fn default_name_column() -> String {
    "Country Name".into()
}

fn default_region_column() -> String {
    "Region".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverlayColumns {
    #[serde(default = "default_overlay_raw")]
    pub raw: String,
    #[serde(default = "default_overlay_substitute")]
    pub substitute: String,
}

impl Default for OverlayColumns {
    fn default() -> Self {
        Self {
            raw: default_overlay_raw(),
            substitute: default_overlay_substitute(),
        }
    }
}

fn default_overlay_raw() -> String {
    "Colloquial Name".into()
}

fn default_overlay_substitute() -> String {
    "Official Name".into()
}

// ---------------------------------------------------------------------------
// Datasets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GdpConfig {
    #[serde(default = "default_code_column")]
    pub code_column: String,
    #[serde(default = "default_series_name_column")]
    pub series_name_column: String,
    #[serde(default = "default_series_code_column")]
    pub series_code_column: String,
    #[serde(default = "default_missing_tokens")]
    pub missing_tokens: Vec<String>,
}

impl Default for GdpConfig {
    fn default() -> Self {
        Self {
            code_column: default_code_column(),
            series_name_column: default_series_name_column(),
            series_code_column: default_series_code_column(),
            missing_tokens: default_missing_tokens(),
        }
    }
}

fn default_series_name_column() -> String {
    "Series Name".into()
}

fn default_series_code_column() -> String {
    "Series Code".into()
}

fn default_missing_tokens() -> Vec<String> {
    vec!["..".into()]
}

/// `..` no data, `x` not applicable, `c` confidential.
fn default_energy_missing_tokens() -> Vec<String> {
    vec!["..".into(), "x".into(), "c".into()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnergyConfig {
    #[serde(default = "default_country_column")]
    pub country_column: String,
    #[serde(default = "default_flow_column")]
    pub flow_column: String,
    #[serde(default = "default_product_column")]
    pub product_column: String,
    #[serde(default = "default_energy_missing_tokens")]
    pub missing_tokens: Vec<String>,
    /// Country names containing any of these are non-physical groupings.
    #[serde(default = "default_excluded_terms")]
    pub excluded_terms: Vec<String>,
    /// Integer column labels at or above this are not years.
    #[serde(default = "default_year_ceiling")]
    pub year_ceiling: i32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            country_column: default_country_column(),
            flow_column: default_flow_column(),
            product_column: default_product_column(),
            missing_tokens: default_energy_missing_tokens(),
            excluded_terms: default_excluded_terms(),
            year_ceiling: default_year_ceiling(),
        }
    }
}

fn default_country_column() -> String {
    "Country".into()
}

fn default_flow_column() -> String {
    "Flow".into()
}

fn default_product_column() -> String {
    "Product".into()
}

fn default_excluded_terms() -> Vec<String> {
    vec!["IEA".into(), "OECD".into()]
}

fn default_year_ceiling() -> i32 {
    3000
}

// ---------------------------------------------------------------------------
// Matcher, join, compare
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct MatcherConfig {
    /// Right-truncations tried after the full string.
    #[serde(default = "default_max_truncations")]
    pub max_truncations: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_truncations: default_max_truncations(),
        }
    }
}

fn default_max_truncations() -> usize {
    4
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinConfig {
    #[serde(default = "default_aggregate_code")]
    pub aggregate_code: String,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            aggregate_code: default_aggregate_code(),
        }
    }
}

fn default_aggregate_code() -> String {
    "WLD".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompareConfig {
    #[serde(default = "default_year")]
    pub year: i32,
    #[serde(default = "default_gdp_series")]
    pub gdp_series: String,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            year: default_year(),
            gdp_series: default_gdp_series(),
        }
    }
}

fn default_year() -> i32 {
    2020
}

fn default_gdp_series() -> String {
    "GDP per capita (constant 2015 US$)".into()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl WorldmixConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: WorldmixConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let columns = [
            ("metadata.code", &self.metadata.code),
            ("metadata.name", &self.metadata.name),
            ("metadata.region", &self.metadata.region),
            ("overlay.raw", &self.overlay.raw),
            ("overlay.substitute", &self.overlay.substitute),
            ("gdp.code_column", &self.gdp.code_column),
            ("gdp.series_name_column", &self.gdp.series_name_column),
            ("gdp.series_code_column", &self.gdp.series_code_column),
            ("energy.country_column", &self.energy.country_column),
            ("energy.flow_column", &self.energy.flow_column),
            ("energy.product_column", &self.energy.product_column),
        ];
        for (key, value) in columns {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "{key} must not be empty"
                )));
            }
        }

        if self.gdp.missing_tokens.is_empty() || self.energy.missing_tokens.is_empty() {
            return Err(ReconError::ConfigValidation(
                "missing_tokens must list at least one token".into(),
            ));
        }

        if self.join.aggregate_code == UNRESOLVED_CODE {
            return Err(ReconError::ConfigValidation(format!(
                "join.aggregate_code must not be the unresolved sentinel {UNRESOLVED_CODE}"
            )));
        }

        if self.energy.year_ceiling <= 0 {
            return Err(ReconError::ConfigValidation(format!(
                "energy.year_ceiling must be positive, got {}",
                self.energy.year_ceiling
            )));
        }

        for source in [
            &self.sources.metadata,
            &self.sources.overlay,
            &self.sources.gdp,
            &self.sources.energy,
        ] {
            source.delimiter_byte()?;
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[sources.metadata]
path = "GDP_metadata.csv"

[sources.overlay]
path = "iea_name_edge_cases.txt"
delimiter = "\t"

[sources.gdp]
path = "GDP_percapita_allData.txt"
delimiter = "\t"

[sources.energy]
path = "energy_balances.csv"
"#;

    #[test]
    fn parse_minimal_with_defaults() {
        let config = WorldmixConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.name, "worldmix");
        assert_eq!(config.sources.overlay.delimiter, '\t');
        assert_eq!(config.sources.metadata.delimiter, ',');
        assert_eq!(config.metadata.code, "Country Code");
        assert_eq!(config.gdp.missing_tokens, vec![".."]);
        assert_eq!(config.energy.missing_tokens, vec!["..", "x", "c"]);
        assert_eq!(config.energy.excluded_terms, vec!["IEA", "OECD"]);
        assert_eq!(config.energy.year_ceiling, 3000);
        assert_eq!(config.matcher.max_truncations, 4);
        assert_eq!(config.join.aggregate_code, "WLD");
        assert_eq!(config.compare.year, 2020);
    }

    #[test]
    fn parse_overrides() {
        let input = format!(
            r#"name = "Electricity 2019"
{MINIMAL}
[energy]
country_column = "COUNTRY"
excluded_terms = ["IEA", "OECD", "Non-OECD"]

[matcher]
max_truncations = 2

[compare]
year = 2019
"#
        );
        let config = WorldmixConfig::from_toml(&input).unwrap();
        assert_eq!(config.name, "Electricity 2019");
        assert_eq!(config.energy.country_column, "COUNTRY");
        // untouched keys in an overridden section keep their defaults
        assert_eq!(config.energy.flow_column, "Flow");
        assert_eq!(config.energy.excluded_terms.len(), 3);
        assert_eq!(config.matcher.max_truncations, 2);
        assert_eq!(config.compare.year, 2019);
    }

    #[test]
    fn reject_missing_sources() {
        let err = WorldmixConfig::from_toml("name = \"x\"").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_sentinel_as_aggregate() {
        let input = format!("{MINIMAL}\n[join]\naggregate_code = \"XXX\"\n");
        let err = WorldmixConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("sentinel"));
    }

    #[test]
    fn reject_empty_missing_tokens() {
        let input = format!("{MINIMAL}\n[gdp]\nmissing_tokens = []\n");
        let err = WorldmixConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("missing_tokens"));
    }

    #[test]
    fn reject_empty_column() {
        let input = format!("{MINIMAL}\n[metadata]\nregion = \"  \"\n");
        let err = WorldmixConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("metadata.region"));
    }

    #[test]
    fn reject_non_ascii_delimiter() {
        let input = MINIMAL.replace("delimiter = \"\\t\"", "delimiter = \"§\"");
        let err = WorldmixConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("ASCII"));
    }
}

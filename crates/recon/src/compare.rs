use std::collections::BTreeMap;

use serde::Serialize;

use crate::dataset::{EnergyDataset, GdpDataset, ELECTRICITY_OUTPUT_FLOW};
use crate::error::ReconError;
use crate::registry::Registry;

pub const PRODUCT_TOTAL: &str = "Total";
pub const PRODUCT_FOSSIL: &str = "Fossil fuels";
pub const PRODUCT_NUCLEAR: &str = "Nuclear";
pub const PRODUCT_RENEWABLE: &str = "Renewable sources";

/// Values per key, index-aligned with the `codes` slice they were built for.
pub type AlignedValues = BTreeMap<String, Vec<Option<f64>>>;

/// Flow and products describing the electricity generation mix.
pub fn electricity_makeup() -> (Vec<&'static str>, Vec<&'static str>) {
    (
        vec![ELECTRICITY_OUTPUT_FLOW],
        vec![PRODUCT_TOTAL, PRODUCT_FOSSIL, PRODUCT_NUCLEAR, PRODUCT_RENEWABLE],
    )
}

/// `flow -> product -> value per code` for one year.
///
/// Every inner vector has exactly `codes.len()` entries; a missing series or
/// year is a `None` slot, so rows never shift between products. Only the
/// requested year's cells are parsed.
pub fn energy_values(
    flows: &[&str],
    products: &[&str],
    codes: &[String],
    year: i32,
    energy: &EnergyDataset,
) -> Result<BTreeMap<String, AlignedValues>, ReconError> {
    let mut out = BTreeMap::new();
    for &flow in flows {
        let mut by_product = AlignedValues::new();
        for &product in products {
            let values = codes
                .iter()
                .map(|code| energy.value(code, flow, product, year))
                .collect::<Result<Vec<_>, _>>()?;
            by_product.insert(product.to_string(), values);
        }
        out.insert(flow.to_string(), by_product);
    }
    Ok(out)
}

/// [`energy_values`] for the electricity makeup, flattened to `product -> values`.
pub fn electricity_values(
    codes: &[String],
    year: i32,
    energy: &EnergyDataset,
) -> Result<AlignedValues, ReconError> {
    let (flows, products) = electricity_makeup();
    let mut by_flow = energy_values(&flows, &products, codes, year, energy)?;
    Ok(by_flow.remove(ELECTRICITY_OUTPUT_FLOW).unwrap_or_default())
}

/// `series name -> value per code` for one year.
pub fn gdp_values(
    series_names: &[&str],
    codes: &[String],
    year: i32,
    gdp: &GdpDataset,
) -> Result<AlignedValues, ReconError> {
    let mut out = AlignedValues::new();
    for &name in series_names {
        let values = codes
            .iter()
            .map(|code| gdp.value(code, name, year))
            .collect::<Result<Vec<_>, _>>()?;
        out.insert(name.to_string(), values);
    }
    Ok(out)
}

/// Energy-side display names for `codes`.
pub fn colloquial_names(
    codes: &[String],
    energy: &EnergyDataset,
) -> Result<Vec<String>, ReconError> {
    codes
        .iter()
        .map(|code| energy.colloquial_name(code).map(str::to_string))
        .collect()
}

/// `100 * part / total`, missing if either side is missing or total is zero.
pub fn share_percent(part: Option<f64>, total: Option<f64>) -> Option<f64> {
    match (part, total) {
        (Some(part), Some(total)) if total != 0.0 => Some(100.0 * part / total),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Comparison rows
// ---------------------------------------------------------------------------

/// One country's row in the renewable-share vs GDP-per-capita comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub code: String,
    pub country: String,
    pub region: String,
    pub gdp_per_capita: Option<f64>,
    pub total_gwh: Option<f64>,
    pub fossil_share: Option<f64>,
    pub nuclear_share: Option<f64>,
    pub renewable_share: Option<f64>,
}

impl ComparisonRow {
    /// True when both axes of the comparison are present.
    pub fn is_plottable(&self) -> bool {
        self.gdp_per_capita.is_some() && self.renewable_share.is_some()
    }
}

/// Assemble comparison rows for `codes` (normally the sanitized common codes).
pub fn electricity_comparison(
    year: i32,
    codes: &[String],
    gdp: &GdpDataset,
    registry: &Registry,
    energy: &EnergyDataset,
    gdp_series: &str,
) -> Result<Vec<ComparisonRow>, ReconError> {
    let names = colloquial_names(codes, energy)?;
    let gdp_per_capita = gdp_values(&[gdp_series], codes, year, gdp)?
        .remove(gdp_series)
        .unwrap_or_default();
    let electricity = electricity_values(codes, year, energy)?;

    let column = |product: &str, i: usize| -> Option<f64> {
        electricity.get(product).and_then(|v| v.get(i)).copied().flatten()
    };

    codes
        .iter()
        .enumerate()
        .map(|(i, code)| -> Result<ComparisonRow, ReconError> {
            let total = column(PRODUCT_TOTAL, i);
            Ok(ComparisonRow {
                code: code.clone(),
                country: names[i].clone(),
                region: registry.region_of(code)?.to_string(),
                gdp_per_capita: gdp_per_capita.get(i).copied().flatten(),
                total_gwh: total,
                fossil_share: share_percent(column(PRODUCT_FOSSIL, i), total),
                nuclear_share: share_percent(column(PRODUCT_NUCLEAR, i), total),
                renewable_share: share_percent(column(PRODUCT_RENEWABLE, i), total),
            })
        })
        .collect()
}

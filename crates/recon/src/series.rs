use std::sync::OnceLock;

use regex::Regex;

use crate::error::ReconError;
use crate::model::AnnualSeries;

/// Placeholder the World Bank export uses for "no data".
pub const GDP_MISSING_TOKEN: &str = "..";

static GDP_YEAR_LABEL: OnceLock<Regex> = OnceLock::new();

fn gdp_year_label() -> &'static Regex {
    GDP_YEAR_LABEL.get_or_init(|| Regex::new(r"[0-9]+ \[YR[0-9]+\]").expect("static pattern"))
}

/// Year from a World Bank column label such as `2020 [YR2020]`: the first four
/// characters of the first `digits [YRdigits]` run. Anything else is not a year.
pub fn recognize_gdp_year(label: &str) -> Option<i32> {
    let found = gdp_year_label().find(label)?;
    found.as_str().get(..4)?.parse().ok()
}

/// Year from an energy-balance column label: a bare non-negative integer below
/// `ceiling` (other integer-typed columns sit above it).
pub fn recognize_energy_year(label: &str, ceiling: i32) -> Option<i32> {
    let label = label.trim();
    if label.is_empty() || !label.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    label.parse::<i32>().ok().filter(|year| *year < ceiling)
}

/// Map one raw cell to a number or an explicit missing marker.
///
/// Empty cells and any of `missing_tokens` are missing. Everything else must
/// parse as a finite `f64`; `NaN`/`inf` spelled out in the data are rejected
/// rather than passed along as numbers.
pub fn normalize_cell<T: AsRef<str>>(
    raw: &str,
    missing_tokens: &[T],
    column: &str,
) -> Result<Option<f64>, ReconError> {
    let value = raw.trim();
    if value.is_empty() || missing_tokens.iter().any(|t| t.as_ref() == value) {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| ReconError::ValueParse {
            column: column.into(),
            value: raw.into(),
        })
}

/// GDP-side normalization: `".."` is missing, never zero and never a parse error.
pub fn value_for_missing_token(raw: &str) -> Result<Option<f64>, ReconError> {
    normalize_cell(raw, &[GDP_MISSING_TOKEN], "value")
}

/// Value for `year`, or missing when the year is absent or explicitly missing.
pub fn extract_for_year(series: &AnnualSeries, year: i32) -> Option<f64> {
    series.get(year)
}

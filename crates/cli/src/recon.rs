//! `wmix` subcommands: load the configured sources, then resolve, join or compare.

use std::io::Write;
use std::path::{Path, PathBuf};

use worldmix_recon::config::WorldmixConfig;
use worldmix_recon::engine::Datasets;
use worldmix_recon::{ComparisonRow, EdgeCaseOverlay};

use crate::exit_codes::EXIT_ERROR;
use crate::CliError;

/// Read and validate the config; file paths inside it are relative to its directory.
fn load_config(config_path: &Path) -> Result<(WorldmixConfig, PathBuf), CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        CliError::args(format!("cannot read config {}: {e}", config_path.display()))
    })?;
    let config = WorldmixConfig::from_toml(&config_str)?;

    let base_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    Ok((config, base_dir))
}

fn load_datasets(
    config_path: &Path,
    verbose: bool,
) -> Result<(WorldmixConfig, Datasets), CliError> {
    let (config, base_dir) = load_config(config_path)?;
    let data = Datasets::load(&config, &base_dir, verbose)?;
    Ok((config, data))
}

fn write_err(e: std::io::Error) -> CliError {
    CliError::new(EXIT_ERROR, format!("cannot write output: {e}"))
}

// ============================================================================
// resolve
// ============================================================================

pub fn cmd_resolve(
    config_path: PathBuf,
    names: Vec<String>,
    verbose: bool,
) -> Result<(), CliError> {
    let (_, data) = load_datasets(&config_path, verbose)?;
    let resolver = data.resolver();

    let names: Vec<&str> = if names.is_empty() {
        data.energy.country_names()
    } else {
        names.iter().map(String::as_str).collect()
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for name in names {
        writeln!(out, "{name}\t{}", resolver.resolve(name, verbose)).map_err(write_err)?;
    }
    Ok(())
}

// ============================================================================
// common
// ============================================================================

pub fn cmd_common(
    config_path: PathBuf,
    keep_aggregates: bool,
    json_output: bool,
    verbose: bool,
) -> Result<(), CliError> {
    let (config, data) = load_datasets(&config_path, verbose)?;

    let codes = if keep_aggregates {
        data.common_codes()
    } else {
        data.common_codes_sanitized(&config.join.aggregate_code)?
    };

    if json_output {
        let json = serde_json::to_string(&codes)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{json}");
    } else {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for code in &codes {
            writeln!(out, "{code}").map_err(write_err)?;
        }
    }

    eprintln!("{} common code(s)", codes.len());
    Ok(())
}

// ============================================================================
// compare
// ============================================================================

pub fn cmd_compare(
    config_path: PathBuf,
    year: Option<i32>,
    json_output: bool,
    output_file: Option<PathBuf>,
    verbose: bool,
) -> Result<(), CliError> {
    let (config, data) = load_datasets(&config_path, verbose)?;
    let year = year.unwrap_or(config.compare.year);

    let rows = data.electricity_comparison(&config, year)?;

    if json_output || output_file.is_some() {
        let json_str = serde_json::to_string_pretty(&rows)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = output_file {
            std::fs::write(path, &json_str).map_err(write_err)?;
            eprintln!("wrote {}", path.display());
        }
        if json_output {
            println!("{json_str}");
        }
    }

    if !json_output {
        print_table(&rows).map_err(write_err)?;
    }

    let plottable = rows.iter().filter(|r| r.is_plottable()).count();
    eprintln!(
        "{year}: {} countries, {plottable} with both GDP per capita and renewable share",
        rows.len()
    );
    Ok(())
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "-".to_string(),
    }
}

fn print_table(rows: &[ComparisonRow]) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let width = rows.iter().map(|r| r.country.chars().count()).max().unwrap_or(7).max(7);

    writeln!(
        out,
        "{:<4} {:<width$} {:>12} {:>12} {:>8} {:>8} {:>8}",
        "code", "country", "gdp/capita", "total GWh", "fossil%", "nuclear%", "renew%"
    )?;
    for r in rows {
        writeln!(
            out,
            "{:<4} {:<width$} {:>12} {:>12} {:>8} {:>8} {:>8}",
            r.code,
            r.country,
            fmt_opt(r.gdp_per_capita, 0),
            fmt_opt(r.total_gwh, 0),
            fmt_opt(r.fossil_share, 1),
            fmt_opt(r.nuclear_share, 1),
            fmt_opt(r.renewable_share, 1),
        )?;
    }
    Ok(())
}

// ============================================================================
// validate
// ============================================================================

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let (config, base_dir) = load_config(&config_path)?;

    let source = &config.sources.overlay;
    let overlay = EdgeCaseOverlay::load(
        &base_dir.join(&source.path),
        source.delimiter_byte()?,
        &config.overlay,
    )
    .map_err(|e| CliError::from(e).with_hint("the edge-case overlay is required"))?;

    eprintln!(
        "valid: '{}' with {} edge-case substitution(s)",
        config.name,
        overlay.len()
    );
    Ok(())
}

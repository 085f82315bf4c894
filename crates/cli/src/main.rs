// worldmix CLI - country-code reconciliation between GDP and energy datasets

mod exit_codes;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{recon_exit_code, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "wmix")]
#[command(about = "Reconcile country identities across GDP and energy-balance datasets")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log matcher decisions (raises the log level to info)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve colloquial country names to ISO alpha-3 codes
    #[command(after_help = "\
Examples:
  wmix resolve worldmix.toml
  wmix resolve worldmix.toml France 'Republic of Korea'
  wmix resolve worldmix.toml --verbose")]
    Resolve {
        /// Path to the worldmix TOML config
        config: PathBuf,

        /// Names to resolve (default: every country in the energy dataset)
        names: Vec<String>,
    },

    /// List country codes present in both the GDP and the energy dataset
    #[command(after_help = "\
Examples:
  wmix common worldmix.toml
  wmix common worldmix.toml --keep-aggregates --json")]
    Common {
        config: PathBuf,

        /// Keep the world aggregate in the list
        #[arg(long)]
        keep_aggregates: bool,

        /// Output a JSON array instead of one code per line
        #[arg(long)]
        json: bool,
    },

    /// Compare renewable electricity share against GDP per capita
    #[command(after_help = "\
Examples:
  wmix compare worldmix.toml
  wmix compare worldmix.toml --year 2019 --json
  wmix compare worldmix.toml --output comparison.json")]
    Compare {
        config: PathBuf,

        /// Year to compare (default: [compare].year from the config)
        #[arg(long)]
        year: Option<i32>,

        /// Output JSON to stdout instead of a table
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a config and its edge-case overlay without loading datasets
    Validate { config: PathBuf },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\nengine:  worldmix-recon ",
        env!("CARGO_PKG_VERSION"),
    )
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    // RUST_LOG wins; engine `log` records come through the subscriber's bridge
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Resolve { config, names } => recon::cmd_resolve(config, names, cli.verbose),
        Commands::Common { config, keep_aggregates, json } => {
            recon::cmd_common(config, keep_aggregates, json, cli.verbose)
        }
        Commands::Compare { config, year, json, output } => {
            recon::cmd_compare(config, year, json, output, cli.verbose)
        }
        Commands::Validate { config } => recon::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<worldmix_recon::ReconError> for CliError {
    fn from(err: worldmix_recon::ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            worldmix_recon::ReconError::MissingColumn { .. } => {
                Some("check the column names and delimiter in the config".to_string())
            }
            worldmix_recon::ReconError::Sanitization { .. } => {
                Some("use --keep-aggregates or set [join].aggregate_code".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}

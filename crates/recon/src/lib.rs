//! `worldmix-recon`: country-identity reconciliation between GDP and energy data.
//!
//! Pure engine crate: resolves colloquial country names to ISO alpha-3 codes,
//! joins datasets on those codes and assembles comparison rows.
//! No CLI dependencies; file reading is limited to [`model::read_text_file`].

pub mod compare;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod join;
pub mod matcher;
pub mod model;
pub mod overlay;
pub mod registry;
pub mod resolver;
pub mod series;

pub use compare::{electricity_comparison, ComparisonRow};
pub use config::WorldmixConfig;
pub use dataset::{EnergyDataset, GdpDataset, TabularDataset};
pub use engine::Datasets;
pub use error::{LookupKind, ReconError};
pub use join::{common_codes, common_codes_sanitized, CodeSource};
pub use matcher::NameMatcher;
pub use model::{AnnualSeries, CountryRecord, Table};
pub use overlay::EdgeCaseOverlay;
pub use registry::Registry;
pub use resolver::{CodeResolver, UNRESOLVED_CODE};

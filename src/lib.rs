//! Core of the `codemetal-ecflow` EC treatment dashboard backend.
//!
//! The pipeline resolves per-school environment CSVs and a growth workbook
//! in a data directory (Unicode-normalization safe), joins them by school,
//! assigns each school its EC treatment level and computes the grouped
//! statistics the dashboard views are drawn from.
//!
//! Module boundaries follow the Explicit Module Boundary Pattern (EMBP):
//! siblings import from this gateway rather than from each other's
//! internals wherever a type is part of the public surface.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod loader;
pub mod manifest;
pub mod models;
pub mod normalize;
pub mod routes;
pub mod treatment;

#[cfg(test)]
mod testutil;

pub use aggregate::{best_ec_level, summarize, SchoolSummary};
pub use cache::DatasetCache;
pub use config::Config;
pub use dataset::Dataset;
pub use error::{DataError, DatasetIssue};
pub use loader::{load_environment, load_growth, Loaded};
pub use manifest::Manifest;
pub use models::{EnvironmentSample, GrowthRecord};
pub use normalize::{find_file_by_normalized_name, normalize_name};
pub use treatment::{resolve_treatments, stamp_ec_levels, EcSource, Treatments};

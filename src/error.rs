//! Error taxonomy for the EC dashboard pipeline.
//!
//! Two tiers:
//! - [`DatasetIssue`] – a single file or sheet failed. Collected and reported,
//!   never aborts loading of unrelated datasets.
//! - [`DataError`] – pipeline level. `EmptyResult` halts everything
//!   downstream; `AggregationUndefined` is a value the caller inspects.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Per-dataset failure. Serialized verbatim into API responses so the
/// dashboard can show which file or sheet failed while rendering the rest.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetIssue {
    /// A logical dataset could not be resolved even after NFC matching.
    #[error("File not found: {dataset}")]
    FileNotFound { dataset: String },

    /// A resolved file or sheet is missing a column or has a bad value.
    #[error("Schema error in {source_name}: {detail}")]
    Schema { source_name: String, detail: String },

    /// The file exists but could not be opened or decoded.
    #[error("Cannot read {source_name}: {detail}")]
    Unreadable { source_name: String, detail: String },

    /// A file or sheet named a school that is not on the manifest allowlist.
    #[error("Unknown school '{school}' in {source_name}")]
    UnknownSchool { source_name: String, school: String },

    /// A second file or sheet resolved to a school that already has a source.
    #[error("Duplicate source {source_name} for school '{school}' ignored")]
    Duplicate { source_name: String, school: String },

    /// The school has data on only one side and is left out of growth analysis.
    #[error("School '{school}' has {present} data but no {missing} data")]
    NotInOverlap {
        school: String,
        present: &'static str,
        missing: &'static str,
    },
}

impl DatasetIssue {
    // ---
    pub fn schema(source_name: impl Into<String>, detail: impl Into<String>) -> Self {
        DatasetIssue::Schema {
            source_name: source_name.into(),
            detail: detail.into(),
        }
    }

    pub fn unreadable(source_name: impl Into<String>, detail: impl ToString) -> Self {
        DatasetIssue::Unreadable {
            source_name: source_name.into(),
            detail: detail.to_string(),
        }
    }
}

/// Pipeline-level errors.
#[derive(Debug, Error)]
pub enum DataError {
    /// The data directory itself could not be read.
    #[error("Cannot read data directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Nothing usable was loaded; all dependent views must be withheld.
    #[error("No usable data: {0}")]
    EmptyResult(String),

    /// A school's EC treatment level could not be determined.
    #[error("Treatment mapping failed: {0}")]
    Mapping(String),

    /// A requested statistic has no defined value (e.g. empty group).
    #[error("Aggregation undefined: {0}")]
    AggregationUndefined(String),

    /// Writing an export payload failed.
    #[error("Export failed: {0}")]
    Export(String),
}

impl From<csv::Error> for DataError {
    fn from(e: csv::Error) -> Self {
        DataError::Export(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for DataError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        DataError::Export(e.to_string())
    }
}

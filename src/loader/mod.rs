//! Dataset loader gateway.
//!
//! Reads the per-school environment CSVs and the growth workbook from one
//! data directory. Each file or sheet is loaded independently: a failure is
//! recorded as a [`DatasetIssue`] and the remaining datasets still load.
//! Only an unreadable data directory is returned as an error.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::DatasetIssue;

mod columns;
mod environment;
mod growth;

pub use environment::load_environment;
pub use growth::load_growth;

// ---

/// Outcome of loading one category of datasets.
#[derive(Debug, Clone, Serialize)]
pub struct Loaded<T> {
    // ---
    /// Rows per school, in source order.
    pub data: BTreeMap<String, Vec<T>>,

    /// Per-file or per-sheet problems encountered while loading.
    pub issues: Vec<DatasetIssue>,
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Loaded {
            data: BTreeMap::new(),
            issues: Vec::new(),
        }
    }
}

impl<T> Loaded<T> {
    // ---
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.data.values().map(Vec::len).sum()
    }
}

//! Route gateway for the dashboard API.
//!
//! Each sibling module exports a subrouter; this gateway merges them and
//! attaches the shared state so `main.rs` never sees individual endpoints.

use std::sync::Arc;

use axum::Router;

use crate::{Config, Dataset, DatasetCache};

mod environment;
mod error;
mod export;
mod growth;
mod health;
mod overview;

pub use error::{ApiError, ApiResult};

/// Shared handler state: the dataset cache and the configuration snapshot.
pub type AppState = (Arc<DatasetCache>, Config);

// ---

pub fn router(cache: Arc<DatasetCache>, config: Config) -> Router {
    // ---
    Router::new()
        .merge(overview::router())
        .merge(environment::router())
        .merge(growth::router())
        .merge(export::router())
        .merge(health::router())
        .with_state((cache, config))
}

/// Fetch the current dataset, loading it off the async runtime on a miss.
async fn current_dataset(cache: Arc<DatasetCache>, config: Config) -> ApiResult<Arc<Dataset>> {
    // ---
    tokio::task::spawn_blocking(move || {
        cache.get_or_load(&config.data_dir, || {
            Dataset::load(&config.data_dir, &config.manifest, config.ec_source)
        })
    })
    .await
    .map_err(|e| ApiError::Internal(format!("dataset load task failed: {}", e)))?
    .map_err(ApiError::from)
}

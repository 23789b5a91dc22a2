//! Overview view and manual reload.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::{current_dataset, AppState, ApiResult};
use crate::{aggregate::Overview, DatasetIssue, EcSource};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/overview", get(handler))
        .route("/api/reload", post(reload))
}

#[derive(Debug, Serialize)]
struct OverviewResponse {
    load_id: Uuid,
    loaded_at: DateTime<Utc>,
    ec_source: EcSource,
    #[serde(flatten)]
    overview: Overview,
    issues: Vec<DatasetIssue>,
}

async fn handler(State((cache, config)): State<AppState>) -> ApiResult<Json<OverviewResponse>> {
    // ---
    info!("GET /api/overview");

    let dataset = current_dataset(cache, config).await?;
    let overview = dataset.overview()?;

    Ok(Json(OverviewResponse {
        load_id: dataset.load_id,
        loaded_at: dataset.loaded_at,
        ec_source: dataset.treatments.source,
        overview,
        issues: dataset.issues.clone(),
    }))
}

#[derive(Debug, Serialize)]
struct ReloadResponse {
    load_id: Uuid,
    issues: usize,
}

async fn reload(State((cache, config)): State<AppState>) -> ApiResult<Json<ReloadResponse>> {
    // ---
    info!("POST /api/reload - invalidating dataset cache");
    cache.invalidate();

    let dataset = current_dataset(Arc::clone(&cache), config).await?;
    Ok(Json(ReloadResponse {
        load_id: dataset.load_id,
        issues: dataset.issues.len(),
    }))
}

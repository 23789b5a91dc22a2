//! Growth view: EC-level and per-school growth statistics.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::{current_dataset, ApiResult, AppState};
use crate::{dataset::GrowthView, DatasetIssue};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/growth", get(handler))
}

#[derive(Debug, Serialize)]
struct GrowthResponse {
    load_id: Uuid,
    #[serde(flatten)]
    view: GrowthView,
    issues: Vec<DatasetIssue>,
}

async fn handler(State((cache, config)): State<AppState>) -> ApiResult<Json<GrowthResponse>> {
    // ---
    info!("GET /api/growth");

    let dataset = current_dataset(cache, config).await?;
    let view = dataset.growth_view()?;

    info!("Optimal EC level {} across {} groups", view.optimal_ec, view.by_ec.len());
    Ok(Json(GrowthResponse {
        load_id: dataset.load_id,
        view,
        issues: dataset.issues.clone(),
    }))
}

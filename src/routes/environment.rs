//! Environment view: per-school means and an optional single-school series.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::{current_dataset, ApiError, ApiResult, AppState};
use crate::{normalize::normalize_name, DatasetIssue, EnvironmentSample, SchoolSummary};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/environment", get(handler))
}

/// Query parameters for the environment view
#[derive(Debug, Deserialize)]
pub struct EnvironmentQuery {
    school: Option<String>,
}

#[derive(Debug, Serialize)]
struct SchoolSeries {
    school: String,
    target_ec: Option<f64>,
    samples: Vec<EnvironmentSample>,
}

#[derive(Debug, Serialize)]
struct EnvironmentResponse {
    load_id: Uuid,
    summaries: Vec<SchoolSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    series: Option<SchoolSeries>,
    issues: Vec<DatasetIssue>,
}

async fn handler(
    Query(params): Query<EnvironmentQuery>,
    State((cache, config)): State<AppState>,
) -> ApiResult<Json<EnvironmentResponse>> {
    // ---
    info!("GET /api/environment {:?}", params);

    let dataset = current_dataset(cache, config).await?;

    let series = match params.school.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(school) => {
            let school = normalize_name(school);
            let samples = dataset.series(&school).ok_or_else(|| {
                ApiError::NotFound(format!("no environment data for school '{}'", school))
            })?;
            debug!("Returning {} samples for '{}'", samples.len(), school);
            Some(SchoolSeries {
                target_ec: dataset.treatments.target(&school),
                samples: samples.to_vec(),
                school,
            })
        }
    };

    Ok(Json(EnvironmentResponse {
        load_id: dataset.load_id,
        summaries: dataset.summaries(),
        series,
        issues: dataset.issues.clone(),
    }))
}

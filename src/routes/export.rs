//! Download endpoints for the full environment and growth tables.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::info;

use super::{current_dataset, ApiResult, AppState};
use crate::export::{environment_csv, growth_xlsx, ENVIRONMENT_CSV_NAME, GROWTH_XLSX_NAME};

// ---

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/export/environment.csv", get(environment))
        .route("/api/export/growth.xlsx", get(growth))
}

async fn environment(State((cache, config)): State<AppState>) -> ApiResult<Response> {
    // ---
    info!("GET /api/export/environment.csv");

    let dataset = current_dataset(cache, config).await?;
    let body = environment_csv(&dataset.environment)?;
    Ok(attachment(body, "text/csv; charset=utf-8", "environment.csv", ENVIRONMENT_CSV_NAME))
}

async fn growth(State((cache, config)): State<AppState>) -> ApiResult<Response> {
    // ---
    info!("GET /api/export/growth.xlsx");

    let dataset = current_dataset(cache, config).await?;
    let body = growth_xlsx(&dataset.growth)?;
    Ok(attachment(body, XLSX_MIME, "growth.xlsx", GROWTH_XLSX_NAME))
}

/// Build a download response. `fallback` is the ASCII name for clients that
/// ignore the RFC 5987 `filename*` parameter.
fn attachment(body: Vec<u8>, mime: &str, fallback: &str, file_name: &str) -> Response {
    // ---
    let disposition = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    );

    (
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

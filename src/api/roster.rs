//! Roster-wide endpoints: search, CSV export and CSV import.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::csv_io;
use crate::errors::AppError;
use crate::models::{ImportReport, MemberView};
use crate::AppState;

/// Query parameters for search.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/search - Substring search over nickname, name and year.
pub async fn search_brothers(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<MemberView>> {
    let matches = state.repo.search(query.q.trim()).await?;
    let roster = state.repo.list_members().await?;
    success(MemberView::collect(matches, &roster))
}

/// GET /api/export - Download the roster as CSV.
pub async fn export_roster(State(state): State<AppState>) -> Result<Response, AppError> {
    let members = state.repo.list_members().await?;
    let body = csv_io::export_csv(members)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"brothers.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}

/// POST /api/import - Create or update brothers from a CSV body.
pub async fn import_roster(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<ImportReport> {
    let report = csv_io::import_csv(&state.repo, &body).await?;
    success(report)
}

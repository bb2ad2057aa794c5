//! REST API module.
//!
//! Contains all API routes and handlers for the roster and its tree views.

mod brothers;
mod roster;

pub use brothers::*;
pub use roster::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Datelike;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::Node;
use crate::tree::TreeBuilder;
use crate::AppState;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Calendar year that marks a cohort as active, read once per request.
fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Build the subtree rooted at `nickname` as of the current year.
async fn build_tree(state: &AppState, nickname: &str) -> Result<Node, AppError> {
    TreeBuilder::new(state.repo.as_ref(), current_year())
        .max_depth(state.config.max_tree_depth)
        .build(nickname)
        .await
}

//! Brother API endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};

use super::{build_tree, success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    AddLittleRequest, BrotherBody, BrotherQuery, CreateMemberRequest, MemberView, Node,
    RekeyRequest, Shape, UpdateMemberRequest,
};
use crate::AppState;

/// GET /api/brothers - List all brothers in insertion order.
pub async fn list_brothers(State(state): State<AppState>) -> ApiResult<Vec<MemberView>> {
    let roster = state.repo.list_members().await?;
    success(MemberView::collect(roster.clone(), &roster))
}

/// GET /api/brothers/:nickname - Get a brother's subtree, or the flat view with `?shape=flat`.
pub async fn get_brother(
    State(state): State<AppState>,
    Path(nickname): Path<String>,
    Query(query): Query<BrotherQuery>,
) -> ApiResult<BrotherBody> {
    match query.shape {
        Shape::Tree => success(BrotherBody::Tree(build_tree(&state, &nickname).await?)),
        Shape::Flat => {
            let member = state
                .repo
                .get_member(&nickname)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Brother {} not found", nickname)))?;
            let littles = state
                .repo
                .get_littles(&nickname)
                .await?
                .into_iter()
                .map(|little| little.nickname)
                .collect();
            success(BrotherBody::Flat(MemberView::new(member, littles)))
        }
    }
}

/// POST /api/brothers - Create a new brother.
pub async fn create_brother(
    State(state): State<AppState>,
    payload: Result<Json<CreateMemberRequest>, JsonRejection>,
) -> ApiResult<Node> {
    let Json(request) = payload?;
    let member = request.validate()?;

    state.repo.create_member(&member).await?;
    success(build_tree(&state, &member.nickname).await?)
}

/// PUT /api/brothers/:nickname - Replace a brother's name, big and year.
pub async fn update_brother(
    State(state): State<AppState>,
    Path(nickname): Path<String>,
    payload: Result<Json<UpdateMemberRequest>, JsonRejection>,
) -> ApiResult<Node> {
    let Json(request) = payload?;
    let member = request.validate(&nickname)?;

    state.repo.update_member(&member).await?;
    success(build_tree(&state, &nickname).await?)
}

/// DELETE /api/brothers/:nickname - Delete a brother, leaving littles orphaned.
pub async fn delete_brother(
    State(state): State<AppState>,
    Path(nickname): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_member(&nickname).await?;
    success(())
}

/// PUT /api/brothers/:nickname/rekey - Change a brother's nickname.
pub async fn rekey_brother(
    State(state): State<AppState>,
    Path(nickname): Path<String>,
    payload: Result<Json<RekeyRequest>, JsonRejection>,
) -> ApiResult<Node> {
    let Json(request) = payload?;
    let new_nickname = request.validate()?;

    state.repo.rekey_member(&nickname, &new_nickname).await?;
    success(build_tree(&state, &new_nickname).await?)
}

/// PUT /api/brothers/:nickname/littles - Attach an existing brother as a little.
pub async fn add_little(
    State(state): State<AppState>,
    Path(nickname): Path<String>,
    payload: Result<Json<AddLittleRequest>, JsonRejection>,
) -> ApiResult<Node> {
    let Json(request) = payload?;

    state.repo.add_little(&nickname, request.little.trim()).await?;
    success(build_tree(&state, &nickname).await?)
}

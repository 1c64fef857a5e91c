use axum::{Json, Router, extract::{Query, State}, routing::get};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_registered},
    response::{ApiResponse, Meta},
    state::AppState,
    uploads::UploadAuthParams,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/sign", get(sign_upload))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignUploadQuery {
    pub file_name: String,
}

#[utoipa::path(
    get,
    path = "/api/uploads/sign",
    params(
        ("file_name" = String, Query, description = "Intended file name on the CDN")
    ),
    responses(
        (status = 200, description = "Short-lived signed upload parameters", body = ApiResponse<UploadAuthParams>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Uploads"
)]
pub async fn sign_upload(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SignUploadQuery>,
) -> AppResult<Json<ApiResponse<UploadAuthParams>>> {
    ensure_registered(&user)?;

    let file_name = query.file_name.trim();
    if file_name.is_empty() {
        return Err(AppError::BadRequest("file_name is required".into()));
    }

    let params = state.uploads.sign(file_name);
    Ok(Json(ApiResponse::success(
        "Upload authorized",
        params,
        Some(Meta::empty()),
    )))
}

use axum::{Json, Router, extract::{Query, State}, routing::get};

use crate::{
    dto::search::{SearchQuery, SearchResults},
    error::AppResult,
    response::ApiResponse,
    services::search_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(search))
}

#[utoipa::path(
    get,
    path = "/api/search",
    params(
        ("q" = String, Query, description = "Free-text search query")
    ),
    responses(
        (status = 200, description = "Combined keyword and semantic matches", body = ApiResponse<SearchResults>)
    ),
    tag = "Search"
)]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<SearchResults>>> {
    let resp = search_service::search(&state, &query.q).await?;
    Ok(Json(resp))
}

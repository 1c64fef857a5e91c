use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::reviews::{SubmitReviewRequest, TestimonialList},
    error::AppResult,
    models::Testimonial,
    response::ApiResponse,
    services::review_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reviews))
        .route("/", post(submit_review))
}

#[utoipa::path(
    get,
    path = "/api/reviews",
    responses(
        (status = 200, description = "List testimonials", body = ApiResponse<TestimonialList>)
    ),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<TestimonialList>>> {
    let resp = review_service::list_testimonials(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = SubmitReviewRequest,
    responses(
        (status = 200, description = "Review accepted", body = ApiResponse<Testimonial>),
        (status = 400, description = "Not delivered yet, name mismatch, or invalid rating"),
        (status = 404, description = "Order not found"),
    ),
    tag = "Reviews"
)]
pub async fn submit_review(
    State(state): State<AppState>,
    Json(payload): Json<SubmitReviewRequest>,
) -> AppResult<Json<ApiResponse<Testimonial>>> {
    let resp = review_service::submit_review(&state, payload).await?;
    Ok(Json(resp))
}

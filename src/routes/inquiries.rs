use axum::{Json, Router, extract::State, routing::post};
use uuid::Uuid;

use crate::{
    dto::inquiries::{CreateInquiryRequest, SubscribeRequest},
    error::{AppError, AppResult},
    models::{Inquiry, Subscriber},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(create_inquiry))
}

pub fn subscribe_router() -> Router<AppState> {
    Router::new().route("/", post(subscribe))
}

#[utoipa::path(
    post,
    path = "/api/inquiries",
    request_body = CreateInquiryRequest,
    responses(
        (status = 200, description = "Inquiry recorded", body = ApiResponse<Inquiry>),
        (status = 400, description = "Missing fields"),
    ),
    tag = "Inquiries"
)]
pub async fn create_inquiry(
    State(state): State<AppState>,
    Json(payload): Json<CreateInquiryRequest>,
) -> AppResult<Json<ApiResponse<Inquiry>>> {
    let missing: Vec<String> = [
        ("name", payload.name.trim()),
        ("phone", payload.phone.trim()),
        ("message", payload.message.trim()),
    ]
    .iter()
    .filter(|(_, v)| v.is_empty())
    .map(|(name, _)| (*name).to_string())
    .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(missing));
    }

    let inquiry: Inquiry = sqlx::query_as(
        "INSERT INTO inquiries (id, name, phone, message) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(payload.name.trim())
    .bind(payload.phone.trim())
    .bind(payload.message.trim())
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(
        "Message sent",
        inquiry,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    post,
    path = "/api/subscribe",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Subscribed", body = ApiResponse<Subscriber>),
        (status = 400, description = "Invalid email"),
    ),
    tag = "Inquiries"
)]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> AppResult<Json<ApiResponse<Subscriber>>> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("Invalid email".into()));
    }

    let subscriber: Subscriber = sqlx::query_as(
        r#"
        INSERT INTO subscribers (id, email)
        VALUES ($1, $2)
        ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(
        "Subscribed",
        subscriber,
        Some(Meta::empty()),
    )))
}

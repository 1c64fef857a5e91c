use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::reviews::{SubmitReviewRequest, TestimonialList},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_registered},
    models::{Order, Testimonial},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_testimonials(state: &AppState) -> AppResult<ApiResponse<TestimonialList>> {
    let items = sqlx::query_as::<_, Testimonial>(
        "SELECT * FROM testimonials ORDER BY created_at DESC",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Testimonials",
        TestimonialList { items },
        None,
    ))
}

/// The review gate. A testimonial is only accepted against a real order that
/// has been delivered, and only under the name the order was placed with.
pub async fn submit_review(
    state: &AppState,
    payload: SubmitReviewRequest,
) -> AppResult<ApiResponse<Testimonial>> {
    let missing: Vec<String> = [
        ("author", payload.author.trim()),
        ("order_number", payload.order_number.trim()),
        ("quote", payload.quote.trim()),
    ]
    .iter()
    .filter(|(_, v)| v.is_empty())
    .map(|(name, _)| (*name).to_string())
    .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(missing));
    }

    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest("Rating must be between 1 and 5".into()));
    }

    let order: Option<Order> = sqlx::query_as("SELECT * FROM orders WHERE order_number = $1")
        .bind(payload.order_number.trim())
        .fetch_optional(&state.pool)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFoundEntity("Order")),
    };

    if order.status != "delivered" {
        return Err(AppError::BadRequest(
            "Order has not been delivered yet".into(),
        ));
    }

    if !name_matches(&payload.author, &order.buyer_name) {
        return Err(AppError::BadRequest("Name does not match the order".into()));
    }

    let testimonial: Testimonial = sqlx::query_as(
        r#"
        INSERT INTO testimonials (id, author, quote, rating, order_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.author.trim())
    .bind(payload.quote.trim())
    .bind(payload.rating)
    .bind(order.id)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Review submitted",
        testimonial,
        Some(Meta::empty()),
    ))
}

pub async fn delete_testimonial(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_registered(user)?;
    let result = sqlx::query("DELETE FROM testimonials WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "testimonial_delete",
        Some("testimonials"),
        Some(serde_json::json!({ "testimonial_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn name_matches(author: &str, buyer_name: &str) -> bool {
    author.trim().to_lowercase() == buyer_name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_compare_case_insensitively() {
        assert!(name_matches("lina haddad", "Lina Haddad"));
        assert!(name_matches("  LINA HADDAD ", "lina haddad"));
        assert!(!name_matches("Lina H.", "Lina Haddad"));
    }
}

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::{
        inquiries::{InquiryList, SubscriberList},
        orders::{OrderList, OrderWithLines},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_registered},
    models::{Inquiry, Order, OrderLine, ORDER_STATUSES, Subscriber},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

/// The numbers on the admin landing page.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub products: i64,
    pub orders_total: i64,
    pub orders_processing: i64,
    pub testimonials: i64,
    pub inquiries: i64,
    pub subscribers: i64,
}

pub async fn dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<DashboardSummary>> {
    ensure_registered(user)?;

    let (products,): (i64,) = sqlx::query_as("SELECT count(*) FROM products")
        .fetch_one(&state.pool)
        .await?;
    let (orders_total,): (i64,) = sqlx::query_as("SELECT count(*) FROM orders")
        .fetch_one(&state.pool)
        .await?;
    let (orders_processing,): (i64,) =
        sqlx::query_as("SELECT count(*) FROM orders WHERE status = 'processing'")
            .fetch_one(&state.pool)
            .await?;
    let (testimonials,): (i64,) = sqlx::query_as("SELECT count(*) FROM testimonials")
        .fetch_one(&state.pool)
        .await?;
    let (inquiries,): (i64,) = sqlx::query_as("SELECT count(*) FROM inquiries")
        .fetch_one(&state.pool)
        .await?;
    let (subscribers,): (i64,) = sqlx::query_as("SELECT count(*) FROM subscribers")
        .fetch_one(&state.pool)
        .await?;

    let summary = DashboardSummary {
        products,
        orders_total,
        orders_processing,
        testimonials,
        inquiries,
        subscribers,
    };
    Ok(ApiResponse::success("Dashboard", summary, Some(Meta::empty())))
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_registered(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let status = query.status.as_deref().filter(|s| !s.is_empty());
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let sql = format!(
        "SELECT * FROM orders WHERE ($1::text IS NULL OR status = $1) \
         ORDER BY created_at {} LIMIT $2 OFFSET $3",
        sort_order.as_sql()
    );
    let items = sqlx::query_as::<_, Order>(&sql)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

    let total: (i64,) =
        sqlx::query_as("SELECT count(*) FROM orders WHERE ($1::text IS NULL OR status = $1)")
            .bind(status)
            .fetch_one(&state.pool)
            .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(meta),
    ))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithLines>> {
    ensure_registered(user)?;
    let order: Option<Order> = sqlx::query_as("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFoundEntity("Order")),
    };

    let lines = sqlx::query_as::<_, OrderLine>(
        "SELECT * FROM order_lines WHERE order_id = $1 ORDER BY created_at",
    )
    .bind(order.id)
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Order found",
        OrderWithLines { order, lines },
        Some(Meta::empty()),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    status: String,
) -> AppResult<ApiResponse<Order>> {
    ensure_registered(user)?;
    validate_order_status(&status)?;

    let order: Option<Order> = sqlx::query_as(
        "UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&status)
    .bind(Utc::now())
    .fetch_optional(&state.pool)
    .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFoundEntity("Order")),
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        order,
        Some(Meta::empty()),
    ))
}

/// Direct, irreversible delete; the lines go with the order.
pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_registered(user)?;
    let result = sqlx::query("DELETE FROM orders WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFoundEntity("Order"));
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_delete",
        Some("orders"),
        Some(serde_json::json!({ "order_id": id })),
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

pub async fn list_inquiries(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<InquiryList>> {
    ensure_registered(user)?;
    let items = sqlx::query_as::<_, Inquiry>("SELECT * FROM inquiries ORDER BY created_at DESC")
        .fetch_all(&state.pool)
        .await?;
    Ok(ApiResponse::success("Inquiries", InquiryList { items }, None))
}

pub async fn delete_inquiry(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_registered(user)?;
    let result = sqlx::query("DELETE FROM inquiries WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFoundEntity("Inquiry"));
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_subscribers(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<SubscriberList>> {
    ensure_registered(user)?;
    let items =
        sqlx::query_as::<_, Subscriber>("SELECT * FROM subscribers ORDER BY created_at DESC")
            .fetch_all(&state.pool)
            .await?;
    Ok(ApiResponse::success(
        "Subscribers",
        SubscriberList { items },
        None,
    ))
}

fn validate_order_status(status: &str) -> Result<(), AppError> {
    if ORDER_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid order status".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_four_statuses_are_accepted() {
        for status in ORDER_STATUSES {
            assert!(validate_order_status(status).is_ok());
        }
        assert!(validate_order_status("paid").is_err());
        assert!(validate_order_status("Processing").is_err());
        assert!(validate_order_status("").is_err());
    }
}

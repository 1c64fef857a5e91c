use axum::{
    Json, Router,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::{
        BrandList, BrandSummary, CreateProductRequest, ProductList, UpdateProductRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_registered},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create_product))
        .route("/", axum::routing::get(list_products))
        .route("/{id}", axum::routing::get(get_product))
        .route("/{id}", axum::routing::put(update_product))
        .route("/{id}", axum::routing::delete(delete_product))
}

pub fn brands_router() -> Router<AppState> {
    Router::new().route("/", axum::routing::get(list_brands))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Substring filter on name/brand/description"),
        ("brand" = Option<String>, Query, description = "Filter by brand"),
        ("category" = Option<String>, Query, description = "Filter by category label"),
        ("min_price_cents" = Option<i64>, Query, description = "Lower price bound"),
        ("max_price_cents" = Option<i64>, Query, description = "Upper price bound"),
        ("sort_by" = Option<String>, Query, description = "Sort column: created_at, price, name"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc"),
    ),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let (page, limit, offset) = query.pagination.normalize();

    let pattern = query
        .q
        .as_ref()
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s));
    let brand = query.brand.as_deref().filter(|s| !s.is_empty());
    let category = query.category.as_deref().filter(|s| !s.is_empty());

    let filter = r#"
        ($1::text IS NULL OR name ILIKE $1 OR brand ILIKE $1 OR description ILIKE $1)
        AND ($2::text IS NULL OR brand ILIKE $2)
        AND ($3::text IS NULL OR EXISTS (SELECT 1 FROM unnest(categories) AS c WHERE c ILIKE $3))
        AND ($4::bigint IS NULL OR price_cents >= $4)
        AND ($5::bigint IS NULL OR price_cents <= $5)
    "#;

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sql = format!(
        "SELECT * FROM products WHERE {filter} ORDER BY {} {} LIMIT $6 OFFSET $7",
        sort_by.as_sql(),
        sort_order.as_sql()
    );

    let items = sqlx::query_as::<_, Product>(&sql)
        .bind(pattern.as_deref())
        .bind(brand)
        .bind(category)
        .bind(query.min_price_cents)
        .bind(query.max_price_cents)
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

    let count_sql = format!("SELECT count(*) FROM products WHERE {filter}");
    let total: (i64,) = sqlx::query_as(&count_sql)
        .bind(pattern.as_deref())
        .bind(brand)
        .bind(category)
        .bind(query.min_price_cents)
        .bind(query.max_price_cents)
        .fetch_one(&state.pool)
        .await?;

    let meta = Meta::new(page, limit, total.0);
    let data = ProductList { items };
    Ok(Json(ApiResponse::success("Products", data, Some(meta))))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let result = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let result = match result {
        Some(p) => p,
        None => return Err(AppError::NotFoundEntity("Product")),
    };
    Ok(Json(ApiResponse::success("Product", result, None)))
}

#[utoipa::path(
    get,
    path = "/api/brands",
    responses(
        (status = 200, description = "List brands with product counts", body = ApiResponse<BrandList>)
    ),
    tag = "Products"
)]
pub async fn list_brands(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<BrandList>>> {
    let items = sqlx::query_as::<_, BrandSummary>(
        "SELECT brand, count(*) AS product_count FROM products GROUP BY brand ORDER BY brand",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success("Brands", BrandList { items }, None)))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Create product", body = ApiResponse<Product>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    ensure_registered(&user)?;
    validate_pricing(payload.price_cents, payload.discount_percent)?;

    let id = Uuid::new_v4();
    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products
            (id, name, brand, description, price_cents, discount_percent,
             categories, image_url, image_file_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(payload.name)
    .bind(payload.brand)
    .bind(payload.description)
    .bind(payload.price_cents)
    .bind(payload.discount_percent)
    .bind(payload.categories)
    .bind(payload.image_url)
    .bind(payload.image_file_id)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(Json(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<Product>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    ensure_registered(&user)?;

    let existing = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFoundEntity("Product")),
    };

    let name = payload.name.unwrap_or(existing.name);
    let brand = payload.brand.unwrap_or(existing.brand);
    let description = payload.description.unwrap_or(existing.description);
    let price_cents = payload.price_cents.unwrap_or(existing.price_cents);
    let discount_percent = payload.discount_percent.unwrap_or(existing.discount_percent);
    let categories = payload.categories.unwrap_or(existing.categories);
    let image_url = payload.image_url.or(existing.image_url);
    let image_file_id = payload.image_file_id.or(existing.image_file_id);

    validate_pricing(price_cents, discount_percent)?;

    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET name = $2, brand = $3, description = $4, price_cents = $5,
            discount_percent = $6, categories = $7, image_url = $8, image_file_id = $9
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(brand)
    .bind(description)
    .bind(price_cents)
    .bind(discount_percent)
    .bind(categories)
    .bind(image_url)
    .bind(image_file_id)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(Json(ApiResponse::success(
        "Updated",
        product,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Deleted product"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_registered(&user)?;
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFoundEntity("Product"));
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(Json(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}

fn validate_pricing(price_cents: i64, discount_percent: i32) -> Result<(), AppError> {
    if price_cents < 0 {
        return Err(AppError::BadRequest("Price must not be negative".into()));
    }
    if !(0..=100).contains(&discount_percent) {
        return Err(AppError::BadRequest(
            "Discount percent must be between 0 and 100".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_must_stay_within_percent_bounds() {
        assert!(validate_pricing(1_000, 0).is_ok());
        assert!(validate_pricing(1_000, 100).is_ok());
        assert!(validate_pricing(1_000, 101).is_err());
        assert!(validate_pricing(1_000, -1).is_err());
        assert!(validate_pricing(-1, 10).is_err());
    }
}

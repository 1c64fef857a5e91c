use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, patch},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartView, SetQuantityRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(view_cart).delete(clear_cart))
        .route("/items", axum::routing::post(add_to_cart))
        .route("/items/{product_id}", patch(set_quantity))
        .route("/items/{product_id}", delete(remove_from_cart))
}

fn cart_view(state: &AppState, user: &AuthUser) -> CartView {
    let cart = state.carts.snapshot(user.user_id);
    CartView {
        subtotal_cents: cart.subtotal_cents(),
        lines: cart.lines().to_vec(),
    }
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Current cart with subtotal", body = ApiResponse<CartView>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn view_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(ApiResponse::success(
        "Cart",
        cart_view(&state, &user),
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Product added", body = ApiResponse<CartView>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(payload.product_id)
        .fetch_optional(&state.pool)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFoundEntity("Product")),
    };

    state.carts.with_cart(user.user_id, |cart| cart.add(&product));

    Ok(Json(ApiResponse::success(
        "Added to cart",
        cart_view(&state, &user),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    patch,
    path = "/api/cart/items/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    request_body = SetQuantityRequest,
    responses(
        (status = 200, description = "Quantity updated", body = ApiResponse<CartView>),
        (status = 404, description = "Not in cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn set_quantity(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<SetQuantityRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let updated = state
        .carts
        .with_cart(user.user_id, |cart| cart.set_quantity(product_id, payload.quantity));
    if !updated {
        return Err(AppError::NotFound);
    }

    Ok(Json(ApiResponse::success(
        "Quantity updated",
        cart_view(&state, &user),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Removed from cart", body = ApiResponse<CartView>),
        (status = 404, description = "Not in cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let removed = state
        .carts
        .with_cart(user.user_id, |cart| cart.remove(product_id));
    if !removed {
        return Err(AppError::NotFound);
    }

    Ok(Json(ApiResponse::success(
        "Removed from cart",
        cart_view(&state, &user),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart cleared", body = ApiResponse<CartView>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartView>>> {
    state.carts.clear(user.user_id);
    Ok(Json(ApiResponse::success(
        "Cart cleared",
        cart_view(&state, &user),
        Some(Meta::empty()),
    )))
}

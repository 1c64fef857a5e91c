use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{CheckoutRequest, DeliveryMethod, OrderWithLines},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderLine, PICKUP_ADDRESS},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Place an order from the caller's cart. The order row and every line are
/// written in one transaction; a failure anywhere leaves nothing behind and
/// keeps the cart intact.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithLines>> {
    let missing = missing_fields(&payload);
    if !missing.is_empty() {
        return Err(AppError::Validation(missing));
    }

    let cart = state.carts.snapshot(user.user_id);
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let shipping_address = compose_shipping_address(&payload);
    let order_id = Uuid::new_v4();
    let order_number = build_order_number(order_id);

    let mut txn = state.pool.begin().await?;

    let order: Order = sqlx::query_as(
        r#"
        INSERT INTO orders
            (id, order_number, user_id, buyer_name, phone_number,
             delivery_method, shipping_address, status, total_cents)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 'processing', $8)
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(&order_number)
    .bind(user.user_id)
    .bind(payload.buyer_name.trim())
    .bind(payload.phone_number.trim())
    .bind(payload.delivery_method.as_str())
    .bind(&shipping_address)
    .bind(cart.subtotal_cents())
    .fetch_one(&mut *txn)
    .await?;

    let mut lines: Vec<OrderLine> = Vec::with_capacity(cart.lines().len());
    for cart_line in cart.lines() {
        let line: OrderLine = sqlx::query_as(
            r#"
            INSERT INTO order_lines
                (id, order_id, product_id, name, brand, unit_price_cents, quantity, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order.id)
        .bind(cart_line.product_id)
        .bind(&cart_line.name)
        .bind(&cart_line.brand)
        .bind(cart_line.unit_price_cents())
        .bind(cart_line.quantity)
        .bind(&cart_line.image_url)
        .fetch_one(&mut *txn)
        .await?;
        lines.push(line);
    }

    txn.commit().await?;

    // Only a committed order empties the cart.
    state.carts.clear(user.user_id);

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({
            "order_id": order.id,
            "order_number": order.order_number,
            "total_cents": order.total_cents,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order placed",
        OrderWithLines { order, lines },
        Some(Meta::empty()),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithLines>> {
    let order: Option<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user.user_id)
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
        "OK",
        OrderWithLines { order, lines },
        Some(Meta::empty()),
    ))
}

/// Names of the required fields the payload leaves blank. Buyer name and
/// phone are always required; the address block only for delivery orders.
fn missing_fields(payload: &CheckoutRequest) -> Vec<String> {
    let mut missing = Vec::new();
    let mut require = |name: &str, value: &str| {
        if value.trim().is_empty() {
            missing.push(name.to_string());
        }
    };

    require("buyer_name", &payload.buyer_name);
    require("phone_number", &payload.phone_number);

    if payload.delivery_method == DeliveryMethod::Delivery {
        require("city", &payload.city);
        require("neighborhood", &payload.neighborhood);
        require("street", &payload.street);
        require("building_number", &payload.building_number);
    }

    missing
}

fn compose_shipping_address(payload: &CheckoutRequest) -> String {
    if payload.delivery_method == DeliveryMethod::Pickup {
        return PICKUP_ADDRESS.to_string();
    }

    let mut address = format!(
        "{}, {}, {}, {}",
        payload.street.trim(),
        payload.building_number.trim(),
        payload.neighborhood.trim(),
        payload.city.trim()
    );
    if let Some(landmark) = payload.landmark.as_deref() {
        if !landmark.trim().is_empty() {
            address.push_str(&format!(" (near {})", landmark.trim()));
        }
    }
    address
}

fn build_order_number(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.to_string();
    let short = &suffix[..8];
    format!("ORD-{}-{}", date, short)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delivery_request() -> CheckoutRequest {
        CheckoutRequest {
            buyer_name: "Lina Haddad".into(),
            phone_number: "0791234567".into(),
            delivery_method: DeliveryMethod::Delivery,
            city: "Amman".into(),
            neighborhood: "Abdoun".into(),
            street: "123 Main St".into(),
            building_number: "Building 1, Floor 2".into(),
            landmark: None,
        }
    }

    #[test]
    fn complete_delivery_request_has_no_missing_fields() {
        assert!(missing_fields(&delivery_request()).is_empty());
    }

    #[test]
    fn delivery_requires_the_address_block() {
        let mut req = delivery_request();
        req.city = "  ".into();
        req.street = String::new();

        let missing = missing_fields(&req);
        assert_eq!(missing, vec!["city".to_string(), "street".to_string()]);
    }

    #[test]
    fn pickup_skips_the_address_block() {
        let req = CheckoutRequest {
            city: String::new(),
            neighborhood: String::new(),
            street: String::new(),
            building_number: String::new(),
            delivery_method: DeliveryMethod::Pickup,
            ..delivery_request()
        };
        assert!(missing_fields(&req).is_empty());
    }

    #[test]
    fn buyer_name_and_phone_are_always_required() {
        let req = CheckoutRequest {
            buyer_name: String::new(),
            phone_number: String::new(),
            delivery_method: DeliveryMethod::Pickup,
            ..delivery_request()
        };
        let missing = missing_fields(&req);
        assert_eq!(
            missing,
            vec!["buyer_name".to_string(), "phone_number".to_string()]
        );
    }

    #[test]
    fn delivery_address_is_composed_from_the_sub_fields() {
        let req = delivery_request();
        assert_eq!(
            compose_shipping_address(&req),
            "123 Main St, Building 1, Floor 2, Abdoun, Amman"
        );
    }

    #[test]
    fn landmark_is_appended_when_present() {
        let mut req = delivery_request();
        req.landmark = Some("the big mosque".into());
        assert!(compose_shipping_address(&req).ends_with("(near the big mosque)"));
    }

    #[test]
    fn pickup_uses_the_fixed_address() {
        let mut req = delivery_request();
        req.delivery_method = DeliveryMethod::Pickup;
        assert_eq!(compose_shipping_address(&req), PICKUP_ADDRESS);
    }

    #[test]
    fn order_number_carries_date_and_id_prefix() {
        let id = Uuid::new_v4();
        let number = build_order_number(id);
        assert!(number.starts_with("ORD-"));
        assert!(number.ends_with(&id.to_string()[..8]));
        assert_eq!(number.len(), "ORD-".len() + 8 + 1 + 8);
    }
}

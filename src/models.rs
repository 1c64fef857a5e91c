use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Order lifecycle. Transitions happen only through the admin surface.
pub const ORDER_STATUSES: [&str; 4] = ["processing", "shipped", "delivered", "cancelled"];

/// Shipping address recorded for pickup orders instead of a composed one.
pub const PICKUP_ADDRESS: &str = "In-store pickup";

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub description: String,
    /// Base price in minor currency units, before discount.
    pub price_cents: i64,
    /// Percentage in [0, 100].
    pub discount_percent: i32,
    pub categories: Vec<String>,
    pub image_url: Option<String>,
    /// File id on the image CDN, set after a signed upload.
    pub image_file_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    /// Human-facing identifier, e.g. ORD-20260214-9f3a1c2b.
    pub order_number: String,
    pub user_id: Uuid,
    pub buyer_name: String,
    pub phone_number: String,
    /// "delivery" or "pickup".
    pub delivery_method: String,
    pub shipping_address: String,
    pub status: String,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A frozen copy of the product at purchase time. Later catalog edits never
/// change historical orders.
#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub brand: String,
    /// Discount-adjusted price per unit at checkout time.
    pub unit_price_cents: i64,
    pub quantity: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Testimonial {
    pub id: Uuid,
    pub author: String,
    pub quote: String,
    /// 1..=5
    pub rating: i32,
    pub order_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Inquiry {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Subscriber {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Singleton row; the admin settings screen edits it in place.
#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct SiteSettings {
    pub social_links: serde_json::Value,
    pub about_us: String,
    pub site_title: String,
    pub site_description: String,
    pub updated_at: DateTime<Utc>,
}

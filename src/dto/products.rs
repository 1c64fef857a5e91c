use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub brand: String,
    pub description: String,
    pub price_cents: i64,
    #[serde(default)]
    pub discount_percent: i32,
    #[serde(default)]
    pub categories: Vec<String>,
    pub image_url: Option<String>,
    pub image_file_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub discount_percent: Option<i32>,
    pub categories: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub image_file_id: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}

/// One row of the brand listing page.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct BrandSummary {
    pub brand: String,
    pub product_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BrandList {
    pub items: Vec<BrandSummary>,
}

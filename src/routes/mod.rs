use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod doc;
pub mod health;
pub mod inquiries;
pub mod orders;
pub mod params;
pub mod products;
pub mod reviews;
pub mod search;
pub mod settings;
pub mod uploads;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/brands", products::brands_router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .nest("/reviews", reviews::router())
        .nest("/search", search::router())
        .nest("/inquiries", inquiries::router())
        .nest("/subscribe", inquiries::subscribe_router())
        .nest("/settings", settings::router())
        .nest("/uploads", uploads::router())
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
}

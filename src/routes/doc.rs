use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::CartLine,
    dto::{
        auth::{LoginRequest, RegisterRequest, TokenResponse},
        cart::{AddToCartRequest, CartView, SetQuantityRequest},
        inquiries::{CreateInquiryRequest, InquiryList, SubscribeRequest, SubscriberList},
        orders::{CheckoutRequest, DeliveryMethod, OrderList, OrderWithLines},
        products::{BrandList, BrandSummary, CreateProductRequest, ProductList, UpdateProductRequest},
        reviews::{SubmitReviewRequest, TestimonialList},
        search::SearchResults,
        settings::UpdateSettingsRequest,
    },
    models::{Inquiry, Order, OrderLine, Product, SiteSettings, Subscriber, Testimonial, User},
    response::{ApiResponse, Meta},
    routes::{
        admin, auth, cart as cart_routes, health, inquiries, orders, params,
        products as product_routes, reviews, search, settings, uploads,
    },
    services::admin_service::DashboardSummary,
    uploads::UploadAuthParams,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        auth::anonymous,
        product_routes::list_products,
        product_routes::get_product,
        product_routes::list_brands,
        product_routes::create_product,
        product_routes::update_product,
        product_routes::delete_product,
        cart_routes::view_cart,
        cart_routes::add_to_cart,
        cart_routes::set_quantity,
        cart_routes::remove_from_cart,
        cart_routes::clear_cart,
        orders::checkout,
        orders::get_order,
        reviews::list_reviews,
        reviews::submit_review,
        search::search,
        inquiries::create_inquiry,
        inquiries::subscribe,
        settings::get_settings,
        uploads::sign_upload,
        admin::dashboard,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::delete_order,
        admin::list_inquiries,
        admin::delete_inquiry,
        admin::delete_review,
        admin::list_subscribers,
        admin::get_settings,
        admin::update_settings,
    ),
    components(
        schemas(
            User,
            Product,
            Order,
            OrderLine,
            Testimonial,
            Inquiry,
            Subscriber,
            SiteSettings,
            CartLine,
            CartView,
            AddToCartRequest,
            SetQuantityRequest,
            CheckoutRequest,
            DeliveryMethod,
            OrderList,
            OrderWithLines,
            SubmitReviewRequest,
            TestimonialList,
            SearchResults,
            CreateInquiryRequest,
            SubscribeRequest,
            InquiryList,
            SubscriberList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            BrandSummary,
            BrandList,
            UpdateSettingsRequest,
            UploadAuthParams,
            DashboardSummary,
            RegisterRequest,
            LoginRequest,
            TokenResponse,
            admin::UpdateOrderStatusRequest,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithLines>,
            ApiResponse<OrderList>,
            ApiResponse<CartView>,
            ApiResponse<SearchResults>,
            ApiResponse<TestimonialList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalog and brand endpoints"),
        (name = "Cart", description = "Session cart endpoints"),
        (name = "Orders", description = "Checkout and order endpoints"),
        (name = "Reviews", description = "Testimonial endpoints"),
        (name = "Search", description = "Combined keyword and semantic search"),
        (name = "Inquiries", description = "Contact form and newsletter"),
        (name = "Settings", description = "Public site settings"),
        (name = "Uploads", description = "Image upload signing"),
        (name = "Admin", description = "Back-office endpoints"),
        (name = "Auth", description = "Authentication endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Testimonial;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitReviewRequest {
    pub author: String,
    /// The human-facing order number printed on the confirmation.
    pub order_number: String,
    pub rating: i32,
    pub quote: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TestimonialList {
    pub items: Vec<Testimonial>,
}

use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    pub social_links: Option<serde_json::Value>,
    pub about_us: Option<String>,
    pub site_title: Option<String>,
    pub site_description: Option<String>,
}

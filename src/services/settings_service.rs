use crate::{
    audit::log_audit,
    dto::settings::UpdateSettingsRequest,
    error::AppResult,
    middleware::auth::{AuthUser, ensure_registered},
    models::SiteSettings,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// The singleton row is created by the migrations, so reads never miss.
pub async fn get_settings(state: &AppState) -> AppResult<ApiResponse<SiteSettings>> {
    let settings = sqlx::query_as::<_, SiteSettings>(
        "SELECT social_links, about_us, site_title, site_description, updated_at \
         FROM site_settings WHERE singleton",
    )
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success("Settings", settings, None))
}

pub async fn update_settings(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateSettingsRequest,
) -> AppResult<ApiResponse<SiteSettings>> {
    ensure_registered(user)?;

    let settings = sqlx::query_as::<_, SiteSettings>(
        r#"
        UPDATE site_settings SET
            social_links = COALESCE($1, social_links),
            about_us = COALESCE($2, about_us),
            site_title = COALESCE($3, site_title),
            site_description = COALESCE($4, site_description),
            updated_at = now()
        WHERE singleton
        RETURNING social_links, about_us, site_title, site_description, updated_at
        "#,
    )
    .bind(payload.social_links)
    .bind(payload.about_us)
    .bind(payload.site_title)
    .bind(payload.site_description)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "settings_update",
        Some("site_settings"),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Settings saved",
        settings,
        Some(Meta::empty()),
    ))
}

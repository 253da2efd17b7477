// src/handlers/settings.rs

use axum::{extract::State, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::settings::{UpdateSettingsRequest, UserSettings},
};

// GET /settings
#[utoipa::path(
    get,
    path = "/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Theme and accent color of the signed-in user", body = UserSettings),
        (status = 307, description = "Not signed in, redirected to /login")
    )
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> Result<Json<UserSettings>, AppError> {
    let user = app_state
        .user_repo
        .find_by_id(claims.sub)
        .await?
        .ok_or(AppError::UserNotFound)?;

    Ok(Json(UserSettings::from_blob(&user.settings)))
}

// PUT /settings
#[utoipa::path(
    put,
    path = "/settings",
    tag = "Settings",
    request_body = UpdateSettingsRequest,
    responses((status = 200, description = "Preferences saved", body = UserSettings))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<UserSettings>, AppError> {
    let user = app_state
        .user_repo
        .find_by_id(claims.sub)
        .await?
        .ok_or(AppError::UserNotFound)?;

    let merged = payload.apply_to(&user.settings);
    let updated = app_state.user_repo.update_settings(user.id, &merged).await?;

    Ok(Json(UserSettings::from_blob(&updated.settings)))
}

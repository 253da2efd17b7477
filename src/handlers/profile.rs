// src/handlers/profile.rs

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::auth::session_cookie,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::AuthResponse,
        profile::{ChangePasswordPayload, ProfileView, UpdateProfilePayload},
    },
};

// GET /profile
#[utoipa::path(
    get,
    path = "/profile",
    tag = "Profile",
    responses(
        (status = 200, description = "Account details read from the session token", body = ProfileView),
        (status = 307, description = "Not signed in, redirected to /login?callbackUrl=%2Fprofile")
    )
)]
pub async fn get_profile(AuthenticatedUser(claims): AuthenticatedUser) -> Json<ProfileView> {
    Json(ProfileView::from(&claims))
}

// PUT /api/profile
//
// Os nomes vivem no token, então um novo é emitido e o cookie substituído.
#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "Profile",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Profile saved, new token issued", body = AuthResponse),
        (status = 400, description = "Invalid fields"),
        (status = 409, description = "Username already taken")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_profile(
    State(app_state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    jar: CookieJar,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let payload = payload.trimmed();
    payload.validate()?;

    let user = app_state
        .user_repo
        .update_profile(claims.sub, &payload.first_name, &payload.last_name, &payload.username)
        .await?;

    tracing::info!("Profile updated for {}", user.username);

    let token = app_state.auth_service.keys().issue(&user)?;
    let jar = jar.add(session_cookie(token.clone()));
    Ok((jar, Json(AuthResponse { token, user: user.into() })))
}

// PUT /api/profile/password
#[utoipa::path(
    put,
    path = "/api/profile/password",
    tag = "Profile",
    request_body = ChangePasswordPayload,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "New password too short or current password wrong")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_password(
    State(app_state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    app_state
        .auth_service
        .change_password(claims.sub, &payload.current_password, &payload.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

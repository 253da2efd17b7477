// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::rbac::PermissionLevel,
};

/// Uma ação protegida por um nível mínimo de permissão.
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
    fn min_level() -> PermissionLevel;
}

/// Extrator que rejeita com 403 se o nível de quem chama não for suficiente.
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)?;

        let required = T::min_level();
        if !user.0.permission().allows(required) {
            tracing::info!(
                "🚫 {} lacks '{}' (has {}, needs {})",
                user.0.username,
                T::slug(),
                user.0.permission().0,
                required.0
            );
            return Err(AppError::Forbidden { required: required.0 });
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// AÇÕES PROTEGIDAS
// ---

pub struct PermReportsRead;
impl PermissionDef for PermReportsRead {
    fn slug() -> &'static str { "reports:read" }
    fn min_level() -> PermissionLevel { PermissionLevel::VIEWER }
}

pub struct PermProductsImport;
impl PermissionDef for PermProductsImport {
    fn slug() -> &'static str { "products:import" }
    fn min_level() -> PermissionLevel { PermissionLevel::ADMIN }
}

pub struct PermTablesClear;
impl PermissionDef for PermTablesClear {
    fn slug() -> &'static str { "tables:clear" }
    fn min_level() -> PermissionLevel { PermissionLevel::ROOT }
}

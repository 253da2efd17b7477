// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{auth::Claims, rbac::rule_for_path},
};

/// Cookie que carrega o token de sessão nas requisições de página.
pub const SESSION_COOKIE: &str = "session_token";

/// Claims do usuário logado, anexadas à requisição pelos guardas.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

/// Primeiro o header Bearer, depois o cookie de sessão.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    bearer.or_else(|| {
        CookieJar::from_headers(headers)
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    })
}

/// `/login`, mais `?callbackUrl=<path>` a não ser que o destino fosse `/`.
pub fn login_redirect_target(path: &str) -> String {
    if path == "/" {
        return "/login".to_string();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("callbackUrl", path)
        .finish();
    format!("/login?{}", query)
}

// ---
// Portão das páginas: redireciona em vez de retornar erro
// ---
pub async fn page_gate(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    // As rotas JSON têm o seu próprio guarda.
    if path.starts_with("/api") {
        return next.run(request).await;
    }

    let claims = extract_token(request.headers())
        .and_then(|token| app_state.auth_service.validate_token(&token).ok());

    if path.starts_with("/login") {
        if claims.is_some() {
            return Redirect::temporary("/").into_response();
        }
        return next.run(request).await;
    }

    let Some(claims) = claims else {
        return Redirect::temporary(&login_redirect_target(&path)).into_response();
    };

    if let Some(rule) = rule_for_path(&path) {
        let permission = claims.permission();
        if !permission.allows(rule.required) {
            tracing::info!(
                "🚫 {} (permission {}) denied {} (requires {})",
                claims.username,
                permission.0,
                path,
                rule.required.0
            );
            return Redirect::temporary("/").into_response();
        }
    }

    request.extensions_mut().insert(AuthenticatedUser(claims));
    next.run(request).await
}

// ---
// Guarda da API: 401 em JSON em vez de redirecionar
// ---
pub async fn api_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(request.headers()).ok_or(AppError::InvalidToken)?;
    let claims = app_state.auth_service.validate_token(&token)?;

    request.extensions_mut().insert(AuthenticatedUser(claims));
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

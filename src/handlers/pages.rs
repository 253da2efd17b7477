// src/handlers/pages.rs
//
// Payloads JSON das rotas de página protegidas. Todo handler aqui roda depois
// do `page_gate`, então quem chama está logado e tem acesso ao caminho.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::UserSummary,
        dashboard::{CompanyCount, DashboardView, InventoryPage, LoginPage, NavCard, ReportSummary},
        profile::ProfileView,
        rbac::{PermissionLevel, ROUTE_PERMISSIONS},
    },
};

/// Cards de cada rota que o nível pode abrir, na ordem da tabela de rotas.
pub fn nav_cards(permission: PermissionLevel) -> Vec<NavCard> {
    ROUTE_PERMISSIONS
        .iter()
        .filter(|rule| permission.allows(rule.required))
        .map(|rule| NavCard {
            title: rule.title.to_string(),
            href: rule.path.to_string(),
            description: rule.description.to_string(),
            required_permission: rule.required,
        })
        .collect()
}

// GET /
#[utoipa::path(
    get,
    path = "/",
    tag = "Pages",
    responses(
        (status = 200, description = "Greeting and the navigation cards the user may open", body = DashboardView),
        (status = 307, description = "Not signed in, redirected to /login")
    )
)]
pub async fn dashboard(AuthenticatedUser(claims): AuthenticatedUser) -> Json<DashboardView> {
    let profile = ProfileView::from(&claims);
    let permission = claims.permission();

    Json(DashboardView {
        display_name: profile.display_name(),
        initials: profile.header_initials(),
        permission,
        cards: nav_cards(permission),
    })
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct LoginQuery {
    /// Para onde ir depois do login.
    pub callback_url: Option<String>,
}

// GET /login
#[utoipa::path(
    get,
    path = "/login",
    tag = "Pages",
    params(LoginQuery),
    responses(
        (status = 200, description = "Login form descriptor", body = LoginPage),
        (status = 307, description = "Already signed in, redirected to /")
    )
)]
pub async fn login_page(Query(query): Query<LoginQuery>) -> Json<LoginPage> {
    let callback_url = query
        .callback_url
        .filter(|url| is_local_path(url))
        .unwrap_or_else(|| "/".to_string());

    Json(LoginPage { callback_url })
}

/// Um único `/` no início. Navegadores leem `//host` e `/\host` como outra origem.
fn is_local_path(url: &str) -> bool {
    let mut chars = url.chars();
    chars.next() == Some('/') && !matches!(chars.next(), Some('/' | '\\'))
}

// GET /insights
#[utoipa::path(
    get,
    path = "/insights",
    tag = "Pages",
    responses((status = 200, description = "Metrics over the whole product table", body = ReportSummary))
)]
pub async fn insights(State(app_state): State<AppState>) -> Result<Json<ReportSummary>, AppError> {
    Ok(Json(app_state.report_service.summary().await?))
}

// GET /inventory
#[utoipa::path(
    get,
    path = "/inventory",
    tag = "Pages",
    responses((status = 200, description = "Products with reorder and out-of-stock lists", body = InventoryPage))
)]
pub async fn inventory(State(app_state): State<AppState>) -> Result<Json<InventoryPage>, AppError> {
    Ok(Json(app_state.report_service.inventory_page().await?))
}

// GET /companies
#[utoipa::path(
    get,
    path = "/companies",
    tag = "Pages",
    responses((status = 200, description = "Associated companies with product counts", body = Vec<CompanyCount>))
)]
pub async fn companies(State(app_state): State<AppState>) -> Result<Json<Vec<CompanyCount>>, AppError> {
    Ok(Json(app_state.product_repo.company_counts().await?))
}

// GET /users
#[utoipa::path(
    get,
    path = "/users",
    tag = "Pages",
    responses((status = 200, description = "User directory", body = Vec<UserSummary>))
)]
pub async fn users(State(app_state): State<AppState>) -> Result<Json<Vec<UserSummary>>, AppError> {
    let users = app_state.user_repo.find_all().await?;
    Ok(Json(users.into_iter().map(UserSummary::from).collect()))
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

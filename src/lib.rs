// src/lib.rs

pub mod cli;
pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    middleware::auth::{api_guard, page_gate},
};

/// `RUST_LOG` tem prioridade; senão, info só para este crate.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("insight_hub=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

pub fn app_router(app_state: AppState) -> Router {
    // Rotas abertas da API
    let public_api = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout));

    // Exige Bearer (ou cookie), senão 401 em JSON
    let protected_api = Router::new()
        .route("/api/auth/me", get(handlers::auth::get_me))
        .route("/api/profile", put(handlers::profile::update_profile))
        .route("/api/profile/password", put(handlers::profile::change_password))
        .route("/api/products", get(handlers::products::list_products))
        .route("/api/products/import", post(handlers::products::import_products))
        .route("/api/reports/summary", get(handlers::products::summary))
        .route("/api/reports/below-reorder", get(handlers::products::below_reorder))
        .route("/api/reports/non-profitable", get(handlers::products::non_profitable))
        .route("/api/reports/discounted", get(handlers::products::discounted))
        .route("/api/reports/out-of-stock", get(handlers::products::out_of_stock))
        .route("/api/reports/low-stock", get(handlers::products::low_stock))
        .route("/api/reports/top-priced", get(handlers::products::top_priced))
        .route("/api/reports/collections", get(handlers::products::collections))
        .route("/api/reports/stale-stock", get(handlers::products::stale_stock))
        .route("/api/admin/tables/{table}", delete(handlers::products::clear_table))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            api_guard,
        ));

    // Páginas: redirecionam para /login ou / em vez de erros. O fallback fica
    // atrás do portão também, então /logistics e /documents continuam protegidos.
    let pages = Router::new()
        .route("/", get(handlers::pages::dashboard))
        .route("/login", get(handlers::pages::login_page))
        .route("/profile", get(handlers::profile::get_profile))
        .route(
            "/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .route("/insights", get(handlers::pages::insights))
        .route("/inventory", get(handlers::pages::inventory))
        .route("/companies", get(handlers::pages::companies))
        .route("/users", get(handlers::pages::users))
        .fallback(handlers::pages::not_found)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            page_gate,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public_api)
        .merge(protected_api)
        .merge(pages)
        .with_state(app_state)
}

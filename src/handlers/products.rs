// src/handlers/products.rs

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    db::{self, Table},
    middleware::rbac::{PermProductsImport, PermReportsRead, PermTablesClear, RequirePermission},
    models::{
        dashboard::ReportSummary,
        product::{ImportSummary, Product},
    },
    services::report::{self, DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_TOP_PRICED_LIMIT},
};

/// Corte de estoque parado quando `before` é omitido.
pub const DEFAULT_STALE_DAYS: i64 = 90;

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportProductsPayload {
    /// Caminho do export CSV, visto pelo servidor.
    #[validate(length(min = 1, message = "File path is required"))]
    #[schema(example = "data/catalog_products.csv")]
    pub file_path: String,

    #[validate(length(min = 1, message = "Company is required"))]
    #[schema(example = "A&Co")]
    pub company: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LowStockQuery {
    /// Estoque estritamente abaixo deste valor conta como baixo (padrão 5).
    pub threshold: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TopPricedQuery {
    /// Quantidade de produtos a retornar (padrão 5).
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StaleStockQuery {
    /// Timestamp RFC 3339 ou `YYYY-MM-DD`. Padrão: 90 dias atrás.
    pub before: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClearTableResponse {
    #[schema(example = "products")]
    pub table: String,
    pub rows_deleted: u64,
}

// --- IMPORTAÇÃO ---

// POST /api/products/import
#[utoipa::path(
    post,
    path = "/api/products/import",
    tag = "Products",
    request_body = ImportProductsPayload,
    responses(
        (status = 200, description = "Every row inserted", body = ImportSummary),
        (status = 400, description = "File missing or unreadable"),
        (status = 403, description = "Requires permission 6"),
        (status = 409, description = "A handle id already exists, nothing inserted"),
        (status = 422, description = "Malformed CSV, nothing inserted")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_products(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermProductsImport>,
    Json(payload): Json<ImportProductsPayload>,
) -> Result<Json<ImportSummary>, AppError> {
    payload.validate()?;

    let summary = app_state
        .import_service
        .import_csv(std::path::Path::new(&payload.file_path), payload.company.trim())
        .await?;

    Ok(Json(summary))
}

// --- LISTAGEM E RELATÓRIOS ---

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    responses((status = 200, description = "All products ordered by name", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermReportsRead>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(app_state.report_service.products().await?))
}

// GET /api/reports/summary
#[utoipa::path(
    get,
    path = "/api/reports/summary",
    tag = "Reports",
    responses((status = 200, description = "Scalar metrics over the product table", body = ReportSummary)),
    security(("api_jwt" = []))
)]
pub async fn summary(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermReportsRead>,
) -> Result<Json<ReportSummary>, AppError> {
    Ok(Json(app_state.report_service.summary().await?))
}

// GET /api/reports/below-reorder
#[utoipa::path(
    get,
    path = "/api/reports/below-reorder",
    tag = "Reports",
    responses((status = 200, description = "Products whose inventory is below their reorder point", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn below_reorder(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermReportsRead>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(app_state.report_service.below_reorder_point().await?))
}

// GET /api/reports/non-profitable
#[utoipa::path(
    get,
    path = "/api/reports/non-profitable",
    tag = "Reports",
    responses((status = 200, description = "Products priced at or below cost", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn non_profitable(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermReportsRead>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(app_state.report_service.non_profitable().await?))
}

// GET /api/reports/discounted
#[utoipa::path(
    get,
    path = "/api/reports/discounted",
    tag = "Reports",
    responses((status = 200, description = "Products with a positive discount", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn discounted(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermReportsRead>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(app_state.report_service.discounted().await?))
}

// GET /api/reports/out-of-stock
#[utoipa::path(
    get,
    path = "/api/reports/out-of-stock",
    tag = "Reports",
    responses((status = 200, description = "Products with zero or missing inventory", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn out_of_stock(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermReportsRead>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(app_state.report_service.out_of_stock().await?))
}

// GET /api/reports/low-stock
#[utoipa::path(
    get,
    path = "/api/reports/low-stock",
    tag = "Reports",
    params(LowStockQuery),
    responses((status = 200, description = "Products below the inventory threshold", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn low_stock(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermReportsRead>,
    Query(query): Query<LowStockQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let threshold = query.threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    Ok(Json(app_state.report_service.low_stock(threshold).await?))
}

// GET /api/reports/top-priced
#[utoipa::path(
    get,
    path = "/api/reports/top-priced",
    tag = "Reports",
    params(TopPricedQuery),
    responses((status = 200, description = "Most expensive products first", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn top_priced(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermReportsRead>,
    Query(query): Query<TopPricedQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_TOP_PRICED_LIMIT);
    Ok(Json(app_state.report_service.top_priced(limit).await?))
}

// GET /api/reports/collections
#[utoipa::path(
    get,
    path = "/api/reports/collections",
    tag = "Reports",
    responses((status = 200, description = "Product count per collection", body = BTreeMap<String, usize>)),
    security(("api_jwt" = []))
)]
pub async fn collections(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermReportsRead>,
) -> Result<Json<BTreeMap<String, usize>>, AppError> {
    Ok(Json(app_state.report_service.products_per_collection().await?))
}

// GET /api/reports/stale-stock
#[utoipa::path(
    get,
    path = "/api/reports/stale-stock",
    tag = "Reports",
    params(StaleStockQuery),
    responses(
        (status = 200, description = "Products whose quantity date is before the cutoff", body = Vec<Product>),
        (status = 400, description = "Unreadable cutoff date")
    ),
    security(("api_jwt" = []))
)]
pub async fn stale_stock(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermReportsRead>,
    Query(query): Query<StaleStockQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let cutoff = match query.before {
        Some(raw) => report::parse_date(&raw).ok_or(AppError::InvalidDate(raw))?,
        None => report::days_ago(DEFAULT_STALE_DAYS)?,
    };

    Ok(Json(app_state.report_service.stale_stock(cutoff).await?))
}

// --- MANUTENÇÃO ---

// DELETE /api/admin/tables/{table}
#[utoipa::path(
    delete,
    path = "/api/admin/tables/{table}",
    tag = "Admin",
    params(("table" = String, Path, description = "users, products or sessions")),
    responses(
        (status = 200, description = "Table emptied", body = ClearTableResponse),
        (status = 400, description = "Unknown table"),
        (status = 403, description = "Requires permission 7")
    ),
    security(("api_jwt" = []))
)]
pub async fn clear_table(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermTablesClear>,
    Path(table): Path<String>,
) -> Result<Json<ClearTableResponse>, AppError> {
    let table: Table = table.parse()?;
    let rows_deleted = db::clear_table(&app_state.db_pool, table).await?;

    Ok(Json(ClearTableResponse { table: table.to_string(), rows_deleted }))
}

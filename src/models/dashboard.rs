// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::models::{product::Product, rbac::PermissionLevel};

// 1. Cards de navegação na raiz do dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NavCard {
    #[schema(example = "Insights")]
    pub title: String,
    #[schema(example = "/insights")]
    pub href: String,
    pub description: String,
    pub required_permission: PermissionLevel,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    #[schema(example = "Admin U.")]
    pub display_name: String,
    #[schema(example = "AU")]
    pub initials: String,
    pub permission: PermissionLevel,
    pub cards: Vec<NavCard>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPage {
    #[schema(example = "/insights")]
    pub callback_url: String,
}

// 2. Métricas escalares da tabela de produtos
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub product_count: usize,
    pub total_inventory: i64,
    #[schema(value_type = f64)]
    pub average_price: Decimal,
    pub visible_products: usize,
    #[schema(value_type = f64)]
    pub total_stock_value: Decimal,
    pub discounted_products: usize,
    pub below_reorder_point: usize,
    pub out_of_stock: usize,
    #[schema(value_type = f64)]
    pub potential_profit: Decimal,
    #[schema(value_type = f64)]
    pub average_profit_per_product: Decimal,
    pub non_profitable_products: usize,
    pub products_per_collection: BTreeMap<String, usize>,
}

// 3. Payloads das páginas
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryPage {
    pub products: Vec<Product>,
    pub below_reorder_point: Vec<Product>,
    pub out_of_stock: Vec<Product>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyCount {
    #[schema(example = "A&Co")]
    pub company: String,
    pub product_count: i64,
    pub total_inventory: i64,
}

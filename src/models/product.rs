// src/models/product.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// Uma linha da tabela `products`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[schema(example = "product_1")]
    pub handle_id: String,
    pub product_id: String,
    pub field_type: String,
    #[schema(example = "Espresso Beans 1kg")]
    pub name: String,
    pub description: Option<String>,
    pub product_image_url: Option<String>,
    pub collection: Option<String>,
    pub sku: Option<String>,
    pub ribbon: Option<String>,
    #[schema(value_type = f64, example = 24.9)]
    pub price: Decimal,
    #[schema(value_type = Option<f64>)]
    pub surcharge: Option<Decimal>,
    pub visible: i32,
    pub discount_mode: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub discount_value: Option<Decimal>,
    pub inventory: Option<i32>,
    #[schema(value_type = Option<f64>)]
    pub weight: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub cost: Option<Decimal>,
    pub product_type: Option<String>,
    pub tax_on_sale: Option<String>,
    pub price_include_tax: Option<i32>,
    pub income_account: Option<String>,
    pub tax_on_purchase: Option<String>,
    pub purchase_cost_include_tax: Option<i32>,
    pub expense_account: Option<String>,
    pub reorder_point: Option<i32>,
    #[schema(example = "2024-03-01")]
    pub quantity_as_of_date: Option<String>,
    #[schema(example = "A&Co")]
    pub associated_company: String,
}

impl Product {
    pub fn inventory_or_zero(&self) -> i64 {
        i64::from(self.inventory.unwrap_or(0))
    }

    pub fn cost_or_zero(&self) -> Decimal {
        self.cost.unwrap_or(Decimal::ZERO)
    }

    pub fn discount_or_zero(&self) -> Decimal {
        self.discount_value.unwrap_or(Decimal::ZERO)
    }

    pub fn reorder_point_or_zero(&self) -> i64 {
        i64::from(self.reorder_point.unwrap_or(0))
    }

    pub fn is_visible(&self) -> bool {
        self.visible == 1
    }

    /// `price - cost`, pode ser negativo. `None` quando a diferença não cabe.
    pub fn margin(&self) -> Option<Decimal> {
        self.price.checked_sub(self.cost_or_zero())
    }
}

/// Linhas de produto como saem do mapeamento do CSV. Mesmo formato da tabela;
/// é um alias para que os caminhos de inserção leiam como linhas "novas".
pub type NewProduct = Product;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    #[schema(example = "A&Co")]
    pub company: String,
    #[schema(example = 278)]
    pub rows_inserted: usize,
    #[schema(example = 28)]
    pub batches: usize,
}

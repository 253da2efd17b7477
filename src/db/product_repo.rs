// src/db/product_repo.rs

use sqlx::{postgres::PgDatabaseError, Executor, PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    models::{
        dashboard::CompanyCount,
        product::{NewProduct, Product},
    },
};

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Carrega a tabela inteira. Os relatórios recalculam a partir disto a cada chamada.
    pub async fn find_all(&self) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    pub async fn company_counts(&self) -> Result<Vec<CompanyCount>, AppError> {
        let counts = sqlx::query_as::<_, CompanyCount>(
            r#"
            SELECT
                associated_company AS company,
                COUNT(*) AS product_count,
                COALESCE(SUM(inventory), 0)::BIGINT AS total_inventory
            FROM products
            GROUP BY associated_company
            ORDER BY associated_company ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }

    /// Insere um lote com um único INSERT de várias linhas.
    pub async fn insert_batch<'e, E>(&self, executor: E, batch: &[NewProduct]) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"INSERT INTO products (
                handle_id, product_id, field_type, name, description, product_image_url,
                collection, sku, ribbon, price, surcharge, visible, discount_mode,
                discount_value, inventory, weight, cost, product_type, tax_on_sale,
                price_include_tax, income_account, tax_on_purchase, purchase_cost_include_tax,
                expense_account, reorder_point, quantity_as_of_date, associated_company
            ) "#,
        );

        builder.push_values(batch, |mut row, p| {
            row.push_bind(p.handle_id.clone())
                .push_bind(p.product_id.clone())
                .push_bind(p.field_type.clone())
                .push_bind(p.name.clone())
                .push_bind(p.description.clone())
                .push_bind(p.product_image_url.clone())
                .push_bind(p.collection.clone())
                .push_bind(p.sku.clone())
                .push_bind(p.ribbon.clone())
                .push_bind(p.price)
                .push_bind(p.surcharge)
                .push_bind(p.visible)
                .push_bind(p.discount_mode.clone())
                .push_bind(p.discount_value)
                .push_bind(p.inventory)
                .push_bind(p.weight)
                .push_bind(p.cost)
                .push_bind(p.product_type.clone())
                .push_bind(p.tax_on_sale.clone())
                .push_bind(p.price_include_tax)
                .push_bind(p.income_account.clone())
                .push_bind(p.tax_on_purchase.clone())
                .push_bind(p.purchase_cost_include_tax)
                .push_bind(p.expense_account.clone())
                .push_bind(p.reorder_point)
                .push_bind(p.quantity_as_of_date.clone())
                .push_bind(p.associated_company.clone());
        });

        let result = builder.build().execute(executor).await.map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    let detail = db_err
                        .try_downcast_ref::<PgDatabaseError>()
                        .and_then(|pg| pg.detail())
                        .map(str::to_string);
                    let first = batch.first().map(|p| p.handle_id.clone()).unwrap_or_default();
                    return AppError::DuplicateProduct(detail.unwrap_or(first));
                }
            }
            AppError::DatabaseError(e)
        })?;

        Ok(result.rows_affected())
    }
}

pub mod user_repo;
pub use user_repo::UserRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;

use sqlx::PgPool;
use std::{fmt, str::FromStr};

use crate::common::error::AppError;

/// Tabelas que o utilitário de manutenção pode esvaziar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Users,
    Products,
    Sessions,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Products => "products",
            Table::Sessions => "sessions",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "users" => Ok(Table::Users),
            "products" => Ok(Table::Products),
            "sessions" => Ok(Table::Sessions),
            other => Err(AppError::UnknownTable(other.to_string())),
        }
    }
}

/// Apaga todas as linhas de `table`. Limpar `users` cascateia para `sessions`.
pub async fn clear_table(pool: &PgPool, table: Table) -> Result<u64, AppError> {
    // Os nomes de tabela vêm do enum fechado acima, nunca de texto do usuário.
    let sql = format!("DELETE FROM {}", table.name());
    let result = sqlx::query(&sql).execute(pool).await?;
    tracing::warn!("🧹 Cleared table {} ({} rows)", table, result.rows_affected());
    Ok(result.rows_affected())
}

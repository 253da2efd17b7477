// src/cli.rs
//
// Subcomandos do operador. Tudo exceto `serve` roda uma vez contra o
// banco e sai.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::{
    config::AppState,
    db::{self, Table},
    services::report,
};

/// Insight Hub backend and maintenance tools
#[derive(Debug, Parser)]
#[command(name = "insight-hub", version)]
#[command(about = "Inventory insights dashboard backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Create the Root account if its email is not registered yet
    SeedAdmin {
        #[arg(long, default_value = "admin@example.com")]
        email: String,
        #[arg(long, default_value = "admin123")]
        password: String,
    },

    /// Import a catalog CSV export for one company
    ImportCsv {
        /// Path of the CSV file.
        path: PathBuf,
        #[arg(long)]
        company: String,
    },

    /// Log inventory and pricing metrics
    Report {
        /// Quantity dates older than this many days count as stale.
        #[arg(long, default_value_t = 90)]
        stale_days: i64,
    },

    /// Delete every row of users, products or sessions
    ClearTable { table: String },
}

/// Executa um comando avulso. `Serve` é tratado pelo binário.
pub async fn execute_command(command: Command, app_state: &AppState) -> anyhow::Result<()> {
    match command {
        Command::Serve => {}
        Command::SeedAdmin { email, password } => {
            match app_state.auth_service.ensure_admin(&email, &password).await? {
                Some(user) => tracing::info!(
                    "👤 Created admin {} ({}); password change required on next login",
                    user.email,
                    user.username
                ),
                None => tracing::info!("Admin {} already exists, nothing to do", email),
            }
        }
        Command::ImportCsv { path, company } => {
            let summary = app_state.import_service.import_csv(&path, company.trim()).await?;
            tracing::info!(
                "Imported {} rows for '{}' in {} batches",
                summary.rows_inserted,
                summary.company,
                summary.batches
            );
        }
        Command::Report { stale_days } => {
            let products = app_state.report_service.products().await?;
            let summary = report::summarize(&products)?;
            let cutoff = report::days_ago(stale_days)?;

            tracing::info!("Products: {}", summary.product_count);
            tracing::info!("Total inventory: {}", summary.total_inventory);
            tracing::info!("Average price: {}", summary.average_price);
            tracing::info!("Visible products: {}", summary.visible_products);
            tracing::info!("Total stock value: {}", summary.total_stock_value);
            tracing::info!("Potential profit: {}", summary.potential_profit);
            tracing::info!("Average profit per product: {}", summary.average_profit_per_product);
            for (collection, count) in &summary.products_per_collection {
                tracing::info!("Collection '{}': {} products", collection, count);
            }
            tracing::info!(
                "Low stock (< {}): {}",
                report::DEFAULT_LOW_STOCK_THRESHOLD,
                report::low_stock(&products, report::DEFAULT_LOW_STOCK_THRESHOLD).len()
            );
            tracing::info!("Discounted: {}", summary.discounted_products);
            tracing::info!("Out of stock: {}", summary.out_of_stock);
            tracing::info!("Below reorder point: {}", summary.below_reorder_point);
            tracing::info!("Non-profitable: {}", summary.non_profitable_products);
            for product in report::top_priced(&products, report::DEFAULT_TOP_PRICED_LIMIT) {
                tracing::info!("Top priced: {} ({})", product.name, product.price);
            }
            tracing::info!(
                "Stale stock (> {} days): {}",
                stale_days,
                report::stale_stock(&products, cutoff).len()
            );
        }
        Command::ClearTable { table } => {
            let table: Table = table.parse()?;
            db::clear_table(&app_state.db_pool, table).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["insight-hub"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn import_requires_a_company() {
        assert!(Cli::try_parse_from(["insight-hub", "import-csv", "catalog.csv"]).is_err());

        let cli = Cli::try_parse_from(["insight-hub", "import-csv", "catalog.csv", "--company", "A&Co"])
            .unwrap();
        match cli.command {
            Some(Command::ImportCsv { path, company }) => {
                assert_eq!(path, PathBuf::from("catalog.csv"));
                assert_eq!(company, "A&Co");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn report_defaults_to_ninety_days() {
        let cli = Cli::try_parse_from(["insight-hub", "report"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Report { stale_days: 90 })));
    }
}

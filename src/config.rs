// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{ProductRepository, UserRepository},
    services::{
        auth::{AuthService, TokenKeys},
        import_service::ImportService,
        report::ReportService,
    },
};

/// Usado quando `JWT_SECRET` não está definido. Quem conhece pode forjar tokens.
const INSECURE_DEFAULT_SECRET: &str = "your-secret-key";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("⚠️ JWT_SECRET is not set, signing tokens with the insecure default");
                INSECURE_DEFAULT_SECRET.to_string()
            }
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid DATABASE_MAX_CONNECTIONS '{}': {}", raw, e))?,
            Err(_) => 5,
        };

        Ok(Self { database_url, jwt_secret, bind_addr, max_connections })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub user_repo: UserRepository,
    pub product_repo: ProductRepository,
    pub auth_service: AuthService,
    pub import_service: ImportService,
    pub report_service: ReportService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Database connection established");

        Ok(Self::from_pool(db_pool, &config.jwt_secret))
    }

    /// Monta repositórios e serviços em volta de um pool existente.
    pub fn from_pool(db_pool: PgPool, jwt_secret: &str) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), TokenKeys::new(jwt_secret));
        let import_service = ImportService::new(db_pool.clone(), product_repo.clone());
        let report_service = ReportService::new(product_repo.clone());

        Self {
            db_pool,
            user_repo,
            product_repo,
            auth_service,
            import_service,
            report_service,
        }
    }
}

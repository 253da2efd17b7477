// src/main.rs

use clap::Parser;
use tokio::net::TcpListener;

use insight_hub::{
    app_router,
    cli::{self, Cli, Command},
    config::{AppState, Config},
    init_tracing,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Database migrations applied");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(app_state, &config.bind_addr).await,
        command => cli::execute_command(command, &app_state).await,
    }
}

async fn serve(app_state: AppState, bind_addr: &str) -> anyhow::Result<()> {
    let app = app_router(app_state);

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("🚀 Listening on {}", listener.local_addr()?);
    tracing::info!("📚 API docs at /swagger-ui");

    axum::serve(listener, app).await?;
    Ok(())
}

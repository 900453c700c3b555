use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use api::{AppState, ServerConfig, create_app};
use auth::{JwtConfig, JwtService};
use common::database::{DatabaseConfig, health_check, init_pool, sync_schema};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting task API service");

    let server_config = ServerConfig::from_env()?;
    let jwt_service = JwtService::new(JwtConfig::from_env()?);

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    sync_schema(&pool).await?;

    let app = create_app(AppState::new(pool, jwt_service), &server_config);

    let listener = TcpListener::bind(server_config.address()).await?;
    info!("Task API service listening on {}", server_config.address());

    axum::serve(listener, app).await?;

    Ok(())
}

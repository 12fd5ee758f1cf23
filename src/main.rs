use helpmap::auth::JwtService;
use helpmap::{create_app, db, AppState};
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present) so DATABASE_URL from file is visible
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Connect and bring the schema up to date
    let db_conn = db::connect().await?;
    Migrator::up(&db_conn, None).await?;

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using an insecure development secret");
        "insecure-dev-secret".to_string()
    });

    let state = AppState {
        db: db_conn,
        jwt: Arc::new(JwtService::new(&jwt_secret, "helpmap".to_string())),
    };

    // Run our server
    let app = create_app(state);
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server running on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

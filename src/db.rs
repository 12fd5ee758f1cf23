use sea_orm::{Database, DatabaseConnection, DbErr};
use std::env;

/// Connect to the configured database.
///
/// `DB_TYPE=postgres` requires `DATABASE_URL`; anything else falls back to a
/// local SQLite file so the server runs without external services.
pub async fn connect() -> Result<DatabaseConnection, DbErr> {
    let db_type = env::var("DB_TYPE").unwrap_or_else(|_| "sqlite".to_string());

    let db_url = match db_type.as_str() {
        "postgres" => env::var("DATABASE_URL").expect("DATABASE_URL must be set for Postgres"),
        _ => env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./local_db.sqlite?mode=rwc".to_string()),
    };

    tracing::info!(
        "Connecting to database: {}",
        if db_type == "postgres" { "PostgreSQL" } else { "SQLite (local)" }
    );

    Database::connect(&db_url).await
}

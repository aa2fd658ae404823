//! CLI subcommands.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;

use crate::commands::migrate::CommandError;

/// Connect to the database named by `EMBERLINE_DATABASE_URL` (or
/// `DATABASE_URL`).
pub async fn connect() -> Result<PgPool, CommandError> {
    let _ = dotenvy::dotenv();

    let database_url = std::env::var("EMBERLINE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("EMBERLINE_DATABASE_URL"))?;

    let pool = emberline_server::db::create_pool(&SecretString::from(database_url)).await?;
    Ok(pool)
}

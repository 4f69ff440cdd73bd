pub mod repository;

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::error::AppError;

pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, AppError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

pub async fn migrate(db: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations").run(db).await?;
    Ok(())
}

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub mod bookmark_repo;
pub mod comment_repo;
pub mod conversation_repo;
pub mod follow_repo;
pub mod like_repo;
pub mod message_repo;
pub mod post_repo;
pub mod user_repo;

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

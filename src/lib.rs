pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod realtime;
pub mod routes;
pub mod security;
pub mod services;
pub mod validators;

pub use config::Config;
pub use error::{AppError, Result};

use realtime::ConnectionRegistry;
use security::jwt::JwtKeys;
use services::{email::EmailService, storage::StorageService};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub jwt: JwtKeys,
    pub email: EmailService,
    pub storage: StorageService,
    pub registry: ConnectionRegistry,
}

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use std::io;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use social_api::db::{create_pool, run_migrations};
use social_api::realtime::ConnectionRegistry;
use social_api::routes::configure_routes;
use social_api::security::jwt::JwtKeys;
use social_api::services::{email::EmailService, storage::StorageService};
use social_api::{AppState, Config};

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");

    tracing::info!("Starting social-api v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let db_pool = create_pool(&config.database.url, config.database.max_connections)
        .await
        .expect("Failed to create database pool");
    tracing::info!(
        "Database pool created with {} max connections",
        config.database.max_connections
    );

    run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations completed");

    let storage = StorageService::new(&config.storage)
        .await
        .expect("Failed to build storage client");

    let state = AppState {
        db: db_pool,
        jwt: JwtKeys::new(&config.jwt.secret, config.jwt.token_ttl_secs),
        email: EmailService::new(config.email.clone()),
        storage,
        registry: ConnectionRegistry::new(),
    };

    let bind_addr = (config.app.host.clone(), config.app.port);
    let cors_origin = config.app.cors_origin.clone();

    tracing::info!("Listening on {}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(web::Data::new(state.clone()))
            .configure(configure_routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}

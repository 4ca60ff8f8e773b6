use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub email: EmailConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Cookie token lifetime in seconds. Fixed 1 day by default.
    pub token_ttl_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Custom endpoint for S3-compatible stores (minio in development).
    pub endpoint: Option<String>,
    /// Public base URL for uploaded objects.
    pub public_url: String,
}

fn default_app_port() -> u16 {
    8080
}

fn default_db_max_connections() -> u32 {
    20
}

fn default_token_ttl_secs() -> i64 {
    86400 // 1 day
}

fn default_smtp_port() -> u16 {
    587
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let app = AppConfig {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_app_port),
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        };

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_db_max_connections),
        };

        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?,
            token_ttl_secs: env::var("JWT_TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_token_ttl_secs),
        };

        let email = EmailConfig {
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_smtp_port),
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_email: env::var("FROM_EMAIL").unwrap_or_else(|_| "noreply@example.com".to_string()),
            from_name: env::var("FROM_NAME").unwrap_or_else(|_| "Social".to_string()),
        };

        let storage = StorageConfig {
            bucket: env::var("S3_BUCKET").unwrap_or_else(|_| "social-uploads".to_string()),
            region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            access_key_id: env::var("S3_ACCESS_KEY_ID").unwrap_or_default(),
            secret_access_key: env::var("S3_SECRET_ACCESS_KEY").unwrap_or_default(),
            endpoint: env::var("S3_ENDPOINT").ok(),
            public_url: env::var("S3_PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:9000/social-uploads".to_string()),
        };

        Ok(Config {
            app,
            database,
            jwt,
            email,
            storage,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }
}

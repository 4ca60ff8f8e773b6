use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::Result;
use crate::AppState;

/// GET /api/v1/health
pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let db_ok = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();

    let status = if db_ok { "healthy" } else { "degraded" };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "status": status,
        "database": db_ok,
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

use actix_web::{web, HttpResponse, Result};
use sqlx::SqlitePool;

use crate::models::{ErrorResponse, HealthResponse, HealthStatus, ServiceError};

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service and database are reachable", body = HealthResponse),
        (status = 500, description = "Database unavailable", body = ErrorResponse)
    )
)]
pub async fn health(pool: web::Data<SqlitePool>) -> Result<HttpResponse, ServiceError> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(HealthResponse {
        success: true,
        status: HealthStatus {
            database: "ok".to_string(),
            timestamp: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        },
    }))
}

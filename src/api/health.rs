use crate::context::AppContext;
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

pub const LIVENESS_MESSAGE: &str = "Profile Upload API is running";

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct LivenessResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub database: String,
    pub timestamp: i64,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = LivenessResponse)
    )
)]
pub async fn liveness() -> impl Responder {
    HttpResponse::Ok().json(LivenessResponse {
        message: LIVENESS_MESSAGE.to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service and database are healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(ctx: web::Data<AppContext>) -> impl Responder {
    let health = |status: &str, database: &str| HealthResponse {
        status: status.to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    };

    match ctx.users.ping().await {
        Ok(()) => HttpResponse::Ok().json(health("healthy", "connected")),
        Err(e) => {
            log::error!("❌ Health check: {}", e);
            HttpResponse::ServiceUnavailable().json(health("degraded", "unreachable"))
        }
    }
}

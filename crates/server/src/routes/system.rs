use actix_web::{get, HttpResponse};

use crate::types::HealthResponse;

/// Liveness probe
#[get("/health")]
pub async fn health_check() -> actix_web::Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(HealthResponse { status: "healthy" }))
}

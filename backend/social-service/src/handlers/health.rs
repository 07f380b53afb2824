use actix_web::{web, HttpResponse};
use serde_json::json;

use super::AppState;

/// GET /health
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    match state.repo.health_check().await {
        Ok(()) => HttpResponse::Ok().json(json!({ "status": "ok" })),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            HttpResponse::ServiceUnavailable().json(json!({ "status": "unavailable" }))
        }
    }
}

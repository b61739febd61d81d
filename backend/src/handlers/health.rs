use actix_web::HttpResponse;
use serde_json::json;

/// `GET /health`: liveness only, no dependency checks.
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

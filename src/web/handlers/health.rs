use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::health::HealthStatus;
use crate::web::server::AppState;

/// Full health report
pub async fn health_check(app_state: web::Data<AppState>) -> impl Responder {
    let report = app_state.health.check(&app_state.machine).await;
    HttpResponse::Ok().json(report)
}

/// Liveness probe: the server is answering
pub async fn liveness_probe() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "alive" }))
}

/// Readiness probe: 503 while any check is unhealthy
pub async fn readiness_probe(app_state: web::Data<AppState>) -> impl Responder {
    let report = app_state.health.check(&app_state.machine).await;

    if report.status == HealthStatus::Unhealthy {
        return HttpResponse::ServiceUnavailable().json(report);
    }

    HttpResponse::Ok().json(json!({ "status": "ready" }))
}

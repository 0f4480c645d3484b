//! Web handlers for machine management
//!
//! Status, fills, reset and the container configuration.

use actix_web::{web, HttpRequest, HttpResponse};

use crate::machine::ContainerKind;
use crate::web::error::ApiError;
use crate::web::models::{
    ContainerConfigResponse, FillRequest, MessageResponse, StatusResponse, MAX_FILL_AMOUNT,
};
use crate::web::rate_limit::{client_key, LimitClass};
use crate::web::server::AppState;

/// Get current machine status
pub async fn get_status(
    app_state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    app_state.limiter.check(&client_key(&req), LimitClass::Status)?;

    let status = app_state.machine.status().await;

    Ok(HttpResponse::Ok().json(StatusResponse {
        success: true,
        data: status.into(),
    }))
}

pub async fn fill_water(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<FillRequest>,
) -> Result<HttpResponse, ApiError> {
    fill(app_state, req, ContainerKind::Water, body.into_inner()).await
}

pub async fn fill_coffee(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<FillRequest>,
) -> Result<HttpResponse, ApiError> {
    fill(app_state, req, ContainerKind::Coffee, body.into_inner()).await
}

async fn fill(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    kind: ContainerKind,
    body: FillRequest,
) -> Result<HttpResponse, ApiError> {
    app_state.limiter.check(&client_key(&req), LimitClass::Fill)?;

    let result = match body.validate() {
        Ok(amount) => app_state.machine.fill(kind, amount).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(filled) => {
            app_state.metrics.record_fill(kind);
            let unit = kind.unit();

            Ok(HttpResponse::Ok().json(MessageResponse {
                success: true,
                message: format!(
                    "Added {}{} of {}. Container now at {}{}/{}{}",
                    filled.amount, unit, kind, filled.level, unit, filled.capacity, unit
                ),
            }))
        }
        Err(e) => {
            app_state.metrics.record_failure(&e);
            Err(e.into())
        }
    }
}

/// Reset the machine to its empty state
pub async fn reset_machine(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    match app_state.machine.reset().await {
        Ok(result) => Ok(HttpResponse::Ok().json(MessageResponse {
            success: true,
            message: result.message,
        })),
        Err(e) => {
            app_state.metrics.record_failure(&e);
            Err(e.into())
        }
    }
}

/// Get the configured container capacities
pub async fn get_container_config(app_state: web::Data<AppState>) -> HttpResponse {
    let capacities = app_state.machine.capacities();

    HttpResponse::Ok().json(ContainerConfigResponse {
        water_capacity: capacities.water,
        coffee_capacity: capacities.coffee,
        max_fill_amount: MAX_FILL_AMOUNT,
    })
}

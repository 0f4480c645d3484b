//! Web handlers for brewing
//!
//! This module provides handlers for the coffee API endpoints.

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::machine::CoffeeType;
use crate::web::error::ApiError;
use crate::web::models::BrewResponse;
use crate::web::rate_limit::{client_key, LimitClass};
use crate::web::server::AppState;

/// Brew the recipe named in the path
pub async fn brew(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    app_state.limiter.check(&client_key(&req), LimitClass::Brew)?;

    let coffee_type: CoffeeType = path.into_inner().parse()?;

    match app_state.machine.brew(coffee_type).await {
        Ok(result) => {
            app_state.metrics.record_brew(coffee_type);

            Ok(HttpResponse::Ok().json(BrewResponse {
                success: true,
                message: result.message,
                recipe: result.recipe,
            }))
        }
        Err(e) => {
            app_state.metrics.record_failure(&e);
            Err(e.into())
        }
    }
}

/// List the fixed recipe table
pub async fn list_recipes(app_state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "recipes": app_state.machine.recipes(),
    }))
}

use std::convert::Infallible;

use actix_web::{web, HttpResponse};
use futures::{stream, StreamExt};
use log::{error, warn};
use serde::Serialize;
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;

use crate::web::error::ApiError;
use crate::web::models::StatusData;
use crate::web::server::AppState;

/// Prometheus text exposition of the machine metrics
pub async fn metrics(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let status = app_state.machine.status().await;
    app_state.metrics.observe_status(&status);

    let body = app_state.metrics.render().map_err(|e| {
        error!("Failed to render metrics: {}", e);
        ApiError::Internal(e.to_string())
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}

fn sse_frame<T: Serialize>(payload: &T) -> Option<web::Bytes> {
    match serde_json::to_string(payload) {
        Ok(json) => Some(web::Bytes::from(format!("data: {}\n\n", json))),
        Err(e) => {
            error!("Failed to serialize event: {}", e);
            None
        }
    }
}

/// Server-sent stream of machine events, opened with a status snapshot
pub async fn events(app_state: web::Data<AppState>) -> HttpResponse {
    let receiver = app_state.machine.subscribe();
    let status = StatusData::from(app_state.machine.status().await);

    let initial = sse_frame(&json!({ "type": "status_update", "data": status }));

    let updates = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Some(frame) = sse_frame(&event) {
                        return Some((frame, receiver));
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event subscriber lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    let events = stream::iter(initial)
        .chain(updates)
        .map(Ok::<_, Infallible>);

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(events)
}

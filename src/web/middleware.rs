use std::time::Instant;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::middleware::Next;
use actix_web::Error;
use log::{error, info};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tag each request with a short id and log its start, outcome and timing
pub async fn request_logging(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let request_id = Uuid::new_v4().simple().to_string()[..8].to_string();
    let method = req.method().to_string();
    let path = req.path().to_string();

    info!("request_started request_id={} method={} path={}", request_id, method, path);
    let started = Instant::now();

    match next.call(req).await {
        Ok(mut res) => {
            info!(
                "request_completed request_id={} method={} path={} status={} process_time={:.3}s",
                request_id,
                method,
                path,
                res.status().as_u16(),
                started.elapsed().as_secs_f64()
            );
            if let Ok(value) = HeaderValue::from_str(&request_id) {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }
            Ok(res)
        }
        Err(e) => {
            error!(
                "request_failed request_id={} method={} path={} error={} process_time={:.3}s",
                request_id,
                method,
                path,
                e,
                started.elapsed().as_secs_f64()
            );
            Err(e)
        }
    }
}

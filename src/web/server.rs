use std::sync::Arc;

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::{from_fn, Logger};
use actix_web::{web, App, HttpServer};
use log::info;

use crate::config::Settings;
use crate::core::metrics::MachineMetrics;
use crate::health::HealthChecker;
use crate::machine::CoffeeMachine;
use crate::storage::StateStore;
use crate::web::error::ApiError;
use crate::web::handlers;
use crate::web::middleware::request_logging;
use crate::web::rate_limit::RateLimiter;

/// Start the HTTP server and run until shutdown
pub async fn start_web_server(state: web::Data<AppState>, bind: &str) -> std::io::Result<()> {
    info!("Starting web server on http://{}", bind);

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&state.settings.cors_origins))
            .wrap(from_fn(request_logging))
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(bind)?
    .run()
    .await
}

/// Browser access for the configured origins
pub fn cors(origins: &[String]) -> Cors {
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST"])
        .allowed_header(header::CONTENT_TYPE)
        .supports_credentials()
        .max_age(3600)
}

/// Register every route: the versioned API, its `/api` alias and `/metrics`
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::InvalidRequest(err.to_string()).into()
    });

    cfg.app_data(json_config)
        .service(web::scope("/api/v1").configure(api_routes))
        .service(web::scope("/api").configure(api_routes))
        .route("/metrics", web::get().to(handlers::system::metrics));
}

fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Coffee APIs
        .route("/coffee/{recipe}", web::post().to(handlers::coffee::brew))
        .route("/recipes", web::get().to(handlers::coffee::list_recipes))
        // Management APIs
        .route("/status", web::get().to(handlers::management::get_status))
        .route("/fill/water", web::post().to(handlers::management::fill_water))
        .route("/fill/coffee", web::post().to(handlers::management::fill_coffee))
        .route("/reset", web::post().to(handlers::management::reset_machine))
        .route("/config/containers", web::get().to(handlers::management::get_container_config))
        .route("/events", web::get().to(handlers::system::events))
        // Health APIs
        .route("/health", web::get().to(handlers::health::health_check))
        .route("/health/live", web::get().to(handlers::health::liveness_probe))
        .route("/health/ready", web::get().to(handlers::health::readiness_probe));
}

/// Shared application state for web handlers
pub struct AppState {
    pub machine: Arc<CoffeeMachine>,
    pub health: HealthChecker,
    pub metrics: MachineMetrics,
    pub limiter: RateLimiter,
    pub settings: Settings,
}

impl AppState {
    pub fn new(
        machine: Arc<CoffeeMachine>,
        store: Arc<dyn StateStore>,
        settings: Settings,
    ) -> Result<Self, prometheus::Error> {
        Ok(Self {
            machine,
            health: HealthChecker::new(store),
            metrics: MachineMetrics::new()?,
            limiter: RateLimiter::new(settings.rate_limit_enabled),
            settings,
        })
    }
}

//! Actix-Web API server for the SahiBin waste scanner.
//!
//! Exposes waste detection, all-time scan statistics, and nearby disposal
//! center lookup over JSON. The image classifier and the place search are
//! external services configured through the environment; the statistics
//! document lives in the configured data directory.

mod config;
mod handlers;
mod models;

pub use config::{ConfigError, ServerConfig};

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, error, middleware, web};
use reqwest::Client;
use sahibin_core::persistence::JsonFileRepository;
use sahibin_core::{Capabilities, SahibinService, StatisticsStore, WasteCatalog};
use sahibin_provider_places as places;
use sahibin_provider_vision as vision;

use crate::models::ApiMessage;

/// Shared application state.
pub struct AppState {
    /// Service facade used by every handler.
    pub service: Arc<SahibinService>,
}

/// Wire the catalog, statistics store, and external backends described by `config`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn build_service(config: &ServerConfig) -> Result<SahibinService, reqwest::Error> {
    let client = Client::builder()
        .user_agent(concat!("sahibin/", env!("CARGO_PKG_VERSION")))
        .timeout(config.http_timeout)
        .build()?;

    let capabilities = Capabilities::new(
        vision::plugin(client.clone(), config.classifier.clone()),
        places::plugin(client, config.google_maps_api_key.clone()),
    );

    let repository = Arc::new(JsonFileRepository::new(&config.data_dir));
    let stats = StatisticsStore::new(repository, config.history_limit);

    Ok(SahibinService::new(
        WasteCatalog::builtin(),
        capabilities,
        stats,
    ))
}

/// Register the API routes and the JSON query error handler.
pub fn routes(cfg: &mut web::ServiceConfig) {
    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ApiMessage::failure(err.to_string()));
        error::InternalError::from_response(err, response).into()
    });

    cfg.app_data(query_config)
        .route("/", web::get().to(handlers::health))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(handlers::health))
                .route("/categories", web::get().to(handlers::categories))
                .route("/detect", web::post().to(handlers::detect))
                .route("/stats", web::get().to(handlers::stats))
                .route(
                    "/collection-centers",
                    web::get().to(handlers::collection_centers),
                ),
        );
}

/// Starts the SahiBin API server.
///
/// Builds the service, checks that the statistics document is readable,
/// logs which external backends are configured, and runs the HTTP server
/// until it is stopped.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built, the statistics
/// document cannot be read, or the server fails to bind.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    log::info!(
        "Using statistics in {} (keeping {} scans)",
        config.data_dir.display(),
        config.history_limit
    );

    let service = build_service(&config)?;

    let snapshot = service.stats().await?;
    log::info!(
        "Loaded statistics: {} scans, {}% recyclable",
        snapshot.items_detected,
        snapshot.recycling_rate
    );

    let status = service.capability_status();
    if status.classifier {
        log::info!("Image classifier configured");
    } else {
        log::warn!("SAHIBIN_CLASSIFIER_URL not set, detection is unavailable");
    }
    if status.facility_search {
        log::info!("Google Maps configured");
    } else {
        log::warn!("GOOGLE_MAPS_API_KEY not set, collection center search is unavailable");
    }

    let state = web::Data::new(AppState {
        service: Arc::new(service),
    });
    let max_upload_bytes = config.max_upload_bytes;

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .configure(routes)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}

mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use crate::config::Settings;
use crate::core::{EmailValidator, ValidationChecks, VoteRecorder};
use routes::voting::AppState;
use services::{
    DisposableDomains, DisposableSource, DnsMxResolver, DocumentStoreClient, MxResolver,
    ProfileStore, SessionManager, StoreCollections,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Campus Vote service (log level: {})...", log_level);

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize the document store client
    let collections = StoreCollections {
        profiles: settings.collection.profiles,
        errors: settings.collection.errors,
    };

    let store: Arc<dyn ProfileStore> = Arc::new(DocumentStoreClient::new(
        settings.store.endpoint,
        settings.store.api_key,
        settings.store.project_id,
        settings.store.database_id,
        collections,
    ));

    info!("Document store client initialized");

    // Load the disposable-domain list; failures degrade to an empty set
    let disposable_source = if let Some(url) = settings.validation.disposable_list_url.clone() {
        DisposableSource::Url(url)
    } else if let Some(path) = settings.validation.disposable_list_path.clone() {
        DisposableSource::File(path.into())
    } else {
        DisposableSource::None
    };

    let disposable = Arc::new(DisposableDomains::load(disposable_source).await);
    info!("Disposable domain set loaded ({} domains)", disposable.len());

    // Re-fetch the list in the background so new disposable providers get
    // picked up without a restart
    let refresh_secs = settings.validation.disposable_refresh_secs;
    if refresh_secs > 0 {
        let disposable = disposable.clone();
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(refresh_secs));
            // The first tick completes immediately; the list was just loaded
            interval.tick().await;
            loop {
                interval.tick().await;
                let count = disposable.refresh().await;
                tracing::debug!("Refreshed disposable domain set ({} domains)", count);
            }
        });
    }

    // MX lookups only when the check is enabled
    let mx: Option<Arc<dyn MxResolver>> = if settings.validation.mx {
        Some(Arc::new(DnsMxResolver::new(settings.validation.mx_timeout_secs)))
    } else {
        None
    };

    let checks = ValidationChecks {
        syntax: settings.validation.syntax,
        allow_list: settings.validation.allow_list,
        disposable: settings.validation.disposable,
        mx: settings.validation.mx,
    };

    let allowed_domains: HashSet<String> = settings
        .validation
        .allowed_domains
        .iter()
        .map(|d| d.to_lowercase())
        .collect();

    let validator = Arc::new(EmailValidator::new(checks, allowed_domains, disposable, mx));

    info!("Email validator initialized with checks: {:?}", checks);

    // Session store and vote recorder
    let sessions = Arc::new(SessionManager::new(
        settings.session.capacity,
        settings.session.ttl_secs,
    ));
    let recorder = VoteRecorder::new(store.clone());

    info!(
        "Session store initialized (capacity: {}, TTL: {}s)",
        settings.session.capacity, settings.session.ttl_secs
    );

    // Build application state
    let app_state = AppState {
        store,
        validator,
        recorder,
        sessions,
        leaderboard_size: settings.leaderboard.size,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}

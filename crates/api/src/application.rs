use actix_web::{middleware::Logger, web, App, HttpServer};
use autologist_domain::config::{ApiConfig, ClientOptions, ConfigError, ServiceConfiguration};
use autologist_domain::services::telemetry::{init_telemetry, TelemetryConfig, TelemetryError};
use autologist_firebase::{install_shared, BackendClients, InitializationError, RestBackendFactory};
use thiserror::Error;
use tracing::info;

use crate::{
    handlers::{health_handler, metrics_handler},
    state::AppState,
};

pub async fn run() -> Result<(), BootstrapError> {
    // 1. Configuration: project identifiers, client knobs, HTTP bind.
    let service_config = ServiceConfiguration::load_from_env()?;
    let options = ClientOptions::load_from_env()?;
    let api_config = ApiConfig::load_from_env()?;

    // 2. Telemetry.
    let telemetry_config = TelemetryConfig::from_env("API");
    let telemetry = init_telemetry(&telemetry_config)?;

    // 3. Client handles. Any error here aborts startup.
    let policy = options.failure_policy();
    let verify = options.verify_services();
    let factory = RestBackendFactory::new(options);
    let clients = BackendClients::initialize(&factory, service_config, policy)?;

    if verify {
        let report = clients.probe().await;
        clients.enforce(&report)?;
        info!(healthy = report.is_healthy(), "startup probe finished");
    }

    let clients = install_shared(clients);
    let state = AppState::new(clients, telemetry);

    // 4. HTTP surface.
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .route("/health", web::get().to(health_handler))
            .route("/metrics", web::get().to(metrics_handler))
    })
    .bind(api_config.api_bind_address())?;

    info!(address = api_config.api_bind_address(), "api listening");
    server.run().await?;

    Ok(())
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("initialization error: {0}")]
    Initialization(#[from] InitializationError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

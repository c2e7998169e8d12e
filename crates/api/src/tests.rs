use std::{sync::Arc, time::Duration};

use actix_web::{body::to_bytes, http::StatusCode, test, web, App};
use autologist_domain::services::telemetry::{init_telemetry, TelemetryConfig, TelemetryGuard};
use autologist_domain::{ClientOptions, FailurePolicy, ServiceConfiguration, ServiceKind};
use autologist_firebase::{
    ApplicationHandle, AuthClient, BackendClients, BackendFactory, DatabaseClient, Endpoints,
    InitializationError, RestBackendFactory, StorageClient,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

use crate::handlers::{
    health::{HealthResponse, OverallStatus},
    health_handler, metrics_handler,
};
use crate::state::AppState;

fn sample_config() -> ServiceConfiguration {
    ServiceConfiguration::builder()
        .api_key("AIzaSyTestKey")
        .auth_domain("autologist-65cd7.firebaseapp.com")
        .project_id("autologist-65cd7")
        .storage_bucket("autologist-65cd7.firebasestorage.app")
        .messaging_sender_id("742606479823")
        .app_id("1:742606479823:web:a08c9f03f4b6838b8f72ba")
        .build()
}

fn telemetry() -> TelemetryGuard {
    let config = TelemetryConfig::from_env("API_TEST");
    init_telemetry(&config).expect("telemetry inits")
}

fn rest_factory(base: &str) -> RestBackendFactory {
    RestBackendFactory::new(ClientOptions::default().with_request_timeout(Duration::from_secs(2)))
        .with_endpoints(Endpoints::uniform(base))
}

/// REST factory that reports storage as switched off for the project.
struct StorageDisabled(RestBackendFactory);

impl BackendFactory for StorageDisabled {
    fn initialize_app(
        &self,
        config: ServiceConfiguration,
    ) -> Result<ApplicationHandle, InitializationError> {
        self.0.initialize_app(config)
    }

    fn database(&self, app: &ApplicationHandle) -> Result<DatabaseClient, InitializationError> {
        self.0.database(app)
    }

    fn auth(&self, app: &ApplicationHandle) -> Result<AuthClient, InitializationError> {
        self.0.auth(app)
    }

    fn storage(&self, _app: &ApplicationHandle) -> Result<StorageClient, InitializationError> {
        Err(InitializationError::unavailable(
            ServiceKind::Storage,
            "bucket not provisioned",
        ))
    }
}

// Answers `count` requests with `200 {}` and returns the base URL.
async fn serve_ok(count: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    actix_web::rt::spawn(async move {
        for _ in 0..count {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}",
                )
                .await
                .unwrap();
        }
    });
    format!("http://{addr}")
}

// Drains headers and any declared body so closing the socket does not reset
// the connection under the client.
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut received = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap_or(0);
        if n == 0 {
            return;
        }
        received.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&received);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if received.len() >= header_end + 4 + content_length {
                return;
            }
        }
    }
}

async fn closed_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn state_with<F: BackendFactory>(factory: &F, policy: FailurePolicy) -> AppState {
    let clients = BackendClients::initialize(factory, sample_config(), policy)
        .expect("clients initialize");
    AppState::new(Arc::new(clients), telemetry())
}

async fn get_health(state: AppState) -> (StatusCode, HealthResponse) {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .route("/health", web::get().to(health_handler)),
    )
    .await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body = to_bytes(resp.into_body()).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[actix_web::test]
async fn health_reports_ok_when_all_services_answer() {
    let base = serve_ok(3).await;
    let state = state_with(&rest_factory(&base), FailurePolicy::Abort);

    let (status, body) = get_health(state).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.status, OverallStatus::Ok);
    assert_eq!(body.project_id, "autologist-65cd7");
    assert_eq!(body.services.len(), 3);
    assert!(body.services.values().all(|s| s.status == "connected"));
}

#[actix_web::test]
async fn health_reports_degraded_when_backend_unreachable() {
    let base = closed_base().await;
    let state = state_with(&rest_factory(&base), FailurePolicy::Abort);

    let (status, body) = get_health(state).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body.status, OverallStatus::Degraded);
    let database = &body.services[&ServiceKind::Database];
    assert_eq!(database.status, "unavailable");
    assert!(database.reason.is_some());
}

#[actix_web::test]
async fn health_lists_degraded_service_as_disabled() {
    let base = serve_ok(2).await;
    let state = state_with(&StorageDisabled(rest_factory(&base)), FailurePolicy::Degrade);

    let (status, body) = get_health(state).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body.services[&ServiceKind::Database].status, "connected");
    assert_eq!(body.services[&ServiceKind::Auth].status, "connected");
    let storage = &body.services[&ServiceKind::Storage];
    assert_eq!(storage.status, "disabled");
    assert!(storage
        .reason
        .as_deref()
        .unwrap_or_default()
        .contains("bucket not provisioned"));
}

#[actix_web::test]
async fn metrics_endpoint_renders_prometheus_text() {
    let base = closed_base().await;
    let state = state_with(&rest_factory(&base), FailurePolicy::Abort);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .route("/metrics", web::get().to(metrics_handler)),
    )
    .await;
    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
}

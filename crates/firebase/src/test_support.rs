use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use autologist_domain::{ClientOptions, ServiceConfiguration, ServiceKind};

use crate::{
    app::{ApplicationHandle, Endpoints},
    error::InitializationError,
    factory::{BackendFactory, RestBackendFactory},
    services::{AuthClient, DatabaseClient, StorageClient},
};

pub fn sample_config() -> ServiceConfiguration {
    ServiceConfiguration::builder()
        .api_key("AIzaSyTestKey")
        .auth_domain("autologist-65cd7.firebaseapp.com")
        .project_id("autologist-65cd7")
        .storage_bucket("autologist-65cd7.firebasestorage.app")
        .messaging_sender_id("742606479823")
        .app_id("1:742606479823:web:a08c9f03f4b6838b8f72ba")
        .build()
}

pub fn sample_app() -> ApplicationHandle {
    RestBackendFactory::default()
        .initialize_app(sample_config())
        .expect("sample config is valid")
}

/// Factory that validates like the REST one but can pretend a product is
/// switched off for the project.
#[derive(Default)]
pub struct StubFactory {
    inner: RestBackendFactory,
    disabled: Option<ServiceKind>,
    pub service_requests: AtomicUsize,
}

impl StubFactory {
    pub fn disabling(kind: ServiceKind) -> Self {
        Self {
            disabled: Some(kind),
            ..Self::default()
        }
    }

    pub fn with_endpoint_base(mut self, base: &str) -> Self {
        self.inner = RestBackendFactory::new(
            ClientOptions::default().with_request_timeout(Duration::from_secs(2)),
        )
        .with_endpoints(Endpoints::uniform(base));
        self
    }

    fn request(&self, kind: ServiceKind) -> Result<(), InitializationError> {
        self.service_requests.fetch_add(1, Ordering::SeqCst);
        if self.disabled == Some(kind) {
            return Err(InitializationError::unavailable(
                kind,
                format!("{} is not enabled for this project", kind.product_name()),
            ));
        }
        Ok(())
    }
}

impl BackendFactory for StubFactory {
    fn initialize_app(
        &self,
        config: ServiceConfiguration,
    ) -> Result<ApplicationHandle, InitializationError> {
        self.inner.initialize_app(config)
    }

    fn database(&self, app: &ApplicationHandle) -> Result<DatabaseClient, InitializationError> {
        self.request(ServiceKind::Database)?;
        self.inner.database(app)
    }

    fn auth(&self, app: &ApplicationHandle) -> Result<AuthClient, InitializationError> {
        self.request(ServiceKind::Auth)?;
        self.inner.auth(app)
    }

    fn storage(&self, app: &ApplicationHandle) -> Result<StorageClient, InitializationError> {
        self.request(ServiceKind::Storage)?;
        self.inner.storage(app)
    }
}

use autologist_domain::{ClientOptions, ServiceConfiguration};
use tracing::debug;

use crate::{
    app::{ApplicationHandle, Endpoints, DEFAULT_APP_NAME},
    error::InitializationError,
    services::{AuthClient, DatabaseClient, StorageClient},
    validate::validate_configuration,
};

/// Produces the application handle and the service handles derived from it.
/// Implementations decide which configurations they accept and whether a
/// given product can be served for the project.
pub trait BackendFactory: Send + Sync {
    fn initialize_app(
        &self,
        config: ServiceConfiguration,
    ) -> Result<ApplicationHandle, InitializationError>;

    fn database(&self, app: &ApplicationHandle) -> Result<DatabaseClient, InitializationError>;

    fn auth(&self, app: &ApplicationHandle) -> Result<AuthClient, InitializationError>;

    fn storage(&self, app: &ApplicationHandle) -> Result<StorageClient, InitializationError>;
}

/// Factory backed by the public REST endpoints. Construction performs no
/// network I/O; reachability is checked separately through probes.
#[derive(Debug, Clone, Default)]
pub struct RestBackendFactory {
    endpoints: Endpoints,
    options: ClientOptions,
}

impl RestBackendFactory {
    pub fn new(options: ClientOptions) -> Self {
        Self {
            endpoints: Endpoints::default(),
            options,
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    fn http_client(&self) -> Result<reqwest::Client, InitializationError> {
        let client = reqwest::Client::builder()
            .timeout(self.options.request_timeout())
            .user_agent(concat!("autologist/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(client)
    }
}

impl BackendFactory for RestBackendFactory {
    fn initialize_app(
        &self,
        config: ServiceConfiguration,
    ) -> Result<ApplicationHandle, InitializationError> {
        validate_configuration(&config)?;
        let http = self.http_client()?;
        debug!(project_id = config.project_id(), "application handle created");
        Ok(ApplicationHandle::new(
            DEFAULT_APP_NAME,
            config,
            self.endpoints.clone(),
            http,
        ))
    }

    fn database(&self, app: &ApplicationHandle) -> Result<DatabaseClient, InitializationError> {
        Ok(DatabaseClient::new(app.clone()))
    }

    fn auth(&self, app: &ApplicationHandle) -> Result<AuthClient, InitializationError> {
        Ok(AuthClient::new(app.clone()))
    }

    fn storage(&self, app: &ApplicationHandle) -> Result<StorageClient, InitializationError> {
        Ok(StorageClient::new(app.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_config;
    use std::time::Duration;

    #[test]
    fn rest_factory_builds_all_handles_from_one_app() {
        let factory = RestBackendFactory::new(
            ClientOptions::default().with_request_timeout(Duration::from_secs(2)),
        );
        let app = factory
            .initialize_app(sample_config())
            .expect("app initializes");
        assert_eq!(app.name(), DEFAULT_APP_NAME);

        let database = factory.database(&app).expect("database handle");
        let auth = factory.auth(&app).expect("auth handle");
        let storage = factory.storage(&app).expect("storage handle");
        assert!(database.app().ptr_eq(&app));
        assert!(auth.app().ptr_eq(&app));
        assert!(storage.app().ptr_eq(&app));
    }

    #[test]
    fn rest_factory_rejects_malformed_config() {
        let config = ServiceConfiguration::builder()
            .api_key("key")
            .project_id("autologist-65cd7")
            .build();
        let err = RestBackendFactory::default()
            .initialize_app(config)
            .unwrap_err();
        assert!(err.is_configuration_rejected());
    }

    #[test]
    fn custom_endpoints_flow_into_handles() {
        let factory = RestBackendFactory::default()
            .with_endpoints(Endpoints::uniform("http://127.0.0.1:8080"));
        let app = factory.initialize_app(sample_config()).unwrap();
        let storage = factory.storage(&app).unwrap();
        assert_eq!(
            storage.bucket_url(),
            "http://127.0.0.1:8080/b/autologist-65cd7.firebasestorage.app"
        );
    }
}

//! Client initialization for the hosted backend: one application handle built
//! from a [`ServiceConfiguration`](autologist_domain::ServiceConfiguration)
//! and the database, authentication and storage handles derived from it.
//!
//! Binaries should build a [`BackendClients`] at startup and inject it; the
//! [`shared`] accessor exists for code paths that cannot be handed one.

pub mod app;
pub mod clients;
pub mod error;
pub mod factory;
pub mod probe;
pub mod services;
pub mod shared;
pub mod validate;

#[cfg(test)]
mod test_support;

pub use app::{ApplicationHandle, Endpoints, DEFAULT_APP_NAME};
pub use clients::{BackendClients, HealthReport};
pub use error::InitializationError;
pub use factory::{BackendFactory, RestBackendFactory};
pub use probe::{classify_response, ServiceProbe, ServiceStatus};
pub use services::{AuthClient, DatabaseClient, StorageClient};
pub use shared::{install_shared, shared};
pub use validate::validate_configuration;

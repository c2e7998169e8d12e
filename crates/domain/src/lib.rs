//! Domain-level building blocks shared by the client and API crates:
//! project configuration, the service catalogue, and telemetry wiring.

pub mod config;
pub mod model;
pub mod services;

pub use config::{
    ApiConfig, ClientOptions, ConfigError, FailurePolicy, ServiceConfiguration,
    ServiceConfigurationBuilder,
};
pub use model::ServiceKind;

use autologist_domain::{config::ConfigError, ServiceKind};
use thiserror::Error;

/// Failures raised while producing the application handle or one of the
/// service handles derived from it.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("configuration rejected: `{field}` {reason}")]
    ConfigurationRejected { field: &'static str, reason: String },
    #[error("{service} unavailable: {reason}")]
    ServiceUnavailable { service: ServiceKind, reason: String },
    #[error("environment error: {0}")]
    Environment(#[source] ConfigError),
    #[error("failed to build http client: {0}")]
    HttpClient(String),
}

impl InitializationError {
    pub fn rejected(field: &'static str, reason: impl Into<String>) -> Self {
        Self::ConfigurationRejected {
            field,
            reason: reason.into(),
        }
    }

    pub fn unavailable(service: ServiceKind, reason: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            service,
            reason: reason.into(),
        }
    }

    pub fn is_configuration_rejected(&self) -> bool {
        matches!(self, Self::ConfigurationRejected { .. })
    }

    /// Service the error is scoped to, if any.
    pub fn service(&self) -> Option<ServiceKind> {
        match self {
            Self::ServiceUnavailable { service, .. } => Some(*service),
            _ => None,
        }
    }
}

// A required identifier missing from the environment is the same refusal as
// an empty field handed to the factory.
impl From<ConfigError> for InitializationError {
    fn from(value: ConfigError) -> Self {
        match value {
            ConfigError::MissingVar { key } => Self::rejected(key, "is not set"),
            other => Self::Environment(other),
        }
    }
}

impl From<reqwest::Error> for InitializationError {
    fn from(value: reqwest::Error) -> Self {
        Self::HttpClient(value.to_string())
    }
}

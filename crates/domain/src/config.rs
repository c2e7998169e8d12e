//! Environment-driven configuration structures shared by all binaries.

use std::{env, fmt, str::FromStr, time::Duration};

use thiserror::Error;

pub const API_KEY_VAR: &str = "FIREBASE_API_KEY";
pub const AUTH_DOMAIN_VAR: &str = "FIREBASE_AUTH_DOMAIN";
pub const PROJECT_ID_VAR: &str = "FIREBASE_PROJECT_ID";
pub const STORAGE_BUCKET_VAR: &str = "FIREBASE_STORAGE_BUCKET";
pub const MESSAGING_SENDER_ID_VAR: &str = "FIREBASE_MESSAGING_SENDER_ID";
pub const APP_ID_VAR: &str = "FIREBASE_APP_ID";

/// Identifying values required to address one backend project. The struct is
/// read-only once built; callers share it behind an `Arc` or by cloning.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceConfiguration {
    api_key: String,
    auth_domain: String,
    project_id: String,
    storage_bucket: String,
    messaging_sender_id: String,
    app_id: String,
}

impl ServiceConfiguration {
    pub fn builder() -> ServiceConfigurationBuilder {
        ServiceConfigurationBuilder::default()
    }

    /// Reads the six `FIREBASE_*` identifiers after hydrating `.env`.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        Ok(Self {
            api_key: get_required_var(API_KEY_VAR)?,
            auth_domain: get_required_var(AUTH_DOMAIN_VAR)?,
            project_id: get_required_var(PROJECT_ID_VAR)?,
            storage_bucket: get_required_var(STORAGE_BUCKET_VAR)?,
            messaging_sender_id: get_required_var(MESSAGING_SENDER_ID_VAR)?,
            app_id: get_required_var(APP_ID_VAR)?,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn auth_domain(&self) -> &str {
        &self.auth_domain
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn storage_bucket(&self) -> &str {
        &self.storage_bucket
    }

    pub fn messaging_sender_id(&self) -> &str {
        &self.messaging_sender_id
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Field name/value pairs in declaration order.
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("api_key", self.api_key.as_str()),
            ("auth_domain", self.auth_domain.as_str()),
            ("project_id", self.project_id.as_str()),
            ("storage_bucket", self.storage_bucket.as_str()),
            ("messaging_sender_id", self.messaging_sender_id.as_str()),
            ("app_id", self.app_id.as_str()),
        ]
    }
}

// The api key never reaches logs.
impl fmt::Debug for ServiceConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfiguration")
            .field("api_key", &"<redacted>")
            .field("auth_domain", &self.auth_domain)
            .field("project_id", &self.project_id)
            .field("storage_bucket", &self.storage_bucket)
            .field("messaging_sender_id", &self.messaging_sender_id)
            .field("app_id", &self.app_id)
            .finish()
    }
}

/// Assembles a configuration in code (tests, embedding). Unset fields are
/// kept empty so the client factory, not the builder, decides whether the
/// values are acceptable.
#[derive(Debug, Default, Clone)]
pub struct ServiceConfigurationBuilder {
    api_key: String,
    auth_domain: String,
    project_id: String,
    storage_bucket: String,
    messaging_sender_id: String,
    app_id: String,
}

impl ServiceConfigurationBuilder {
    pub fn api_key(mut self, value: impl Into<String>) -> Self {
        self.api_key = value.into();
        self
    }

    pub fn auth_domain(mut self, value: impl Into<String>) -> Self {
        self.auth_domain = value.into();
        self
    }

    pub fn project_id(mut self, value: impl Into<String>) -> Self {
        self.project_id = value.into();
        self
    }

    pub fn storage_bucket(mut self, value: impl Into<String>) -> Self {
        self.storage_bucket = value.into();
        self
    }

    pub fn messaging_sender_id(mut self, value: impl Into<String>) -> Self {
        self.messaging_sender_id = value.into();
        self
    }

    pub fn app_id(mut self, value: impl Into<String>) -> Self {
        self.app_id = value.into();
        self
    }

    pub fn build(self) -> ServiceConfiguration {
        ServiceConfiguration {
            api_key: self.api_key.trim().to_string(),
            auth_domain: self.auth_domain.trim().to_string(),
            project_id: self.project_id.trim().to_string(),
            storage_bucket: self.storage_bucket.trim().to_string(),
            messaging_sender_id: self.messaging_sender_id.trim().to_string(),
            app_id: self.app_id.trim().to_string(),
        }
    }
}

/// What the initializer does when one service handle cannot be produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Startup fails on the first unavailable service.
    #[default]
    Abort,
    /// Startup continues with the handles that could be produced.
    Degrade,
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "degrade" => Ok(Self::Degrade),
            other => Err(ConfigError::InvalidValue {
                key: "FIREBASE_FAILURE_POLICY",
                value: other.to_string(),
            }),
        }
    }
}

/// Knobs controlling how client handles are produced, independent of the
/// project identifiers themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    failure_policy: FailurePolicy,
    verify_services: bool,
    request_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Abort,
            verify_services: false,
            request_timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

impl ClientOptions {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Loads optional client knobs; unset variables fall back to defaults.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        let failure_policy = match get_optional_var("FIREBASE_FAILURE_POLICY") {
            Some(value) => value.parse()?,
            None => FailurePolicy::default(),
        };
        let verify_services = match get_optional_var("FIREBASE_VERIFY_SERVICES") {
            Some(value) => parse_bool("FIREBASE_VERIFY_SERVICES", &value)?,
            None => false,
        };
        let request_timeout = match get_optional_var("FIREBASE_REQUEST_TIMEOUT_SECS") {
            Some(value) => {
                let secs: u64 = value.parse().map_err(|source| ConfigError::InvalidNumber {
                    key: "FIREBASE_REQUEST_TIMEOUT_SECS",
                    source,
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "FIREBASE_REQUEST_TIMEOUT_SECS",
                        value,
                    });
                }
                Duration::from_secs(secs)
            }
            None => Self::DEFAULT_TIMEOUT,
        };

        Ok(Self {
            failure_policy,
            verify_services,
            request_timeout,
        })
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_verify_services(mut self, verify: bool) -> Self {
        self.verify_services = verify;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    pub fn verify_services(&self) -> bool {
        self.verify_services
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

/// API-specific configuration so the HTTP surface does not depend on values
/// only the client initializer reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    api_bind_address: String,
}

impl ApiConfig {
    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        Ok(Self {
            api_bind_address: get_required_var("API_BIND_ADDRESS")?,
        })
    }

    pub fn api_bind_address(&self) -> &str {
        &self.api_bind_address
    }
}

fn get_required_var(key: &'static str) -> Result<String, ConfigError> {
    get_optional_var(key).ok_or(ConfigError::MissingVar { key })
}

fn get_optional_var(key: &'static str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

pub fn hydrate_env_file() -> Result<(), ConfigError> {
    if env::var_os("AUTOLOGIST_SKIP_DOTENV").is_some() {
        return Ok(());
    }
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(ConfigError::Dotenv { source: err }),
    }

    Ok(())
}

/// Errors emitted when `.env` hydration or environment parsing fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable `{key}`")]
    MissingVar { key: &'static str },
    #[error("invalid integer in `{key}`: {source}")]
    InvalidNumber {
        key: &'static str,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("invalid value `{value}` for `{key}`")]
    InvalidValue { key: &'static str, value: String },
    #[error("failed to load .env file: {source}")]
    Dotenv {
        #[from]
        source: dotenvy::Error,
    },
}

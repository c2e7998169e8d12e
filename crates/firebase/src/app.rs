use std::sync::Arc;

use autologist_domain::ServiceConfiguration;

/// Name given to the application handle when callers do not pick one.
pub const DEFAULT_APP_NAME: &str = "[DEFAULT]";

pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
pub const IDENTITY_TOOLKIT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const STORAGE_BASE_URL: &str = "https://firebasestorage.googleapis.com/v0";

/// Base URLs of the three REST surfaces. Overridable so emulators and tests
/// can stand in for the hosted products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    firestore: String,
    identity_toolkit: String,
    storage: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            firestore: FIRESTORE_BASE_URL.to_string(),
            identity_toolkit: IDENTITY_TOOLKIT_BASE_URL.to_string(),
            storage: STORAGE_BASE_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Points every service at one base URL, e.g. a local test server.
    pub fn uniform(base: impl Into<String>) -> Self {
        let base = trim_slash(base.into());
        Self {
            firestore: base.clone(),
            identity_toolkit: base.clone(),
            storage: base,
        }
    }

    pub fn with_firestore(mut self, url: impl Into<String>) -> Self {
        self.firestore = trim_slash(url.into());
        self
    }

    pub fn with_identity_toolkit(mut self, url: impl Into<String>) -> Self {
        self.identity_toolkit = trim_slash(url.into());
        self
    }

    pub fn with_storage(mut self, url: impl Into<String>) -> Self {
        self.storage = trim_slash(url.into());
        self
    }

    pub fn firestore(&self) -> &str {
        &self.firestore
    }

    pub fn identity_toolkit(&self) -> &str {
        &self.identity_toolkit
    }

    pub fn storage(&self) -> &str {
        &self.storage
    }
}

fn trim_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

/// Initialized connection context every service handle is derived from.
/// Clones share one inner allocation, so identity survives cloning.
#[derive(Debug, Clone)]
pub struct ApplicationHandle {
    inner: Arc<AppInner>,
}

#[derive(Debug)]
struct AppInner {
    name: String,
    config: ServiceConfiguration,
    endpoints: Endpoints,
    http: reqwest::Client,
}

impl ApplicationHandle {
    pub fn new(
        name: impl Into<String>,
        config: ServiceConfiguration,
        endpoints: Endpoints,
        http: reqwest::Client,
    ) -> Self {
        Self {
            inner: Arc::new(AppInner {
                name: name.into(),
                config,
                endpoints,
                http,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn config(&self) -> &ServiceConfiguration {
        &self.inner.config
    }

    pub fn project_id(&self) -> &str {
        self.inner.config.project_id()
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.inner.endpoints
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// True when both handles came from the same initialization.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

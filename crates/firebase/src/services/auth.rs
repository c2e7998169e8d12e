use autologist_domain::ServiceKind;
use serde_json::json;

use crate::{app::ApplicationHandle, probe::ServiceProbe};

/// Handle to Firebase Authentication (Identity Toolkit REST surface).
#[derive(Debug, Clone)]
pub struct AuthClient {
    app: ApplicationHandle,
}

impl AuthClient {
    pub fn new(app: ApplicationHandle) -> Self {
        Self { app }
    }

    pub fn app(&self) -> &ApplicationHandle {
        &self.app
    }

    /// Domain hosted sign-in flows redirect through.
    pub fn auth_domain(&self) -> &str {
        self.app.config().auth_domain()
    }

    /// URL of an `accounts:*` method, e.g. `accounts_url("signUp")`.
    pub fn accounts_url(&self, method: &str) -> String {
        format!(
            "{}/accounts:{}",
            self.app.endpoints().identity_toolkit(),
            method
        )
    }

    pub fn continue_uri(&self) -> String {
        format!("https://{}/__/auth/handler", self.auth_domain())
    }
}

impl ServiceProbe for AuthClient {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Auth
    }

    // createAuthUri is unauthenticated and side-effect free.
    fn probe_request(&self) -> reqwest::RequestBuilder {
        self.app
            .http()
            .post(self.accounts_url("createAuthUri"))
            .query(&[("key", self.app.config().api_key())])
            .json(&json!({
                "identifier": "probe@autologist.invalid",
                "continueUri": self.continue_uri(),
            }))
    }
}

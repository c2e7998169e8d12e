//! Lightweight reachability checks for the service handles.

use async_trait::async_trait;
use autologist_domain::ServiceKind;
use metrics::counter;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::InitializationError;

// Markers Google APIs put in 4xx error bodies when a product is switched off,
// was never provisioned for the project, or the api key is refused.
const UNAVAILABLE_MARKERS: [&str; 6] = [
    "SERVICE_DISABLED",
    "has not been used",
    "is disabled",
    "CONFIGURATION_NOT_FOUND",
    "API_KEY_INVALID",
    "API key not valid",
];

/// Observed state of one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ServiceStatus {
    Connected,
    Unavailable(String),
    /// No handle exists because initialization degraded past this service.
    Disabled(String),
}

impl ServiceStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Unavailable(_) => "unavailable",
            Self::Disabled(_) => "disabled",
        }
    }

    /// Converts a failed status into the error the failure policy surfaces.
    pub fn into_error(self, service: ServiceKind) -> Option<InitializationError> {
        match self {
            Self::Connected => None,
            Self::Unavailable(reason) | Self::Disabled(reason) => {
                Some(InitializationError::unavailable(service, reason))
            }
        }
    }
}

/// Maps a probe response onto a status. Access-control refusals still prove
/// the product is provisioned; missing resources, disabled APIs and rejected
/// api keys do not. Bodies are only inspected for 400/401/403 answers, since
/// a successful listing may carry arbitrary user content.
pub fn classify_response(status: u16, body: &str) -> ServiceStatus {
    match status {
        200..=299 => ServiceStatus::Connected,
        400 | 401 | 403 => match UNAVAILABLE_MARKERS
            .iter()
            .find(|marker| body.contains(**marker))
        {
            Some(marker) => ServiceStatus::Unavailable(format!("http {status}: {marker}")),
            None => ServiceStatus::Connected,
        },
        404 => ServiceStatus::Unavailable("http 404: resource not found".to_string()),
        other => ServiceStatus::Unavailable(format!("http {other}")),
    }
}

/// Seam implemented by every service handle so callers can check it without
/// knowing which REST surface backs it.
#[async_trait]
pub trait ServiceProbe: Send + Sync {
    fn kind(&self) -> ServiceKind;

    fn probe_request(&self) -> reqwest::RequestBuilder;

    async fn probe(&self) -> ServiceStatus {
        let kind = self.kind();
        let status = match self.probe_request().send().await {
            Ok(response) => {
                let code = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                classify_response(code, &body)
            }
            Err(err) => ServiceStatus::Unavailable(format!("transport error: {err}")),
        };

        counter!("firebase_probe_total", "service" => kind.to_string(), "result" => status.tag())
            .increment(1);
        if status.is_connected() {
            debug!(service = %kind, "probe succeeded");
        } else {
            warn!(service = %kind, ?status, "probe failed");
        }
        status
    }
}

use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use autologist_domain::ServiceKind;
use autologist_firebase::{HealthReport, ServiceStatus};
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use strum_macros::AsRefStr;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OverallStatus {
    Ok,
    Degraded,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&ServiceStatus> for ServiceHealth {
    fn from(status: &ServiceStatus) -> Self {
        let reason = match status {
            ServiceStatus::Connected => None,
            ServiceStatus::Unavailable(reason) | ServiceStatus::Disabled(reason) => {
                Some(reason.clone())
            }
        };
        Self {
            status: status.tag().to_string(),
            reason,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: OverallStatus,
    pub project_id: String,
    pub checked_at: DateTime<Utc>,
    pub services: BTreeMap<ServiceKind, ServiceHealth>,
}

impl HealthResponse {
    pub fn from_report(report: &HealthReport, checked_at: DateTime<Utc>) -> Self {
        let status = if report.is_healthy() {
            OverallStatus::Ok
        } else {
            OverallStatus::Degraded
        };
        Self {
            status,
            project_id: report.project_id.clone(),
            checked_at,
            services: report
                .services
                .iter()
                .map(|(kind, status)| (*kind, ServiceHealth::from(status)))
                .collect(),
        }
    }
}

pub async fn health_handler(state: web::Data<AppState>) -> HttpResponse {
    let report = state.clients().probe().await;
    let body = HealthResponse::from_report(&report, Utc::now());
    let status_tag = body.status.as_ref().to_owned();
    counter!("api_health_requests_total", "status" => status_tag).increment(1);

    match body.status {
        OverallStatus::Ok => HttpResponse::Ok().json(body),
        OverallStatus::Degraded => HttpResponse::ServiceUnavailable().json(body),
    }
}

use std::sync::Arc;

use autologist_domain::services::telemetry::TelemetryGuard;
use autologist_firebase::BackendClients;

#[derive(Clone)]
pub struct AppState {
    clients: Arc<BackendClients>,
    telemetry: TelemetryGuard,
}

impl AppState {
    pub fn new(clients: Arc<BackendClients>, telemetry: TelemetryGuard) -> Self {
        Self { clients, telemetry }
    }

    pub fn clients(&self) -> &BackendClients {
        self.clients.as_ref()
    }

    pub fn telemetry(&self) -> &TelemetryGuard {
        &self.telemetry
    }
}

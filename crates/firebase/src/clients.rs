use std::collections::BTreeMap;

use autologist_domain::{FailurePolicy, ServiceConfiguration, ServiceKind};
use metrics::counter;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    app::ApplicationHandle,
    error::InitializationError,
    factory::BackendFactory,
    probe::{ServiceProbe, ServiceStatus},
    services::{AuthClient, DatabaseClient, StorageClient},
};

/// The application handle plus the three service handles derived from it.
///
/// Under [`FailurePolicy::Abort`] every service accessor returns `Some`.
/// Under [`FailurePolicy::Degrade`] a service whose handle could not be
/// produced returns `None` and its error stays available via [`failure`].
///
/// [`failure`]: BackendClients::failure
#[derive(Debug)]
pub struct BackendClients {
    app: ApplicationHandle,
    database: Result<DatabaseClient, InitializationError>,
    auth: Result<AuthClient, InitializationError>,
    storage: Result<StorageClient, InitializationError>,
    policy: FailurePolicy,
}

impl BackendClients {
    /// Runs the one-shot initialization: the configuration goes to the
    /// factory first, and service handles are only requested once the
    /// application handle exists. Every service is requested even when an
    /// earlier one fails; the policy then decides what is returned.
    pub fn initialize<F>(
        factory: &F,
        config: ServiceConfiguration,
        policy: FailurePolicy,
    ) -> Result<Self, InitializationError>
    where
        F: BackendFactory + ?Sized,
    {
        let project_id = config.project_id().to_string();
        let app = factory.initialize_app(config).inspect_err(|err| {
            counter!("firebase_service_init_total", "service" => "app", "result" => "rejected")
                .increment(1);
            warn!(project_id = %project_id, error = %err, "application handle rejected");
        })?;

        let database = record(ServiceKind::Database, factory.database(&app));
        let auth = record(ServiceKind::Auth, factory.auth(&app));
        let storage = record(ServiceKind::Storage, factory.storage(&app));

        let clients = Self {
            app,
            database,
            auth,
            storage,
            policy,
        };

        if policy == FailurePolicy::Abort {
            if let Some(kind) = clients.first_failed() {
                return Err(clients.take_failure(kind));
            }
        }

        info!(
            project_id = %project_id,
            app = clients.app.name(),
            degraded = clients.first_failed().is_some(),
            "backend clients initialized"
        );
        Ok(clients)
    }

    pub fn app(&self) -> &ApplicationHandle {
        &self.app
    }

    pub fn database(&self) -> Option<&DatabaseClient> {
        self.database.as_ref().ok()
    }

    pub fn auth(&self) -> Option<&AuthClient> {
        self.auth.as_ref().ok()
    }

    pub fn storage(&self) -> Option<&StorageClient> {
        self.storage.as_ref().ok()
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn failure(&self, kind: ServiceKind) -> Option<&InitializationError> {
        match kind {
            ServiceKind::Database => self.database.as_ref().err(),
            ServiceKind::Auth => self.auth.as_ref().err(),
            ServiceKind::Storage => self.storage.as_ref().err(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.first_failed().is_none()
    }

    fn first_failed(&self) -> Option<ServiceKind> {
        ServiceKind::ALL
            .into_iter()
            .find(|kind| self.failure(*kind).is_some())
    }

    fn take_failure(self, kind: ServiceKind) -> InitializationError {
        let failed = match kind {
            ServiceKind::Database => self.database.err(),
            ServiceKind::Auth => self.auth.err(),
            ServiceKind::Storage => self.storage.err(),
        };
        failed.unwrap_or_else(|| InitializationError::unavailable(kind, "unknown failure"))
    }

    fn probe_target(&self, kind: ServiceKind) -> Option<&dyn ServiceProbe> {
        match kind {
            ServiceKind::Database => self.database().map(|c| c as &dyn ServiceProbe),
            ServiceKind::Auth => self.auth().map(|c| c as &dyn ServiceProbe),
            ServiceKind::Storage => self.storage().map(|c| c as &dyn ServiceProbe),
        }
    }

    /// Checks every present handle concurrently; absent handles report
    /// `Disabled` with the initialization error that removed them.
    pub async fn probe(&self) -> HealthReport {
        let (database, auth, storage) = tokio::join!(
            self.status_of(ServiceKind::Database),
            self.status_of(ServiceKind::Auth),
            self.status_of(ServiceKind::Storage),
        );

        HealthReport {
            project_id: self.app.project_id().to_string(),
            services: BTreeMap::from([
                (ServiceKind::Database, database),
                (ServiceKind::Auth, auth),
                (ServiceKind::Storage, storage),
            ]),
        }
    }

    async fn status_of(&self, kind: ServiceKind) -> ServiceStatus {
        match self.probe_target(kind) {
            Some(target) => target.probe().await,
            None => ServiceStatus::Disabled(
                self.failure(kind)
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            ),
        }
    }

    /// Applies the failure policy to a probe outcome. `Abort` turns the first
    /// unreachable service into an error; `Degrade` accepts the report.
    pub fn enforce(&self, report: &HealthReport) -> Result<(), InitializationError> {
        if self.policy == FailurePolicy::Degrade {
            return Ok(());
        }
        match report.first_unhealthy() {
            Some((kind, status)) => match status.clone().into_error(kind) {
                Some(err) => Err(err),
                None => Ok(()),
            },
            None => Ok(()),
        }
    }
}

fn record<T>(
    kind: ServiceKind,
    result: Result<T, InitializationError>,
) -> Result<T, InitializationError> {
    match &result {
        Ok(_) => {
            counter!("firebase_service_init_total", "service" => kind.to_string(), "result" => "ok")
                .increment(1);
        }
        Err(err) => {
            counter!("firebase_service_init_total", "service" => kind.to_string(), "result" => "error")
                .increment(1);
            warn!(service = %kind, product = kind.product_name(), error = %err, "service handle unavailable");
        }
    }
    result
}

/// Per-service outcome of [`BackendClients::probe`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub project_id: String,
    pub services: BTreeMap<ServiceKind, ServiceStatus>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.services.values().all(ServiceStatus::is_connected)
    }

    pub fn status(&self, kind: ServiceKind) -> Option<&ServiceStatus> {
        self.services.get(&kind)
    }

    pub fn first_unhealthy(&self) -> Option<(ServiceKind, &ServiceStatus)> {
        self.services
            .iter()
            .find(|(_, status)| !status.is_connected())
            .map(|(kind, status)| (*kind, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_config, StubFactory};
    use std::{
        sync::atomic::Ordering,
        time::{Duration, Instant},
    };

    #[test]
    fn all_handles_present_after_success() {
        let factory = StubFactory::default();
        let clients = BackendClients::initialize(&factory, sample_config(), FailurePolicy::Abort)
            .expect("clients initialize");

        assert!(clients.is_complete());
        assert!(clients.database().is_some());
        assert!(clients.auth().is_some());
        assert!(clients.storage().is_some());
        assert!(clients.database().unwrap().app().ptr_eq(clients.app()));
    }

    #[test]
    fn empty_api_key_is_rejected_before_service_requests() {
        let factory = StubFactory::default();
        let config = ServiceConfiguration::builder()
            .auth_domain("autologist-65cd7.firebaseapp.com")
            .project_id("autologist-65cd7")
            .storage_bucket("autologist-65cd7.firebasestorage.app")
            .messaging_sender_id("742606479823")
            .app_id("1:742606479823:web:a08c9f03f4b6838b8f72ba")
            .build();

        let err = BackendClients::initialize(&factory, config, FailurePolicy::Degrade).unwrap_err();
        assert!(matches!(
            err,
            InitializationError::ConfigurationRejected {
                field: "api_key",
                ..
            }
        ));
        assert_eq!(factory.service_requests.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn abort_policy_surfaces_disabled_service() {
        let factory = StubFactory::disabling(ServiceKind::Storage);
        let err = BackendClients::initialize(&factory, sample_config(), FailurePolicy::Abort)
            .unwrap_err();

        assert_eq!(err.service(), Some(ServiceKind::Storage));
        assert_eq!(factory.service_requests.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn degrade_policy_keeps_other_handles() {
        let factory = StubFactory::disabling(ServiceKind::Auth);
        let clients = BackendClients::initialize(&factory, sample_config(), FailurePolicy::Degrade)
            .expect("degraded clients initialize");

        assert!(!clients.is_complete());
        assert!(clients.auth().is_none());
        assert!(clients.database().is_some());
        assert!(clients.storage().is_some());
        assert_eq!(
            clients.failure(ServiceKind::Auth).and_then(|e| e.service()),
            Some(ServiceKind::Auth)
        );
    }

    #[tokio::test]
    async fn health_check_reports_missing_handle_as_disabled() {
        let factory = StubFactory::disabling(ServiceKind::Database)
            .with_endpoint_base("http://127.0.0.1:9");
        let clients = BackendClients::initialize(&factory, sample_config(), FailurePolicy::Degrade)
            .unwrap();

        let report = clients.probe().await;
        assert_eq!(
            report.status(ServiceKind::Database).map(ServiceStatus::tag),
            Some("disabled")
        );
        assert!(!report.is_healthy());
        assert!(clients.enforce(&report).is_ok());
    }

    #[tokio::test]
    async fn services_are_checked_concurrently() {
        // Accepts connections into the backlog but never answers, so every
        // request runs into the 2s client timeout.
        let silent = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", silent.local_addr().unwrap());
        let factory = StubFactory::default().with_endpoint_base(&base);
        let clients =
            BackendClients::initialize(&factory, sample_config(), FailurePolicy::Abort).unwrap();

        let started = Instant::now();
        let report = clients.probe().await;
        let elapsed = started.elapsed();

        assert!(report
            .services
            .values()
            .all(|status| status.tag() == "unavailable"));
        assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
        drop(silent);
    }

    #[test]
    fn enforce_aborts_on_first_unhealthy_service() {
        let factory = StubFactory::default();
        let clients =
            BackendClients::initialize(&factory, sample_config(), FailurePolicy::Abort).unwrap();
        let report = HealthReport {
            project_id: "autologist-65cd7".into(),
            services: BTreeMap::from([
                (ServiceKind::Database, ServiceStatus::Connected),
                (ServiceKind::Auth, ServiceStatus::Unavailable("http 404".into())),
                (ServiceKind::Storage, ServiceStatus::Connected),
            ]),
        };

        let err = clients.enforce(&report).unwrap_err();
        assert_eq!(err.service(), Some(ServiceKind::Auth));
    }

    #[test]
    fn health_report_serializes_status_tags() {
        let report = HealthReport {
            project_id: "autologist-65cd7".into(),
            services: BTreeMap::from([
                (ServiceKind::Database, ServiceStatus::Connected),
                (ServiceKind::Storage, ServiceStatus::Unavailable("http 503".into())),
            ]),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["services"]["database"]["status"], "connected");
        assert_eq!(json["services"]["storage"]["reason"], "http 503");
    }
}

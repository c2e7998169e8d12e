//! Process-wide handle set for callers that cannot have it injected.

use std::sync::Arc;

use autologist_domain::{ClientOptions, ServiceConfiguration};
use once_cell::sync::OnceCell;

use crate::{
    clients::BackendClients, error::InitializationError, factory::RestBackendFactory,
};

static SHARED: OnceCell<Arc<BackendClients>> = OnceCell::new();

/// Returns the shared clients, initializing them from the environment on the
/// first call. Every later call yields the same instance; a failed first call
/// leaves the cell empty so the error reaches the caller unchanged.
pub fn shared() -> Result<Arc<BackendClients>, InitializationError> {
    SHARED
        .get_or_try_init(|| {
            let config = ServiceConfiguration::load_from_env()?;
            let options = ClientOptions::load_from_env()?;
            let policy = options.failure_policy();
            let factory = RestBackendFactory::new(options);
            BackendClients::initialize(&factory, config, policy).map(Arc::new)
        })
        .cloned()
}

/// Installs an explicitly constructed set as the shared instance. Returns the
/// instance that ends up shared, which is the earlier one if already set.
pub fn install_shared(clients: BackendClients) -> Arc<BackendClients> {
    let clients = Arc::new(clients);
    match SHARED.try_insert(clients.clone()) {
        Ok(installed) => installed.clone(),
        Err((existing, _)) => existing.clone(),
    }
}

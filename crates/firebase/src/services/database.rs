use autologist_domain::ServiceKind;

use crate::{app::ApplicationHandle, probe::ServiceProbe};

// Collection the reachability probe reads from; it does not need to exist.
const PROBE_COLLECTION: &str = "_health";

/// Handle to the project's default Firestore database.
#[derive(Debug, Clone)]
pub struct DatabaseClient {
    app: ApplicationHandle,
    documents_url: String,
}

impl DatabaseClient {
    pub fn new(app: ApplicationHandle) -> Self {
        let documents_url = format!(
            "{}/projects/{}/databases/(default)/documents",
            app.endpoints().firestore(),
            app.project_id()
        );
        Self { app, documents_url }
    }

    pub fn app(&self) -> &ApplicationHandle {
        &self.app
    }

    /// Root of the document tree, e.g. `.../databases/(default)/documents`.
    pub fn documents_url(&self) -> &str {
        &self.documents_url
    }

    pub fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_url, collection.trim_matches('/'))
    }

    pub fn document_url(&self, collection: &str, document_id: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(collection),
            document_id.trim_matches('/')
        )
    }
}

impl ServiceProbe for DatabaseClient {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Database
    }

    fn probe_request(&self) -> reqwest::RequestBuilder {
        self.app
            .http()
            .get(self.collection_url(PROBE_COLLECTION))
            .query(&[("pageSize", "1"), ("key", self.app.config().api_key())])
    }
}

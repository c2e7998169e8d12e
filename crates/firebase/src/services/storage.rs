use autologist_domain::ServiceKind;

use crate::{app::ApplicationHandle, probe::ServiceProbe};

/// Handle to the project's default Cloud Storage bucket.
#[derive(Debug, Clone)]
pub struct StorageClient {
    app: ApplicationHandle,
    bucket_url: String,
}

impl StorageClient {
    pub fn new(app: ApplicationHandle) -> Self {
        let bucket_url = format!(
            "{}/b/{}",
            app.endpoints().storage(),
            app.config().storage_bucket()
        );
        Self { app, bucket_url }
    }

    pub fn app(&self) -> &ApplicationHandle {
        &self.app
    }

    pub fn bucket(&self) -> &str {
        self.app.config().storage_bucket()
    }

    pub fn bucket_url(&self) -> &str {
        &self.bucket_url
    }

    /// Object names travel as a single path segment, so `/` is escaped too.
    pub fn object_url(&self, object_name: &str) -> String {
        format!("{}/o/{}", self.bucket_url, urlencoding::encode(object_name))
    }
}

impl ServiceProbe for StorageClient {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Storage
    }

    fn probe_request(&self) -> reqwest::RequestBuilder {
        self.app
            .http()
            .get(format!("{}/o", self.bucket_url))
            .query(&[("maxResults", "1")])
    }
}

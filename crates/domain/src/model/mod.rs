//! Identifiers shared by the client crate and the HTTP surface.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumIter};

/// One backend product addressed through the application handle.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ServiceKind {
    Database,
    Auth,
    Storage,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 3] = [Self::Database, Self::Auth, Self::Storage];

    /// Product name used in log lines and error messages.
    pub fn product_name(self) -> &'static str {
        match self {
            Self::Database => "Cloud Firestore",
            Self::Auth => "Firebase Authentication",
            Self::Storage => "Cloud Storage for Firebase",
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

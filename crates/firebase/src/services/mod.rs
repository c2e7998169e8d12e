//! Service handles derived from an [`ApplicationHandle`](crate::ApplicationHandle).

pub mod auth;
pub mod database;
pub mod storage;

pub use auth::AuthClient;
pub use database::DatabaseClient;
pub use storage::StorageClient;

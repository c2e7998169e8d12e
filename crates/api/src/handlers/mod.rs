pub mod health;
pub mod metrics;

pub use health::health_handler;
pub use metrics::metrics_handler;

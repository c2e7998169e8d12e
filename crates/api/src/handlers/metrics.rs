use actix_web::{web::Data, HttpResponse};

use crate::state::AppState;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Prometheus scrape endpoint, including the client init and probe counters.
pub async fn metrics_handler(state: Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(PROMETHEUS_CONTENT_TYPE)
        .body(state.telemetry().render_metrics())
}

use crate::error::ServerError;
use axum::{
    extract::State,
    http::header,
    response::{
        Html,
        IntoResponse,
        Response,
    },
    routing::get,
    Router,
};
use volume_exporter_collector::MetricsRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: MetricsRegistry,
    pub metrics_path: String,
}

pub fn create_router(registry: MetricsRegistry, metrics_path: &str) -> Router {
    let state = AppState {
        registry,
        metrics_path: metrics_path.to_string(),
    };

    Router::new()
        .route("/healthz", get(healthz))
        .route("/", get(landing_page))
        .route(metrics_path, get(metrics))
        .with_state(state)
}

async fn healthz(State(state): State<AppState>) -> String {
    format!("ok, {} volume(s) registered", state.registry.len())
}

async fn landing_page(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\
<head><title>Volume Stats Exporter</title></head>\
<body><h1>Volume Stats Exporter</h1><p><a href=\"{path}\">Metrics</a></p></body>\
</html>",
        path = state.metrics_path
    ))
}

/// Scrapes every registered volume. The collectors fetch with a blocking client, so gathering
/// runs on the blocking pool.
async fn metrics(State(state): State<AppState>) -> Result<Response, ServerError> {
    let registry = state.registry.clone();
    let text = tokio::task::spawn_blocking(move || registry.render()).await??;
    debug!(bytes = text.len(), "Served metrics");
    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], text).into_response())
}

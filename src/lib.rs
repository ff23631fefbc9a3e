pub mod config;
pub mod error;
pub mod state;
pub mod form;
pub mod page;
pub mod providers;
pub mod rate_limit;
pub mod relay;
pub mod routes;
pub mod submission;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::RelayError;
use crate::rate_limit::SubmissionRateLimiter;
use crate::relay::FormRelay;
use crate::state::{AppState, SharedState};

pub use relay::SubmissionOutcome;

pub fn build_app(config: Config) -> Result<(Router, SharedState), RelayError> {
    let relay = FormRelay::new(config.forms.clone(), config.request_timeout)?;
    tracing::info!("Relaying form submissions via {}", config.forms.provider_tag());

    let cors = cors_layer(&config.cors_origins);
    let max_body_size = config.max_body_size;

    let state: SharedState = Arc::new(AppState {
        submission_limiter: SubmissionRateLimiter::from_config(&config),
        config,
        relay,
    });

    let app = Router::new()
        .merge(routes::ingest_routes())
        .route("/health", axum::routing::get(health))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(cors),
        )
        .with_state(state.clone());

    Ok((app, state))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Ignoring invalid CORS origin '{o}': {e}");
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn health() -> &'static str {
    "ok"
}

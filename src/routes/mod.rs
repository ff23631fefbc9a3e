pub mod ingest;

use axum::routing::post;
use axum::Router;

use crate::state::SharedState;

pub fn ingest_routes() -> Router<SharedState> {
    Router::new()
        .route("/v1/forms", post(ingest::submit_general))
        .route("/v1/forms/{form_type}", post(ingest::submit_typed))
}

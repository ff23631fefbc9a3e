use std::net::{IpAddr, SocketAddr};

use axum::body::Bytes;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::SharedState;
use crate::submission::normalize::DEFAULT_FORM_TYPE;
use crate::submission::{honeypot, metadata, normalize, parser, IncomingForm};

/// `POST /v1/forms/{form_type}`
pub async fn submit_typed(
    State(state): State<SharedState>,
    Path(form_type): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    relay(&state, Some(form_type), addr.ip(), &headers, body).await
}

/// `POST /v1/forms`, relayed as the general form.
pub async fn submit_general(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    relay(&state, None, addr.ip(), &headers, body).await
}

async fn relay(
    state: &SharedState,
    marker: Option<String>,
    peer_ip: IpAddr,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let config = &state.config;
    let meta = metadata::extract(headers, Some(peer_ip), &config.trusted_proxies);
    let form_type = marker
        .clone()
        .unwrap_or_else(|| DEFAULT_FORM_TYPE.to_string());

    state
        .submission_limiter
        .admit(meta.ip, &form_type)
        .map_err(|retry_after| {
            let secs = retry_after.as_secs().max(1);
            AppError::RateLimited(format!("Rate limited. Retry after {secs}s"))
        })?;

    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok());

    let fields = if content_type.is_some_and(|ct| ct.contains("multipart/form-data")) {
        parser::parse_multipart(headers, body).await
    } else {
        parser::parse_body(content_type, &body)
    }
    .map_err(AppError::BadRequest)?;

    let honeypot_field = config.honeypot_field.as_deref();
    if honeypot::is_spam(&fields, honeypot_field) {
        tracing::info!("Dropped {form_type} submission from {} (honeypot)", meta.ip);
        // Silent 200 for spam
        return Ok((StatusCode::OK, Json(json!({ "status": "ok" }))));
    }

    let mut form = IncomingForm::new(marker, fields);
    if let Some(field) = honeypot_field {
        form = form.without_field(field);
    }

    let location = meta.referer_path.as_deref().unwrap_or_default();
    let payload = normalize(&form, location);
    tracing::debug!(
        "Relaying {form_type} submission from {} ({})",
        meta.ip,
        meta.user_agent
    );

    state.relay.dispatch(&payload).await?;

    Ok((StatusCode::OK, Json(json!({ "status": "sent" }))))
}

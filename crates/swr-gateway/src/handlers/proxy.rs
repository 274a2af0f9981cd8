//! Fallback handler: every non-admin request goes through the worker.

use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use swr_core::{Method, ResponseSource};
use swr_router::FetchDecision;
use tracing::{debug, warn};

use crate::fetcher::is_hop_by_hop;
use crate::state::AppState;

/// Largest request body buffered before forwarding.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Response header naming where the body came from.
pub const SOURCE_HEADER: &str = "x-swr-source";

pub async fn proxy(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let Ok(method) = parts.method.as_str().parse::<Method>() else {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    };

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = state.upstream_url(path_and_query);
    if url.origin() != state.upstream.origin() {
        debug!(path = path_and_query, "Rejecting path that leaves the upstream origin");
        return StatusCode::BAD_REQUEST.into_response();
    }

    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(_) => return StatusCode::PAYLOAD_TOO_LARGE.into_response(),
    };

    let mut outbound = swr_core::Request::new(method, url).with_body(body.to_vec());
    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            outbound = outbound.with_header(name.as_str(), value);
        }
    }

    let response = match state.worker.handle_fetch(&outbound).await {
        FetchDecision::Respond(response) => response,
        FetchDecision::Passthrough => {
            match state.worker.router().fetcher().fetch(&outbound).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(url = %outbound.url, error = %e, "Upstream unreachable");
                    return StatusCode::BAD_GATEWAY.into_response();
                }
            }
        }
    };

    into_http_response(response)
}

fn source_label(source: ResponseSource) -> &'static str {
    match source {
        ResponseSource::Network => "network",
        ResponseSource::Cache => "cache",
        ResponseSource::Synthetic => "synthetic",
    }
}

fn into_http_response(response: swr_core::Response) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);

    let mut headers = HeaderMap::new();
    for (name, value) in &response.headers {
        if is_hop_by_hop(name) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }
    headers.insert(
        SOURCE_HEADER,
        HeaderValue::from_static(source_label(response.source)),
    );

    (status, headers, Body::from(response.body)).into_response()
}

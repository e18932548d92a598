//! The capture middleware itself

use crate::capture::context::RequestContext;
use crate::capture::record::ExchangeRecord;
use crate::store::ExchangeStore;
use axum::body::{to_bytes, Body};
use axum::extract::{ConnectInfo, RawPathParams, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Local;
use serde_json::Value;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Records one exchange per request passing through it.
///
/// The request body is buffered and restored before the handler runs; the
/// response body is buffered and restored after. Both streams reach their
/// peers byte-identical to what was sent.
pub async fn capture_exchange(
    State(store): State<Arc<ExchangeStore>>,
    path_params: RawPathParams,
    request: Request,
    next: Next,
) -> Response {
    let mut ctx = RequestContext::begin();

    let method = request.method().as_str().to_uppercase();
    let endpoint = request.uri().path().to_string();
    let query_params = parse_query(request.uri().query());
    let request_headers = collect_headers(request.headers());
    let path_variables: BTreeMap<String, String> = path_params
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    // GET carries no body, so the captured "body" is the query map as a
    // JSON string.
    let request = if method == "GET" {
        if let Ok(json) = serde_json::to_string(&query_params) {
            ctx.set_request_body(Value::String(json));
        }
        request
    } else {
        buffer_request_body(request, &mut ctx).await
    };

    let response = next.run(request).await;

    let (response, response_body, status_code) = buffer_response_body(response).await;

    let record = ExchangeRecord {
        id: Uuid::new_v4(),
        endpoint,
        method,
        request_body: ctx.request_body().cloned(),
        request_headers,
        query_params,
        path_variables,
        response_body,
        status_code,
        timestamp: Local::now().naive_local(),
        execution_time: ctx.elapsed_millis(),
        client_ip,
    };

    store.save(&record);
    ctx.clear();

    response
}

/// Buffers the request body into the context and rebuilds the request with
/// the identical bytes. Size is already bounded by the router's body limit;
/// a body that cannot be read leaves the context empty and the request
/// proceeds with an empty body (nothing else remains of the stream).
async fn buffer_request_body(request: Request, ctx: &mut RequestContext) -> Request {
    let (parts, body) = request.into_parts();
    match to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            if !bytes.is_empty() {
                match serde_json::from_slice::<Value>(&bytes) {
                    Ok(value) => ctx.set_request_body(value),
                    Err(_) => {
                        ctx.set_request_body(Value::String(
                            String::from_utf8_lossy(&bytes).into_owned(),
                        ));
                    }
                }
            }
            Request::from_parts(parts, Body::from(bytes))
        }
        Err(err) => {
            warn!(error = %err, "Failed to buffer request body for capture");
            Request::from_parts(parts, Body::empty())
        }
    }
}

/// Buffers the response body, parses it as JSON when possible, and rebuilds
/// the response with the identical bytes. An empty body captures as `""`.
async fn buffer_response_body(response: Response) -> (Response, Option<Value>, u16) {
    let status_code = response.status().as_u16();
    let (parts, body) = response.into_parts();

    match to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            let captured = if bytes.is_empty() {
                Some(Value::String(String::new()))
            } else {
                match serde_json::from_slice::<Value>(&bytes) {
                    Ok(value) => Some(value),
                    Err(_) => Some(Value::String(
                        String::from_utf8_lossy(&bytes).into_owned(),
                    )),
                }
            };
            (
                Response::from_parts(parts, Body::from(bytes)),
                captured,
                status_code,
            )
        }
        Err(err) => {
            debug!(error = %err, "Failed to buffer response body for capture");
            (
                Response::from_parts(parts, Body::empty()),
                Some(Value::String(String::new())),
                status_code,
            )
        }
    }
}

/// First value per header name; keys iterate in sorted order.
fn collect_headers(headers: &axum::http::HeaderMap) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (name, value) in headers {
        out.entry(name.as_str().to_string())
            .or_insert_with(|| String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    out
}

/// First value per query parameter name.
fn parse_query(query: Option<&str>) -> BTreeMap<String, String> {
    let Some(query) = query else {
        return BTreeMap::new();
    };
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(query).unwrap_or_default();
    let mut out = BTreeMap::new();
    for (name, value) in pairs {
        out.entry(name).or_insert(value);
    }
    out
}

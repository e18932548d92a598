//! Per-request scratch space for the capture middleware
//!
//! The context is an explicit value owned by the middleware frame, so values
//! set during one request are never visible to any other in-flight request.

use serde_json::Value;
use std::time::Instant;

/// Carries the start instant and the deserialized request body from the
/// pre-handler phase to the post-handler phase of a single request.
#[derive(Debug)]
pub struct RequestContext {
    started_at: Option<Instant>,
    request_body: Option<Value>,
}

impl RequestContext {
    /// Begin a request: records the start instant.
    pub fn begin() -> Self {
        Self {
            started_at: Some(Instant::now()),
            request_body: None,
        }
    }

    /// Store the deserialized request body (or the GET placeholder).
    pub fn set_request_body(&mut self, body: Value) {
        self.request_body = Some(body);
    }

    /// Body captured for this request, if any.
    pub fn request_body(&self) -> Option<&Value> {
        self.request_body.as_ref()
    }

    /// Elapsed milliseconds since `begin()`, 0 if the start instant is missing.
    pub fn elapsed_millis(&self) -> u64 {
        self.started_at
            .map(|s| s.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }

    /// Drop all per-request state. Runs on every exit path of the post phase.
    pub fn clear(&mut self) {
        self.started_at = None;
        self.request_body = None;
    }
}

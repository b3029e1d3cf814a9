use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::{ApiError, ErrorCode};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id carried in request extensions for handlers and error bodies.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Counter for one fixed window.
#[derive(Debug)]
struct Window {
    opened_at: Instant,
    admitted: usize,
}

impl Window {
    /// Count one request at `now`; `false` once `max` is reached inside `length`.
    fn admit(&mut self, now: Instant, max: usize, length: Duration) -> bool {
        if now.duration_since(self.opened_at) >= length {
            self.opened_at = now;
            self.admitted = 0;
        }
        if self.admitted >= max {
            return false;
        }
        self.admitted += 1;
        true
    }
}

/// Fixed-window limit shared by all clients of the guarded routes.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window_length: Duration,
    window: Arc<Mutex<Window>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window_length: Duration) -> Self {
        Self {
            max_requests,
            window_length,
            window: Arc::new(Mutex::new(Window {
                opened_at: Instant::now(),
                admitted: 0,
            })),
        }
    }

    #[must_use]
    pub fn from_app_config(config: &nearby_core::AppConfig) -> Self {
        Self::new(config.rate_limit_max_requests, config.rate_limit_window())
    }

    async fn admit(&self) -> bool {
        self.window
            .lock()
            .await
            .admit(Instant::now(), self.max_requests, self.window_length)
    }
}

/// Reuse the caller's `x-request-id` or mint a UUIDv4, expose it to handlers,
/// and echo it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned);

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

pub async fn enforce_rate_limit(
    State(limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    if limit.admit().await {
        return next.run(req).await;
    }

    tracing::warn!(
        max_requests = limit.max_requests,
        window_secs = limit.window_length.as_secs(),
        path = %req.uri().path(),
        "rate limit exceeded"
    );
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    ApiError::new(request_id, ErrorCode::RateLimited, "rate limit exceeded").into_response()
}

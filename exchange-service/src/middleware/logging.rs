use axum::http;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::Level;

use crate::state::AppState;

/// Trace every HTTP request: one span per request, status and latency on
/// completion. WebSocket frames are not traced here; the channel handler
/// logs its own lifecycle events.
pub fn add_tracing(router: Router<AppState>) -> Router<AppState> {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &http::Request<_>| {
                tracing::span!(
                    Level::INFO,
                    "request",
                    method = %req.method(),
                    path = %req.uri().path(),
                )
            })
            .on_response(
                |res: &http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                    tracing::info!(
                        status = res.status().as_u16(),
                        elapsed_ms = latency.as_millis() as u64,
                        "handled request"
                    );
                },
            ),
    )
}

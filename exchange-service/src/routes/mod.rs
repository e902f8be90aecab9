use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Json, Router,
};

pub mod chat;
pub mod exchanges;

use chat::chat_history;
use exchanges::{
    accept_exchange, complete_exchange, exchange_status, profile_exchanges, propose_exchange,
    reject_exchange,
};

use crate::websocket::handlers::ws_handler;

// OpenAPI endpoint handler
async fn openapi_json() -> Json<serde_json::Value> {
    use utoipa::OpenApi;
    Json(serde_json::to_value(crate::openapi::ApiDoc::openapi()).unwrap_or_default())
}

async fn docs() -> axum::response::Html<&'static str> {
    axum::response::Html(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Tradepost Exchange Service API</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 40px; background: #f5f5f5; }
        .container { max-width: 600px; margin: 0 auto; background: white; padding: 40px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        h1 { color: #333; }
        a { display: block; margin: 15px 0; padding: 15px; background: #28a745; color: white; text-decoration: none; border-radius: 4px; }
        a:hover { background: #218838; }
    </style>
</head>
<body>
    <div class="container">
        <h1>Tradepost Exchange Service API</h1>
        <p>Barter negotiation and real-time messaging.</p>
        <a href="/openapi.json">OpenAPI JSON (Raw)</a>
    </div>
</body>
</html>"#,
    )
}

pub fn build_router() -> Router<AppState> {
    // Service introspection endpoints plus the real-time channel, which
    // authenticates inside its own handshake
    let introspection = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/openapi.json", get(openapi_json))
        .route("/docs", get(docs))
        .route("/ws", get(ws_handler));

    // Business routes, bearer-token protected
    let api_v1 = Router::new()
        .route("/exchanges", post(propose_exchange))
        .route("/exchanges/profile", get(profile_exchanges))
        .route(
            "/exchanges/:listing_id/:counterpart_id/accept",
            put(accept_exchange),
        )
        .route(
            "/exchanges/:listing_id/:counterpart_id/reject",
            put(reject_exchange),
        )
        .route(
            "/exchanges/:listing_id/:counterpart_id/complete",
            put(complete_exchange),
        )
        .route(
            "/exchanges/:listing_id/:counterpart_id/status",
            get(exchange_status),
        )
        .route("/chat/history/:counterpart_id", get(chat_history))
        .route_layer(axum::middleware::from_fn(
            crate::middleware::auth::auth_middleware,
        ));

    introspection.merge(Router::new().nest("/api/v1", api_v1))
}

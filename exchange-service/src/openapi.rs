/// OpenAPI documentation for the Tradepost Exchange Service
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tradepost Exchange Service API",
        version = "0.1.0",
        description = "Barter negotiation and confidential real-time messaging",
        license(name = "MIT")
    ),
    tags(
        (name = "Health", description = "Service health checks"),
        (name = "Exchanges", description = "Barter proposal lifecycle"),
        (name = "Chat", description = "Message history"),
        (name = "WebSocket", description = "Real-time messaging and presence"),
    ),
    components(schemas(
        crate::models::exchange::Exchange,
        crate::models::exchange::ExchangeStatus,
        crate::models::exchange::ExchangeOverview,
        crate::models::listing::Listing,
        crate::models::listing::ListingStatus,
        crate::routes::exchanges::ProposeExchangeRequest,
        crate::routes::chat::ChatMessageDto,
    ))
)]
pub struct ApiDoc;

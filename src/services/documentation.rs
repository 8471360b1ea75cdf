//! OpenAPI documentation aggregate.

use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Bulls & Cows Back.
#[openapi(
    paths(crate::routes::health::healthcheck, crate::routes::websocket::ws_handler,),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::ws::ClientMessage,
            crate::dto::ws::ServerMessage,
            crate::state::lobby::Lobby,
            crate::state::game::GameState,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "WebSocket operations for game clients"),
    )
)]
pub struct ApiDoc;

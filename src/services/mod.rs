/// OpenAPI documentation generation.
pub mod documentation;
/// Server message fan-out to rooms and single connections.
pub mod events;
/// Game round coordination: secrets, guesses, resets.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Lobby coordination: membership, settings, readiness, round start.
pub mod lobby_service;
/// WebSocket connection and message handling service.
pub mod websocket_service;

//! Health payload returned by the `/healthcheck` route.

use serde::Serialize;
use utoipa::ToSchema;

/// Health response with current in-memory occupancy.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status; always "ok" while the process is serving.
    pub status: String,
    /// Number of live lobbies.
    pub lobbies: usize,
    /// Number of active game rounds.
    pub games: usize,
    /// Number of connected sockets.
    pub connections: usize,
}

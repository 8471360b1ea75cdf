//! Health reporting backed by the in-memory session store.

use crate::{dto::health::HealthResponse, state::SharedState};

/// Build a health payload with the current in-memory occupancy.
pub fn health_status(state: &SharedState) -> HealthResponse {
    HealthResponse {
        status: "ok".to_string(),
        lobbies: state.lobbies().len(),
        games: state.games().len(),
        connections: state.connections().len(),
    }
}

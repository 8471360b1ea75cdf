//! Lobby coordinator: join/leave/ready/settings handling and round start.
//!
//! Every operation completes its read-modify-broadcast while holding the
//! lobby's map entry, so no two events interleave on the same aggregate.
//! When both maps are touched, the order is always lobbies before games.

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::SettingsPatch,
    error::ServiceError,
    logic,
    services::events,
    state::{SharedState, game::GameState, lobby::Lobby, lobby::LobbyStatus},
};

/// Bounded retries for allocating an unused lobby code.
const CODE_ALLOCATION_ATTEMPTS: usize = 32;

/// Create a fresh lobby hosted by `connection_id` and acknowledge it to the
/// creator. Codes colliding with a live lobby are regenerated.
pub fn create_lobby(
    state: &SharedState,
    connection_id: Uuid,
    player_name: &str,
) -> Result<(), ServiceError> {
    let code = allocate_code(state)?;
    let lobby = Lobby::new(code.clone(), connection_id, player_name.trim().to_string());

    state.lobbies().insert(code.clone(), lobby.clone());
    state.join_room(&code, connection_id);

    info!(lobby_id = %code, player = %player_name, "lobby created");
    events::emit_lobby_created(state, connection_id, &lobby);
    Ok(())
}

/// Join an existing lobby by code. Fails when the lobby is missing, not in
/// waiting status, or already at the configured player cap.
pub fn join_lobby(
    state: &SharedState,
    connection_id: Uuid,
    lobby_code: &str,
    player_name: &str,
) -> Result<(), ServiceError> {
    let snapshot = {
        let mut lobby = state
            .lobbies()
            .get_mut(lobby_code)
            .ok_or(ServiceError::LobbyNotFound)?;

        if lobby.status != LobbyStatus::Waiting {
            return Err(ServiceError::NotJoinable);
        }
        if lobby.players.len() >= state.config().max_players {
            return Err(ServiceError::NotJoinable);
        }

        lobby.add_player(connection_id, player_name.trim().to_string());
        lobby.clone()
    };

    state.join_room(lobby_code, connection_id);

    info!(lobby_id = %lobby_code, player = %player_name, "player joined lobby");
    events::broadcast_lobby_updated(state, &snapshot);
    events::emit_lobby_joined(state, connection_id, &snapshot);
    Ok(())
}

/// Remove `connection_id` from the lobby. Deletes the lobby (and its round)
/// when it empties; otherwise transfers the host role if needed and
/// broadcasts the updated roster. Missing lobbies are silently ignored.
pub fn leave_lobby(state: &SharedState, connection_id: Uuid, lobby_id: &str) {
    let outcome = {
        let Some(mut lobby) = state.lobbies().get_mut(lobby_id) else {
            return;
        };
        let Some(removed) = lobby.remove_player(connection_id) else {
            return;
        };
        if lobby.players.is_empty() {
            None
        } else {
            Some((removed, lobby.clone()))
        }
    };

    state.leave_room(lobby_id, connection_id);

    match outcome {
        None => {
            if delete_lobby_if_empty(state, lobby_id) {
                info!(lobby_id = %lobby_id, "lobby deleted (empty)");
            }
        }
        Some((removed, snapshot)) => {
            info!(lobby_id = %lobby_id, player = %removed.name, "player left lobby");
            events::broadcast_lobby_updated(state, &snapshot);
        }
    }
}

/// Delete the lobby (plus its round and room) only if it is still empty at
/// the moment of removal. The emptiness check runs under the entry lock, so
/// a join landing after the caller's snapshot keeps the lobby alive.
fn delete_lobby_if_empty(state: &SharedState, lobby_id: &str) -> bool {
    let deleted = state
        .lobbies()
        .remove_if(lobby_id, |_, lobby| lobby.players.is_empty())
        .is_some();
    if deleted {
        state.games().remove(lobby_id);
        state.remove_room(lobby_id);
    }
    deleted
}

/// Host-only shallow merge of the lobby settings. Missing lobbies are
/// silently ignored; non-hosts get a forbidden error. Settings are frozen
/// once the lobby left the waiting status: late updates are silently
/// dropped, matching the leave/ready convention.
pub fn update_settings(
    state: &SharedState,
    connection_id: Uuid,
    lobby_id: &str,
    patch: &SettingsPatch,
) -> Result<(), ServiceError> {
    let snapshot = {
        let Some(mut lobby) = state.lobbies().get_mut(lobby_id) else {
            return Ok(());
        };
        if !lobby.is_host(connection_id) {
            return Err(ServiceError::Forbidden);
        }
        if lobby.status != LobbyStatus::Waiting {
            return Ok(());
        }
        lobby.settings.merge(patch);
        lobby.clone()
    };

    events::broadcast_lobby_updated(state, &snapshot);
    Ok(())
}

/// Set the sender's ready flag and broadcast. When the lobby reaches two or
/// more players all ready, atomically transitions it to playing and starts
/// the round. Missing lobbies and non-members are silently ignored.
pub fn set_ready(state: &SharedState, connection_id: Uuid, lobby_id: &str, ready: bool) {
    let (snapshot, starting) = {
        let Some(mut lobby) = state.lobbies().get_mut(lobby_id) else {
            return;
        };
        let Some(player) = lobby.player_mut(connection_id) else {
            return;
        };
        player.is_ready = ready;

        let starting = lobby.ready_to_start();
        let snapshot = lobby.clone();
        if starting {
            lobby.status = LobbyStatus::Playing;
            let game = GameState::from_lobby(&lobby);
            state.games().insert(lobby_id.to_string(), game);
        }
        (snapshot, starting)
    };

    events::broadcast_lobby_updated(state, &snapshot);

    if starting {
        let Some(game) = state.games().get(lobby_id).map(|entry| entry.clone()) else {
            warn!(lobby_id = %lobby_id, "round vanished between start and broadcast");
            return;
        };
        info!(lobby_id = %lobby_id, players = game.players.len(), "game started");
        events::broadcast_game_started(state, &game);
    }
}

/// Synthesize a leave for whichever lobby contains the dead connection.
///
/// This is the only place disconnect cleanup happens; there is no separate
/// idle timeout.
pub fn handle_disconnect(state: &SharedState, connection_id: Uuid) {
    if let Some(lobby_id) = state.lobby_of_connection(connection_id) {
        leave_lobby(state, connection_id, &lobby_id);
    }
}

/// Allocate a lobby code not currently in use, regenerating on collision.
fn allocate_code(state: &SharedState) -> Result<String, ServiceError> {
    for _ in 0..CODE_ALLOCATION_ATTEMPTS {
        let code = logic::generate_lobby_code();
        if !state.lobbies().contains_key(&code) {
            return Ok(code);
        }
    }
    Err(ServiceError::CodeSpaceExhausted)
}

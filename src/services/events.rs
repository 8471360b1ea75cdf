//! Outbound half of the connection gateway: serialize [`ServerMessage`]s and
//! fan them out to a room or a single connection.

use axum::extract::ws::Message;
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::ws::{
        ErrorPayload, GameFinishedPayload, GameStartedPayload, LobbyCreatedPayload,
        LobbyJoinedPayload, ServerMessage,
    },
    state::{SharedState, game::GameState, lobby::Lobby},
};

/// Serialize a message and push it onto a socket's writer channel.
///
/// Serialization failure is a permanent error (a bug, not a transport
/// condition) and is logged rather than propagated; a closed writer means
/// the peer is gone and the send is silently dropped.
pub fn send_message_to_websocket(tx: &mpsc::UnboundedSender<Message>, message: &ServerMessage) {
    let payload = match serde_json::to_string(message) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "failed to serialize server message `{message:?}`");
            return;
        }
    };

    let _ = tx.send(Message::Text(payload.into()));
}

/// Deliver a message to every connection subscribed to `room_id`.
///
/// Send-and-forget: a member that disconnected mid-operation simply never
/// receives the message; delivery to the rest proceeds.
fn broadcast_to_room(state: &SharedState, room_id: &str, message: &ServerMessage) {
    for tx in state.room_senders(room_id) {
        send_message_to_websocket(&tx, message);
    }
}

/// Deliver a message to a single connection, if it is still registered.
fn send_to_connection(state: &SharedState, connection_id: Uuid, message: &ServerMessage) {
    let Some(tx) = state
        .connections()
        .get(&connection_id)
        .map(|conn| conn.tx.clone())
    else {
        return;
    };
    send_message_to_websocket(&tx, message);
}

/// Acknowledge lobby creation to the creating connection.
pub fn emit_lobby_created(state: &SharedState, connection_id: Uuid, lobby: &Lobby) {
    let message = ServerMessage::LobbyCreated(LobbyCreatedPayload {
        lobby_id: lobby.id.clone(),
        lobby: lobby.clone(),
    });
    send_to_connection(state, connection_id, &message);
}

/// Acknowledge a successful join to the joining connection alone.
pub fn emit_lobby_joined(state: &SharedState, connection_id: Uuid, lobby: &Lobby) {
    let message = ServerMessage::LobbyJoined(LobbyJoinedPayload {
        lobby_id: lobby.id.clone(),
        lobby: lobby.clone(),
    });
    send_to_connection(state, connection_id, &message);
}

/// Broadcast the post-mutation lobby snapshot to its room.
pub fn broadcast_lobby_updated(state: &SharedState, lobby: &Lobby) {
    broadcast_to_room(state, &lobby.id, &ServerMessage::LobbyUpdated(lobby.clone()));
}

/// Broadcast that a round has started (or been re-armed).
pub fn broadcast_game_started(state: &SharedState, game: &GameState) {
    let message = ServerMessage::GameStarted(GameStartedPayload {
        game_state: game.clone(),
    });
    broadcast_to_room(state, &game.id, &message);
}

/// Broadcast the post-mutation game snapshot to its room.
pub fn broadcast_game_updated(state: &SharedState, game: &GameState) {
    broadcast_to_room(state, &game.id, &ServerMessage::GameUpdated(game.clone()));
}

/// Broadcast the terminal game snapshot along with the winner's name.
pub fn broadcast_game_finished(state: &SharedState, winner: &str, game: &GameState) {
    let message = ServerMessage::GameFinished(GameFinishedPayload {
        winner: winner.to_string(),
        game_state: game.clone(),
    });
    broadcast_to_room(state, &game.id, &message);
}

/// Deliver an error message to the originating connection only.
pub fn emit_error(state: &SharedState, connection_id: Uuid, message: &str) {
    let message = ServerMessage::Error(ErrorPayload {
        message: message.to_string(),
    });
    send_to_connection(state, connection_id, &message);
}

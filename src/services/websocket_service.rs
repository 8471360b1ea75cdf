//! Inbound half of the connection gateway: socket lifecycle and event
//! dispatch to the coordinators.

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::ClientMessage,
    error::ServiceError,
    services::{events, game_service, lobby_service},
    state::{ClientConnection, SharedState},
};

/// Handle the full lifecycle for an individual client WebSocket connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let connection_id = Uuid::new_v4();
    state.register_connection(ClientConnection {
        id: connection_id,
        tx: outbound_tx.clone(),
    });
    info!(id = %connection_id, "client connected");

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match ClientMessage::from_json_str(&text) {
                Ok(message) => dispatch(&state, connection_id, message),
                Err(err) => {
                    warn!(id = %connection_id, error = %err, "rejected inbound message");
                    events::emit_error(&state, connection_id, &err.to_string());
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(id = %connection_id, "client closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(id = %connection_id, error = %err, "websocket error");
                break;
            }
        }
    }

    // Abrupt termination and clean close both land here: synthesize a leave
    // for whichever lobby still holds this connection, then deregister.
    lobby_service::handle_disconnect(&state, connection_id);
    state.drop_connection(connection_id);
    info!(id = %connection_id, "client disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Route one parsed client event to its coordinator.
///
/// Coordinator failures are reported to the originating connection only and
/// never tear down the socket or the process.
fn dispatch(state: &SharedState, connection_id: Uuid, message: ClientMessage) {
    let result: Result<(), ServiceError> = match message {
        ClientMessage::CreateLobby(request) => {
            lobby_service::create_lobby(state, connection_id, &request.player_name)
        }
        ClientMessage::JoinLobby(request) => lobby_service::join_lobby(
            state,
            connection_id,
            &request.lobby_code,
            &request.player_name,
        ),
        ClientMessage::LeaveLobby(request) => {
            lobby_service::leave_lobby(state, connection_id, &request.lobby_id);
            Ok(())
        }
        ClientMessage::UpdateSettings(request) => {
            lobby_service::update_settings(state, connection_id, &request.lobby_id, &request.settings)
        }
        ClientMessage::PlayerReady(request) => {
            lobby_service::set_ready(state, connection_id, &request.lobby_id, request.ready);
            Ok(())
        }
        ClientMessage::SubmitSecretNumber(request) => game_service::submit_secret(
            state,
            connection_id,
            &request.game_id,
            &request.secret_number,
        ),
        ClientMessage::MakeGuess(request) => {
            game_service::make_guess(state, connection_id, &request.game_id, &request.guess)
        }
        ClientMessage::NewGame(request) => {
            game_service::new_game(state, &request.game_id);
            Ok(())
        }
        ClientMessage::Unknown => {
            debug!(id = %connection_id, "ignoring unknown event");
            Ok(())
        }
    };

    if let Err(err) = result {
        warn!(id = %connection_id, error = %err, "event handler failed");
        events::emit_error(state, connection_id, &err.to_string());
    }
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}

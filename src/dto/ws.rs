//! WebSocket message envelopes: every event travels as
//! `{"event": <name>, "data": <payload>}` with camelCase payload keys.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::validation::{validate_lobby_code, validate_player_name},
    error::ServiceError,
    state::{game::GameState, lobby::Lobby},
};

/// Messages accepted from game clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(tag = "event", content = "data")]
pub enum ClientMessage {
    /// Create a fresh lobby hosted by the sender.
    #[serde(rename = "create-lobby")]
    CreateLobby(CreateLobbyRequest),
    /// Join an existing lobby by code.
    #[serde(rename = "join-lobby")]
    JoinLobby(JoinLobbyRequest),
    /// Leave the given lobby.
    #[serde(rename = "leave-lobby")]
    LeaveLobby(LeaveLobbyRequest),
    /// Host-only partial settings update.
    #[serde(rename = "update-settings")]
    UpdateSettings(UpdateSettingsRequest),
    /// Toggle the sender's ready flag.
    #[serde(rename = "player-ready")]
    PlayerReady(PlayerReadyRequest),
    /// Contribute a secret number during round setup.
    #[serde(rename = "submit-secret-number")]
    SubmitSecretNumber(SubmitSecretRequest),
    /// Submit a guess against the sender's assigned number.
    #[serde(rename = "make-guess")]
    MakeGuess(MakeGuessRequest),
    /// Re-arm the lobby for another round.
    #[serde(rename = "new-game")]
    NewGame(NewGameRequest),
    /// Unrecognized event name; logged and ignored.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Event names this enum deserializes; anything else maps to
    /// [`ClientMessage::Unknown`] regardless of its `data` shape.
    const KNOWN_EVENTS: [&'static str; 8] = [
        "create-lobby",
        "join-lobby",
        "leave-lobby",
        "update-settings",
        "player-ready",
        "submit-secret-number",
        "make-guess",
        "new-game",
    ];

    /// Parse and validate an inbound text frame.
    ///
    /// The envelope tag is inspected first so that unrecognized events are
    /// tolerated even when they carry a payload the enum cannot represent.
    pub fn from_json_str(payload: &str) -> Result<Self, ServiceError> {
        let value: serde_json::Value = serde_json::from_str(payload)
            .map_err(|err| ServiceError::InvalidPayload(err.to_string()))?;
        let event = value
            .get("event")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ServiceError::InvalidPayload("missing event field".into()))?;
        if !Self::KNOWN_EVENTS.contains(&event) {
            return Ok(Self::Unknown);
        }

        let message: Self = serde_json::from_value(value)
            .map_err(|err| ServiceError::InvalidPayload(err.to_string()))?;
        message.validate_payload()?;
        Ok(message)
    }

    /// Run payload-level validation for the variant's request data.
    fn validate_payload(&self) -> Result<(), ValidationErrors> {
        match self {
            Self::CreateLobby(request) => request.validate(),
            Self::JoinLobby(request) => request.validate(),
            Self::UpdateSettings(request) => request.validate(),
            Self::LeaveLobby(_)
            | Self::PlayerReady(_)
            | Self::SubmitSecretNumber(_)
            | Self::MakeGuess(_)
            | Self::NewGame(_)
            | Self::Unknown => Ok(()),
        }
    }
}

/// Payload for `create-lobby`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLobbyRequest {
    /// Display name of the creating player.
    pub player_name: String,
}

impl Validate for CreateLobbyRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(err) = validate_player_name(&self.player_name) {
            errors.add("playerName", err);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload for `join-lobby`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinLobbyRequest {
    /// Code of the lobby to join.
    pub lobby_code: String,
    /// Display name of the joining player.
    pub player_name: String,
}

impl Validate for JoinLobbyRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(err) = validate_lobby_code(&self.lobby_code) {
            errors.add("lobbyCode", err);
        }
        if let Err(err) = validate_player_name(&self.player_name) {
            errors.add("playerName", err);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload for `leave-lobby`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveLobbyRequest {
    /// Identifier of the lobby to leave.
    pub lobby_id: String,
}

/// Partial settings update; absent fields keep their current value.
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    /// New secret length, 3-6.
    #[validate(range(min = 3, max = 6))]
    pub number_length: Option<usize>,
    /// New guess cap.
    pub max_guesses: Option<u32>,
    /// New time limit in seconds.
    pub time_limit: Option<u32>,
}

/// Payload for `update-settings`.
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    /// Identifier of the lobby being configured.
    pub lobby_id: String,
    /// The partial settings to merge.
    #[validate(nested)]
    pub settings: SettingsPatch,
}

/// Payload for `player-ready`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerReadyRequest {
    /// Identifier of the lobby.
    pub lobby_id: String,
    /// New value for the sender's ready flag.
    pub ready: bool,
}

/// Payload for `submit-secret-number`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSecretRequest {
    /// Identifier of the game (equal to the lobby code).
    pub game_id: String,
    /// The contributed secret; format-checked against the lobby settings.
    pub secret_number: String,
}

/// Payload for `make-guess`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MakeGuessRequest {
    /// Identifier of the game.
    pub game_id: String,
    /// The guessed candidate.
    pub guess: String,
}

/// Payload for `new-game`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewGameRequest {
    /// Identifier of the game/lobby to re-arm.
    pub game_id: String,
}

/// Messages pushed to game clients. Aggregate payloads are full-replace
/// snapshots, never deltas.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "event", content = "data")]
pub enum ServerMessage {
    /// Acknowledgment sent to the creator of a lobby.
    #[serde(rename = "lobby-created")]
    LobbyCreated(LobbyCreatedPayload),
    /// Acknowledgment sent to a player who just joined.
    #[serde(rename = "lobby-joined")]
    LobbyJoined(LobbyJoinedPayload),
    /// Broadcast of the lobby aggregate after any mutation.
    #[serde(rename = "lobby-updated")]
    LobbyUpdated(Lobby),
    /// Broadcast when a round starts (initial setup state).
    #[serde(rename = "game-started")]
    GameStarted(GameStartedPayload),
    /// Broadcast of the game aggregate after a non-terminal mutation.
    #[serde(rename = "game-updated")]
    GameUpdated(GameState),
    /// Broadcast when a round ends, carrying the winner's name.
    #[serde(rename = "game-finished")]
    GameFinished(GameFinishedPayload),
    /// Error delivered only to the originating connection.
    #[serde(rename = "error")]
    Error(ErrorPayload),
}

/// Data for `lobby-created`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LobbyCreatedPayload {
    /// Identifier of the new lobby.
    pub lobby_id: String,
    /// Snapshot of the new lobby.
    pub lobby: Lobby,
}

/// Data for `lobby-joined`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LobbyJoinedPayload {
    /// Identifier of the joined lobby.
    pub lobby_id: String,
    /// Snapshot of the lobby after joining.
    pub lobby: Lobby,
}

/// Data for `game-started`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameStartedPayload {
    /// The freshly derived round in setup status.
    pub game_state: GameState,
}

/// Data for `game-finished`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameFinishedPayload {
    /// Display name of the winning player.
    pub winner: String,
    /// Final snapshot of the round.
    pub game_state: GameState,
}

/// Data for `error`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorPayload {
    /// Human-readable description of what went wrong.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_lobby_envelope() {
        let message = ClientMessage::from_json_str(
            r#"{"event":"create-lobby","data":{"playerName":"ada"}}"#,
        )
        .unwrap();
        match message {
            ClientMessage::CreateLobby(request) => assert_eq!(request.player_name, "ada"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn parses_make_guess_envelope() {
        let message = ClientMessage::from_json_str(
            r#"{"event":"make-guess","data":{"gameId":"AB12CD","guess":"1234"}}"#,
        )
        .unwrap();
        match message {
            ClientMessage::MakeGuess(request) => {
                assert_eq!(request.game_id, "AB12CD");
                assert_eq!(request.guess, "1234");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_player_name() {
        let err =
            ClientMessage::from_json_str(r#"{"event":"create-lobby","data":{"playerName":""}}"#)
                .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidPayload(_)));
    }

    #[test]
    fn rejects_out_of_range_number_length() {
        let err = ClientMessage::from_json_str(
            r#"{"event":"update-settings","data":{"lobbyId":"AB12CD","settings":{"numberLength":7}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidPayload(_)));
    }

    #[test]
    fn unknown_events_parse_to_unknown() {
        let message =
            ClientMessage::from_json_str(r#"{"event":"spectate","data":{}}"#).unwrap();
        assert!(matches!(message, ClientMessage::Unknown));
    }

    #[test]
    fn unknown_events_tolerate_arbitrary_data() {
        let message = ClientMessage::from_json_str(
            r#"{"event":"spectate","data":{"channel":7,"nested":{"x":true}}}"#,
        )
        .unwrap();
        assert!(matches!(message, ClientMessage::Unknown));

        let message = ClientMessage::from_json_str(r#"{"event":"ping"}"#).unwrap();
        assert!(matches!(message, ClientMessage::Unknown));
    }

    #[test]
    fn envelope_without_event_field_is_rejected() {
        let err = ClientMessage::from_json_str(r#"{"data":{"playerName":"ada"}}"#).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidPayload(_)));
    }

    #[test]
    fn server_messages_use_kebab_case_event_names() {
        let payload = serde_json::to_value(ServerMessage::Error(ErrorPayload {
            message: "lobby not found".into(),
        }))
        .unwrap();
        assert_eq!(payload["event"], "error");
        assert_eq!(payload["data"]["message"], "lobby not found");
    }
}

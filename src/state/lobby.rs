//! Lobby aggregate: the pre-game grouping of players behind a shareable code.

use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::ws::SettingsPatch;

/// Default secret length for freshly created lobbies.
const DEFAULT_NUMBER_LENGTH: usize = 4;

/// A participant in a lobby, identified by their connection id.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Connection-derived identity, stable for the life of the socket.
    pub id: Uuid,
    /// Display name chosen by the player.
    pub name: String,
    /// Whether this player currently hosts the lobby.
    pub is_host: bool,
    /// Whether this player has toggled ready for the next round.
    pub is_ready: bool,
}

/// Settings the host can edit while the lobby is waiting.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    /// Length of the secret numbers for the next round (3-6).
    pub number_length: usize,
    /// Optional cap on guesses per player; part of the contract, unused by
    /// the current rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_guesses: Option<u32>,
    /// Optional per-round time limit in seconds; likewise unused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            number_length: DEFAULT_NUMBER_LENGTH,
            max_guesses: None,
            time_limit: None,
        }
    }
}

impl GameSettings {
    /// Shallow-merge a partial update: fields absent from the patch keep
    /// their current value.
    pub fn merge(&mut self, patch: &SettingsPatch) {
        if let Some(number_length) = patch.number_length {
            self.number_length = number_length;
        }
        if let Some(max_guesses) = patch.max_guesses {
            self.max_guesses = Some(max_guesses);
        }
        if let Some(time_limit) = patch.time_limit {
            self.time_limit = Some(time_limit);
        }
    }
}

/// Lifecycle status of a lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LobbyStatus {
    /// Accepting joins; settings editable, players toggle ready.
    Waiting,
    /// Reserved intermediate status; part of the wire contract.
    Configuring,
    /// A round is hosted; settings frozen, joins rejected.
    Playing,
    /// The current round ended; a new-game event re-arms the lobby.
    Finished,
}

/// Pre-game grouping of players sharing a joinable code.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lobby {
    /// Shareable 6-character code, also the broadcast room id.
    pub id: String,
    /// Identity of the current host; always matches the player whose
    /// `is_host` flag is set.
    pub host_id: Uuid,
    /// Players in join order; index 0 inherits the host role when the host
    /// leaves.
    pub players: Vec<Player>,
    /// Settings for the next round.
    pub settings: GameSettings,
    /// Current lifecycle status.
    pub status: LobbyStatus,
    /// Creation timestamp, used by the TTL sweep.
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: OffsetDateTime,
}

impl Lobby {
    /// Build a fresh lobby hosting `host_name` under the given code.
    pub fn new(code: String, host_id: Uuid, host_name: String) -> Self {
        Self {
            id: code,
            host_id,
            players: vec![Player {
                id: host_id,
                name: host_name,
                is_host: true,
                is_ready: false,
            }],
            settings: GameSettings::default(),
            status: LobbyStatus::Waiting,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Append a non-host, not-ready player.
    pub fn add_player(&mut self, id: Uuid, name: String) {
        self.players.push(Player {
            id,
            name,
            is_host: false,
            is_ready: false,
        });
    }

    /// Remove the player owning `connection_id`, transferring the host role
    /// to the first remaining player if the host departed.
    ///
    /// Returns the removed player, or `None` if the connection was not a
    /// member of this lobby.
    pub fn remove_player(&mut self, connection_id: Uuid) -> Option<Player> {
        let index = self.players.iter().position(|p| p.id == connection_id)?;
        let removed = self.players.remove(index);

        if removed.is_host
            && let Some(successor) = self.players.first_mut()
        {
            successor.is_host = true;
            self.host_id = successor.id;
        }

        Some(removed)
    }

    /// Mutable access to the player owning `connection_id`.
    pub fn player_mut(&mut self, connection_id: Uuid) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == connection_id)
    }

    /// Whether `connection_id` belongs to a member of this lobby.
    pub fn contains(&self, connection_id: Uuid) -> bool {
        self.players.iter().any(|p| p.id == connection_id)
    }

    /// Whether `connection_id` is the current host.
    pub fn is_host(&self, connection_id: Uuid) -> bool {
        self.host_id == connection_id && self.contains(connection_id)
    }

    /// Start condition: at least two players, every one of them ready.
    pub fn ready_to_start(&self) -> bool {
        self.players.len() >= 2 && self.players.iter().all(|p| p.is_ready)
    }

    /// Clear every player's ready flag, ahead of a new round.
    pub fn reset_ready_flags(&mut self) {
        for player in &mut self.players {
            player.is_ready = false;
        }
    }
}

//! Game aggregate: one round of Bulls & Cows derived from a lobby roster.

use serde::Serialize;
use time::OffsetDateTime;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::lobby::Lobby;

/// One scored guess in a player's history. Immutable once appended.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Guess {
    /// The submitted candidate.
    pub number: String,
    /// Digits matching value and position.
    pub bulls: usize,
    /// Digits matching value but not position.
    pub cows: usize,
    /// When the guess was scored.
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub timestamp: OffsetDateTime,
}

/// Per-round view of a lobby player.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GamePlayer {
    /// Connection-derived identity, shared with the lobby player.
    pub id: Uuid,
    /// Display name carried over from the lobby.
    pub name: String,
    /// The number this player must guess; assigned once per round.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_number: Option<String>,
    /// Identity of the player who contributed `assigned_number`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_by: Option<Uuid>,
    /// The secret this player contributed; write-once per round.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_number: Option<String>,
    /// Guess history in submission order; appended, never removed.
    pub guesses: Vec<Guess>,
    /// Whether this player has found their assigned number.
    pub has_won: bool,
}

/// Lifecycle status of a game round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Players are submitting their secret numbers.
    Setup,
    /// Secrets assigned; players are guessing.
    Playing,
    /// A winner has been recorded; terminal for this round.
    Finished,
}

/// Aggregated state for one round, keyed by the owning lobby's identifier.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Identifier equal to the owning lobby's code; one active round per lobby.
    pub id: String,
    /// Per-round players in lobby join order.
    pub players: Vec<GamePlayer>,
    /// Current round status.
    pub status: GameStatus,
    /// When the round was started.
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub started_at: OffsetDateTime,
    /// Identity of the winning player, once the round finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Uuid>,
}

impl GameState {
    /// Derive a fresh round in `setup` status from the lobby's current roster.
    pub fn from_lobby(lobby: &Lobby) -> Self {
        Self {
            id: lobby.id.clone(),
            players: lobby
                .players
                .iter()
                .map(|p| GamePlayer {
                    id: p.id,
                    name: p.name.clone(),
                    assigned_number: None,
                    assigned_by: None,
                    secret_number: None,
                    guesses: Vec::new(),
                    has_won: false,
                })
                .collect(),
            status: GameStatus::Setup,
            started_at: OffsetDateTime::now_utc(),
            winner: None,
        }
    }

    /// Mutable access to the player owning `connection_id`.
    pub fn player_mut(&mut self, connection_id: Uuid) -> Option<&mut GamePlayer> {
        self.players.iter_mut().find(|p| p.id == connection_id)
    }

    /// Whether every player has contributed a secret.
    pub fn all_secrets_set(&self) -> bool {
        self.players.iter().all(|p| p.secret_number.is_some())
    }

    /// Assign targets as a fixed circular shift of the join order: each
    /// player guesses the secret contributed by their successor, wrapping at
    /// the end.
    ///
    /// Refuses rosters of fewer than two players, where the shift would hand
    /// a player their own number. Returns whether assignment took place.
    pub fn assign_numbers(&mut self) -> bool {
        let count = self.players.len();
        if count < 2 {
            warn!(
                id = %self.id,
                players = count,
                "refusing number assignment for a single-player round"
            );
            return false;
        }

        let successors: Vec<(Option<String>, Uuid)> = (0..count)
            .map(|i| {
                let next = &self.players[(i + 1) % count];
                (next.secret_number.clone(), next.id)
            })
            .collect();

        for (player, (secret, contributor)) in self.players.iter_mut().zip(successors) {
            player.assigned_number = secret;
            player.assigned_by = Some(contributor);
        }

        true
    }
}

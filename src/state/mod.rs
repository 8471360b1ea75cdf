//! Shared application state: the in-memory session store and the
//! connection/room registries used for broadcasting.

pub mod game;
pub mod lobby;

use std::{collections::HashSet, sync::Arc};

use axum::extract::ws::Message;
use dashmap::DashMap;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    state::{game::GameState, lobby::Lobby},
};

/// Cheaply clonable handle to [`AppState`].
pub type SharedState = Arc<AppState>;

#[derive(Clone)]
/// Handle used to push messages to a connected client socket.
pub struct ClientConnection {
    /// Connection identity, also used as the player id.
    pub id: Uuid,
    /// Writer channel feeding the socket's dedicated sender task.
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Central application state owning every lobby and game aggregate.
///
/// Constructed once in `main` and passed down explicitly; coordinators hold
/// a map entry only for the duration of one event.
pub struct AppState {
    config: AppConfig,
    lobbies: DashMap<String, Lobby>,
    games: DashMap<String, GameState>,
    connections: DashMap<Uuid, ClientConnection>,
    rooms: DashMap<String, HashSet<Uuid>>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(Self {
            config,
            lobbies: DashMap::new(),
            games: DashMap::new(),
            connections: DashMap::new(),
            rooms: DashMap::new(),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Registry of lobbies keyed by their shareable code.
    pub fn lobbies(&self) -> &DashMap<String, Lobby> {
        &self.lobbies
    }

    /// Registry of active rounds keyed by the owning lobby's code.
    pub fn games(&self) -> &DashMap<String, GameState> {
        &self.games
    }

    /// Registry of live client sockets keyed by connection id.
    pub fn connections(&self) -> &DashMap<Uuid, ClientConnection> {
        &self.connections
    }

    /// Register a freshly identified socket.
    pub fn register_connection(&self, connection: ClientConnection) {
        self.connections.insert(connection.id, connection);
    }

    /// Remove a socket and drop it from every room it joined.
    pub fn drop_connection(&self, connection_id: Uuid) {
        self.connections.remove(&connection_id);
        self.rooms.retain(|_, members| {
            members.remove(&connection_id);
            !members.is_empty()
        });
    }

    /// Subscribe a connection to the broadcast room for `room_id`.
    pub fn join_room(&self, room_id: &str, connection_id: Uuid) {
        self.rooms
            .entry(room_id.to_string())
            .or_default()
            .insert(connection_id);
    }

    /// Unsubscribe a connection from a room, dropping the room when empty.
    pub fn leave_room(&self, room_id: &str, connection_id: Uuid) {
        let emptied = self
            .rooms
            .get_mut(room_id)
            .map(|mut members| {
                members.remove(&connection_id);
                members.is_empty()
            })
            .unwrap_or(false);
        if emptied {
            self.rooms.remove(room_id);
        }
    }

    /// Drop a room and its membership outright (lobby deleted).
    pub fn remove_room(&self, room_id: &str) {
        self.rooms.remove(room_id);
    }

    /// Writer channels for every member of `room_id`.
    pub fn room_senders(&self, room_id: &str) -> Vec<mpsc::UnboundedSender<Message>> {
        let Some(members) = self.rooms.get(room_id) else {
            return Vec::new();
        };
        members
            .iter()
            .filter_map(|id| self.connections.get(id).map(|conn| conn.tx.clone()))
            .collect()
    }

    /// Identifier of the lobby currently containing `connection_id`, if any.
    ///
    /// Used to synthesize a leave when a socket terminates abruptly.
    pub fn lobby_of_connection(&self, connection_id: Uuid) -> Option<String> {
        self.lobbies
            .iter()
            .find(|entry| entry.value().contains(connection_id))
            .map(|entry| entry.key().clone())
    }

    /// Evict every lobby older than the configured TTL, along with its game
    /// and room. Returns how many lobbies were purged.
    ///
    /// Crude age-based policy: activity does not refresh a lobby.
    pub fn purge_expired_lobbies(&self) -> usize {
        let cutoff = OffsetDateTime::now_utc() - self.config.lobby_ttl;
        let expired: Vec<String> = self
            .lobbies
            .iter()
            .filter(|entry| entry.value().created_at < cutoff)
            .map(|entry| entry.key().clone())
            .collect();

        for id in &expired {
            self.lobbies.remove(id);
            self.games.remove(id);
            self.rooms.remove(id);
        }

        expired.len()
    }
}

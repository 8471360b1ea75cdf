//! Game coordinator: secret submission, guessing, and round resets.

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::ServiceError,
    logic,
    services::events,
    state::{
        SharedState,
        game::{GameState, GameStatus, Guess},
        lobby::LobbyStatus,
    },
};

/// Record a player's secret number during round setup.
///
/// The last submission that completes the set triggers circular number
/// assignment and moves the round to playing. Submissions after setup are
/// ignored: secrets are write-once per round.
pub fn submit_secret(
    state: &SharedState,
    connection_id: Uuid,
    game_id: &str,
    secret_number: &str,
) -> Result<(), ServiceError> {
    let Some(number_length) = lobby_number_length(state, game_id) else {
        return Ok(());
    };

    if !logic::is_valid_number(secret_number, number_length) {
        return Err(ServiceError::InvalidNumber);
    }

    let snapshot = {
        let Some(mut game) = state.games().get_mut(game_id) else {
            return Ok(());
        };
        if game.status != GameStatus::Setup {
            return Ok(());
        }
        let Some(player) = game.player_mut(connection_id) else {
            return Ok(());
        };
        player.secret_number = Some(secret_number.to_string());

        if game.all_secrets_set() && game.assign_numbers() {
            game.status = GameStatus::Playing;
            info!(game_id = %game_id, "all secrets in; numbers assigned, round playing");
        }
        game.clone()
    };

    events::broadcast_game_updated(state, &snapshot);
    Ok(())
}

/// Score a guess against the sender's assigned number.
///
/// A guess scoring full bulls wins the round: the winner is recorded once
/// and the round becomes finished; any later guess is a no-op, so the
/// recorded winner is never overwritten.
pub fn make_guess(
    state: &SharedState,
    connection_id: Uuid,
    game_id: &str,
    guess: &str,
) -> Result<(), ServiceError> {
    let Some(number_length) = lobby_number_length(state, game_id) else {
        return Ok(());
    };

    if !logic::is_valid_number(guess, number_length) {
        return Err(ServiceError::InvalidNumber);
    }

    let (winner, snapshot) = {
        let Some(mut game) = state.games().get_mut(game_id) else {
            return Ok(());
        };
        if game.status != GameStatus::Playing {
            return Ok(());
        }
        let Some(player) = game.player_mut(connection_id) else {
            return Ok(());
        };
        let Some(target) = player.assigned_number.clone() else {
            return Ok(());
        };
        if player.has_won {
            return Ok(());
        }

        let score = logic::calculate_bulls_and_cows(guess, &target)?;
        player.guesses.push(Guess {
            number: guess.to_string(),
            bulls: score.bulls,
            cows: score.cows,
            timestamp: OffsetDateTime::now_utc(),
        });

        if score.bulls == number_length {
            player.has_won = true;
            let winner_name = player.name.clone();
            game.status = GameStatus::Finished;
            game.winner = Some(connection_id);
            (Some(winner_name), game.clone())
        } else {
            (None, game.clone())
        }
    };

    match winner {
        Some(winner) => {
            info!(game_id = %game_id, winner = %winner, "game finished");
            events::broadcast_game_finished(state, &winner, &snapshot);
        }
        None => events::broadcast_game_updated(state, &snapshot),
    }
    Ok(())
}

/// Re-derive a fresh round from the lobby's current roster and broadcast it.
///
/// Clears every ready flag and puts the lobby back into hosting an active
/// game without changing its identifier or roster.
pub fn new_game(state: &SharedState, game_id: &str) {
    let game = {
        let Some(mut lobby) = state.lobbies().get_mut(game_id) else {
            return;
        };
        lobby.reset_ready_flags();
        lobby.status = LobbyStatus::Playing;
        GameState::from_lobby(&lobby)
    };

    state.games().insert(game_id.to_string(), game.clone());
    info!(game_id = %game_id, players = game.players.len(), "new round armed");
    events::broadcast_game_started(state, &game);
}

/// Secret length configured on the owning lobby, if it still exists.
fn lobby_number_length(state: &SharedState, game_id: &str) -> Option<usize> {
    state
        .lobbies()
        .get(game_id)
        .map(|lobby| lobby.settings.number_length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        services::lobby_service,
        state::{AppState, lobby::Lobby},
    };

    fn two_player_round(state: &SharedState) -> (String, Uuid, Uuid) {
        let host = Uuid::new_v4();
        lobby_service::create_lobby(state, host, "ada").unwrap();
        let code = state.lobbies().iter().next().unwrap().key().clone();
        let second = Uuid::new_v4();
        lobby_service::join_lobby(state, second, &code, "bob").unwrap();
        lobby_service::set_ready(state, host, &code, true);
        lobby_service::set_ready(state, second, &code, true);
        (code, host, second)
    }

    fn state() -> SharedState {
        AppState::new(AppConfig::default())
    }

    #[test]
    fn invalid_secret_is_rejected() {
        let state = state();
        let (code, host, _) = two_player_round(&state);

        let err = submit_secret(&state, host, &code, "1123").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidNumber));

        let err = submit_secret(&state, host, &code, "123").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidNumber));
    }

    #[test]
    fn last_secret_triggers_assignment_and_playing() {
        let state = state();
        let (code, host, second) = two_player_round(&state);

        submit_secret(&state, host, &code, "1234").unwrap();
        assert_eq!(state.games().get(&code).unwrap().status, GameStatus::Setup);

        submit_secret(&state, second, &code, "5678").unwrap();

        let game = state.games().get(&code).unwrap();
        assert_eq!(game.status, GameStatus::Playing);
        let host_player = game.players.iter().find(|p| p.id == host).unwrap();
        let second_player = game.players.iter().find(|p| p.id == second).unwrap();
        assert_eq!(host_player.assigned_number.as_deref(), Some("5678"));
        assert_eq!(host_player.assigned_by, Some(second));
        assert_eq!(second_player.assigned_number.as_deref(), Some("1234"));
        assert_eq!(second_player.assigned_by, Some(host));
    }

    #[test]
    fn secrets_are_write_once_per_round() {
        let state = state();
        let (code, host, second) = two_player_round(&state);
        submit_secret(&state, host, &code, "1234").unwrap();
        submit_secret(&state, second, &code, "5678").unwrap();

        // Round is playing now; a late submission must not re-run assignment.
        submit_secret(&state, host, &code, "9012").unwrap();

        let game = state.games().get(&code).unwrap();
        let host_player = game.players.iter().find(|p| p.id == host).unwrap();
        assert_eq!(host_player.secret_number.as_deref(), Some("1234"));
    }

    #[test]
    fn guesses_are_scored_and_appended() {
        let state = state();
        let (code, host, second) = two_player_round(&state);
        submit_secret(&state, host, &code, "1234").unwrap();
        submit_secret(&state, second, &code, "5678").unwrap();

        // Host guesses against second's secret "5678".
        make_guess(&state, host, &code, "5687").unwrap();

        let game = state.games().get(&code).unwrap();
        let host_player = game.players.iter().find(|p| p.id == host).unwrap();
        assert_eq!(host_player.guesses.len(), 1);
        assert_eq!(host_player.guesses[0].bulls, 2);
        assert_eq!(host_player.guesses[0].cows, 2);
        assert_eq!(game.status, GameStatus::Playing);
    }

    #[test]
    fn full_bulls_win_finishes_the_round_once() {
        let state = state();
        let (code, host, second) = two_player_round(&state);
        submit_secret(&state, host, &code, "1234").unwrap();
        submit_secret(&state, second, &code, "5678").unwrap();

        make_guess(&state, host, &code, "5678").unwrap();

        {
            let game = state.games().get(&code).unwrap();
            assert_eq!(game.status, GameStatus::Finished);
            assert_eq!(game.winner, Some(host));
        }

        // A later winning guess must not overwrite the recorded winner.
        make_guess(&state, second, &code, "1234").unwrap();

        let game = state.games().get(&code).unwrap();
        assert_eq!(game.winner, Some(host));
        let second_player = game.players.iter().find(|p| p.id == second).unwrap();
        assert!(second_player.guesses.is_empty());
        assert!(!second_player.has_won);
    }

    #[test]
    fn guesses_before_assignment_are_ignored() {
        let state = state();
        let (code, host, _) = two_player_round(&state);
        submit_secret(&state, host, &code, "1234").unwrap();

        make_guess(&state, host, &code, "5678").unwrap();

        let game = state.games().get(&code).unwrap();
        let host_player = game.players.iter().find(|p| p.id == host).unwrap();
        assert!(host_player.guesses.is_empty());
    }

    #[test]
    fn new_game_resets_round_and_ready_flags() {
        let state = state();
        let (code, host, second) = two_player_round(&state);
        submit_secret(&state, host, &code, "1234").unwrap();
        submit_secret(&state, second, &code, "5678").unwrap();
        make_guess(&state, host, &code, "5678").unwrap();

        new_game(&state, &code);

        let lobby = state.lobbies().get(&code).unwrap();
        assert_eq!(lobby.status, LobbyStatus::Playing);
        assert!(lobby.players.iter().all(|p| !p.is_ready));

        let game = state.games().get(&code).unwrap();
        assert_eq!(game.status, GameStatus::Setup);
        assert!(game.winner.is_none());
        assert!(game.players.iter().all(|p| p.guesses.is_empty()));
        assert!(game.players.iter().all(|p| p.secret_number.is_none()));
    }

    #[test]
    fn operations_on_missing_aggregates_are_noops() {
        let state = state();
        assert!(submit_secret(&state, Uuid::new_v4(), "NOPE00", "1234").is_ok());
        assert!(make_guess(&state, Uuid::new_v4(), "NOPE00", "1234").is_ok());
        new_game(&state, "NOPE00");
        assert!(state.games().is_empty());

        // Lobby exists but no round was started: guesses go nowhere.
        let lobby = Lobby::new("ZZZ999".into(), Uuid::new_v4(), "ada".into());
        state.lobbies().insert(lobby.id.clone(), lobby);
        assert!(make_guess(&state, Uuid::new_v4(), "ZZZ999", "1234").is_ok());
    }
}

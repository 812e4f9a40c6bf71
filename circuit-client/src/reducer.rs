use tracing::debug;

use circuit_core::networking::InboundMessage;

use crate::session::GameSession;

/// Apply one inbound message to the session. Messages are applied in arrival
/// order and later positions simply overwrite earlier ones.
pub fn reduce(session: &mut GameSession, message: InboundMessage) {
    match message {
        InboundMessage::Assignment { player_id } => session.set_local_id(player_id),
        InboundMessage::Roster(all_players) => {
            debug!(players = all_players.len(), "received roster");
            session.apply_roster(all_players);
        }
        InboundMessage::PlayerJoined(player) => {
            debug!(player_id = %player.id, "player joined");
            session.upsert_player(player);
        }
        InboundMessage::PlayerSpawned(player) => session.upsert_player(player),
        InboundMessage::PlayerMoved {
            player_id,
            position,
        } => {
            if !session.move_player(&player_id, position) {
                debug!(%player_id, "move for unknown player");
            }
        }
        InboundMessage::PlayerLeft { player_id } => {
            if session.remove_player(&player_id).is_some() {
                debug!(%player_id, "player left");
            }
        }
    }
}

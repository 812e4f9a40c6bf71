use glam::DVec2;

use circuit_core::containment::constrain_to_track;
use circuit_core::networking::ServerBoundEvent;
use circuit_core::player_inputs::InputState;
use circuit_core::progress::RaceSignal;

use crate::session::{GameSession, SessionConfig};
use crate::transport::Transport;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickOutcome {
    pub moved: bool,
    // local position after the tick, if there is a local player
    pub position: Option<DVec2>,
    pub signal: Option<RaceSignal>,
}

/// Fixed-step displacement from the held keys. A direction only applies
/// while the car is still inside the world margin on that side; the axes are
/// checked in turn so a later check sees the earlier move.
pub fn apply_input(position: DVec2, input: InputState, config: &SessionConfig) -> (DVec2, bool) {
    let margin = config.player_size;
    let speed = config.move_speed;
    let mut next = position;
    let mut moved = false;

    if input.up && next.y > margin {
        next.y -= speed;
        moved = true;
    }
    if input.down && next.y < config.world_size.y - margin {
        next.y += speed;
        moved = true;
    }
    if input.left && next.x > margin {
        next.x -= speed;
        moved = true;
    }
    if input.right && next.x < config.world_size.x - margin {
        next.x += speed;
        moved = true;
    }

    (next, moved)
}

/// Advance the local player by one tick. Returns the outcome and the move
/// to publish, if any.
pub fn step(session: &mut GameSession, input: InputState) -> (TickOutcome, Option<ServerBoundEvent>) {
    let config = *session.config();
    let current = match session.local_player() {
        Some(player) => player.position,
        None => return (TickOutcome::default(), None),
    };

    let (tentative, moved) = apply_input(current, input, &config);
    if !moved {
        let outcome = TickOutcome {
            moved,
            position: Some(current),
            signal: None,
        };
        return (outcome, None);
    }

    let position = constrain_to_track(session.race().track(), tentative, config.player_radius());
    if let Some(player) = session.local_player_mut() {
        player.position = position;
    }
    let signal = session.check_local_progress();

    let outcome = TickOutcome {
        moved,
        position: Some(position),
        signal,
    };
    (
        outcome,
        Some(ServerBoundEvent::PlayerMove {
            x: position.x,
            y: position.y,
        }),
    )
}

pub fn simulate_tick(
    session: &mut GameSession,
    input: InputState,
    transport: &mut dyn Transport,
) -> TickOutcome {
    let (outcome, publish) = step(session, input);
    if let Some(event) = publish {
        transport.send(event);
    }
    outcome
}

#[cfg(test)]
mod tests;

use glam::DVec2;

use circuit_core::geometry::distance_to_segment;
use circuit_core::networking::{PlayerRecord, ServerBoundEvent};
use circuit_core::player_inputs::{DirectionKey, InputState};
use circuit_core::progress::RaceSignal;

use crate::session::{GameSession, SessionConfig};
use crate::simulation::{apply_input, simulate_tick, TickOutcome};
use crate::transport::MemoryTransport;

fn held(keys: &[DirectionKey]) -> InputState {
    let mut input = InputState::default();
    for key in keys {
        input.set(*key, true);
    }
    input
}

fn racing_session(config: SessionConfig) -> GameSession {
    let mut session = GameSession::new(config);
    session.set_local_id("me".to_string());
    session.upsert_player(PlayerRecord {
        id: "me".to_string(),
        x: 200.0,
        y: 150.0,
        car_image: "car1.png".to_string(),
    });
    session
}

#[test]
fn test_no_local_player_is_a_no_op() {
    let mut session = GameSession::new(SessionConfig::default());
    let mut transport = MemoryTransport::default();

    let outcome = simulate_tick(&mut session, held(&[DirectionKey::Right]), &mut transport);
    assert_eq!(outcome, TickOutcome::default());
    assert!(transport.sent.is_empty());
}

#[test]
fn test_idle_does_not_publish() {
    let mut session = racing_session(SessionConfig::default());
    let mut transport = MemoryTransport::default();

    let outcome = simulate_tick(&mut session, InputState::default(), &mut transport);
    assert!(!outcome.moved);
    assert_eq!(outcome.position, Some(DVec2::new(200.0, 150.0)));
    assert!(transport.sent.is_empty());
}

#[test]
fn test_move_publishes_position() {
    let mut session = racing_session(SessionConfig::default());
    let mut transport = MemoryTransport::default();

    let outcome = simulate_tick(&mut session, held(&[DirectionKey::Right]), &mut transport);
    assert!(outcome.moved);
    assert_eq!(outcome.position, Some(DVec2::new(204.0, 150.0)));
    assert_eq!(
        transport.sent,
        vec![ServerBoundEvent::PlayerMove { x: 204.0, y: 150.0 }]
    );
}

#[test]
fn test_world_margin() {
    let config = SessionConfig::default();

    let (position, moved) = apply_input(
        DVec2::new(24.0, 24.0),
        held(&[DirectionKey::Up, DirectionKey::Left]),
        &config,
    );
    assert!(!moved);
    assert_eq!(position, DVec2::new(24.0, 24.0));

    let (position, moved) = apply_input(
        DVec2::new(776.0, 576.0),
        held(&[DirectionKey::Down, DirectionKey::Right]),
        &config,
    );
    assert!(!moved);
    assert_eq!(position, DVec2::new(776.0, 576.0));

    let (position, moved) = apply_input(DVec2::new(30.0, 30.0), held(&[DirectionKey::Up]), &config);
    assert!(moved);
    assert_eq!(position, DVec2::new(30.0, 26.0));
}

#[test]
fn test_opposite_keys_see_earlier_move() {
    let config = SessionConfig::default();
    // up takes y to the margin, so down still applies and the car ends where it began
    let (position, moved) = apply_input(
        DVec2::new(100.0, 28.0),
        held(&[DirectionKey::Up, DirectionKey::Down]),
        &config,
    );
    assert!(moved);
    assert_eq!(position, DVec2::new(100.0, 28.0));
}

#[test]
fn test_leaving_track_is_corrected() {
    let mut session = racing_session(SessionConfig::default());
    let mut transport = MemoryTransport::default();
    let (start, end) = session.race().track().segment(0);

    // 39 units off the centre of the first straight, then one step further out
    let normal = DVec2::new(50.0, 200.0).normalize();
    let near_edge = (start + end) / 2.0 + normal * 39.0;
    session.move_player("me", near_edge);

    let outcome = simulate_tick(&mut session, held(&[DirectionKey::Down]), &mut transport);
    let position = outcome.position.unwrap();
    let off_centre = distance_to_segment(position, start, end).distance;
    assert!((off_centre - 28.0).abs() < 1e-9);
    assert_eq!(
        transport.sent,
        vec![ServerBoundEvent::PlayerMove {
            x: position.x,
            y: position.y
        }]
    );
}

#[test]
fn test_speedway_lap_by_teleport() {
    let mut session = racing_session(SessionConfig::default());
    let mut transport = MemoryTransport::default();
    let checkpoints = session.race().checkpoints().to_vec();
    assert_eq!(checkpoints.len(), 4);

    let mut last = None;
    for checkpoint in &checkpoints {
        let waypoint = checkpoint.position(session.race().track());
        session.move_player("me", waypoint);
        last = simulate_tick(&mut session, held(&[DirectionKey::Right]), &mut transport).signal;
    }
    assert_eq!(last, Some(RaceSignal::LapCompleted { completed_laps: 1 }));

    // a fifth teleport opens the second lap without counting another
    let first = checkpoints[0].position(session.race().track());
    session.move_player("me", first);
    let outcome = simulate_tick(&mut session, held(&[DirectionKey::Right]), &mut transport);
    assert_eq!(outcome.signal, Some(RaceSignal::CheckpointPassed { id: 0 }));

    let local = session.local_player().unwrap();
    assert_eq!(local.progress.completed_laps(), 1);
    assert_eq!(transport.sent.len(), 5);
}

#[test]
fn test_race_complete_fires_once() {
    let mut session = racing_session(SessionConfig {
        laps_required: 1,
        ..SessionConfig::default()
    });
    let mut transport = MemoryTransport::default();
    let checkpoints = session.race().checkpoints().to_vec();

    let mut signals = vec![];
    for checkpoint in &checkpoints {
        let waypoint = checkpoint.position(session.race().track());
        session.move_player("me", waypoint);
        signals.extend(simulate_tick(&mut session, held(&[DirectionKey::Right]), &mut transport).signal);
    }
    for _ in 0..5 {
        signals.extend(simulate_tick(&mut session, held(&[DirectionKey::Left]), &mut transport).signal);
    }

    let completions = signals
        .iter()
        .filter(|signal| matches!(signal, RaceSignal::RaceComplete { .. }))
        .count();
    assert_eq!(completions, 1);
    assert!(session.local_player().unwrap().progress.is_finished());
}

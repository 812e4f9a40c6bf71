use circuit_core::progress::{RaceProgress, RaceSignal};

use crate::session::{CampaignState, GameSession};

/// The status line shown over the track, or `None` before we have a car.
pub fn lap_text(session: &GameSession) -> Option<String> {
    let race = session.race();
    if race.campaign() == CampaignState::AllLevelsComplete {
        return Some(format!(
            "Champion! All {} tracks completed",
            race.total_levels()
        ));
    }

    let local = session.local_player()?;
    match local.progress {
        RaceProgress::Racing { completed_laps, .. } => Some(format!(
            "L{}:{} | Lap {}/{}",
            race.level(),
            race.track().name(),
            completed_laps + 1,
            race.laps_required()
        )),
        RaceProgress::Finished { .. } => {
            Some(format!("Finished {}:{}", race.level(), race.track().name()))
        }
        RaceProgress::NotRacing => None,
    }
}

pub fn signal_text(session: &GameSession, signal: RaceSignal) -> String {
    let race = session.race();
    match signal {
        RaceSignal::CheckpointPassed { id } => match race.checkpoints().get(id) {
            Some(checkpoint) => format!("Checkpoint: {}", checkpoint.label),
            None => format!("Checkpoint: {}", id + 1),
        },
        RaceSignal::LapCompleted { completed_laps } => {
            format!("Lap {}/{}", completed_laps + 1, race.laps_required())
        }
        RaceSignal::RaceComplete { .. } if race.level() < race.total_levels() => {
            format!("Level Complete! {} Conquered!", race.track().name())
        }
        RaceSignal::RaceComplete { .. } => "YOU WIN! Champion!".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use circuit_core::networking::PlayerRecord;

    use super::*;
    use crate::session::SessionConfig;

    fn session() -> GameSession {
        let mut session = GameSession::new(SessionConfig::default());
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
    fn test_no_text_before_join() {
        let session = GameSession::new(SessionConfig::default());
        assert_eq!(lap_text(&session), None);
    }

    #[test]
    fn test_lap_text_counts_current_lap() {
        let mut session = session();
        assert_eq!(
            lap_text(&session).as_deref(),
            Some("L1:Speedway Oval | Lap 1/3")
        );

        let checkpoints = session.race().checkpoints().to_vec();
        for checkpoint in &checkpoints {
            let position = checkpoint.position(session.race().track());
            session.move_player("me", position);
            session.check_local_progress();
        }
        assert_eq!(
            lap_text(&session).as_deref(),
            Some("L1:Speedway Oval | Lap 2/3")
        );
    }

    #[test]
    fn test_finished_and_champion_text() {
        let mut session = GameSession::new(SessionConfig {
            laps_required: 1,
            ..SessionConfig::default()
        });
        session.set_local_id("me".to_string());
        session.upsert_player(PlayerRecord {
            id: "me".to_string(),
            x: 200.0,
            y: 150.0,
            car_image: "car1.png".to_string(),
        });
        let checkpoints = session.race().checkpoints().to_vec();
        let mut last = None;
        for checkpoint in &checkpoints {
            session.move_player("me", checkpoint.position(session.race().track()));
            last = session.check_local_progress();
        }
        assert_eq!(
            lap_text(&session).as_deref(),
            Some("Finished 1:Speedway Oval")
        );
        assert_eq!(
            signal_text(&session, last.unwrap()),
            "Level Complete! Speedway Oval Conquered!"
        );

        session.load_level(5);
        session.advance_to_next_level();
        assert_eq!(
            lap_text(&session).as_deref(),
            Some("Champion! All 5 tracks completed")
        );
    }

    #[test]
    fn test_checkpoint_signal_uses_label() {
        let session = session();
        assert_eq!(
            signal_text(&session, RaceSignal::CheckpointPassed { id: 1 }),
            "Checkpoint: Checkpoint 2"
        );
        assert_eq!(
            signal_text(&session, RaceSignal::LapCompleted { completed_laps: 1 }),
            "Lap 2/3"
        );
    }
}

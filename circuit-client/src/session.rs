use std::collections::HashMap;

use glam::DVec2;
use tracing::{debug, info};

use circuit_core::networking::{PlayerRecord, ServerBoundEvent};
use circuit_core::progress::{
    capture_for, check_progress, CheckpointCapture, LapNumber, ProgressEvent, RaceProgress,
    RaceRules, RaceSignal, DEFAULT_LAPS_REQUIRED,
};
use circuit_core::track::{derive_checkpoints, level_track, Checkpoint, LevelNumber, Track, TOTAL_LEVELS};
use circuit_core::settings::{
    DEFAULT_MOVE_SPEED, DEFAULT_PLAYER_SIZE, DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH,
};
use circuit_core::{CaptureMode, PlayerID, Settings};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    pub move_speed: f64,
    pub player_size: f64,
    pub world_size: DVec2,
    pub laps_required: LapNumber,
    pub checkpoint_capture: CaptureMode,
}

impl SessionConfig {
    pub fn player_radius(&self) -> f64 {
        self.player_size / 2.0
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            move_speed: DEFAULT_MOVE_SPEED,
            player_size: DEFAULT_PLAYER_SIZE,
            world_size: DVec2::new(DEFAULT_WORLD_WIDTH, DEFAULT_WORLD_HEIGHT),
            laps_required: DEFAULT_LAPS_REQUIRED,
            checkpoint_capture: CaptureMode::Proximity,
        }
    }
}

impl From<&Settings> for SessionConfig {
    fn from(settings: &Settings) -> Self {
        SessionConfig {
            move_speed: settings.move_speed,
            player_size: settings.player_size,
            world_size: DVec2::new(settings.world_width, settings.world_height),
            laps_required: settings.laps_required,
            checkpoint_capture: settings.checkpoint_capture,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CampaignState {
    InProgress,
    // every level has been won; distinct from any one player finishing
    AllLevelsComplete,
}

pub struct RaceSession {
    active_track: Track,
    active_level: LevelNumber,
    total_levels: LevelNumber,
    laps_required: LapNumber,
    checkpoints: Vec<Checkpoint>,
    campaign: CampaignState,
}

impl RaceSession {
    pub fn new(laps_required: LapNumber) -> Self {
        let active_track = level_track(1).expect("level 1 is compiled in");
        let checkpoints = derive_checkpoints(&active_track);
        RaceSession {
            active_track,
            active_level: 1,
            total_levels: TOTAL_LEVELS,
            laps_required,
            checkpoints,
            campaign: CampaignState::InProgress,
        }
    }

    /// Swap in the track for `level`. Out-of-range levels leave everything
    /// as it was and return `false`.
    pub fn load_level(&mut self, level: LevelNumber) -> bool {
        if level < 1 || level > self.total_levels {
            return false;
        }
        let track = match level_track(level) {
            Some(track) => track,
            None => return false,
        };

        self.checkpoints = derive_checkpoints(&track);
        self.active_track = track;
        self.active_level = level;
        self.campaign = CampaignState::InProgress;
        info!(level, track = self.active_track.name(), "loaded level");
        true
    }

    pub fn track(&self) -> &Track {
        &self.active_track
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn level(&self) -> LevelNumber {
        self.active_level
    }

    pub fn total_levels(&self) -> LevelNumber {
        self.total_levels
    }

    pub fn laps_required(&self) -> LapNumber {
        self.laps_required
    }

    pub fn campaign(&self) -> CampaignState {
        self.campaign
    }

    pub fn rules(&self) -> RaceRules {
        RaceRules {
            checkpoint_count: self.checkpoints.len(),
            laps_required: self.laps_required,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerRaceState {
    pub position: DVec2,
    pub car_image: String,
    pub progress: RaceProgress,
}

impl PlayerRaceState {
    fn from_record(record: &PlayerRecord) -> Self {
        PlayerRaceState {
            position: record.position(),
            car_image: record.car_image.clone(),
            progress: RaceProgress::NotRacing,
        }
    }
}

// Everything one client knows about the game. Only the local player is
// simulated here; remote entries are whatever the transport last said.
pub struct GameSession {
    config: SessionConfig,
    race: RaceSession,
    players: HashMap<PlayerID, PlayerRaceState>,
    local_id: Option<PlayerID>,
    capture: Box<dyn CheckpointCapture>,
}

impl GameSession {
    pub fn new(config: SessionConfig) -> Self {
        GameSession {
            race: RaceSession::new(config.laps_required),
            capture: capture_for(config.checkpoint_capture),
            config,
            players: HashMap::new(),
            local_id: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn race(&self) -> &RaceSession {
        &self.race
    }

    pub fn players(&self) -> &HashMap<PlayerID, PlayerRaceState> {
        &self.players
    }

    pub fn local_id(&self) -> Option<&PlayerID> {
        self.local_id.as_ref()
    }

    /// Record which participant is us. If the roster already holds that
    /// entry, its race starts now.
    pub fn set_local_id(&mut self, player_id: PlayerID) {
        info!(%player_id, "assigned local identity");
        self.local_id = Some(player_id);
        self.start_local_race();
    }

    pub fn is_local(&self, player_id: &str) -> bool {
        self.local_id.as_deref() == Some(player_id)
    }

    pub fn local_player(&self) -> Option<&PlayerRaceState> {
        self.local_id.as_ref().and_then(|id| self.players.get(id))
    }

    pub fn local_player_mut(&mut self) -> Option<&mut PlayerRaceState> {
        match &self.local_id {
            Some(id) => self.players.get_mut(id),
            None => None,
        }
    }

    /// Replace the whole roster, as on our own join. The local player starts
    /// racing from here.
    pub fn apply_roster(&mut self, roster: HashMap<PlayerID, PlayerRecord>) {
        self.players = roster
            .iter()
            .map(|(id, record)| (id.clone(), PlayerRaceState::from_record(record)))
            .collect();

        if self.local_player().is_none() {
            debug!("roster arrived without our own entry");
        }
        self.start_local_race();
    }

    /// Insert a participant, or refresh the position and car of one we
    /// already know while keeping their race progress.
    pub fn upsert_player(&mut self, record: PlayerRecord) {
        let is_local = self.is_local(&record.id);
        let entry = self
            .players
            .entry(record.id.clone())
            .or_insert_with(|| PlayerRaceState::from_record(&record));
        entry.position = record.position();
        entry.car_image = record.car_image;
        if is_local {
            self.start_local_race();
        }
    }

    // racing and finished players keep their progress
    fn start_local_race(&mut self) {
        let rules = self.race.rules();
        if let Some(local) = self.local_player_mut() {
            if !local.progress.is_racing() && !local.progress.is_finished() {
                local.progress = local.progress.apply(ProgressEvent::Start, rules).0;
            }
        }
    }

    // returns false when we have never heard of this player
    pub fn move_player(&mut self, player_id: &str, position: DVec2) -> bool {
        match self.players.get_mut(player_id) {
            Some(player) => {
                player.position = position;
                true
            }
            None => false,
        }
    }

    pub fn remove_player(&mut self, player_id: &str) -> Option<PlayerRaceState> {
        self.players.remove(player_id)
    }

    /// Run the progression check for the local player at its current
    /// position.
    pub fn check_local_progress(&mut self) -> Option<RaceSignal> {
        let rules = self.race.rules();
        let local_id = self.local_id.as_ref()?;
        let player = self.players.get_mut(local_id)?;

        let (progress, signal) = check_progress(
            player.progress,
            &self.race.active_track,
            &self.race.checkpoints,
            player.position,
            self.capture.as_ref(),
            rules,
        );
        player.progress = progress;

        match signal {
            Some(RaceSignal::CheckpointPassed { id }) => debug!(checkpoint = id, "checkpoint"),
            Some(RaceSignal::LapCompleted { completed_laps }) => info!(completed_laps, "lap complete"),
            Some(RaceSignal::RaceComplete { completed_laps }) => {
                info!(completed_laps, level = self.race.active_level, "race complete")
            }
            None => {}
        }
        signal
    }

    // Every player goes back to the grid state for the active level; the
    // local car is placed on the start waypoint, which the caller publishes.
    fn reset_for_level(&mut self) -> Option<ServerBoundEvent> {
        let rules = self.race.rules();
        let start = self.race.active_track.start();
        let local_id = self.local_id.clone();

        for (id, player) in self.players.iter_mut() {
            if Some(id) == local_id.as_ref() {
                player.progress = player.progress.apply(ProgressEvent::Start, rules).0;
                player.position = start;
            } else {
                player.progress = RaceProgress::NotRacing;
            }
        }

        self.local_player().map(|local| ServerBoundEvent::PlayerMove {
            x: local.position.x,
            y: local.position.y,
        })
    }

    /// Load `level` and reset the race for it. Returns `false` and changes
    /// nothing when the level does not exist.
    pub fn load_level(&mut self, level: LevelNumber) -> (bool, Option<ServerBoundEvent>) {
        if !self.race.load_level(level) {
            return (false, None);
        }
        (true, self.reset_for_level())
    }

    /// Race the current level again.
    pub fn replay_level(&mut self) -> Option<ServerBoundEvent> {
        self.reset_for_level()
    }

    /// Move on to the next level, or mark the campaign complete when the
    /// last one has been won.
    pub fn advance_to_next_level(&mut self) -> Option<ServerBoundEvent> {
        let next = self.race.active_level + 1;
        let (loaded, publish) = self.load_level(next);
        if !loaded {
            info!(total_levels = self.race.total_levels, "all levels complete");
            self.race.campaign = CampaignState::AllLevelsComplete;
        }
        publish
    }

    pub fn restart_campaign(&mut self) -> Option<ServerBoundEvent> {
        self.load_level(1).1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, x: f64, y: f64) -> PlayerRecord {
        PlayerRecord {
            id: id.to_string(),
            x,
            y,
            car_image: "car1.png".to_string(),
        }
    }

    fn joined_session() -> GameSession {
        let mut session = GameSession::new(SessionConfig::default());
        session.set_local_id("me".to_string());
        let roster = [record("me", 200.0, 150.0), record("them", 400.0, 100.0)]
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect();
        session.apply_roster(roster);
        session
    }

    #[test]
    fn test_roster_starts_local_race_only() {
        let session = joined_session();
        assert_eq!(session.players().len(), 2);
        assert!(session.local_player().unwrap().progress.is_racing());
        assert_eq!(session.players()["them"].progress, RaceProgress::NotRacing);
    }

    #[test]
    fn test_default_config_matches_built_in_settings() {
        assert_eq!(
            SessionConfig::default(),
            SessionConfig::from(&*circuit_core::GLOBAL_CONFIG)
        );
    }

    #[test]
    fn test_assignment_after_roster_starts_local_race() {
        let mut session = GameSession::new(SessionConfig::default());
        let roster = [record("me", 200.0, 150.0), record("them", 400.0, 100.0)]
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect();
        session.apply_roster(roster);
        assert!(session.players().values().all(|p| p.progress == RaceProgress::NotRacing));

        session.set_local_id("me".to_string());
        assert!(session.local_player().unwrap().progress.is_racing());
        assert_eq!(session.players()["them"].progress, RaceProgress::NotRacing);
    }

    #[test]
    fn test_load_out_of_range_level_is_a_no_op() {
        let mut session = joined_session();
        assert_eq!(session.load_level(6), (false, None));
        assert_eq!(session.race().level(), 1);
        assert_eq!(session.load_level(0), (false, None));
        assert_eq!(session.race().level(), 1);
        assert_eq!(session.race().track().name(), "Speedway Oval");
    }

    #[test]
    fn test_load_level_resets_players() {
        let mut session = joined_session();
        session.move_player("me", DVec2::new(400.0, 100.0));
        session.check_local_progress();
        assert_eq!(
            session.local_player().unwrap().progress.target_checkpoint(),
            Some(1)
        );

        let (loaded, publish) = session.load_level(3);
        assert!(loaded);
        assert_eq!(session.race().track().name(), "Technical Circuit");
        assert_eq!(session.race().checkpoints().len(), 5);

        let local = session.local_player().unwrap();
        assert_eq!(local.position, DVec2::new(650.0, 100.0));
        assert_eq!(local.progress.target_checkpoint(), Some(0));
        assert_eq!(
            publish,
            Some(ServerBoundEvent::PlayerMove { x: 650.0, y: 100.0 })
        );
    }

    #[test]
    fn test_advance_through_campaign() {
        let mut session = joined_session();
        for expected in 2..=TOTAL_LEVELS {
            assert!(session.advance_to_next_level().is_some());
            assert_eq!(session.race().level(), expected);
            assert_eq!(session.race().campaign(), CampaignState::InProgress);
        }

        assert_eq!(session.advance_to_next_level(), None);
        assert_eq!(session.race().level(), TOTAL_LEVELS);
        assert_eq!(session.race().campaign(), CampaignState::AllLevelsComplete);

        session.restart_campaign();
        assert_eq!(session.race().level(), 1);
        assert_eq!(session.race().campaign(), CampaignState::InProgress);
    }

    #[test]
    fn test_replay_restarts_a_finished_race() {
        let mut session = GameSession::new(SessionConfig {
            laps_required: 1,
            ..SessionConfig::default()
        });
        session.set_local_id("me".to_string());
        session.upsert_player(record("me", 200.0, 150.0));

        let checkpoints = session.race().checkpoints().to_vec();
        let mut signals = Vec::new();
        for checkpoint in &checkpoints {
            let position = checkpoint.position(session.race().track());
            session.move_player("me", position);
            signals.extend(session.check_local_progress());
        }
        assert_eq!(
            signals.last(),
            Some(&RaceSignal::RaceComplete { completed_laps: 1 })
        );
        assert!(session.local_player().unwrap().progress.is_finished());

        session.replay_level();
        let local = session.local_player().unwrap();
        assert_eq!(local.progress.target_checkpoint(), Some(0));
        assert_eq!(local.progress.completed_laps(), 0);
        assert_eq!(session.race().level(), 1);
    }

    #[test]
    fn test_upsert_keeps_progress() {
        let mut session = joined_session();
        session.move_player("me", DVec2::new(400.0, 100.0));
        session.check_local_progress();

        session.upsert_player(record("me", 410.0, 110.0));
        let local = session.local_player().unwrap();
        assert_eq!(local.position, DVec2::new(410.0, 110.0));
        assert_eq!(local.progress.target_checkpoint(), Some(1));
    }

    #[test]
    fn test_progress_without_local_player() {
        let mut session = GameSession::new(SessionConfig::default());
        assert_eq!(session.check_local_progress(), None);
        assert_eq!(session.replay_level(), None);
    }
}

use glam::DVec2;

use circuit_core::geometry::{distance_to_segment, nearest_track_segment};
use circuit_core::navigation::point_along_track;
use circuit_core::player_inputs::{DirectionKey, InputState};
use circuit_core::track::{LevelNumber, Track};

use crate::session::GameSession;

/// Where the simulation gets the held direction keys from each tick.
pub trait InputSource {
    fn poll(&mut self, session: &GameSession) -> InputState;
}

// a fixed set of held keys
impl InputSource for InputState {
    fn poll(&mut self, _session: &GameSession) -> InputState {
        *self
    }
}

// how far ahead of the car, in track widths, the autopilot aims
const LOOKAHEAD_WIDTHS: f64 = 0.75;

/// Drives the local car by chasing a point a little way up the centre line.
/// The segment it follows only moves forward, so tracks that double back
/// close to themselves don't pull it onto the wrong stretch.
#[derive(Clone, Copy, Debug, Default)]
pub struct Autopilot {
    level: LevelNumber,
    segment: Option<usize>,
    last_position: Option<DVec2>,
}

impl Autopilot {
    pub fn aim_point(&mut self, track: &Track, position: DVec2) -> DVec2 {
        // a jump bigger than a correction means we were placed somewhere new
        let jumped = self
            .last_position
            .map_or(true, |last| last.distance(position) > track.half_width());
        let mut segment = match self.segment {
            Some(segment) if !jumped => segment,
            _ => nearest_track_segment(track, position).segment_index,
        };
        self.last_position = Some(position);

        let segment_count = track.segment_count();
        for _ in 0..segment_count {
            if !track.is_closed() && segment + 1 == segment_count {
                break;
            }
            let next = (segment + 1) % segment_count;
            let (start, end) = track.segment(segment);
            let (next_start, next_end) = track.segment(next);
            let current = distance_to_segment(position, start, end);
            let upcoming = distance_to_segment(position, next_start, next_end);
            if current.fraction >= 1.0 || upcoming.distance < current.distance {
                segment = next;
            } else {
                break;
            }
        }
        self.segment = Some(segment);

        let (start, end) = track.segment(segment);
        let from = distance_to_segment(position, start, end).closest_point;
        point_along_track(track, segment, from, track.width() * LOOKAHEAD_WIDTHS)
    }
}

impl InputSource for Autopilot {
    fn poll(&mut self, session: &GameSession) -> InputState {
        let mut input = InputState::default();
        let player = match session.local_player() {
            Some(player) if player.progress.is_racing() => player,
            _ => return input,
        };

        let race = session.race();
        if race.level() != self.level {
            self.level = race.level();
            self.segment = None;
        }

        let aim = self.aim_point(race.track(), player.position);
        let delta = aim - player.position;
        // inside half a step on an axis, holding the key would only jitter
        let deadzone = session.config().move_speed / 2.0;

        input.set(DirectionKey::Right, delta.x > deadzone);
        input.set(DirectionKey::Left, delta.x < -deadzone);
        input.set(DirectionKey::Down, delta.y > deadzone);
        input.set(DirectionKey::Up, delta.y < -deadzone);
        input
    }
}

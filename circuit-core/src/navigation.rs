//! Guidance helpers for steering around a track: where to aim, where to
//! brake, and how hard each corner is. Waypoint order is the direction of
//! travel; the racing line is offset along `(dy, -dx)` of each segment,
//! which in screen coordinates (y down) is the left of the heading.

use std::f64::consts::PI;

use glam::DVec2;

use crate::geometry::nearest_track_segment;
use crate::track::Track;

const RACING_LINE_OFFSET: f64 = 0.25;
const BRAKING_FACTOR: f64 = 0.4;
const BRAKING_SCALE: f64 = 15.0;
const CRUISE_MULTIPLIER: f64 = 2.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerAngles {
    pub entry: f64,
    pub exit: f64,
    // exit minus entry, normalized to [-PI, PI]
    pub corner: f64,
    pub is_left_turn: bool,
    pub is_right_turn: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrakingPoint {
    pub position: DVec2,
    pub distance: f64,
}

pub fn next_waypoint(track: &Track, index: usize) -> usize {
    (index + 1) % track.waypoints().len()
}

fn previous_waypoint(track: &Track, index: usize) -> usize {
    let n = track.waypoints().len();
    (index + n - 1) % n
}

/// A point a quarter track width off the waypoint, on the line a driver
/// should hold through the corner.
pub fn racing_line_point(track: &Track, index: usize) -> DVec2 {
    let waypoint = track.waypoint(index);
    let heading = track.waypoint(next_waypoint(track, index)) - waypoint;
    let length = heading.length();
    if length == 0.0 {
        return waypoint;
    }

    let direction = heading / length;
    let offset = DVec2::new(direction.y, -direction.x);
    waypoint + offset * track.width() * RACING_LINE_OFFSET
}

pub fn braking_point(track: &Track, corner_index: usize, speed: f64) -> BrakingPoint {
    let corner = track.waypoint(corner_index);
    let previous = track.waypoint(previous_waypoint(track, corner_index));
    let approach_length = corner.distance(previous);
    let distance = speed * BRAKING_FACTOR * BRAKING_SCALE;

    let ratio = if approach_length > 0.0 {
        (distance / approach_length).min(1.0)
    } else {
        0.0
    };

    BrakingPoint {
        position: corner - (corner - previous) * ratio,
        distance,
    }
}

pub fn corner_angles(track: &Track, index: usize) -> CornerAngles {
    let previous = track.waypoint(previous_waypoint(track, index));
    let current = track.waypoint(index);
    let next = track.waypoint(next_waypoint(track, index));

    let entry_heading = current - previous;
    let exit_heading = next - current;
    let entry = entry_heading.y.atan2(entry_heading.x);
    let exit = exit_heading.y.atan2(exit_heading.x);

    let mut corner = exit - entry;
    while corner > PI {
        corner -= 2.0 * PI;
    }
    while corner < -PI {
        corner += 2.0 * PI;
    }

    CornerAngles {
        entry,
        exit,
        corner,
        is_left_turn: corner > 0.0,
        is_right_turn: corner < 0.0,
    }
}

pub fn recommended_speed(track: &Track, index: usize, base_speed: f64) -> f64 {
    let severity = corner_angles(track, index).corner.abs();
    let speed = base_speed * CRUISE_MULTIPLIER;

    if severity > PI / 3.0 {
        speed * 0.4 // hairpin
    } else if severity > PI / 4.0 {
        speed * 0.6
    } else if severity > PI / 6.0 {
        speed * 0.8
    } else {
        speed
    }
}

pub fn track_length(track: &Track) -> f64 {
    track
        .segments()
        .map(|(_, start, end)| start.distance(end))
        .sum()
}

/// Walk `distance` along the centre line from `from`, a point on segment
/// `segment_index`. Open tracks stop at their last waypoint.
pub fn point_along_track(track: &Track, segment_index: usize, from: DVec2, distance: f64) -> DVec2 {
    if track_length(track) == 0.0 {
        return from;
    }

    let segment_count = track.segment_count();
    let mut segment = segment_index % segment_count;
    let mut position = from;
    let mut remaining = distance;
    loop {
        if remaining <= 0.0 {
            return position;
        }
        let (_, end) = track.segment(segment);
        let to_end = position.distance(end);
        if to_end >= remaining {
            return position + (end - position) * (remaining / to_end);
        }
        if !track.is_closed() && segment + 1 == segment_count {
            return end;
        }
        remaining -= to_end;
        position = end;
        segment = (segment + 1) % segment_count;
    }
}

/// How far around the lap `point` is, as a percentage of the arc index.
pub fn track_progress_percent(track: &Track, point: DVec2) -> f64 {
    let arc = nearest_track_segment(track, point).parametric_position;
    arc / track.waypoints().len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{level_track, Direction};

    fn square() -> Track {
        Track::new(
            "square",
            vec![
                DVec2::new(0.0, 0.0),
                DVec2::new(100.0, 0.0),
                DVec2::new(100.0, 100.0),
                DVec2::new(0.0, 100.0),
            ],
            40.0,
            true,
            Direction::Clockwise,
        )
        .unwrap()
    }

    #[test]
    fn test_next_waypoint_wraps() {
        let track = square();
        assert_eq!(next_waypoint(&track, 1), 2);
        assert_eq!(next_waypoint(&track, 3), 0);
    }

    #[test]
    fn test_racing_line_offset() {
        let track = square();
        // heading +x along the top edge, offset toward -y
        let point = racing_line_point(&track, 0);
        assert!(point.abs_diff_eq(DVec2::new(0.0, -10.0), 1e-9));
    }

    #[test]
    fn test_braking_point_clamps_to_previous_waypoint() {
        let track = square();
        let near = braking_point(&track, 1, 4.0);
        assert!((near.distance - 24.0).abs() < 1e-9);
        assert!(near.position.abs_diff_eq(DVec2::new(76.0, 0.0), 1e-9));

        let far = braking_point(&track, 1, 100.0);
        assert!(far.position.abs_diff_eq(DVec2::new(0.0, 0.0), 1e-9));
    }

    #[test]
    fn test_square_corners_are_quarter_turns() {
        let track = square();
        let angles = corner_angles(&track, 1);
        assert!((angles.corner - PI / 2.0).abs() < 1e-9);
        assert!(angles.is_left_turn);
        assert!(!angles.is_right_turn);
    }

    #[test]
    fn test_corner_angle_is_normalized() {
        let track = level_track(5).unwrap();
        for index in 0..track.waypoints().len() {
            let corner = corner_angles(&track, index).corner;
            assert!(corner >= -PI && corner <= PI);
        }
    }

    #[test]
    fn test_point_along_track_rounds_corners() {
        let track = square();
        let ahead = point_along_track(&track, 0, DVec2::new(50.0, 0.0), 30.0);
        assert!(ahead.abs_diff_eq(DVec2::new(80.0, 0.0), 1e-9));

        let around = point_along_track(&track, 0, DVec2::new(90.0, 0.0), 30.0);
        assert!(around.abs_diff_eq(DVec2::new(100.0, 20.0), 1e-9));

        let wrapped = point_along_track(&track, 3, DVec2::new(0.0, 10.0), 30.0);
        assert!(wrapped.abs_diff_eq(DVec2::new(20.0, 0.0), 1e-9));
    }

    #[test]
    fn test_point_along_open_track_stops_at_end() {
        let track = Track::new(
            "line",
            vec![DVec2::new(0.0, 0.0), DVec2::new(100.0, 0.0)],
            20.0,
            false,
            Direction::Clockwise,
        )
        .unwrap();
        let end = point_along_track(&track, 0, DVec2::new(90.0, 0.0), 50.0);
        assert!(end.abs_diff_eq(DVec2::new(100.0, 0.0), 1e-9));
    }

    #[test]
    fn test_recommended_speed_slows_for_sharp_corners() {
        let track = square();
        // a right angle counts as a hairpin
        assert!((recommended_speed(&track, 1, 4.0) - 4.0).abs() < 1e-9);

        let straight = Track::new(
            "straight",
            vec![DVec2::new(0.0, 0.0), DVec2::new(50.0, 0.0), DVec2::new(100.0, 0.0)],
            20.0,
            false,
            Direction::Clockwise,
        )
        .unwrap();
        assert!((recommended_speed(&straight, 1, 4.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_track_length() {
        assert!((track_length(&square()) - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_track_progress_percent() {
        let track = square();
        assert!((track_progress_percent(&track, DVec2::new(0.0, 0.0))).abs() < 1e-9);
        assert!((track_progress_percent(&track, DVec2::new(100.0, 50.0)) - 37.5).abs() < 1e-9);
    }
}

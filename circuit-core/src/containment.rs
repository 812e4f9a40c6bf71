use glam::DVec2;

use crate::geometry::nearest_track_segment;
use crate::track::Track;

pub fn is_on_track(track: &Track, point: DVec2) -> bool {
    nearest_track_segment(track, point).distance <= track.half_width()
}

/// Pull an off-track point back onto the drivable band. The result sits
/// `half_width - player_radius` from the centerline, on the same side the
/// player left from. On-track points come back unchanged.
pub fn constrain_to_track(track: &Track, point: DVec2, player_radius: f64) -> DVec2 {
    let nearest = nearest_track_segment(track, point);
    if nearest.distance <= track.half_width() {
        return point;
    }

    let toward_center = nearest.closest_point - point;
    let length = toward_center.length();
    if length == 0.0 {
        return nearest.closest_point;
    }

    let push_distance = track.half_width() - player_radius;
    nearest.closest_point - (toward_center / length) * push_distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{level_track, Direction, TOTAL_LEVELS};

    const PLAYER_RADIUS: f64 = 12.0;

    fn straight() -> Track {
        Track::new(
            "straight",
            vec![DVec2::new(0.0, 0.0), DVec2::new(100.0, 0.0)],
            40.0,
            false,
            Direction::Clockwise,
        )
        .unwrap()
    }

    #[test]
    fn test_every_waypoint_is_on_track() {
        for level in 1..=TOTAL_LEVELS {
            let track = level_track(level).unwrap();
            for &waypoint in track.waypoints() {
                assert!(is_on_track(&track, waypoint));
            }
        }
    }

    #[test]
    fn test_just_outside_the_band() {
        let track = straight();
        assert!(is_on_track(&track, DVec2::new(50.0, 20.0)));
        assert!(!is_on_track(&track, DVec2::new(50.0, 21.0)));
        assert!(!is_on_track(&track, DVec2::new(-21.0, 0.0)));
    }

    #[test]
    fn test_far_point_is_off_every_level() {
        for level in 1..=TOTAL_LEVELS {
            let track = level_track(level).unwrap();
            assert!(!is_on_track(&track, DVec2::new(-500.0, -500.0)));
        }
    }

    #[test]
    fn test_on_track_point_unchanged() {
        let track = straight();
        let point = DVec2::new(30.0, -15.0);
        assert_eq!(constrain_to_track(&track, point, PLAYER_RADIUS), point);
    }

    #[test]
    fn test_off_track_point_pulled_into_band() {
        let track = straight();
        let corrected = constrain_to_track(&track, DVec2::new(50.0, 35.0), PLAYER_RADIUS);
        // pushed to half_width - radius = 8 on the same side
        assert!(corrected.abs_diff_eq(DVec2::new(50.0, 8.0), 1e-9));
        assert!(is_on_track(&track, corrected));
    }

    #[test]
    fn test_constrain_is_idempotent() {
        let track = level_track(2).unwrap();
        let samples = [
            DVec2::new(0.0, 0.0),
            DVec2::new(800.0, 600.0),
            DVec2::new(400.0, 300.0),
            DVec2::new(120.0, 480.0),
            DVec2::new(410.0, 40.0),
        ];
        for point in samples {
            let once = constrain_to_track(&track, point, PLAYER_RADIUS);
            let twice = constrain_to_track(&track, once, PLAYER_RADIUS);
            assert_eq!(once, twice);
            assert!(is_on_track(&track, once));
        }
    }
}

use glam::DVec2;

use crate::track::Track;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentProjection {
    pub distance: f64,
    pub closest_point: DVec2,
    // how far along the segment the closest point sits, in [0, 1]
    pub fraction: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackProjection {
    pub segment_index: usize,
    pub distance: f64,
    pub closest_point: DVec2,
    /// `segment_index + fraction`, a continuous arc index in
    /// `[0, waypoints.len())` used to order positions along the track.
    pub parametric_position: f64,
}

/// Project `point` onto the segment `start..end`, clamping to the endpoints.
pub fn distance_to_segment(point: DVec2, start: DVec2, end: DVec2) -> SegmentProjection {
    let segment = end - start;
    let length_squared = segment.length_squared();

    if length_squared == 0.0 {
        // the segment is a single point
        return SegmentProjection {
            distance: point.distance(start),
            closest_point: start,
            fraction: 0.0,
        };
    }

    let fraction = ((point - start).dot(segment) / length_squared).clamp(0.0, 1.0);
    let closest_point = start + segment * fraction;

    SegmentProjection {
        distance: point.distance(closest_point),
        closest_point,
        fraction,
    }
}

pub fn nearest_track_segment(track: &Track, point: DVec2) -> TrackProjection {
    let mut best = TrackProjection {
        segment_index: 0,
        distance: f64::INFINITY,
        closest_point: track.start(),
        parametric_position: 0.0,
    };

    for (index, start, end) in track.segments() {
        let projection = distance_to_segment(point, start, end);
        // strict comparison: on an exact tie the earlier segment wins
        if projection.distance < best.distance {
            best = TrackProjection {
                segment_index: index,
                distance: projection.distance,
                closest_point: projection.closest_point,
                parametric_position: index as f64 + projection.fraction,
            };
        }
    }

    best
}

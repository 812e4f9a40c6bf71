use glam::DVec2;

use crate::error::TrackError;

mod checkpoints;
mod levels;

pub use checkpoints::*;
pub use levels::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Clockwise,
    Counterclockwise,
}

// The centerline of a drivable band. Waypoint order is the direction of
// travel, and a waypoint's index is its identity within the track.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    name: String,
    waypoints: Vec<DVec2>,
    width: f64,
    closed: bool,
    direction: Direction,
}

impl Track {
    pub fn new(
        name: impl Into<String>,
        waypoints: Vec<DVec2>,
        width: f64,
        closed: bool,
        direction: Direction,
    ) -> Result<Track, TrackError> {
        let name = name.into();
        if waypoints.len() < 2 {
            return Err(TrackError::TooFewWaypoints {
                name,
                count: waypoints.len(),
            });
        }
        if !width.is_finite() || width <= 0.0 {
            return Err(TrackError::InvalidWidth { name, width });
        }

        Ok(Track {
            name,
            waypoints,
            width,
            closed,
            direction,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn waypoints(&self) -> &[DVec2] {
        &self.waypoints
    }

    pub fn waypoint(&self, index: usize) -> DVec2 {
        self.waypoints[index % self.waypoints.len()]
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn start(&self) -> DVec2 {
        self.waypoints[0]
    }

    /// Number of segments; a closed track also has the one joining the last
    /// waypoint back to the first.
    pub fn segment_count(&self) -> usize {
        if self.closed {
            self.waypoints.len()
        } else {
            self.waypoints.len() - 1
        }
    }

    pub fn segment(&self, index: usize) -> (DVec2, DVec2) {
        let n = self.waypoints.len();
        (self.waypoints[index % n], self.waypoints[(index + 1) % n])
    }

    pub fn segments(&self) -> impl Iterator<Item = (usize, DVec2, DVec2)> + '_ {
        (0..self.segment_count()).map(move |i| {
            let (start, end) = self.segment(i);
            (i, start, end)
        })
    }
}

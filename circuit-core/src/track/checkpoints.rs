use glam::DVec2;

use super::Track;

pub type CheckpointID = usize;

pub const MAX_CHECKPOINTS: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    pub id: CheckpointID,
    pub waypoint_index: usize,
    pub label: String,
}

impl Checkpoint {
    pub fn position(&self, track: &Track) -> DVec2 {
        track.waypoint(self.waypoint_index)
    }
}

// Spread k = min(5, n/2) checkpoints evenly over the waypoints, skipping the
// start so the first one is never under the grid.
pub fn derive_checkpoints(track: &Track) -> Vec<Checkpoint> {
    let n = track.waypoints().len();
    let k = MAX_CHECKPOINTS.min(n / 2);

    (0..k)
        .map(|i| Checkpoint {
            id: i,
            waypoint_index: ((i + 1) * n / (k + 1)) % n,
            label: format!("Checkpoint {}", i + 1),
        })
        .collect()
}

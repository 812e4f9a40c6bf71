use glam::DVec2;

use crate::geometry::nearest_track_segment;
use crate::track::{Checkpoint, CheckpointID, Track};
use crate::CaptureMode;


pub type LapNumber = u32;

pub const DEFAULT_LAPS_REQUIRED: LapNumber = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaceProgress {
    // joined but no race running for this player yet
    NotRacing,
    Racing {
        next_checkpoint: CheckpointID,
        completed_laps: LapNumber,
    },
    Finished {
        completed_laps: LapNumber,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    // join, level load, replay or advance
    Start,
    // the current target checkpoint was captured this tick
    CheckpointReached,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaceSignal {
    CheckpointPassed { id: CheckpointID },
    LapCompleted { completed_laps: LapNumber },
    RaceComplete { completed_laps: LapNumber },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RaceRules {
    pub checkpoint_count: usize,
    pub laps_required: LapNumber,
}

impl Default for RaceProgress {
    fn default() -> Self {
        RaceProgress::NotRacing
    }
}

impl RaceProgress {
    /// The single transition function for a player's race. Returns the next
    /// state and at most one signal describing what happened.
    pub fn apply(self, event: ProgressEvent, rules: RaceRules) -> (RaceProgress, Option<RaceSignal>) {
        match (self, event) {
            (_, ProgressEvent::Start) => (
                RaceProgress::Racing {
                    next_checkpoint: 0,
                    completed_laps: 0,
                },
                None,
            ),
            (
                RaceProgress::Racing {
                    next_checkpoint,
                    completed_laps,
                },
                ProgressEvent::CheckpointReached,
            ) if rules.checkpoint_count > 0 => {
                let passed = next_checkpoint;
                let next_checkpoint = (next_checkpoint + 1) % rules.checkpoint_count;
                if next_checkpoint != 0 {
                    return (
                        RaceProgress::Racing {
                            next_checkpoint,
                            completed_laps,
                        },
                        Some(RaceSignal::CheckpointPassed { id: passed }),
                    );
                }

                let completed_laps = completed_laps + 1;
                if completed_laps >= rules.laps_required {
                    (
                        RaceProgress::Finished { completed_laps },
                        Some(RaceSignal::RaceComplete { completed_laps }),
                    )
                } else {
                    (
                        RaceProgress::Racing {
                            next_checkpoint,
                            completed_laps,
                        },
                        Some(RaceSignal::LapCompleted { completed_laps }),
                    )
                }
            }
            // nothing to capture outside a running race
            (state, ProgressEvent::CheckpointReached) => (state, None),
        }
    }

    pub fn target_checkpoint(&self) -> Option<CheckpointID> {
        match self {
            RaceProgress::Racing {
                next_checkpoint, ..
            } => Some(*next_checkpoint),
            _ => None,
        }
    }

    pub fn completed_laps(&self) -> LapNumber {
        match self {
            RaceProgress::NotRacing => 0,
            RaceProgress::Racing { completed_laps, .. }
            | RaceProgress::Finished { completed_laps } => *completed_laps,
        }
    }

    pub fn is_racing(&self) -> bool {
        matches!(self, RaceProgress::Racing { .. })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, RaceProgress::Finished { .. })
    }

    // render/debug only: checkpoints already taken on the current lap
    pub fn has_passed(&self, id: CheckpointID) -> bool {
        match self {
            RaceProgress::Racing {
                next_checkpoint, ..
            } => id < *next_checkpoint,
            RaceProgress::Finished { .. } => true,
            RaceProgress::NotRacing => false,
        }
    }
}

/// Decides whether a player at `position` has taken `checkpoint`.
pub trait CheckpointCapture {
    fn captures(&self, track: &Track, checkpoint: &Checkpoint, position: DVec2) -> bool;
}

/// Capture anywhere within a full track width of the checkpoint waypoint,
/// whatever the approach direction.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProximityCapture;

impl CheckpointCapture for ProximityCapture {
    fn captures(&self, track: &Track, checkpoint: &Checkpoint, position: DVec2) -> bool {
        position.distance(checkpoint.position(track)) < track.width()
    }
}

/// Proximity capture that also requires the player to be on the segment
/// leading into the checkpoint, or at most half a segment past it.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArrivalCapture;

impl CheckpointCapture for ArrivalCapture {
    fn captures(&self, track: &Track, checkpoint: &Checkpoint, position: DVec2) -> bool {
        if !ProximityCapture.captures(track, checkpoint, position) {
            return false;
        }

        let arc_length = track.waypoints().len() as f64;
        let arc = nearest_track_segment(track, position).parametric_position;
        let behind = (checkpoint.waypoint_index as f64 - arc).rem_euclid(arc_length);
        behind <= 1.0 || arc_length - behind <= 0.5
    }
}

pub fn capture_for(mode: CaptureMode) -> Box<dyn CheckpointCapture> {
    match mode {
        CaptureMode::Proximity => Box::new(ProximityCapture),
        CaptureMode::Arrival => Box::new(ArrivalCapture),
    }
}

/// Run one progression check for a player standing at `position`.
pub fn check_progress(
    progress: RaceProgress,
    track: &Track,
    checkpoints: &[Checkpoint],
    position: DVec2,
    capture: &dyn CheckpointCapture,
    rules: RaceRules,
) -> (RaceProgress, Option<RaceSignal>) {
    match progress
        .target_checkpoint()
        .and_then(|id| checkpoints.get(id))
    {
        Some(checkpoint) if capture.captures(track, checkpoint, position) => {
            progress.apply(ProgressEvent::CheckpointReached, rules)
        }
        _ => (progress, None),
    }
}

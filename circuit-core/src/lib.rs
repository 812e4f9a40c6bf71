pub mod containment;
pub mod error;
pub mod geometry;
pub mod navigation;
pub mod networking;
pub mod player_inputs;
pub mod progress;
pub mod settings;
pub mod track;

pub use settings::{CaptureMode, Settings, GLOBAL_CONFIG};

pub type PlayerID = String;

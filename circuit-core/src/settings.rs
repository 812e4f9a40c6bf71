use config::{Config, ConfigError, File};
use lazy_static::lazy_static;
use serde::Deserialize;

use crate::progress::DEFAULT_LAPS_REQUIRED;

pub const DEFAULT_MOVE_SPEED: f64 = 4.0;
pub const DEFAULT_PLAYER_SIZE: f64 = 24.0;
pub const DEFAULT_WORLD_WIDTH: f64 = 800.0;
pub const DEFAULT_WORLD_HEIGHT: f64 = 600.0;
pub const DEFAULT_SPAWN_MARGIN: i64 = 50;

// which checkpoint capture predicate the race uses
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    Proximity,
    Arrival,
}

#[derive(Deserialize)]
pub struct Settings {
    pub port: String,
    pub server_address: String,
    pub server_tick_ms: u64,
    pub frame_ms: u64,

    pub move_speed: f64,
    pub player_size: f64,
    pub world_width: f64,
    pub world_height: f64,
    pub spawn_margin: i64,

    pub laps_required: u32,
    pub checkpoint_capture: CaptureMode,
}

impl Settings {
    fn new() -> Result<Settings, ConfigError> {
        let config = Config::builder()
            .set_default("port", "5000")?
            .set_default("server_address", "127.0.0.1")?
            .set_default("server_tick_ms", 15)?
            .set_default("frame_ms", 16)?
            .set_default("move_speed", DEFAULT_MOVE_SPEED)?
            .set_default("player_size", DEFAULT_PLAYER_SIZE)?
            .set_default("world_width", DEFAULT_WORLD_WIDTH)?
            .set_default("world_height", DEFAULT_WORLD_HEIGHT)?
            .set_default("spawn_margin", DEFAULT_SPAWN_MARGIN)?
            .set_default("laps_required", DEFAULT_LAPS_REQUIRED)?
            .set_default("checkpoint_capture", "proximity")?
            .add_source(File::with_name("config.yaml").required(false))
            .build()?;

        config.try_deserialize()
    }
}

lazy_static! {
    pub static ref GLOBAL_CONFIG: Settings = Settings::new().expect("failed to read config file");
}

use std::collections::HashMap;
use std::ops::RangeInclusive;

use glam::DVec2;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use circuit_core::networking::{ClientBoundEvent, PlayerRecord};
use circuit_core::settings::{DEFAULT_SPAWN_MARGIN, DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH};
use circuit_core::{PlayerID, Settings};

pub const CAR_IMAGES: [&str; 3] = ["car1.png", "car2.png", "car3.png"];

#[derive(Clone, Debug, PartialEq)]
pub enum Recipient {
    Player(PlayerID),
    AllExcept(PlayerID),
    All,
}

// an event together with who should receive it
#[derive(Clone, Debug, PartialEq)]
pub struct Outbound {
    pub recipient: Recipient,
    pub event: ClientBoundEvent,
}

/// The rectangle new cars are dropped into, inset from the world edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnArea {
    pub width: i64,
    pub height: i64,
    pub margin: i64,
}

impl Default for SpawnArea {
    fn default() -> Self {
        SpawnArea {
            width: DEFAULT_WORLD_WIDTH as i64,
            height: DEFAULT_WORLD_HEIGHT as i64,
            margin: DEFAULT_SPAWN_MARGIN,
        }
    }
}

impl From<&Settings> for SpawnArea {
    fn from(settings: &Settings) -> Self {
        let spawn = SpawnArea {
            width: settings.world_width as i64,
            height: settings.world_height as i64,
            margin: settings.spawn_margin,
        };
        if spawn.margin * 2 > spawn.width.min(spawn.height) {
            warn!(margin = spawn.margin, "spawn margin leaves no room, cars spawn at the world centre");
        }
        spawn
    }
}

impl SpawnArea {
    pub fn random_position<R: Rng>(&self, rng: &mut R) -> DVec2 {
        let x = rng.gen_range(Self::inset(self.width, self.margin));
        let y = rng.gen_range(Self::inset(self.height, self.margin));
        DVec2::new(x as f64, y as f64)
    }

    // a margin wider than half the extent collapses onto the middle
    fn inset(extent: i64, margin: i64) -> RangeInclusive<i64> {
        let extent = extent.max(0);
        let margin = margin.max(0).min(extent / 2);
        margin..=extent - margin
    }
}

/// Everyone who has joined the race, keyed by connection id. Every operation
/// returns the events the server should send in response.
pub struct Roster {
    players: HashMap<PlayerID, PlayerRecord>,
    spawn: SpawnArea,
}

impl Roster {
    pub fn new(spawn: SpawnArea) -> Self {
        Roster {
            players: HashMap::new(),
            spawn,
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, player_id: &str) -> Option<&PlayerRecord> {
        self.players.get(player_id)
    }

    /// Give the player a random car and spot. The joiner gets the whole
    /// roster, everyone else just the new record. Joining again re-rolls both.
    pub fn join<R: Rng>(&mut self, player_id: &PlayerID, rng: &mut R) -> Vec<Outbound> {
        let car_image = CAR_IMAGES
            .choose(rng)
            .copied()
            .unwrap_or(CAR_IMAGES[0])
            .to_string();
        let position = self.spawn.random_position(rng);

        let record = PlayerRecord {
            id: player_id.clone(),
            x: position.x,
            y: position.y,
            car_image,
        };
        info!(%player_id, car = %record.car_image, x = record.x, y = record.y, "player joined");
        self.players.insert(player_id.clone(), record.clone());

        vec![
            Outbound {
                recipient: Recipient::Player(player_id.clone()),
                event: ClientBoundEvent::roster(self.players.clone()),
            },
            Outbound {
                recipient: Recipient::AllExcept(player_id.clone()),
                event: ClientBoundEvent::joined(record),
            },
        ]
    }

    // moves from connections that never joined are dropped
    pub fn handle_move(&mut self, player_id: &PlayerID, position: DVec2) -> Vec<Outbound> {
        let record = match self.players.get_mut(player_id) {
            Some(record) => record,
            None => {
                debug!(%player_id, "ignoring move before join");
                return vec![];
            }
        };
        record.x = position.x;
        record.y = position.y;

        vec![Outbound {
            recipient: Recipient::AllExcept(player_id.clone()),
            event: ClientBoundEvent::moved(player_id.clone(), position.x, position.y),
        }]
    }

    pub fn leave(&mut self, player_id: &PlayerID) -> Vec<Outbound> {
        match self.players.remove(player_id) {
            Some(record) => {
                info!(%player_id, car = %record.car_image, "player left");
                vec![Outbound {
                    recipient: Recipient::All,
                    event: ClientBoundEvent::left(player_id.clone()),
                }]
            }
            None => vec![],
        }
    }
}

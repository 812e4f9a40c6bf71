use std::collections::HashMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::PlayerID;

// what every participant knows about a car: who drives it, where it is, and
// which sprite it uses
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlayerRecord {
    pub id: PlayerID,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub car_image: String,
}

impl PlayerRecord {
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerBoundEvent {
    JoinGame,
    PlayerMove { x: f64, y: f64 },
}

// Frames as they appear on the wire. The same event name carries different
// payload shapes, so every field is optional here and `resolve` decides what
// the frame means.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientBoundEvent {
    Assignment(AssignmentPayload),
    PlayerJoined(JoinedPayload),
    PlayerMoved(MovedPayload),
    PlayerLeft(LeftPayload),
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AssignmentPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerID>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct JoinedPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_players: Option<HashMap<PlayerID, PlayerRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerRecord>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MovedPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerID>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct LeftPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerID>,
}

/// An inbound event once its payload shape has been resolved.
#[derive(Clone, Debug, PartialEq)]
pub enum InboundMessage {
    // our own identity on this connection
    Assignment { player_id: PlayerID },
    // full roster, sent to us right after we join
    Roster(HashMap<PlayerID, PlayerRecord>),
    // someone else joined
    PlayerJoined(PlayerRecord),
    // a participant's full record rebroadcast
    PlayerSpawned(PlayerRecord),
    PlayerMoved { player_id: PlayerID, position: DVec2 },
    PlayerLeft { player_id: PlayerID },
}

impl ClientBoundEvent {
    pub fn assignment(player_id: PlayerID) -> Self {
        ClientBoundEvent::Assignment(AssignmentPayload {
            player_id: Some(player_id),
        })
    }

    pub fn roster(all_players: HashMap<PlayerID, PlayerRecord>) -> Self {
        ClientBoundEvent::PlayerJoined(JoinedPayload {
            all_players: Some(all_players),
            ..Default::default()
        })
    }

    pub fn joined(player: PlayerRecord) -> Self {
        ClientBoundEvent::PlayerJoined(JoinedPayload {
            player: Some(player),
            ..Default::default()
        })
    }

    pub fn spawned(player: PlayerRecord) -> Self {
        ClientBoundEvent::PlayerMoved(MovedPayload {
            player: Some(player),
            ..Default::default()
        })
    }

    pub fn moved(player_id: PlayerID, x: f64, y: f64) -> Self {
        ClientBoundEvent::PlayerMoved(MovedPayload {
            player_id: Some(player_id),
            x: Some(x),
            y: Some(y),
            ..Default::default()
        })
    }

    pub fn left(player_id: PlayerID) -> Self {
        ClientBoundEvent::PlayerLeft(LeftPayload {
            player_id: Some(player_id),
        })
    }

    /// Work out which message a frame is from the fields it carries. Frames
    /// missing the fields every shape needs resolve to `None`.
    pub fn resolve(self) -> Option<InboundMessage> {
        match self {
            ClientBoundEvent::Assignment(AssignmentPayload { player_id }) => {
                player_id.map(|player_id| InboundMessage::Assignment { player_id })
            }
            ClientBoundEvent::PlayerJoined(JoinedPayload {
                all_players,
                player,
            }) => match (all_players, player) {
                (Some(all_players), _) => Some(InboundMessage::Roster(all_players)),
                (None, Some(player)) => Some(InboundMessage::PlayerJoined(player)),
                (None, None) => None,
            },
            ClientBoundEvent::PlayerMoved(MovedPayload {
                player,
                player_id,
                x,
                y,
            }) => match (player, player_id, x, y) {
                (Some(player), ..) => Some(InboundMessage::PlayerSpawned(player)),
                (None, Some(player_id), Some(x), Some(y)) => Some(InboundMessage::PlayerMoved {
                    player_id,
                    position: DVec2::new(x, y),
                }),
                _ => None,
            },
            ClientBoundEvent::PlayerLeft(LeftPayload { player_id }) => {
                player_id.map(|player_id| InboundMessage::PlayerLeft { player_id })
            }
        }
    }
}

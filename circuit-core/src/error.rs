use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum TrackError {
    #[error("track {name:?} needs at least 2 waypoints, got {count}")]
    TooFewWaypoints { name: String, count: usize },

    #[error("track {name:?} has invalid width {width}")]
    InvalidWidth { name: String, width: f64 },
}

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("malformed event frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("websocket handshake failed: {0}")]
    Handshake(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

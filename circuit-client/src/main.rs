use std::process;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use circuit_client::game::{FinishAction, GameClient};
use circuit_client::input::Autopilot;
use circuit_client::session::{GameSession, SessionConfig};
use circuit_core::networking::ClientSideConnection;
use circuit_core::GLOBAL_CONFIG;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let url = format!("ws://{}:{}", GLOBAL_CONFIG.server_address, GLOBAL_CONFIG.port);
    let connection = match ClientSideConnection::connect(&url) {
        Ok(connection) => connection,
        Err(err) => {
            error!(%err, %url, "could not connect to game server");
            process::exit(1);
        }
    };
    info!("game client connected to {}", url);

    let session = GameSession::new(SessionConfig::from(&*GLOBAL_CONFIG));
    let mut game_client = GameClient::new(
        session,
        connection,
        Autopilot::default(),
        Duration::from_millis(GLOBAL_CONFIG.frame_ms),
        FinishAction::Advance,
    );
    game_client.run();
}

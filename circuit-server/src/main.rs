use std::process;

use tracing::error;
use tracing_subscriber::EnvFilter;

use circuit_core::GLOBAL_CONFIG;

mod game;
mod roster;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // kick off the relay loop
    let ip_addr = format!("0.0.0.0:{}", GLOBAL_CONFIG.port);
    let spawn = roster::SpawnArea::from(&*GLOBAL_CONFIG);
    match game::GameServer::new(ip_addr, spawn) {
        Ok(mut server) => server.start_loop(),
        Err(err) => {
            error!(%err, "could not start game server");
            process::exit(1);
        }
    }
}

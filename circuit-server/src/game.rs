use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener};
use std::thread;
use std::time::{Duration, Instant};

use glam::DVec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use circuit_core::error::NetworkError;
use circuit_core::networking::{
    ClientBoundEvent, PendingAccept, ServerBoundEvent, ServerSideAccept, ServerSideConnection, Uuid,
};
use circuit_core::{PlayerID, GLOBAL_CONFIG};

use crate::roster::{Outbound, Recipient, Roster, SpawnArea};

// a peer that has not finished its upgrade by then is dropped
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct GameServer {
    listener: TcpListener,
    pending: Vec<(PendingAccept, SocketAddr)>,
    connections: HashMap<PlayerID, ServerSideConnection>,
    roster: Roster,
    rng: StdRng,
}

impl GameServer {
    pub fn new(ip_addr: String, spawn: SpawnArea) -> Result<GameServer, NetworkError> {
        // start the TCP listening service
        let listener = TcpListener::bind(&ip_addr)?;
        listener.set_nonblocking(true)?;
        info!("game server now listening on {}", ip_addr);

        Ok(GameServer {
            listener,
            pending: vec![],
            connections: HashMap::new(),
            roster: Roster::new(spawn),
            rng: StdRng::from_entropy(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, NetworkError> {
        Ok(self.listener.local_addr()?)
    }

    // WARNING: this function never returns
    pub fn start_loop(&mut self) {
        let max_server_tick_duration = Duration::from_millis(GLOBAL_CONFIG.server_tick_ms);

        loop {
            let start_time = Instant::now();
            self.tick();

            // wait until server tick time has elapsed
            match max_server_tick_duration.checked_sub(start_time.elapsed()) {
                Some(remaining) => thread::sleep(remaining),
                None => warn!("server tick took longer than configured length"),
            }
        }
    }

    pub fn tick(&mut self) {
        self.acquire_new_connections();

        // poll for events and add them to the incoming packet queues
        self.connections
            .values_mut()
            .for_each(|con| con.fetch_incoming_packets());

        self.process_incoming_packets();
        self.drop_closed_connections();

        // empty outgoing packet queues and send to clients
        self.connections
            .values_mut()
            .for_each(|con| con.sync_outgoing());
    }

    // take every pending connection without blocking the tick
    fn acquire_new_connections(&mut self) {
        for (handshake, addr) in std::mem::take(&mut self.pending) {
            if handshake.elapsed() > HANDSHAKE_TIMEOUT {
                warn!(%addr, "websocket handshake timed out");
                continue;
            }
            self.settle_handshake(handshake.resume(), addr);
        }

        loop {
            match self.listener.accept() {
                Ok((stream, addr)) => self.settle_handshake(ServerSideConnection::accept(stream), addr),
                Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                Err(err) => {
                    warn!(%err, "couldn't get connecting client info");
                    break;
                }
            }
        }
    }

    fn settle_handshake(&mut self, progress: Result<ServerSideAccept, NetworkError>, addr: SocketAddr) {
        match progress {
            Ok(ServerSideAccept::Ready(mut connection)) => {
                let id = Uuid::new_v4().to_string();
                info!(player_id = %id, %addr, "new connection");
                if let Err(err) = connection.push_outgoing(&ClientBoundEvent::assignment(id.clone())) {
                    warn!(%err, "could not queue assignment");
                }
                self.connections.insert(id, connection);
            }
            Ok(ServerSideAccept::Pending(handshake)) => self.pending.push((handshake, addr)),
            Err(err) => warn!(%err, %addr, "websocket handshake failed"),
        }
    }

    // handle every packet in received order
    fn process_incoming_packets(&mut self) {
        let mut outbound = vec![];
        for (player_id, connection) in self.connections.iter_mut() {
            while let Some(packet) = connection.pop_incoming() {
                match packet {
                    ServerBoundEvent::JoinGame => {
                        outbound.extend(self.roster.join(player_id, &mut self.rng))
                    }
                    ServerBoundEvent::PlayerMove { x, y } => {
                        outbound.extend(self.roster.handle_move(player_id, DVec2::new(x, y)))
                    }
                }
            }
        }
        self.dispatch(outbound);
    }

    fn drop_closed_connections(&mut self) {
        let closed: Vec<PlayerID> = self
            .connections
            .iter()
            .filter(|(_, con)| con.is_closed())
            .map(|(id, _)| id.clone())
            .collect();

        let mut outbound = vec![];
        for player_id in closed {
            info!(%player_id, "connection closed");
            self.connections.remove(&player_id);
            outbound.extend(self.roster.leave(&player_id));
        }
        self.dispatch(outbound);
    }

    fn dispatch(&mut self, outbound: Vec<Outbound>) {
        for Outbound { recipient, event } in outbound {
            for (player_id, connection) in self.connections.iter_mut() {
                let addressed = match &recipient {
                    Recipient::Player(target) => target == player_id,
                    Recipient::AllExcept(sender) => sender != player_id,
                    Recipient::All => true,
                };
                if !addressed {
                    continue;
                }
                if let Err(err) = connection.push_outgoing(&event) {
                    warn!(%err, %player_id, "could not queue event");
                }
            }
        }
    }
}

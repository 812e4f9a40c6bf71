use std::collections::VecDeque;

use tracing::warn;

use circuit_core::networking::{ClientBoundEvent, ClientSideConnection, ServerBoundEvent};

/// A bidirectional, ordered event channel to the relay server. Sends are
/// fire-and-forget.
pub trait Transport {
    fn send(&mut self, event: ServerBoundEvent);

    /// Everything that has arrived since the last poll, in arrival order.
    fn poll_incoming(&mut self) -> Vec<ClientBoundEvent>;

    fn flush(&mut self) {}

    fn is_closed(&self) -> bool {
        false
    }
}

impl Transport for ClientSideConnection {
    fn send(&mut self, event: ServerBoundEvent) {
        if let Err(err) = self.push_outgoing(&event) {
            warn!(%err, ?event, "dropping outbound event");
        }
    }

    fn poll_incoming(&mut self) -> Vec<ClientBoundEvent> {
        self.fetch_incoming_packets();
        let mut ret = vec![];
        while let Some(packet) = self.pop_incoming() {
            ret.push(packet);
        }
        ret
    }

    fn flush(&mut self) {
        self.sync_outgoing();
    }

    fn is_closed(&self) -> bool {
        ClientSideConnection::is_closed(self)
    }
}

// In-process stand-in for a server: records what was sent and hands back
// whatever was queued with `deliver`.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    pub sent: Vec<ServerBoundEvent>,
    inbound: VecDeque<ClientBoundEvent>,
    flushes: usize,
    closed: bool,
}

impl MemoryTransport {
    pub fn deliver(&mut self, event: ClientBoundEvent) {
        self.inbound.push_back(event);
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl Transport for MemoryTransport {
    fn send(&mut self, event: ServerBoundEvent) {
        self.sent.push(event);
    }

    fn poll_incoming(&mut self) -> Vec<ClientBoundEvent> {
        self.inbound.drain(..).collect()
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

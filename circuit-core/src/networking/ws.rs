use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::marker::PhantomData;
use std::net::TcpStream;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use tungstenite::handshake::server::{NoCallback, ServerHandshake};
use tungstenite::handshake::{HandshakeError, MidHandshake};
pub use tungstenite::stream::MaybeTlsStream;
pub use tungstenite::{Message, WebSocket};

use crate::error::NetworkError;

// One JSON text frame per event in each direction. Reads and writes never
// block; packets queue up here between `fetch_incoming_packets` and
// `sync_outgoing`.
pub struct WSConnection<S: Read + Write, In, Out> {
    socket: WebSocket<S>,
    incoming_packets: VecDeque<In>,
    outgoing_packets: VecDeque<Message>,
    closed: bool,
    outgoing_kind: PhantomData<Out>,
}

/// Where a server-side handshake stands after one nonblocking attempt.
pub enum AcceptProgress<In, Out> {
    Ready(WSConnection<TcpStream, In, Out>),
    Pending(PendingAccept),
}

// A handshake whose peer has not finished talking yet. Resume it on a
// later tick; it never waits on the socket.
pub struct PendingAccept {
    handshake: MidHandshake<ServerHandshake<TcpStream, NoCallback>>,
    started: Instant,
}

impl PendingAccept {
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn resume<In, Out>(self) -> Result<AcceptProgress<In, Out>, NetworkError>
    where
        In: DeserializeOwned,
        Out: Serialize,
    {
        WSConnection::<TcpStream, In, Out>::settle_handshake(self.handshake.handshake(), self.started)
    }
}

impl<In, Out> WSConnection<TcpStream, In, Out>
where
    In: DeserializeOwned,
    Out: Serialize,
{
    /// Server side: start the handshake on a freshly accepted stream. A peer
    /// that has not sent its upgrade request yet comes back as `Pending`.
    pub fn accept(tcp_stream: TcpStream) -> Result<AcceptProgress<In, Out>, NetworkError> {
        tcp_stream.set_nonblocking(true)?;
        // disable the Nagle algorithm to allow for real-time transfers
        tcp_stream.set_nodelay(true)?;
        Self::settle_handshake(tungstenite::accept(tcp_stream), Instant::now())
    }

    fn settle_handshake(
        result: Result<WebSocket<TcpStream>, HandshakeError<ServerHandshake<TcpStream, NoCallback>>>,
        started: Instant,
    ) -> Result<AcceptProgress<In, Out>, NetworkError> {
        match result {
            Ok(socket) => Ok(AcceptProgress::Ready(Self::from_socket(socket))),
            Err(HandshakeError::Interrupted(handshake)) => {
                Ok(AcceptProgress::Pending(PendingAccept { handshake, started }))
            }
            Err(HandshakeError::Failure(err)) => Err(NetworkError::Handshake(err.to_string())),
        }
    }
}

impl<In, Out> WSConnection<MaybeTlsStream<TcpStream>, In, Out>
where
    In: DeserializeOwned,
    Out: Serialize,
{
    /// Client side: connect to a `ws://` url.
    pub fn connect(url: &str) -> Result<Self, NetworkError> {
        let (socket, _response) = tungstenite::connect(url)?;
        if let MaybeTlsStream::Plain(stream) = socket.get_ref() {
            stream.set_nonblocking(true)?;
            stream.set_nodelay(true)?;
        }
        Ok(Self::from_socket(socket))
    }
}

impl<S, In, Out> WSConnection<S, In, Out>
where
    S: Read + Write,
    In: DeserializeOwned,
    Out: Serialize,
{
    fn from_socket(socket: WebSocket<S>) -> Self {
        WSConnection {
            socket,
            incoming_packets: VecDeque::new(),
            outgoing_packets: VecDeque::new(),
            closed: false,
            outgoing_kind: PhantomData,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // read frames until the socket runs dry
    pub fn fetch_incoming_packets(&mut self) {
        while !self.closed {
            match self.socket.read_message() {
                Ok(Message::Text(text)) => match serde_json::from_str::<In>(&text) {
                    Ok(packet) => self.incoming_packets.push_back(packet),
                    Err(err) => debug!(%err, frame = %text, "skipping malformed frame"),
                },
                Ok(Message::Close(_)) => self.closed = true,
                // pings are answered by tungstenite itself
                Ok(_) => {}
                Err(tungstenite::Error::Io(ref err)) if err.kind() == ErrorKind::WouldBlock => break,
                Err(tungstenite::Error::ConnectionClosed) | Err(tungstenite::Error::AlreadyClosed) => {
                    self.closed = true
                }
                Err(err) => {
                    warn!(%err, "websocket read failed, dropping connection");
                    self.closed = true;
                }
            }
        }
    }

    pub fn pop_incoming(&mut self) -> Option<In> {
        self.incoming_packets.pop_front()
    }

    pub fn push_outgoing(&mut self, packet: &Out) -> Result<(), NetworkError> {
        let json_string = serde_json::to_string(packet)?;
        self.outgoing_packets.push_back(Message::Text(json_string));
        Ok(())
    }

    // send packets on this connection until exhausted
    pub fn sync_outgoing(&mut self) {
        if self.closed || !self.socket.can_write() {
            self.closed = true;
            self.outgoing_packets.clear();
            return;
        }

        while let Some(message) = self.outgoing_packets.pop_front() {
            match self.socket.write_message(message) {
                Ok(()) => {}
                // tungstenite keeps the frame buffered; it goes out with a later flush
                Err(tungstenite::Error::Io(ref err)) if err.kind() == ErrorKind::WouldBlock => {}
                Err(err) => {
                    warn!(%err, "websocket write failed, dropping connection");
                    self.closed = true;
                    self.outgoing_packets.clear();
                    return;
                }
            }
        }

        match self.socket.write_pending() {
            Ok(()) => {}
            Err(tungstenite::Error::Io(ref err)) if err.kind() == ErrorKind::WouldBlock => {}
            Err(err) => {
                warn!(%err, "websocket flush failed, dropping connection");
                self.closed = true;
            }
        }
    }

    pub fn close(&mut self) {
        if !self.closed {
            let _ = self.socket.close(None);
            let _ = self.socket.write_pending();
            self.closed = true;
        }
    }
}

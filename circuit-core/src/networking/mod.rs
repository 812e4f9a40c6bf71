mod events;
pub mod ws;

pub use events::*;
pub use uuid::Uuid;
pub use ws::PendingAccept;

pub type ServerSideConnection = ws::WSConnection<std::net::TcpStream, ServerBoundEvent, ClientBoundEvent>;
pub type ServerSideAccept = ws::AcceptProgress<ServerBoundEvent, ClientBoundEvent>;
pub type ClientSideConnection = ws::WSConnection<
    ws::MaybeTlsStream<std::net::TcpStream>,
    ClientBoundEvent,
    ServerBoundEvent,
>;

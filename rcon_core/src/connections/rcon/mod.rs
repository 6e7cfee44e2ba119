pub mod packet;
pub mod rcon_client;

pub use packet::{Packet, RconCodec};
pub use rcon_client::{SourceRconClient, SourceRconConnector};

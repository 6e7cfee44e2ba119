pub mod client;
pub mod errors;
pub mod rcon;

pub use client::{Connector, Endpoint, RemoteClient};
pub use errors::RconError;
pub use rcon::{SourceRconClient, SourceRconConnector};

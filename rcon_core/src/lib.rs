pub mod connections;
pub mod core;
pub mod storage;
pub mod utils;

// re‑export ergonomic entry points
pub use crate::connections::{
    Connector, Endpoint, RconError, RemoteClient, SourceRconClient, SourceRconConnector,
};
pub use crate::core::console::Console;
pub use crate::core::session::{ConsoleSession, SessionError, SessionState};

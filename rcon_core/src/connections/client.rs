use std::fmt;

use async_trait::async_trait;

use super::errors::RconError;

/// Address, port and password of one remote administrative endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub address: String,
    pub port: u16,
    pub password: String,
}

impl Endpoint {
    pub fn new(address: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port,
            password: password.into(),
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// A remote command endpoint the console can talk to.
///
/// `execute` sends one command line and resolves to the full response text.
/// Failures are split by [`RconError::invalidates_session`]: credential and
/// protocol failures end the session, everything else is transient.
#[async_trait]
pub trait RemoteClient: Send {
    async fn execute(&mut self, command: &str) -> Result<String, RconError>;
}

/// Builds a not-yet-connected [`RemoteClient`] for an endpoint.
///
/// Construction never touches the network; the first `execute` does.
pub trait Connector: Send {
    fn client(&self, endpoint: &Endpoint) -> Box<dyn RemoteClient>;
}

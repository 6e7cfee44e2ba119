use std::{io, time::Duration};

use log::{debug, info, warn};
use thiserror::Error;

use crate::connections::{Connector, Endpoint, RconError, RemoteClient};
use crate::core::prompt::Prompter;
use crate::storage::{FavoritesStore, DEFAULT_PORT};

/// Command sent right after connecting; any reply proves the endpoint is live.
pub const LIVENESS_PROBE: &str = "ping";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not connected to a server")]
    NotConnected,
    #[error("could not connect to {endpoint}: {source}")]
    ConnectFailed {
        endpoint: String,
        #[source]
        source: RconError,
    },
    /// Credential or protocol failure; the session has been dropped.
    #[error("disconnected from {endpoint}: {source}")]
    Invalidated {
        endpoint: String,
        #[source]
        source: RconError,
    },
    /// Anything else; the session is still connected.
    #[error("remote call failed: {0}")]
    Transient(#[source] RconError),
    #[error("could not read password: {0}")]
    Input(#[source] io::Error),
}

struct ActiveConnection {
    endpoint: Endpoint,
    client: Box<dyn RemoteClient>,
}

/// The console's zero-or-one connection to a remote endpoint.
///
/// State only changes once a remote call has completed, so dropping an
/// in-flight `connect` or `dispatch` future (Ctrl-C, an outer timeout)
/// leaves the session exactly as it was.
pub struct ConsoleSession {
    connector: Box<dyn Connector>,
    active: Option<ActiveConnection>,
    timeout: Option<Duration>,
}

impl ConsoleSession {
    pub fn new(connector: Box<dyn Connector>) -> Self {
        Self {
            connector,
            active: None,
            timeout: None,
        }
    }

    /// Bounds every remote call; `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn state(&self) -> SessionState {
        if self.active.is_some() {
            SessionState::Connected
        } else {
            SessionState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.active.as_ref().map(|a| &a.endpoint)
    }

    /// Address of the connected endpoint.
    pub fn host(&self) -> Option<&str> {
        self.endpoint().map(|e| e.address.as_str())
    }

    /// Resolves `identifier` (favorite alias or raw address) and connects.
    pub async fn connect(
        &mut self,
        identifier: &str,
        password: Option<String>,
        port: Option<u16>,
        favorites: &FavoritesStore,
        prompter: &mut dyn Prompter,
    ) -> Result<Endpoint, SessionError> {
        let endpoint = resolve_endpoint(identifier, password, port, favorites, prompter)?;
        self.connect_endpoint(endpoint.clone()).await?;
        Ok(endpoint)
    }

    /// Builds a client for `endpoint` and probes it. Success replaces any
    /// current connection; failure leaves the session disconnected.
    pub async fn connect_endpoint(&mut self, endpoint: Endpoint) -> Result<(), SessionError> {
        info!("Connecting to {endpoint}");
        let mut client = self.connector.client(&endpoint);
        match call(client.as_mut(), LIVENESS_PROBE, self.timeout).await {
            Ok(_) => {
                info!("Connected to {endpoint}");
                self.active = Some(ActiveConnection { endpoint, client });
                Ok(())
            }
            Err(source) => {
                warn!("Liveness probe to {endpoint} failed: {source}");
                self.active = None;
                Err(SessionError::ConnectFailed {
                    endpoint: endpoint.to_string(),
                    source,
                })
            }
        }
    }

    /// Drops the active connection, if any, and returns its endpoint.
    pub fn disconnect(&mut self) -> Option<Endpoint> {
        let active = self.active.take()?;
        info!("Disconnected from {}", active.endpoint);
        Some(active.endpoint)
    }

    /// Sends `text` verbatim to the connected endpoint.
    pub async fn dispatch(&mut self, text: &str) -> Result<String, SessionError> {
        let timeout = self.timeout;
        let active = self.active.as_mut().ok_or(SessionError::NotConnected)?;
        match call(active.client.as_mut(), text, timeout).await {
            Ok(response) => Ok(response),
            Err(source) if source.invalidates_session() => {
                let endpoint = active.endpoint.to_string();
                warn!("Dropping session to {endpoint}: {source}");
                self.active = None;
                Err(SessionError::Invalidated { endpoint, source })
            }
            Err(source) => {
                warn!("Transient failure on {}: {source}", active.endpoint);
                Err(SessionError::Transient(source))
            }
        }
    }
}

/// Favorites win outright: a known alias uses the stored address, port and
/// password, whatever the caller passed. Raw addresses prompt for a missing
/// password and fall back to [`DEFAULT_PORT`].
pub fn resolve_endpoint(
    identifier: &str,
    password: Option<String>,
    port: Option<u16>,
    favorites: &FavoritesStore,
    prompter: &mut dyn Prompter,
) -> Result<Endpoint, SessionError> {
    if let Some(profile) = favorites.get(identifier) {
        debug!("'{identifier}' is a favorite");
        return Ok(Endpoint::new(
            &profile.address,
            profile.port,
            &profile.password,
        ));
    }
    let password = match password {
        Some(password) => password,
        None => prompter
            .read_password("Password: ")
            .map_err(SessionError::Input)?,
    };
    Ok(Endpoint::new(
        identifier,
        port.unwrap_or(DEFAULT_PORT),
        password,
    ))
}

async fn call(
    client: &mut dyn RemoteClient,
    command: &str,
    timeout: Option<Duration>,
) -> Result<String, RconError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, client.execute(command))
            .await
            .unwrap_or(Err(RconError::TimedOut(limit))),
        None => client.execute(command).await,
    }
}

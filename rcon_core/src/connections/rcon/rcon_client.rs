use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use super::packet::{
    Packet, RconCodec, MAX_OUTGOING_BODY, SERVERDATA_AUTH, SERVERDATA_AUTH_RESPONSE, SERVERDATA_EXECCOMMAND,
    SERVERDATA_RESPONSE_VALUE,
};
use crate::connections::{
    client::{Connector, Endpoint, RemoteClient},
    errors::RconError,
};

/// Source RCON client speaking the TCP protocol.
///
/// The socket is opened and authenticated lazily on the first `execute`.
/// Any failure drops it, so the following call starts from a fresh
/// connection. Every request carries a fresh id; packets for older ids
/// (left over from a cancelled call) are skipped.
pub struct SourceRconClient {
    endpoint: Endpoint,
    framed: Option<Framed<TcpStream, RconCodec>>,
    next_id: i32,
}

impl SourceRconClient {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            framed: None,
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> i32 {
        let id = self.next_id;
        // -1 is reserved for the auth-failure reply.
        self.next_id = if id == i32::MAX { 1 } else { id + 1 };
        id
    }

    async fn open(&mut self) -> Result<Framed<TcpStream, RconCodec>, RconError> {
        info!("Connecting to RCON endpoint {}", self.endpoint);
        let stream =
            TcpStream::connect((self.endpoint.address.as_str(), self.endpoint.port)).await?;
        let mut framed = Framed::new(stream, RconCodec);

        let auth_id = self.allocate_id();
        framed
            .send(Packet::new(auth_id, SERVERDATA_AUTH, self.endpoint.password.as_str()))
            .await?;

        loop {
            let packet = framed.next().await.ok_or(RconError::Closed)??;
            if packet.kind != SERVERDATA_AUTH_RESPONSE {
                // Source sends an empty RESPONSE_VALUE ahead of the auth reply.
                continue;
            }
            if packet.id == -1 {
                return Err(RconError::AuthRejected(self.endpoint.to_string()));
            }
            if packet.id == auth_id {
                info!("Authenticated with {}", self.endpoint);
                return Ok(framed);
            }
            debug!("Ignoring auth reply for stale id {}", packet.id);
        }
    }

    async fn round_trip(&mut self, command: &str) -> Result<String, RconError> {
        if self.framed.is_none() {
            let framed = self.open().await?;
            self.framed = Some(framed);
        }
        let request_id = self.allocate_id();
        let sentinel_id = self.allocate_id();
        let framed = self.framed.as_mut().ok_or(RconError::Closed)?;

        debug!("exec #{request_id}: {command:?}");
        framed
            .send(Packet::new(request_id, SERVERDATA_EXECCOMMAND, command))
            .await?;
        // The server answers requests in order, so the echo of this empty
        // packet marks the end of a possibly multi-packet response.
        framed
            .send(Packet::new(sentinel_id, SERVERDATA_RESPONSE_VALUE, ""))
            .await?;

        let mut response = String::new();
        loop {
            let packet = framed.next().await.ok_or(RconError::Closed)??;
            if packet.kind != SERVERDATA_RESPONSE_VALUE {
                debug!("Skipping packet of type {}", packet.kind);
            } else if packet.id == request_id {
                response.push_str(&packet.body);
            } else if packet.id == sentinel_id {
                debug!("exec #{request_id}: {} bytes", response.len());
                return Ok(response);
            } else {
                debug!("Skipping stale packet #{}", packet.id);
            }
        }
    }
}

#[async_trait]
impl RemoteClient for SourceRconClient {
    async fn execute(&mut self, command: &str) -> Result<String, RconError> {
        if command.len() > MAX_OUTGOING_BODY {
            return Err(RconError::CommandTooLong {
                len: command.len(),
                limit: MAX_OUTGOING_BODY,
            });
        }
        match self.round_trip(command).await {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!("RCON call to {} failed: {}", self.endpoint, e);
                self.framed = None;
                Err(e)
            }
        }
    }
}

/// Builds [`SourceRconClient`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceRconConnector;

impl Connector for SourceRconConnector {
    fn client(&self, endpoint: &Endpoint) -> Box<dyn RemoteClient> {
        Box::new(SourceRconClient::new(endpoint.clone()))
    }
}

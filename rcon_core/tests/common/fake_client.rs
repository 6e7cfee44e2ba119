//! A deterministic **in‑process stand‑in** for a remote RCON endpoint.
//!
//! *  **From the test’s perspective**
//!    * Script replies per command with `FakeServer::reply`, or queue one-off
//!      replies with `FakeServer::push`.
//!    * Inspect every endpoint a client was built for and every command that
//!      reached the "server" via `FakeServer::endpoints` / `FakeServer::commands`.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use rcon_core::{Connector, Endpoint, RconError, RemoteClient};

#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    AuthFailure,
    TransportFailure,
    /// Never answers.
    Hang,
}

#[derive(Default)]
struct FakeState {
    scripted: HashMap<String, Reply>,
    queued: VecDeque<Reply>,
    commands: Vec<String>,
    endpoints: Vec<Endpoint>,
}

/// Shared handle to the fake server; clone it into the connector.
#[derive(Clone, Default)]
pub struct FakeServer {
    state: Arc<Mutex<FakeState>>,
}

impl FakeServer {
    /// A server that answers `ping` with `pong` and everything else with "".
    pub fn new() -> Self {
        let server = Self::default();
        server.reply("ping", Reply::Text("pong".into()));
        server
    }

    pub fn reply(&self, command: &str, reply: Reply) {
        self.state
            .lock()
            .unwrap()
            .scripted
            .insert(command.to_string(), reply);
    }

    /// Answer the next command (whatever it is) with `reply`.
    pub fn push(&self, reply: Reply) {
        self.state.lock().unwrap().queued.push_back(reply);
    }

    pub fn commands(&self) -> Vec<String> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.state.lock().unwrap().endpoints.clone()
    }

    pub fn connector(&self) -> Box<dyn Connector> {
        Box::new(FakeConnector {
            server: self.clone(),
        })
    }

    fn answer(&self, command: &str) -> Reply {
        let mut state = self.state.lock().unwrap();
        state.commands.push(command.to_string());
        if let Some(reply) = state.queued.pop_front() {
            return reply;
        }
        state
            .scripted
            .get(command)
            .cloned()
            .unwrap_or_else(|| Reply::Text(String::new()))
    }
}

struct FakeConnector {
    server: FakeServer,
}

impl Connector for FakeConnector {
    fn client(&self, endpoint: &Endpoint) -> Box<dyn RemoteClient> {
        self.server
            .state
            .lock()
            .unwrap()
            .endpoints
            .push(endpoint.clone());
        Box::new(FakeClient {
            server: self.server.clone(),
            host: endpoint.address.clone(),
        })
    }
}

struct FakeClient {
    server: FakeServer,
    host: String,
}

#[async_trait]
impl RemoteClient for FakeClient {
    async fn execute(&mut self, command: &str) -> Result<String, RconError> {
        // The lock guard is dropped inside `answer`, before any await.
        match self.server.answer(command) {
            Reply::Text(text) => Ok(text),
            Reply::AuthFailure => Err(RconError::AuthRejected(self.host.clone())),
            Reply::TransportFailure => Err(RconError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            ))),
            Reply::Hang => std::future::pending().await,
        }
    }
}

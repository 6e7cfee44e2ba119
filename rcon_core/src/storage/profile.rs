use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::InvalidPort;

pub const DEFAULT_PORT: u16 = 27015;

/// A saved server: JSON looks like
/// `{ "address":"tf.example.com", "port":27015, "password":"hunter2" }`.
/// The alias is the key of the surrounding map.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub address: String,
    #[serde(default = "default_port", with = "port_number")]
    pub port: u16,
    #[serde(default)]
    pub password: String,
}

impl ConnectionProfile {
    pub fn new(address: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port,
            password: password.into(),
        }
    }
}

impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Parses interactive port input. Blank means [`DEFAULT_PORT`].
pub fn parse_port(input: &str) -> Result<u16, InvalidPort> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(DEFAULT_PORT);
    }
    trimmed
        .parse::<u16>()
        .map_err(|_| InvalidPort(trimmed.to_string()))
}

/// Writes ports as integers; reads integers or numeric strings, since older
/// settings files stored whatever was typed at the prompt.
mod port_number {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(port: &u16, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u16(*port)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u16, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u16),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(port) => Ok(port),
            Raw::Text(text) => super::parse_port(&text).map_err(de::Error::custom),
        }
    }
}

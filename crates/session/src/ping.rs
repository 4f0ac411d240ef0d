//! Server list ping document
//!
//! The status response payload is a JSON document with a fixed shape
//! that has been stable since 1.7. The proxy answers pings locally so a
//! server list refresh never touches a backend.

use serde::{Deserialize, Serialize};
use waypoint_core::{Result, WaypointError};
use waypoint_protocol::ProtocolVersion;

/// Version block of the ping document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingVersion {
    /// Display name shown when the client's version is incompatible
    pub name: String,
    /// Wire number the server claims to speak
    pub protocol: i32,
}

/// One sampled player entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingSamplePlayer {
    pub name: String,
    pub id: String,
}

/// Player counts block of the ping document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingPlayers {
    pub max: u32,
    pub online: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sample: Vec<PingSamplePlayer>,
}

/// The full server list entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerPing {
    pub version: PingVersion,
    pub players: PingPlayers,
    /// Message of the day, as a JSON text document
    pub description: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

impl ServerPing {
    /// Ping document advertising the proxy itself
    pub fn new(motd: &str, max_players: u32, version: ProtocolVersion) -> Self {
        Self {
            version: PingVersion {
                name: version.name().to_owned(),
                protocol: version.wire_number(),
            },
            players: PingPlayers {
                max: max_players,
                online: 0,
                sample: Vec::new(),
            },
            description: serde_json::json!({ "text": motd }),
            favicon: None,
        }
    }

    /// Serialize into the status response payload
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| WaypointError::Config(format!("Unserializable ping document: {}", e)))
    }

    /// Parse a status response payload
    pub fn from_json(payload: &str) -> Result<Self> {
        serde_json::from_str(payload)
            .map_err(|e| WaypointError::Framing(format!("Malformed ping document: {}", e)))
    }
}

//! Login progression and reconfiguration tracking
//!
//! Phase movement around login is split across the two directions of a
//! connection pair, so two flows cooperate:
//!
//! - [`BackendLoginFlow`] watches clientbound traffic. On revisions
//!   without the configuration sub-protocol, login success is the last
//!   login packet and the flow moves straight to play. On 1.20.2+ the
//!   transition waits for the client's acknowledgement instead. Later,
//!   a reconfiguration order moves play back to config.
//! - [`ClientLoginFlow`] watches serverbound traffic: the login
//!   acknowledgement enters config, the configuration-finish
//!   acknowledgement enters play, and the reconfiguration
//!   acknowledgement re-enters config.
//!
//! All packets are declined so they still reach the other side; these
//! flows only observe.

use waypoint_protocol::packets::config::FinishConfigurationPacket;
use waypoint_protocol::packets::login::{
    DisconnectPacket, LoginAcknowledgedPacket, LoginSuccessPacket, ServerLoginPacket,
};
use waypoint_protocol::packets::play::{
    ReconfigureAcknowledgedPacket, StartReconfigurationPacket,
};
use waypoint_protocol::{Phase, ProtocolVersion, SessionHandler};

/// Clientbound login/reconfiguration observer for the backend session
#[derive(Debug)]
pub struct BackendLoginFlow {
    version: ProtocolVersion,
    next_phase: Option<Phase>,
}

impl BackendLoginFlow {
    pub fn new(version: ProtocolVersion) -> Self {
        Self {
            version,
            next_phase: None,
        }
    }
}

impl SessionHandler for BackendLoginFlow {
    fn handle_login_success(&mut self, packet: &LoginSuccessPacket) -> bool {
        match packet.username() {
            Ok(username) => tracing::info!(username, "backend accepted login"),
            Err(_) => tracing::info!("backend accepted login"),
        }
        if !self.version.supports_reconfiguration() {
            // Pre-1.20.2 has no acknowledgement step; login success is
            // immediately followed by play traffic
            self.next_phase = Some(Phase::Play);
        }
        false
    }

    fn handle_start_reconfiguration(&mut self, _packet: &StartReconfigurationPacket) -> bool {
        self.next_phase = Some(Phase::Config);
        false
    }

    fn handle_disconnect(&mut self, packet: &DisconnectPacket) -> bool {
        if let Ok(reason) = packet.reason() {
            tracing::info!(reason, "backend disconnected the client");
        }
        false
    }

    fn take_phase_transition(&mut self) -> Option<Phase> {
        self.next_phase.take()
    }
}

/// Serverbound acknowledgement observer for the client session
#[derive(Debug, Default)]
pub struct ClientLoginFlow {
    username: Option<String>,
    next_phase: Option<Phase>,
}

impl ClientLoginFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Username announced at login start, once seen
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

impl SessionHandler for ClientLoginFlow {
    fn handle_server_login(&mut self, packet: &ServerLoginPacket) -> bool {
        if let Ok(username) = packet.username() {
            tracing::debug!(username, "login requested");
            self.username = Some(username.to_owned());
        }
        false
    }

    fn handle_login_acknowledged(&mut self, _packet: &LoginAcknowledgedPacket) -> bool {
        self.next_phase = Some(Phase::Config);
        false
    }

    fn handle_finish_configuration(&mut self, _packet: &FinishConfigurationPacket) -> bool {
        // Serverbound finish-configuration is the client acknowledging
        // the end of the phase
        self.next_phase = Some(Phase::Play);
        false
    }

    fn handle_reconfigure_acknowledged(&mut self, _packet: &ReconfigureAcknowledgedPacket) -> bool {
        self.next_phase = Some(Phase::Config);
        false
    }

    fn take_phase_transition(&mut self) -> Option<Phase> {
        self.next_phase.take()
    }
}

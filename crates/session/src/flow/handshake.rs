//! Handshake routing

use waypoint_protocol::packets::handshake::HandshakePacket;
use waypoint_protocol::packets::login::DisconnectPacket;
use waypoint_protocol::{Direction, Packet, Phase, ProtocolVersion, SessionHandler};

/// Routes a fresh connection to the status or login sub-protocol.
///
/// The handshake is declined so the original frame is forwarded to the
/// backend untouched; this flow only extracts the negotiated version and
/// the requested phase for the engine to apply.
///
/// Unknown wire numbers are tolerated for status (the client only wants
/// the server list entry) and refused for login, where every subsequent
/// byte depends on the version bracket.
#[derive(Debug, Default)]
pub struct HandshakeFlow {
    version: Option<ProtocolVersion>,
    next_phase: Option<Phase>,
    outbox: Vec<(Direction, Packet)>,
}

impl HandshakeFlow {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionHandler for HandshakeFlow {
    fn handle_handshake(&mut self, packet: &HandshakePacket) -> bool {
        let known = packet.known_version();
        match packet.requested_phase() {
            Some(Phase::Status) => {
                // Status works against any revision; pin unknown ones to
                // the newest layout we speak
                self.version = Some(known.unwrap_or(ProtocolVersion::MAXIMUM));
                self.next_phase = Some(Phase::Status);
            }
            Some(Phase::Login) => match known {
                Some(version) => {
                    self.version = Some(version);
                    self.next_phase = Some(Phase::Login);
                }
                None => {
                    tracing::warn!(
                        wire_number = packet.protocol_version,
                        "login refused for unsupported protocol version"
                    );
                    self.next_phase = Some(Phase::Login);
                    self.outbox.push((
                        Direction::Clientbound,
                        Packet::Disconnect(DisconnectPacket::new(
                            r#"{"text":"Unsupported client version"}"#.into(),
                        )),
                    ));
                }
            },
            _ => {
                tracing::warn!(intent = packet.next_phase, "handshake with unroutable intent");
            }
        }
        false
    }

    fn take_version_selection(&mut self) -> Option<ProtocolVersion> {
        self.version.take()
    }

    fn take_phase_transition(&mut self) -> Option<Phase> {
        self.next_phase.take()
    }

    fn drain_outbox(&mut self) -> Vec<(Direction, Packet)> {
        std::mem::take(&mut self.outbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_intent_selects_status_phase() {
        let mut flow = HandshakeFlow::new();
        let packet = HandshakePacket::new(764, "play.example.net".into(), 25565, 1);

        assert!(!flow.handle_handshake(&packet));
        assert_eq!(flow.take_version_selection(), Some(ProtocolVersion::V1_20_2));
        assert_eq!(flow.take_phase_transition(), Some(Phase::Status));
        // Hooks are one-shot
        assert_eq!(flow.take_phase_transition(), None);
    }

    #[test]
    fn test_unknown_version_status_is_pinned_to_maximum() {
        let mut flow = HandshakeFlow::new();
        let packet = HandshakePacket::new(99_999, "host".into(), 25565, 1);

        flow.handle_handshake(&packet);
        assert_eq!(flow.take_version_selection(), Some(ProtocolVersion::MAXIMUM));
        assert_eq!(flow.take_phase_transition(), Some(Phase::Status));
    }

    #[test]
    fn test_unknown_version_login_is_refused() {
        let mut flow = HandshakeFlow::new();
        let packet = HandshakePacket::new(99_999, "host".into(), 25565, 2);

        flow.handle_handshake(&packet);
        assert_eq!(flow.take_version_selection(), None);
        assert_eq!(flow.take_phase_transition(), Some(Phase::Login));

        let outbox = flow.drain_outbox();
        assert_eq!(outbox.len(), 1);
        assert!(matches!(outbox[0], (Direction::Clientbound, Packet::Disconnect(_))));
    }
}

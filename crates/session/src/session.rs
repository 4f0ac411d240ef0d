//! # Session Engine
//!
//! One [`Session`] per side of a proxied connection pair. The session
//! owns the negotiated protocol version, the active phase and the active
//! handler, and drives the decode → dispatch → (re-encode) cycle for
//! every complete frame the transport delivers.
//!
//! # Concurrency
//!
//! A session is exclusively owned by its connection's worker task; all
//! mutation happens from that task. The packet registry and version
//! catalog it reads are process-wide immutable state, shared without
//! locking. Closing a connection simply drops the session; no in-flight
//! state outlives it.

use bytes::{Bytes, BytesMut};
use waypoint_core::{ConnectionId, Result, WaypointError};
use waypoint_protocol::codec::{read_varint, write_varint};
use waypoint_protocol::{
    state_registry, Direction, Packet, PassthroughHandler, Phase, ProtocolVersion, SessionHandler,
};

/// What the engine decided about one submitted frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The handler consumed the packet; nothing is forwarded
    Consumed,
    /// The handler declined; forward the original frame unmodified
    Forward(Bytes),
}

/// Codec/dispatch state for one side of one connection
pub struct Session {
    id: ConnectionId,
    version: ProtocolVersion,
    phase: Phase,
    handler: Box<dyn SessionHandler>,
}

impl Session {
    /// New session in the handshake phase.
    ///
    /// The version is provisional until the handshake announces the real
    /// one; the handshake packet's own layout is version-independent, so
    /// starting at the catalog minimum is safe.
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            version: ProtocolVersion::MINIMUM,
            phase: Phase::Handshake,
            handler: Box::new(PassthroughHandler),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_closed(&self) -> bool {
        self.phase == Phase::Closed
    }

    /// Adopt the negotiated protocol version
    pub fn set_protocol_version(&mut self, version: ProtocolVersion) {
        tracing::debug!(session = %self.id, %version, "protocol version negotiated");
        self.version = version;
    }

    /// Swap the active handler for the current phase
    pub fn set_handler(&mut self, handler: Box<dyn SessionHandler>) {
        self.handler = handler;
    }

    /// Move to the next phase, validating the transition.
    ///
    /// Play → Config additionally requires a protocol revision with the
    /// configuration sub-protocol.
    pub fn set_active_phase(&mut self, phase: Phase) -> Result<()> {
        if !self.phase.can_transition_to(phase) {
            return Err(WaypointError::PhaseTransition(format!(
                "{} -> {} is not a legal transition",
                self.phase, phase
            )));
        }
        if self.phase == Phase::Play
            && phase == Phase::Config
            && !self.version.supports_reconfiguration()
        {
            return Err(WaypointError::PhaseTransition(format!(
                "play -> config requires 1.20.2+, connection is {}",
                self.version
            )));
        }
        tracing::debug!(session = %self.id, from = %self.phase, to = %phase, "phase transition");
        self.phase = phase;
        Ok(())
    }

    /// Terminal transition, legal from every phase
    pub fn close(&mut self) {
        tracing::debug!(session = %self.id, phase = %self.phase, "session closed");
        self.phase = Phase::Closed;
    }

    /// Decode, sanity-check and dispatch one complete frame.
    ///
    /// The transport guarantees the frame is a complete length-delimited
    /// unit with decompression/decryption already applied. The leading
    /// varint is the packet id; the rest is the payload.
    ///
    /// # Errors
    /// - [`WaypointError::UnknownPacket`] when no registry bracket covers
    ///   the id for this (phase, direction, version). The caller decides
    ///   whether that is fatal; in the play phase it must be, since an
    ///   unknown payload cannot be safely reinterpreted.
    /// - [`WaypointError::Framing`] for payloads outside the packet's
    ///   expected length bounds, malformed primitives, or trailing bytes
    ///   after a complete decode.
    pub fn submit_frame(&mut self, direction: Direction, mut frame: BytesMut) -> Result<FrameOutcome> {
        let original = frame.clone().freeze();
        let id = read_varint(&mut frame)?;

        let kind = state_registry()
            .resolve_by_id(self.phase, direction, self.version, id)
            .ok_or_else(|| WaypointError::UnknownPacket {
                id,
                context: format!("{} {} {}", self.phase, direction, self.version),
            })?;

        // Cheap first line of defense before attempting a full decode
        let payload_len = frame.len();
        let min = kind.expected_min_length(direction, self.version);
        if payload_len < min {
            return Err(WaypointError::Framing(format!(
                "{:?} payload of {} bytes below expected minimum {}",
                kind, payload_len, min
            )));
        }
        if let Some(max) = kind.expected_max_length(direction, self.version) {
            if payload_len > max {
                return Err(WaypointError::Framing(format!(
                    "{:?} payload of {} bytes above expected maximum {}",
                    kind, payload_len, max
                )));
            }
        }

        let packet = kind.decode(&mut frame, direction, self.version)?;
        if !frame.is_empty() {
            return Err(WaypointError::Framing(format!(
                "{:?} left {} undecoded trailing bytes",
                kind,
                frame.len()
            )));
        }

        let consumed = packet.handle(self.handler.as_mut());
        tracing::trace!(
            session = %self.id,
            phase = %self.phase,
            %direction,
            id = %format_args!("0x{:02X}", id),
            kind = ?kind,
            consumed,
            "frame dispatched"
        );

        if let Some(version) = self.handler.take_version_selection() {
            self.set_protocol_version(version);
        }
        if let Some(next) = self.handler.take_phase_transition() {
            self.set_active_phase(next)?;
        }

        Ok(if consumed {
            FrameOutcome::Consumed
        } else {
            FrameOutcome::Forward(original)
        })
    }

    /// Encode a packet into a ready-to-frame byte payload (leading id
    /// included) for the given travel direction.
    pub fn encode_for_send(&self, direction: Direction, packet: &Packet) -> Result<Bytes> {
        let kind = packet.kind();
        let id = state_registry()
            .resolve_id(self.phase, direction, self.version, kind)
            .ok_or_else(|| {
                WaypointError::UnsupportedVersion(format!(
                    "{:?} is not registered {} in {} for {}",
                    kind, direction, self.phase, self.version
                ))
            })?;

        let mut buf = BytesMut::new();
        write_varint(&mut buf, id);
        packet.encode(&mut buf, direction, self.version)?;
        Ok(buf.freeze())
    }

    /// Encode everything the active handler queued for sending.
    ///
    /// Returns (direction, frame payload) pairs in queue order. Called
    /// after [`submit_frame`](Self::submit_frame) so synthesized replies
    /// are encoded against the post-transition phase.
    pub fn drain_outbox(&mut self) -> Result<Vec<(Direction, Bytes)>> {
        let queued = self.handler.drain_outbox();
        let mut frames = Vec::with_capacity(queued.len());
        for (direction, packet) in queued {
            frames.push((direction, self.encode_for_send(direction, &packet)?));
        }
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_protocol::packets::play::KeepAlivePacket;
    use waypoint_protocol::PacketKind;

    fn play_session(version: ProtocolVersion) -> Session {
        let mut session = Session::new(ConnectionId::new(1));
        session.set_protocol_version(version);
        session.set_active_phase(Phase::Login).unwrap();
        session.set_active_phase(Phase::Play).unwrap();
        session
    }

    #[test]
    fn test_declined_packet_forwards_original_bytes() {
        let mut session = play_session(ProtocolVersion::V1_12_2);
        let frame = session
            .encode_for_send(
                Direction::Serverbound,
                &Packet::KeepAlive(KeepAlivePacket::new(99)),
            )
            .unwrap();

        let outcome = session
            .submit_frame(Direction::Serverbound, BytesMut::from(&frame[..]))
            .unwrap();
        assert_eq!(outcome, FrameOutcome::Forward(frame));
    }

    #[test]
    fn test_unknown_play_id_is_an_error() {
        let mut session = play_session(ProtocolVersion::V1_20_2);
        let mut frame = BytesMut::new();
        write_varint(&mut frame, 0x7E);
        frame.extend_from_slice(&[0xAA; 4]);

        let result = session.submit_frame(Direction::Serverbound, frame);
        assert!(matches!(
            result,
            Err(WaypointError::UnknownPacket { id: 0x7E, .. })
        ));
    }

    #[test]
    fn test_length_hint_rejects_oversized_frame() {
        let mut session = play_session(ProtocolVersion::V1_12_2);

        // Keep-alive at 1.12.2 is exactly 8 bytes; send 12
        let id = state_registry()
            .resolve_id(
                Phase::Play,
                Direction::Serverbound,
                ProtocolVersion::V1_12_2,
                PacketKind::KeepAlive,
            )
            .unwrap();
        let mut frame = BytesMut::new();
        write_varint(&mut frame, id);
        frame.extend_from_slice(&[0; 12]);

        assert!(matches!(
            session.submit_frame(Direction::Serverbound, frame),
            Err(WaypointError::Framing(_))
        ));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut session = Session::new(ConnectionId::new(2));
        session.set_active_phase(Phase::Status).unwrap();

        // A status ping with a 9-byte payload fails the max-length hint;
        // craft a request (max 0) with one stray byte instead
        let id = state_registry()
            .resolve_id(
                Phase::Status,
                Direction::Serverbound,
                session.version(),
                PacketKind::StatusRequest,
            )
            .unwrap();
        let mut frame = BytesMut::new();
        write_varint(&mut frame, id);
        frame.extend_from_slice(&[0x01]);

        assert!(matches!(
            session.submit_frame(Direction::Serverbound, frame),
            Err(WaypointError::Framing(_))
        ));

        // The same packet without the stray byte is fine
        let mut frame = BytesMut::new();
        write_varint(&mut frame, id);
        let outcome = session.submit_frame(Direction::Serverbound, frame).unwrap();
        assert!(matches!(outcome, FrameOutcome::Forward(_)));
    }

    #[test]
    fn test_illegal_phase_transition_rejected() {
        let mut session = Session::new(ConnectionId::new(3));
        assert!(session.set_active_phase(Phase::Play).is_err());
        assert!(session.set_active_phase(Phase::Status).is_ok());
        assert!(session.set_active_phase(Phase::Login).is_err());
    }

    #[test]
    fn test_reconfiguration_requires_modern_version() {
        let mut old = play_session(ProtocolVersion::V1_19_4);
        assert!(old.set_active_phase(Phase::Config).is_err());

        let mut modern = play_session(ProtocolVersion::V1_20_2);
        assert!(modern.set_active_phase(Phase::Config).is_ok());
    }

    #[test]
    fn test_close_from_any_phase() {
        let mut session = play_session(ProtocolVersion::V1_20_2);
        session.close();
        assert!(session.is_closed());

        // Nothing decodes after close: no registry covers the phase
        let mut frame = BytesMut::new();
        write_varint(&mut frame, 0x00);
        assert!(session
            .submit_frame(Direction::Serverbound, frame)
            .is_err());
    }

    #[test]
    fn test_encode_for_unregistered_bracket_fails() {
        let mut session = Session::new(ConnectionId::new(4));
        session.set_protocol_version(ProtocolVersion::V1_7_6);
        session.set_active_phase(Phase::Login).unwrap();

        // Set-compression does not exist before 1.8
        let packet = Packet::SetCompression(
            waypoint_protocol::packets::login::SetCompressionPacket::new(256),
        );
        assert!(matches!(
            session.encode_for_send(Direction::Clientbound, &packet),
            Err(WaypointError::UnsupportedVersion(_))
        ));
    }
}

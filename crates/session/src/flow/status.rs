//! Local status answering

use waypoint_protocol::packets::status::{
    StatusPingPacket, StatusRequestPacket, StatusResponsePacket,
};
use waypoint_protocol::{Direction, Packet, SessionHandler};

use crate::ping::ServerPing;

/// Answers server list pings on behalf of the backends.
///
/// Both status packets are consumed: the response is synthesized from
/// the proxy's own ping document and the latency probe is echoed back,
/// so status traffic never reaches a backend.
#[derive(Debug)]
pub struct StatusFlow {
    payload: String,
    outbox: Vec<(Direction, Packet)>,
}

impl StatusFlow {
    /// Pre-serializes the ping document once per connection
    pub fn new(ping: &ServerPing) -> waypoint_core::Result<Self> {
        Ok(Self {
            payload: ping.to_json()?,
            outbox: Vec::new(),
        })
    }
}

impl SessionHandler for StatusFlow {
    fn handle_status_request(&mut self, _packet: &StatusRequestPacket) -> bool {
        self.outbox.push((
            Direction::Clientbound,
            Packet::StatusResponse(StatusResponsePacket::new(self.payload.clone())),
        ));
        true
    }

    fn handle_status_ping(&mut self, packet: &StatusPingPacket) -> bool {
        self.outbox.push((
            Direction::Clientbound,
            Packet::StatusPing(StatusPingPacket::new(packet.payload)),
        ));
        true
    }

    fn drain_outbox(&mut self) -> Vec<(Direction, Packet)> {
        std::mem::take(&mut self.outbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_protocol::ProtocolVersion;

    fn flow() -> StatusFlow {
        let ping = ServerPing::new("motd", 64, ProtocolVersion::V1_20_2);
        StatusFlow::new(&ping).unwrap()
    }

    #[test]
    fn test_request_is_consumed_and_answered() {
        let mut flow = flow();
        assert!(flow.handle_status_request(&StatusRequestPacket));

        let outbox = flow.drain_outbox();
        assert_eq!(outbox.len(), 1);
        let (direction, packet) = &outbox[0];
        assert_eq!(*direction, Direction::Clientbound);
        match packet {
            Packet::StatusResponse(response) => {
                assert!(response.status().unwrap().contains("motd"));
            }
            other => panic!("unexpected outbox packet {:?}", other),
        }
    }

    #[test]
    fn test_ping_echoes_payload() {
        let mut flow = flow();
        assert!(flow.handle_status_ping(&StatusPingPacket::new(0x1122_3344_5566_7788)));

        let outbox = flow.drain_outbox();
        match &outbox[0].1 {
            Packet::StatusPing(pong) => assert_eq!(pong.payload, 0x1122_3344_5566_7788),
            other => panic!("unexpected outbox packet {:?}", other),
        }
    }
}

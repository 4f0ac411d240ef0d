//! End-to-end session scenarios: a connection pair driven frame by
//! frame the way the transport pump drives it.

use bytes::BytesMut;
use uuid::Uuid;
use waypoint_core::{ConnectionId, WaypointError};
use waypoint_protocol::packets::handshake::HandshakePacket;
use waypoint_protocol::packets::login::{LoginSuccessPacket, ServerLoginPacket};
use waypoint_protocol::packets::status::{StatusPingPacket, StatusRequestPacket};
use waypoint_protocol::{Direction, Packet, Phase, ProtocolVersion};
use waypoint_session::{
    BackendLoginFlow, ClientLoginFlow, FrameOutcome, HandshakeFlow, ServerPing, Session,
    StatusFlow,
};

fn submit(session: &mut Session, direction: Direction, frame: &[u8]) -> FrameOutcome {
    session
        .submit_frame(direction, BytesMut::from(frame))
        .expect("frame should decode")
}

#[test]
fn status_exchange_is_answered_locally() {
    let mut client = Session::new(ConnectionId::next());
    client.set_handler(Box::new(HandshakeFlow::new()));

    // Client dials with the status intent
    let handshake = Packet::Handshake(HandshakePacket::new(
        ProtocolVersion::V1_20_2.wire_number(),
        "play.example.net".into(),
        25565,
        1,
    ));
    let frame = client
        .encode_for_send(Direction::Serverbound, &handshake)
        .unwrap();
    let outcome = submit(&mut client, Direction::Serverbound, &frame);
    assert!(matches!(outcome, FrameOutcome::Forward(_)));
    assert_eq!(client.phase(), Phase::Status);
    assert_eq!(client.version(), ProtocolVersion::V1_20_2);

    // Swap in the status flow for the new phase
    let ping = ServerPing::new("A Waypoint Proxy", 100, ProtocolVersion::V1_20_2);
    client.set_handler(Box::new(StatusFlow::new(&ping).unwrap()));

    // The request is consumed and answered from the outbox
    let frame = client
        .encode_for_send(
            Direction::Serverbound,
            &Packet::StatusRequest(StatusRequestPacket),
        )
        .unwrap();
    assert_eq!(
        submit(&mut client, Direction::Serverbound, &frame),
        FrameOutcome::Consumed
    );
    let replies = client.drain_outbox().unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].0, Direction::Clientbound);

    // The reply decodes as a response carrying our motd
    let mut reply = BytesMut::from(&replies[0].1[..]);
    let outcome = client.submit_frame(Direction::Clientbound, reply.split()).unwrap();
    assert!(matches!(outcome, FrameOutcome::Consumed | FrameOutcome::Forward(_)));

    // The latency probe echoes bit-for-bit
    let frame = client
        .encode_for_send(
            Direction::Serverbound,
            &Packet::StatusPing(StatusPingPacket::new(7_654_321)),
        )
        .unwrap();
    assert_eq!(
        submit(&mut client, Direction::Serverbound, &frame),
        FrameOutcome::Consumed
    );
    let echoes = client.drain_outbox().unwrap();
    assert_eq!(echoes[0].1, frame, "echo must match the probe bytes");
}

#[test]
fn modern_login_reaches_play_through_config() {
    let version = ProtocolVersion::V1_20_2;
    let mut client = Session::new(ConnectionId::next());
    let mut backend = Session::new(ConnectionId::next());
    client.set_handler(Box::new(HandshakeFlow::new()));

    // Handshake with the login intent, forwarded to the backend
    let handshake = Packet::Handshake(HandshakePacket::new(
        version.wire_number(),
        "play.example.net".into(),
        25565,
        2,
    ));
    let frame = client
        .encode_for_send(Direction::Serverbound, &handshake)
        .unwrap();
    let outcome = submit(&mut client, Direction::Serverbound, &frame);
    let FrameOutcome::Forward(forwarded) = outcome else {
        panic!("handshake must forward");
    };
    assert_eq!(client.phase(), Phase::Login);

    // Mirror negotiation onto the backend session, as the pump does
    backend.set_protocol_version(client.version());
    submit(&mut backend, Direction::Serverbound, &forwarded);
    backend.set_active_phase(Phase::Login).unwrap();
    backend.set_handler(Box::new(BackendLoginFlow::new(version)));
    client.set_handler(Box::new(ClientLoginFlow::new()));

    // Login start travels to the backend
    let mut login = ServerLoginPacket::new("Notch".into());
    login.holder_uuid = Some(Uuid::from_u128(0xAB));
    let frame = client
        .encode_for_send(Direction::Serverbound, &Packet::ServerLogin(login))
        .unwrap();
    assert!(matches!(
        submit(&mut client, Direction::Serverbound, &frame),
        FrameOutcome::Forward(_)
    ));

    // Backend answers with login success; on 1.20.2 the phase holds
    // until the client acknowledges
    let success = Packet::LoginSuccess(LoginSuccessPacket::new(
        Uuid::from_u128(0xAB),
        "Notch".into(),
    ));
    let frame = backend
        .encode_for_send(Direction::Clientbound, &success)
        .unwrap();
    assert!(matches!(
        submit(&mut backend, Direction::Clientbound, &frame),
        FrameOutcome::Forward(_)
    ));
    assert_eq!(backend.phase(), Phase::Login);

    // Client acknowledges: its session enters config, and the pump
    // mirrors the transition to the backend session
    let ack_id = waypoint_protocol::state_registry()
        .resolve_id(
            Phase::Login,
            Direction::Serverbound,
            version,
            waypoint_protocol::PacketKind::LoginAcknowledged,
        )
        .unwrap();
    let mut frame = BytesMut::new();
    waypoint_protocol::codec::write_varint(&mut frame, ack_id);
    assert!(matches!(
        client.submit_frame(Direction::Serverbound, frame).unwrap(),
        FrameOutcome::Forward(_)
    ));
    assert_eq!(client.phase(), Phase::Config);
    backend.set_active_phase(client.phase()).unwrap();

    // Client acknowledges the end of configuration: play begins
    let finish_id = waypoint_protocol::state_registry()
        .resolve_id(
            Phase::Config,
            Direction::Serverbound,
            version,
            waypoint_protocol::PacketKind::FinishConfiguration,
        )
        .unwrap();
    let mut frame = BytesMut::new();
    waypoint_protocol::codec::write_varint(&mut frame, finish_id);
    client.submit_frame(Direction::Serverbound, frame).unwrap();
    assert_eq!(client.phase(), Phase::Play);
}

#[test]
fn legacy_login_reaches_play_without_config() {
    let version = ProtocolVersion::V1_16_4;
    let mut backend = Session::new(ConnectionId::next());
    backend.set_protocol_version(version);
    backend.set_active_phase(Phase::Login).unwrap();
    backend.set_handler(Box::new(BackendLoginFlow::new(version)));

    let success = Packet::LoginSuccess(LoginSuccessPacket::new(
        Uuid::from_u128(0xCD),
        "Steve".into(),
    ));
    let frame = backend
        .encode_for_send(Direction::Clientbound, &success)
        .unwrap();
    submit(&mut backend, Direction::Clientbound, &frame);
    assert_eq!(backend.phase(), Phase::Play);
}

#[test]
fn declining_handlers_forward_identical_bytes_in_play() {
    // A passthrough pair: whatever enters one side leaves it unchanged
    let version = ProtocolVersion::V1_18_2;
    let mut client = Session::new(ConnectionId::next());
    client.set_protocol_version(version);
    client.set_active_phase(Phase::Login).unwrap();
    client.set_active_phase(Phase::Play).unwrap();

    let keep_alive_id = waypoint_protocol::state_registry()
        .resolve_id(
            Phase::Play,
            Direction::Serverbound,
            version,
            waypoint_protocol::PacketKind::KeepAlive,
        )
        .unwrap();
    let mut frame = BytesMut::new();
    waypoint_protocol::codec::write_varint(&mut frame, keep_alive_id);
    frame.extend_from_slice(&0x0102_0304_0506_0708u64.to_be_bytes());
    let original = frame.clone().freeze();

    match client.submit_frame(Direction::Serverbound, frame).unwrap() {
        FrameOutcome::Forward(bytes) => assert_eq!(bytes, original),
        FrameOutcome::Consumed => panic!("default handler must decline"),
    }
}

#[test]
fn unknown_play_id_without_skip_length_is_fatal() {
    let mut session = Session::new(ConnectionId::next());
    session.set_protocol_version(ProtocolVersion::V1_20_2);
    session.set_active_phase(Phase::Login).unwrap();
    session.set_active_phase(Phase::Play).unwrap();

    let mut frame = BytesMut::new();
    waypoint_protocol::codec::write_varint(&mut frame, 0x6F);
    frame.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);

    let error = session
        .submit_frame(Direction::Serverbound, frame)
        .unwrap_err();
    assert!(matches!(error, WaypointError::UnknownPacket { id: 0x6F, .. }));
}

#[test]
fn undashed_login_success_scenario() {
    // Notch's profile encoded in the oldest, undashed identifier bracket
    let version = ProtocolVersion::V1_7_2;
    let uuid = Uuid::parse_str("11111111-2222-3333-4444-555555555555").unwrap();

    let mut backend = Session::new(ConnectionId::next());
    backend.set_protocol_version(version);
    backend.set_active_phase(Phase::Login).unwrap();

    let packet = Packet::LoginSuccess(LoginSuccessPacket::new(uuid, "Notch".into()));
    let frame = backend
        .encode_for_send(Direction::Clientbound, &packet)
        .unwrap();

    let mut payload = BytesMut::from(&frame[..]);
    let id = waypoint_protocol::codec::read_varint(&mut payload).unwrap();
    assert_eq!(id, 0x02);
    let decoded = waypoint_protocol::PacketKind::LoginSuccess
        .decode(&mut payload, Direction::Clientbound, version)
        .unwrap();
    let Packet::LoginSuccess(decoded) = decoded else {
        panic!("wrong packet kind");
    };
    assert_eq!(decoded.uuid().unwrap(), uuid);
    assert_eq!(decoded.username().unwrap(), "Notch");
    assert_eq!(decoded.properties(), None);
}

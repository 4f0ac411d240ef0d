//! # Proxy Server
//!
//! Accept loop and per-connection frame pump. Each accepted client gets
//! one Tokio task owning both sides of the pair: the client socket and a
//! fresh backend socket, each wrapped in the frame codec. Frames are
//! pulled off either side in arrival order, pushed through that side's
//! session, and the outcome (forward, locally-synthesized replies, or a
//! fatal decode error) is applied.
//!
//! Sessions are task-local; the only shared state is the connection
//! registry used for the player cap, and the read-only packet registry
//! inside the protocol crate.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;

use bytes::{Bytes, BytesMut};
use waypoint_config::ProxyConfig;
use waypoint_core::{ConnectionId, Result, WaypointError};
use waypoint_protocol::{Direction, Phase};
use waypoint_session::{
    BackendLoginFlow, ClientLoginFlow, FrameOutcome, HandshakeFlow, ServerPing, Session,
    StatusFlow,
};

use crate::framing::FrameCodec;

type FrameSink = SplitSink<Framed<TcpStream, FrameCodec>, Bytes>;
type FrameStream = SplitStream<Framed<TcpStream, FrameCodec>>;

/// The proxy: listener plus connection bookkeeping
pub struct ProxyServer {
    config: ProxyConfig,
    connections: Arc<DashMap<ConnectionId, SocketAddr>>,
}

impl ProxyServer {
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            config,
            connections: Arc::new(DashMap::new()),
        }
    }

    /// Accept clients until the listener fails
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.bind_address)
            .await
            .map_err(|e| {
                WaypointError::Network(format!(
                    "Cannot bind {}: {}",
                    self.config.bind_address, e
                ))
            })?;
        tracing::info!(address = %self.config.bind_address, "proxy listening");

        loop {
            let (stream, peer) = listener
                .accept()
                .await
                .map_err(|e| WaypointError::Network(format!("Accept failed: {}", e)))?;

            if self.connections.len() >= self.config.max_players as usize {
                tracing::warn!(%peer, "connection refused: player cap reached");
                drop(stream);
                continue;
            }

            let id = ConnectionId::next();
            self.connections.insert(id, peer);
            tracing::info!(connection = %id, %peer, "client connected");

            let config = self.config.clone();
            let connections = Arc::clone(&self.connections);
            tokio::spawn(async move {
                if let Err(error) = handle_connection(id, stream, &config).await {
                    tracing::warn!(connection = %id, %error, "connection ended with error");
                }
                connections.remove(&id);
                tracing::info!(connection = %id, "client disconnected");
            });
        }
    }
}

/// Run one proxied connection pair to completion
async fn handle_connection(id: ConnectionId, client: TcpStream, config: &ProxyConfig) -> Result<()> {
    client
        .set_nodelay(true)
        .map_err(|e| WaypointError::Network(format!("set_nodelay: {}", e)))?;
    let backend = TcpStream::connect(&config.backend_address)
        .await
        .map_err(|e| {
            WaypointError::Network(format!(
                "Cannot reach backend {}: {}",
                config.backend_address, e
            ))
        })?;
    backend
        .set_nodelay(true)
        .map_err(|e| WaypointError::Network(format!("set_nodelay: {}", e)))?;

    let (client_sink, client_stream) = Framed::new(client, FrameCodec).split();
    let (backend_sink, backend_stream) = Framed::new(backend, FrameCodec).split();

    let mut pump = ConnectionPump {
        client_session: Session::new(id),
        backend_session: Session::new(id),
        client_sink,
        client_stream,
        backend_sink,
        backend_stream,
        config,
        handlers_installed_for: Phase::Handshake,
    };
    pump.client_session.set_handler(Box::new(HandshakeFlow::new()));

    pump.run().await
}

/// Both directions of one proxied connection
struct ConnectionPump<'a> {
    client_session: Session,
    backend_session: Session,
    client_sink: FrameSink,
    client_stream: FrameStream,
    backend_sink: FrameSink,
    backend_stream: FrameStream,
    config: &'a ProxyConfig,
    handlers_installed_for: Phase,
}

impl ConnectionPump<'_> {
    async fn run(&mut self) -> Result<()> {
        let idle = Duration::from_secs(self.config.idle_timeout_secs);
        loop {
            let keep_going = tokio::select! {
                frame = self.client_stream.next() => match frame {
                    Some(frame) => self.pump_frame(Direction::Serverbound, frame?).await?,
                    None => false,
                },
                frame = self.backend_stream.next() => match frame {
                    Some(frame) => self.pump_frame(Direction::Clientbound, frame?).await?,
                    None => false,
                },
                _ = tokio::time::sleep(idle) => {
                    tracing::warn!(connection = %self.client_session.id(), "idle timeout");
                    false
                }
            };
            if !keep_going {
                self.client_session.close();
                self.backend_session.close();
                return Ok(());
            }
        }
    }

    /// Submit one frame to the session owning its direction and apply
    /// the outcome. Returns false when the connection must close.
    async fn pump_frame(&mut self, direction: Direction, frame: BytesMut) -> Result<bool> {
        let session = match direction {
            Direction::Serverbound => &mut self.client_session,
            Direction::Clientbound => &mut self.backend_session,
        };

        match session.submit_frame(direction, frame) {
            Ok(FrameOutcome::Forward(payload)) => match direction {
                Direction::Serverbound => self.backend_sink.send(payload).await?,
                Direction::Clientbound => self.client_sink.send(payload).await?,
            },
            Ok(FrameOutcome::Consumed) => {}
            Err(error) => {
                // Framing and unknown-id errors are fatal: the stream
                // position can no longer be trusted
                tracing::error!(
                    connection = %session.id(),
                    phase = %session.phase(),
                    version = %session.version(),
                    %direction,
                    %error,
                    "dropping connection on decode error"
                );
                return Ok(false);
            }
        }

        let session = match direction {
            Direction::Serverbound => &mut self.client_session,
            Direction::Clientbound => &mut self.backend_session,
        };
        for (reply_direction, payload) in session.drain_outbox()? {
            match reply_direction {
                Direction::Serverbound => self.backend_sink.send(payload).await?,
                Direction::Clientbound => self.client_sink.send(payload).await?,
            }
        }

        self.mirror_pair_state(direction);
        self.install_phase_handlers()?;
        Ok(true)
    }

    /// Keep the two sessions of the pair in lockstep: the side that just
    /// transitioned drags the other along, and version negotiation on
    /// the client side is adopted by the backend side.
    fn mirror_pair_state(&mut self, moved: Direction) {
        let (version, phase) = match moved {
            Direction::Serverbound => {
                (self.client_session.version(), self.client_session.phase())
            }
            Direction::Clientbound => {
                (self.backend_session.version(), self.backend_session.phase())
            }
        };
        let follower = match moved {
            Direction::Serverbound => &mut self.backend_session,
            Direction::Clientbound => &mut self.client_session,
        };
        if follower.version() != version {
            follower.set_protocol_version(version);
        }
        if follower.phase() != phase && follower.phase().can_transition_to(phase) {
            // The pair moves through the same legal ladder, so a mirror
            // failure is a bug, not a wire condition
            if let Err(error) = follower.set_active_phase(phase) {
                tracing::error!(%error, "phase mirror failed");
            }
        }
    }

    /// Install the flow handlers for a newly-entered phase
    fn install_phase_handlers(&mut self) -> Result<()> {
        let phase = self.client_session.phase();
        if phase == self.handlers_installed_for {
            return Ok(());
        }
        match phase {
            Phase::Status => {
                // The handshake flow pinned a version before this phase
                // was entered, so the ping echoes what the client speaks
                let ping = ServerPing::new(
                    &self.config.motd,
                    self.config.max_players,
                    self.client_session.version(),
                );
                self.client_session
                    .set_handler(Box::new(StatusFlow::new(&ping)?));
            }
            Phase::Login => {
                self.client_session
                    .set_handler(Box::new(ClientLoginFlow::new()));
                self.backend_session.set_handler(Box::new(
                    BackendLoginFlow::new(self.backend_session.version()),
                ));
            }
            // The login flows carry config and play; closed needs none
            Phase::Config | Phase::Play | Phase::Closed | Phase::Handshake => {}
        }
        self.handlers_installed_for = phase;
        Ok(())
    }
}

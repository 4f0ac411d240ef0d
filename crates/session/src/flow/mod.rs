//! # Phase Flow Handlers
//!
//! The handlers the proxy installs per phase. Each one interprets only
//! the packets that drive the connection's lifecycle and declines
//! everything else, so unhandled traffic falls through to pass-through
//! forwarding.
//!
//! A connection pair runs two sessions: the client-facing session sees
//! serverbound frames, the backend-facing session sees clientbound
//! frames. Handlers are therefore direction-pure: a flow attached to one
//! session only ever observes one direction of traffic.

mod handshake;
mod login;
mod status;

pub use handshake::HandshakeFlow;
pub use login::{BackendLoginFlow, ClientLoginFlow};
pub use status::StatusFlow;

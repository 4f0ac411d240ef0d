//! # Waypoint Session Layer
//!
//! The session engine and the phase flow handlers the proxy installs on
//! it. A [`Session`] turns complete frames into typed packets, routes
//! them through the active [`SessionHandler`](waypoint_protocol::SessionHandler),
//! and re-encodes packets for transmission; the flows in [`flow`] drive
//! phase transitions and answer status traffic locally.

pub mod flow;
pub mod ping;
pub mod session;

// Re-export commonly used items
pub use flow::{BackendLoginFlow, ClientLoginFlow, HandshakeFlow, StatusFlow};
pub use ping::ServerPing;
pub use session::{FrameOutcome, Session};

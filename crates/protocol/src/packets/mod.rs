//! # Packet Type Set
//!
//! Concrete data structures for each wire message kind the proxy
//! interprets, grouped by the phase that introduces them. Types used in
//! more than one phase (disconnect, keep-alive, plugin messages) live
//! with the phase where they first appear.
//!
//! Every structure implements [`PacketCodec`](crate::packet::PacketCodec)
//! with the exact wire layout of each protocol version bracket; version
//! checks are evaluated newest-compatible to oldest, matching the order
//! the public protocol documentation lists them in. Packet instances are
//! created per in-flight message and discarded after handling; they hold
//! no cross-connection state.

pub mod config;
pub mod handshake;
pub mod login;
pub mod play;
pub mod status;

//! # Waypoint Protocol Library
//!
//! Packet codec and version-dispatch engine for the Minecraft Java
//! Edition wire protocol, exact to the byte against each protocol
//! revision's documented layout.
//!
//! ## Architecture
//!
//! The protocol is organized into several layers:
//!
//! ### 1. Primitive Codecs ([`codec`])
//! Stateless encoding/decoding of the wire's building blocks:
//! - VarInt / VarLong: 7-bits-per-byte variable-length integers
//! - String: VarInt-prefixed UTF-8 with per-field codepoint bounds
//! - 128-bit identifiers in their four historical wire forms
//! - Profile property lists with optional signatures
//!
//! ### 2. Version Catalog ([`version`])
//! Every supported wire revision (1.7.2 through 1.21) in a totally
//! ordered catalog, plus the named bracket predicates packet layouts
//! branch on.
//!
//! ### 3. Packet Types ([`packets`], [`packet`])
//! One value type per wire message kind, each owning its per-version
//! decode/encode contract and participating in handler double dispatch
//! through the flat [`Packet`] enumeration.
//!
//! ### 4. Registry ([`registry`])
//! Version-bracketed mapping between numeric packet ids and packet
//! kinds per (phase, direction), built once and shared lock-free.
//!
//! ### 5. Handler Protocol ([`handler`])
//! The capability interface session logic implements; a handler consumes
//! a packet or declines it, declining selects pass-through forwarding.
//!
//! ## Protocol Compatibility
//!
//! Wire format bit-exactness is the point of this crate: every numeric
//! id, bracket boundary and field order matches the public protocol
//! documentation for the target version, since the proxy's value is
//! byte-for-byte interoperability with unmodified clients and servers.

pub mod codec;
pub mod handler;
pub mod packet;
pub mod packets;
pub mod registry;
pub mod state;
pub mod version;

// Re-export commonly used items
pub use codec::ProfileProperty;
pub use handler::{PassthroughHandler, SessionHandler};
pub use packet::{Packet, PacketCodec, PacketKind};
pub use registry::{state_registry, StateRegistry};
pub use state::{Direction, Phase};
pub use version::{ProtocolVersion, UuidWireFormat};

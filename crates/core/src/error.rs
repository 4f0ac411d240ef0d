//! Core error types for Waypoint

/// Errors surfaced by the codec, registry and session layers.
///
/// # Taxonomy
/// - `Framing`: malformed varint, oversized declared length, truncated
///   buffer. Fatal to the connection; the transport closes it.
/// - `UnknownPacket`: no registry entry covers the id for the negotiated
///   version. Fatal unless the phase policy allows a safe skip.
/// - `MissingField`: a required field was never populated before encode.
///   The encode call fails instead of writing partial bytes.
/// - `UnsupportedVersion`: a packet was requested for a version outside
///   its registered brackets. Handled like `UnknownPacket`.
#[derive(thiserror::Error, Debug)]
pub enum WaypointError {
    #[error("Framing error: {0}")]
    Framing(String),

    #[error("Unknown packet id 0x{id:02X} ({context})")]
    UnknownPacket { id: i32, context: String },

    #[error("Required field missing: {0}")]
    MissingField(&'static str),

    #[error("Unsupported protocol version: {0}")]
    UnsupportedVersion(String),

    #[error("Illegal phase transition: {0}")]
    PhaseTransition(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, WaypointError>;

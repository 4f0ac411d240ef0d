//! # Protocol Version Catalog
//!
//! Every released wire revision the proxy can speak, in release order.
//!
//! The catalog is the only place protocol numbers live. Packet logic
//! never compares against raw wire numbers; it calls the comparison
//! predicates ([`no_less_than`](ProtocolVersion::no_less_than),
//! [`no_greater_than`](ProtocolVersion::no_greater_than),
//! [`between_inclusive`](ProtocolVersion::between_inclusive)) or one of
//! the named bracket helpers so that layout boundaries are defined once.
//!
//! ## Brackets
//!
//! A *bracket* is a contiguous range of versions sharing one wire layout
//! for a field or packet. Brackets that more than one packet type depends
//! on are exposed here as named helpers ([`UuidWireFormat::select`],
//! [`supports_signed_properties`](ProtocolVersion::supports_signed_properties),
//! [`supports_reconfiguration`](ProtocolVersion::supports_reconfiguration))
//! so boundary constants cannot drift apart between packet types.

/// A released revision of the wire protocol.
///
/// Variants are declared in release order, so the derived `Ord` is the
/// protocol's total order. The discriminant is NOT the wire number; use
/// [`wire_number`](Self::wire_number) for the value exchanged in the
/// handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProtocolVersion {
    V1_7_2,
    V1_7_6,
    V1_8,
    V1_9,
    V1_9_1,
    V1_9_2,
    V1_9_4,
    V1_10,
    V1_11,
    V1_11_1,
    V1_12,
    V1_12_1,
    V1_12_2,
    V1_13,
    V1_13_1,
    V1_13_2,
    V1_14,
    V1_14_1,
    V1_14_2,
    V1_14_3,
    V1_14_4,
    V1_15,
    V1_15_1,
    V1_15_2,
    V1_16,
    V1_16_1,
    V1_16_2,
    V1_16_3,
    V1_16_4,
    V1_17,
    V1_17_1,
    V1_18,
    V1_18_2,
    V1_19,
    V1_19_1,
    V1_19_3,
    V1_19_4,
    V1_20,
    V1_20_2,
    V1_20_3,
    V1_20_5,
    V1_21,
}

use ProtocolVersion::*;

impl ProtocolVersion {
    /// All known versions, oldest first
    pub const ALL: &'static [ProtocolVersion] = &[
        V1_7_2, V1_7_6, V1_8, V1_9, V1_9_1, V1_9_2, V1_9_4, V1_10, V1_11, V1_11_1, V1_12,
        V1_12_1, V1_12_2, V1_13, V1_13_1, V1_13_2, V1_14, V1_14_1, V1_14_2, V1_14_3, V1_14_4,
        V1_15, V1_15_1, V1_15_2, V1_16, V1_16_1, V1_16_2, V1_16_3, V1_16_4, V1_17, V1_17_1,
        V1_18, V1_18_2, V1_19, V1_19_1, V1_19_3, V1_19_4, V1_20, V1_20_2, V1_20_3, V1_20_5,
        V1_21,
    ];

    /// Oldest supported version
    pub const MINIMUM: ProtocolVersion = V1_7_2;

    /// Newest supported version
    pub const MAXIMUM: ProtocolVersion = V1_21;

    /// The wire number exchanged in the handshake packet
    pub const fn wire_number(self) -> i32 {
        match self {
            V1_7_2 => 4,
            V1_7_6 => 5,
            V1_8 => 47,
            V1_9 => 107,
            V1_9_1 => 108,
            V1_9_2 => 109,
            V1_9_4 => 110,
            V1_10 => 210,
            V1_11 => 315,
            V1_11_1 => 316,
            V1_12 => 335,
            V1_12_1 => 338,
            V1_12_2 => 340,
            V1_13 => 393,
            V1_13_1 => 401,
            V1_13_2 => 404,
            V1_14 => 477,
            V1_14_1 => 480,
            V1_14_2 => 485,
            V1_14_3 => 490,
            V1_14_4 => 498,
            V1_15 => 573,
            V1_15_1 => 575,
            V1_15_2 => 578,
            V1_16 => 735,
            V1_16_1 => 736,
            V1_16_2 => 751,
            V1_16_3 => 753,
            V1_16_4 => 754,
            V1_17 => 755,
            V1_17_1 => 756,
            V1_18 => 757,
            V1_18_2 => 758,
            V1_19 => 759,
            V1_19_1 => 760,
            V1_19_3 => 761,
            V1_19_4 => 762,
            V1_20 => 763,
            V1_20_2 => 764,
            V1_20_3 => 765,
            V1_20_5 => 766,
            V1_21 => 767,
        }
    }

    /// Human-readable name (the primary game version of the revision)
    pub const fn name(self) -> &'static str {
        match self {
            V1_7_2 => "1.7.2",
            V1_7_6 => "1.7.6",
            V1_8 => "1.8",
            V1_9 => "1.9",
            V1_9_1 => "1.9.1",
            V1_9_2 => "1.9.2",
            V1_9_4 => "1.9.4",
            V1_10 => "1.10",
            V1_11 => "1.11",
            V1_11_1 => "1.11.1",
            V1_12 => "1.12",
            V1_12_1 => "1.12.1",
            V1_12_2 => "1.12.2",
            V1_13 => "1.13",
            V1_13_1 => "1.13.1",
            V1_13_2 => "1.13.2",
            V1_14 => "1.14",
            V1_14_1 => "1.14.1",
            V1_14_2 => "1.14.2",
            V1_14_3 => "1.14.3",
            V1_14_4 => "1.14.4",
            V1_15 => "1.15",
            V1_15_1 => "1.15.1",
            V1_15_2 => "1.15.2",
            V1_16 => "1.16",
            V1_16_1 => "1.16.1",
            V1_16_2 => "1.16.2",
            V1_16_3 => "1.16.3",
            V1_16_4 => "1.16.4",
            V1_17 => "1.17",
            V1_17_1 => "1.17.1",
            V1_18 => "1.18",
            V1_18_2 => "1.18.2",
            V1_19 => "1.19",
            V1_19_1 => "1.19.1",
            V1_19_3 => "1.19.3",
            V1_19_4 => "1.19.4",
            V1_20 => "1.20",
            V1_20_2 => "1.20.2",
            V1_20_3 => "1.20.3",
            V1_20_5 => "1.20.5",
            V1_21 => "1.21",
        }
    }

    /// Look up a catalog entry by handshake wire number
    pub fn from_wire_number(number: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.wire_number() == number)
    }

    /// `self >= other` in release order
    #[inline]
    pub fn no_less_than(self, other: ProtocolVersion) -> bool {
        self >= other
    }

    /// `self <= other` in release order
    #[inline]
    pub fn no_greater_than(self, other: ProtocolVersion) -> bool {
        self <= other
    }

    /// `low <= self <= high` in release order
    #[inline]
    pub fn between_inclusive(self, low: ProtocolVersion, high: ProtocolVersion) -> bool {
        self >= low && self <= high
    }

    /// Versions carrying signed profile properties in login success (1.19+)
    #[inline]
    pub fn supports_signed_properties(self) -> bool {
        self.no_less_than(V1_19)
    }

    /// Versions with the configuration sub-protocol (1.20.2+)
    #[inline]
    pub fn supports_reconfiguration(self) -> bool {
        self.no_less_than(V1_20_2)
    }

    /// Versions using varint-prefixed byte arrays in the encryption
    /// exchange (1.8+); older revisions use i16-prefixed arrays
    #[inline]
    pub fn modern_frame_arrays(self) -> bool {
        self.no_less_than(V1_8)
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (protocol {})", self.name(), self.wire_number())
    }
}

/// Wire representation of a 128-bit identifier.
///
/// The representation changed three times over the protocol's history;
/// both the login-success packet and the identifier codecs branch on it.
/// The checks are evaluated newest first, matching the packet layout
/// documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UuidWireFormat {
    /// 32-character textual form without dashes (before 1.7.6)
    Undashed,
    /// 36-character dashed textual form (1.7.6 through 1.15.x)
    Dashed,
    /// Four 32-bit big-endian segments (1.16 through 1.18.x)
    IntArray,
    /// Two 64-bit big-endian halves (1.19 and newer)
    Binary,
}

impl UuidWireFormat {
    /// Select the representation for a protocol version
    pub fn select(version: ProtocolVersion) -> Self {
        if version.no_less_than(V1_19) {
            UuidWireFormat::Binary
        } else if version.no_less_than(V1_16) {
            UuidWireFormat::IntArray
        } else if version.no_less_than(V1_7_6) {
            UuidWireFormat::Dashed
        } else {
            UuidWireFormat::Undashed
        }
    }
}

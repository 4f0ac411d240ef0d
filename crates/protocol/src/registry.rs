//! # Packet Registry
//!
//! Maps (phase, direction, version, numeric id) to a packet kind and
//! back. The catalog is declared as per-kind *mapping ladders*: a list
//! of (id, introduced-in-version) steps, each step holding until the
//! next step supersedes it. At build time the ladders are densified into
//! per-version lookup tables, so resolution is two hash lookups with no
//! version arithmetic on the hot path.
//!
//! Registration is static: the registry is built once at first use and
//! shared read-only across all connection workers. A ladder that would
//! give one id two kinds for the same version is a catalog bug and
//! panics at build.
//!
//! Numeric ids follow the publicly documented wire tables of each
//! protocol version. Lookup misses are a normal outcome — most play
//! traffic is opaque to the proxy — and are surfaced as `None`, never a
//! panic; callers decide whether an unresolved id is fatal.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::packet::PacketKind;
use crate::state::{Direction, Phase};
use crate::version::ProtocolVersion;

/// Lookup tables for one protocol version of one (phase, direction)
#[derive(Debug, Default)]
struct VersionTable {
    by_id: HashMap<i32, PacketKind>,
    to_id: HashMap<PacketKind, i32>,
}

/// Lookup tables for one direction of one phase
#[derive(Debug, Default)]
pub struct DirectionRegistry {
    versions: HashMap<ProtocolVersion, VersionTable>,
}

impl DirectionRegistry {
    /// Densify one mapping ladder into the per-version tables.
    ///
    /// `steps` are (id, from-version) pairs in ascending version order;
    /// each step applies until the next one supersedes it. `until` caps
    /// the whole ladder for kinds that left the registry (for example
    /// the play-phase disconnect once its payload stopped being JSON).
    fn register(
        &mut self,
        kind: PacketKind,
        steps: &[(i32, ProtocolVersion)],
        until: Option<ProtocolVersion>,
    ) {
        assert!(!steps.is_empty(), "empty mapping ladder for {:?}", kind);
        for window in steps.windows(2) {
            assert!(
                window[0].1 < window[1].1,
                "mapping ladder for {:?} is not in version order",
                kind
            );
        }

        for &version in ProtocolVersion::ALL {
            if let Some(cap) = until {
                if version > cap {
                    continue;
                }
            }
            let Some(&(id, _)) = steps.iter().rev().find(|(_, from)| version >= *from) else {
                continue;
            };

            let table = self.versions.entry(version).or_default();
            if let Some(previous) = table.by_id.insert(id, kind) {
                panic!(
                    "packet id 0x{:02X} at {} registered for both {:?} and {:?}",
                    id, version, previous, kind
                );
            }
            if table.to_id.insert(kind, id).is_some() {
                panic!("{:?} registered twice at {}", kind, version);
            }
        }
    }

    fn lookup_kind(&self, version: ProtocolVersion, id: i32) -> Option<PacketKind> {
        self.versions.get(&version)?.by_id.get(&id).copied()
    }

    fn lookup_id(&self, version: ProtocolVersion, kind: PacketKind) -> Option<i32> {
        self.versions.get(&version)?.to_id.get(&kind).copied()
    }

    /// Registered ids for a version, for invariant checks
    #[cfg(test)]
    fn ids(&self, version: ProtocolVersion) -> Vec<i32> {
        self.versions
            .get(&version)
            .map(|t| t.by_id.keys().copied().collect())
            .unwrap_or_default()
    }
}

/// Both directions of one phase
#[derive(Debug, Default)]
pub struct PhaseRegistry {
    serverbound: DirectionRegistry,
    clientbound: DirectionRegistry,
}

impl PhaseRegistry {
    fn direction(&self, direction: Direction) -> &DirectionRegistry {
        match direction {
            Direction::Serverbound => &self.serverbound,
            Direction::Clientbound => &self.clientbound,
        }
    }

    fn direction_mut(&mut self, direction: Direction) -> &mut DirectionRegistry {
        match direction {
            Direction::Serverbound => &mut self.serverbound,
            Direction::Clientbound => &mut self.clientbound,
        }
    }
}

/// The full packet registry across all phases
#[derive(Debug, Default)]
pub struct StateRegistry {
    handshake: PhaseRegistry,
    status: PhaseRegistry,
    login: PhaseRegistry,
    config: PhaseRegistry,
    play: PhaseRegistry,
}

impl StateRegistry {
    fn phase(&self, phase: Phase) -> Option<&PhaseRegistry> {
        match phase {
            Phase::Handshake => Some(&self.handshake),
            Phase::Status => Some(&self.status),
            Phase::Login => Some(&self.login),
            Phase::Config => Some(&self.config),
            Phase::Play => Some(&self.play),
            Phase::Closed => None,
        }
    }

    /// Resolve a leading numeric id to the packet kind registered for it
    pub fn resolve_by_id(
        &self,
        phase: Phase,
        direction: Direction,
        version: ProtocolVersion,
        id: i32,
    ) -> Option<PacketKind> {
        self.phase(phase)?
            .direction(direction)
            .lookup_kind(version, id)
    }

    /// Resolve a packet kind to the numeric id it is sent with
    pub fn resolve_id(
        &self,
        phase: Phase,
        direction: Direction,
        version: ProtocolVersion,
        kind: PacketKind,
    ) -> Option<i32> {
        self.phase(phase)?
            .direction(direction)
            .lookup_id(version, kind)
    }

    fn build() -> Self {
        use Direction::{Clientbound, Serverbound};
        use PacketKind as K;
        use ProtocolVersion::*;

        let mut registry = StateRegistry::default();

        {
            let handshake = registry.handshake.direction_mut(Serverbound);
            handshake.register(K::Handshake, &[(0x00, V1_7_2)], None);
        }

        {
            let status = registry.status.direction_mut(Serverbound);
            status.register(K::StatusRequest, &[(0x00, V1_7_2)], None);
            status.register(K::StatusPing, &[(0x01, V1_7_2)], None);

            let status = registry.status.direction_mut(Clientbound);
            status.register(K::StatusResponse, &[(0x00, V1_7_2)], None);
            status.register(K::StatusPing, &[(0x01, V1_7_2)], None);
        }

        {
            let login = registry.login.direction_mut(Serverbound);
            login.register(K::ServerLogin, &[(0x00, V1_7_2)], None);
            login.register(K::EncryptionResponse, &[(0x01, V1_7_2)], None);
            login.register(K::LoginPluginResponse, &[(0x02, V1_13)], None);
            login.register(K::LoginAcknowledged, &[(0x03, V1_20_2)], None);

            let login = registry.login.direction_mut(Clientbound);
            login.register(K::Disconnect, &[(0x00, V1_7_2)], None);
            login.register(K::EncryptionRequest, &[(0x01, V1_7_2)], None);
            login.register(K::LoginSuccess, &[(0x02, V1_7_2)], None);
            login.register(K::SetCompression, &[(0x03, V1_8)], None);
            login.register(K::LoginPluginMessage, &[(0x04, V1_13)], None);
        }

        {
            // The configuration phase exists from 1.20.2; 1.20.5 inserted
            // the cookie packets at the top of both id spaces, shifting
            // everything below them.
            let config = registry.config.direction_mut(Serverbound);
            config.register(K::ClientSettings, &[(0x00, V1_20_2)], None);
            config.register(
                K::PluginMessage,
                &[(0x01, V1_20_2), (0x02, V1_20_5)],
                None,
            );
            config.register(
                K::FinishConfiguration,
                &[(0x02, V1_20_2), (0x03, V1_20_5)],
                None,
            );
            config.register(K::KeepAlive, &[(0x03, V1_20_2), (0x04, V1_20_5)], None);

            let config = registry.config.direction_mut(Clientbound);
            config.register(
                K::PluginMessage,
                &[(0x00, V1_20_2), (0x01, V1_20_5)],
                None,
            );
            config.register(K::Disconnect, &[(0x01, V1_20_2)], Some(V1_20_2));
            config.register(
                K::FinishConfiguration,
                &[(0x02, V1_20_2), (0x03, V1_20_5)],
                None,
            );
            config.register(K::KeepAlive, &[(0x03, V1_20_2), (0x04, V1_20_5)], None);
        }

        {
            let play = registry.play.direction_mut(Serverbound);
            play.register(
                K::KeepAlive,
                &[
                    (0x00, V1_7_2),
                    (0x0B, V1_9),
                    (0x0C, V1_12),
                    (0x0B, V1_12_1),
                    (0x0E, V1_13),
                    (0x0F, V1_14),
                    (0x10, V1_16),
                    (0x0F, V1_17),
                    (0x11, V1_19),
                    (0x12, V1_19_1),
                    (0x11, V1_19_3),
                    (0x12, V1_19_4),
                    (0x14, V1_20_2),
                    (0x15, V1_20_3),
                    (0x18, V1_20_5),
                ],
                None,
            );
            play.register(
                K::PluginMessage,
                &[
                    (0x17, V1_7_2),
                    (0x09, V1_9),
                    (0x0A, V1_12),
                    (0x09, V1_12_1),
                    (0x0A, V1_13),
                    (0x0B, V1_14),
                    (0x0A, V1_17),
                    (0x0C, V1_19),
                    (0x0D, V1_19_1),
                    (0x0C, V1_19_3),
                    (0x0D, V1_19_4),
                    (0x0F, V1_20_2),
                    (0x10, V1_20_3),
                    (0x12, V1_20_5),
                ],
                None,
            );
            play.register(
                K::ClientSettings,
                &[
                    (0x15, V1_7_2),
                    (0x04, V1_9),
                    (0x05, V1_12),
                    (0x04, V1_12_1),
                    (0x05, V1_14),
                    (0x07, V1_19),
                    (0x08, V1_19_1),
                    (0x07, V1_19_3),
                    (0x08, V1_19_4),
                    (0x09, V1_20_2),
                    (0x0A, V1_20_5),
                ],
                None,
            );
            play.register(
                K::ReconfigureAcknowledged,
                &[(0x0B, V1_20_2), (0x0C, V1_20_5)],
                None,
            );

            let play = registry.play.direction_mut(Clientbound);
            play.register(
                K::KeepAlive,
                &[
                    (0x00, V1_7_2),
                    (0x1F, V1_9),
                    (0x21, V1_13),
                    (0x20, V1_14),
                    (0x21, V1_15),
                    (0x20, V1_16),
                    (0x1F, V1_16_2),
                    (0x21, V1_17),
                    (0x1E, V1_19),
                    (0x20, V1_19_1),
                    (0x1F, V1_19_3),
                    (0x23, V1_19_4),
                    (0x24, V1_20_2),
                    (0x26, V1_20_5),
                ],
                None,
            );
            play.register(
                K::PluginMessage,
                &[
                    (0x3F, V1_7_2),
                    (0x18, V1_9),
                    (0x19, V1_13),
                    (0x18, V1_14),
                    (0x19, V1_15),
                    (0x18, V1_16),
                    (0x17, V1_16_2),
                    (0x18, V1_17),
                    (0x15, V1_19),
                    (0x16, V1_19_1),
                    (0x15, V1_19_3),
                    (0x17, V1_19_4),
                    (0x18, V1_20_2),
                    (0x19, V1_20_5),
                ],
                None,
            );
            // JSON-reason disconnect only; later revisions moved the
            // payload to NBT text and are not decoded by this proxy
            play.register(
                K::Disconnect,
                &[
                    (0x40, V1_7_2),
                    (0x1A, V1_9),
                    (0x1B, V1_13),
                    (0x1A, V1_14),
                    (0x1B, V1_15),
                    (0x1A, V1_16),
                    (0x19, V1_16_2),
                    (0x1A, V1_17),
                    (0x17, V1_19),
                    (0x19, V1_19_1),
                    (0x17, V1_19_3),
                    (0x1A, V1_19_4),
                    (0x1B, V1_20_2),
                ],
                Some(V1_20_2),
            );
            play.register(
                K::StartReconfiguration,
                &[(0x65, V1_20_2), (0x67, V1_20_3), (0x69, V1_20_5)],
                None,
            );
        }

        tracing::debug!("packet registry built for {} versions", ProtocolVersion::ALL.len());
        registry
    }
}

/// The process-wide registry, built on first access
pub fn state_registry() -> &'static StateRegistry {
    static REGISTRY: OnceLock<StateRegistry> = OnceLock::new();
    REGISTRY.get_or_init(StateRegistry::build)
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::{Clientbound, Serverbound};
    use ProtocolVersion::*;

    #[test]
    fn test_handshake_is_id_zero_everywhere() {
        let registry = state_registry();
        for &version in ProtocolVersion::ALL {
            assert_eq!(
                registry.resolve_by_id(Phase::Handshake, Serverbound, version, 0x00),
                Some(PacketKind::Handshake)
            );
        }
    }

    #[test]
    fn test_resolution_is_identity_both_ways() {
        // resolve_id(resolve_by_id(id)) == id for every registered entry
        let registry = state_registry();
        for phase in [Phase::Handshake, Phase::Status, Phase::Login, Phase::Config, Phase::Play] {
            for direction in [Serverbound, Clientbound] {
                let Some(phase_registry) = registry.phase(phase) else {
                    continue;
                };
                for &version in ProtocolVersion::ALL {
                    for id in phase_registry.direction(direction).ids(version) {
                        let kind = registry
                            .resolve_by_id(phase, direction, version, id)
                            .unwrap();
                        assert_eq!(
                            registry.resolve_id(phase, direction, version, kind),
                            Some(id),
                            "{:?} {:?} {} 0x{:02X}",
                            phase,
                            direction,
                            version,
                            id
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_id_reuse_across_brackets() {
        let registry = state_registry();

        // Serverbound keep-alive moved from 0x00 to 0x0B at 1.9; 0x0B
        // later belonged to it again after the 1.12 reshuffle
        assert_eq!(
            registry.resolve_by_id(Phase::Play, Serverbound, V1_7_2, 0x00),
            Some(PacketKind::KeepAlive)
        );
        assert_eq!(
            registry.resolve_by_id(Phase::Play, Serverbound, V1_9, 0x0B),
            Some(PacketKind::KeepAlive)
        );
        assert_eq!(
            registry.resolve_by_id(Phase::Play, Serverbound, V1_12, 0x0C),
            Some(PacketKind::KeepAlive)
        );
        assert_eq!(
            registry.resolve_by_id(Phase::Play, Serverbound, V1_12_1, 0x0B),
            Some(PacketKind::KeepAlive)
        );
    }

    #[test]
    fn test_config_phase_id_shift_at_1_20_5() {
        let registry = state_registry();

        assert_eq!(
            registry.resolve_id(Phase::Config, Serverbound, V1_20_2, PacketKind::KeepAlive),
            Some(0x03)
        );
        assert_eq!(
            registry.resolve_id(Phase::Config, Serverbound, V1_20_5, PacketKind::KeepAlive),
            Some(0x04)
        );
        assert_eq!(
            registry.resolve_id(Phase::Config, Clientbound, V1_20_3, PacketKind::PluginMessage),
            Some(0x00)
        );
        assert_eq!(
            registry.resolve_id(Phase::Config, Clientbound, V1_21, PacketKind::PluginMessage),
            Some(0x01)
        );
    }

    #[test]
    fn test_version_gated_entries_absent_outside_brackets() {
        let registry = state_registry();

        // No configuration phase before 1.20.2
        assert_eq!(
            registry.resolve_by_id(Phase::Config, Serverbound, V1_20, 0x00),
            None
        );
        // Set-compression does not exist before 1.8
        assert_eq!(
            registry.resolve_id(Phase::Login, Clientbound, V1_7_6, PacketKind::SetCompression),
            None
        );
        // JSON-reason disconnect left the play registry after 1.20.2
        assert_eq!(
            registry.resolve_id(Phase::Play, Clientbound, V1_20_3, PacketKind::Disconnect),
            None
        );
        assert_eq!(
            registry.resolve_id(Phase::Play, Clientbound, V1_20_2, PacketKind::Disconnect),
            Some(0x1B)
        );
    }

    #[test]
    fn test_unregistered_play_id_resolves_to_none() {
        let registry = state_registry();
        assert_eq!(
            registry.resolve_by_id(Phase::Play, Serverbound, V1_20_2, 0x7E),
            None
        );
    }

    #[test]
    fn test_closed_phase_has_no_registry() {
        let registry = state_registry();
        assert_eq!(
            registry.resolve_by_id(Phase::Closed, Serverbound, V1_20_2, 0x00),
            None
        );
    }
}

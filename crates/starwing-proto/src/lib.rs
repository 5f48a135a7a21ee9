//! Starwing wire protocol -- the UDP packet codec.
//!
//! Every datagram is a 7-byte big-endian header followed by a per-kind
//! payload:
//!
//! ```text
//! HEADER = u8 type | u16 packetId | u32 timestamp
//! ```
//!
//! Datagrams shorter than the header are dropped; unknown type codes decode
//! to an error the caller is expected to ignore-and-log. All multi-byte
//! integers are big-endian, floats are big-endian IEEE-754.

#![deny(unsafe_code)]

use std::fmt;

/// Header size in bytes; the minimum well-formed datagram.
pub const HEADER_LEN: usize = 7;

/// Per-entity payload size inside a snapshot: id + x + y + reserved.
pub const SNAPSHOT_ENTITY_LEN: usize = 1 + 4 + 4 + 16;

/// Upper bound on entities per snapshot (the count prefix is one byte).
pub const SNAPSHOT_MAX_ENTITIES: usize = 255;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Decoding failures. Per the error policy these are recovered at the
/// datagram handler: the datagram is dropped and logged, never fatal.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// Datagram shorter than the 7-byte header.
    #[error("datagram of {len} bytes is shorter than the {HEADER_LEN}-byte header")]
    Truncated { len: usize },

    /// Type code not in the packet-type table.
    #[error("unknown packet type code {code:#04x}")]
    UnknownType { code: u8 },

    /// Payload too short for the declared packet type.
    #[error("{kind:?} payload truncated: expected at least {expected} bytes, got {len}")]
    TruncatedPayload {
        kind: PacketType,
        expected: usize,
        len: usize,
    },

    /// A username or message was not valid UTF-8.
    #[error("{kind:?} payload is not valid UTF-8")]
    InvalidText { kind: PacketType },
}

// ---------------------------------------------------------------------------
// PacketType
// ---------------------------------------------------------------------------

/// Stable single-byte packet type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketType {
    /// C→S: one key transition.
    Input = 0x01,
    /// C→S: join request carrying the username.
    Join = 0x02,
    /// C→S: liveness probe, echoed in [`PacketType::PingResponse`].
    Ping = 0x04,
    /// S→C: slot assignment (255 = server full).
    PlayerIdAssign = 0x08,
    /// S→C: authoritative entity state dump.
    Snapshot = 0x10,
    /// S→C: a player timed out.
    Timeout = 0x20,
    /// S→C: a player died.
    Killed = 0x40,
    /// S→C: echo of a ping's id and timestamp.
    PingResponse = 0x80,
}

impl PacketType {
    /// Decode a type code.
    pub fn from_code(code: u8) -> Option<PacketType> {
        match code {
            0x01 => Some(PacketType::Input),
            0x02 => Some(PacketType::Join),
            0x04 => Some(PacketType::Ping),
            0x08 => Some(PacketType::PlayerIdAssign),
            0x10 => Some(PacketType::Snapshot),
            0x20 => Some(PacketType::Timeout),
            0x40 => Some(PacketType::Killed),
            0x80 => Some(PacketType::PingResponse),
            _ => None,
        }
    }

    /// The wire code.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PacketType::Input => "INPUT",
            PacketType::Join => "JOIN",
            PacketType::Ping => "PING",
            PacketType::PlayerIdAssign => "PLAYER_ID_ASSIGNMENT",
            PacketType::Snapshot => "SNAPSHOT",
            PacketType::Timeout => "TIMEOUT",
            PacketType::Killed => "KILLED",
            PacketType::PingResponse => "PING_RESPONSE",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// The 7-byte packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub kind: PacketType,
    pub packet_id: u16,
    /// Server time in milliseconds.
    pub timestamp: u32,
}

// ---------------------------------------------------------------------------
// Packet
// ---------------------------------------------------------------------------

/// One entity's slice of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotEntity {
    pub id: u8,
    pub x: f32,
    pub y: f32,
    /// Velocity/facing/state; layout reserved, currently written as zero.
    pub reserved: [u8; 16],
}

impl SnapshotEntity {
    /// A snapshot entry with zeroed reserved bytes.
    pub fn new(id: u8, x: f32, y: f32) -> Self {
        SnapshotEntity {
            id,
            x,
            y,
            reserved: [0; 16],
        }
    }
}

/// A decoded packet payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Input {
        player_id: u8,
        key_code: u8,
        /// 0 = released, 1 = pressed.
        action: u8,
    },
    Join {
        username: String,
    },
    Ping,
    PlayerIdAssign {
        player_id: u8,
    },
    Snapshot {
        entities: Vec<SnapshotEntity>,
    },
    Timeout {
        message: String,
    },
    Killed {
        player_id: u8,
    },
    PingResponse,
}

impl Packet {
    /// The type code this payload travels under.
    pub fn kind(&self) -> PacketType {
        match self {
            Packet::Input { .. } => PacketType::Input,
            Packet::Join { .. } => PacketType::Join,
            Packet::Ping => PacketType::Ping,
            Packet::PlayerIdAssign { .. } => PacketType::PlayerIdAssign,
            Packet::Snapshot { .. } => PacketType::Snapshot,
            Packet::Timeout { .. } => PacketType::Timeout,
            Packet::Killed { .. } => PacketType::Killed,
            Packet::PingResponse => PacketType::PingResponse,
        }
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Serialise a packet into a datagram with the given header fields.
pub fn encode(packet: &Packet, packet_id: u16, timestamp: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + 16);
    buf.push(packet.kind().code());
    buf.extend_from_slice(&packet_id.to_be_bytes());
    buf.extend_from_slice(&timestamp.to_be_bytes());

    match packet {
        Packet::Input {
            player_id,
            key_code,
            action,
        } => {
            buf.push(*player_id);
            buf.push(*key_code);
            buf.push(*action);
        }
        Packet::Join { username } => {
            buf.extend_from_slice(username.as_bytes());
        }
        Packet::Ping | Packet::PingResponse => {}
        Packet::PlayerIdAssign { player_id } => {
            buf.push(*player_id);
        }
        Packet::Snapshot { entities } => {
            debug_assert!(entities.len() <= SNAPSHOT_MAX_ENTITIES);
            let count = entities.len().min(SNAPSHOT_MAX_ENTITIES);
            buf.push(count as u8);
            for entity in &entities[..count] {
                buf.push(entity.id);
                buf.extend_from_slice(&entity.x.to_be_bytes());
                buf.extend_from_slice(&entity.y.to_be_bytes());
                buf.extend_from_slice(&entity.reserved);
            }
        }
        Packet::Timeout { message } => {
            buf.extend_from_slice(message.as_bytes());
        }
        Packet::Killed { player_id } => {
            buf.push(*player_id);
        }
    }
    buf
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn read_u16(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn read_f32(bytes: &[u8]) -> f32 {
    f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn payload_text(kind: PacketType, payload: &[u8]) -> Result<String, ProtocolError> {
    String::from_utf8(payload.to_vec()).map_err(|_| ProtocolError::InvalidText { kind })
}

/// Parse a datagram into its header and payload.
pub fn decode(datagram: &[u8]) -> Result<(Header, Packet), ProtocolError> {
    if datagram.len() < HEADER_LEN {
        return Err(ProtocolError::Truncated {
            len: datagram.len(),
        });
    }
    let kind = PacketType::from_code(datagram[0])
        .ok_or(ProtocolError::UnknownType { code: datagram[0] })?;
    let header = Header {
        kind,
        packet_id: read_u16(&datagram[1..3]),
        timestamp: read_u32(&datagram[3..7]),
    };
    let payload = &datagram[HEADER_LEN..];

    let need = |expected: usize| -> Result<(), ProtocolError> {
        if payload.len() < expected {
            Err(ProtocolError::TruncatedPayload {
                kind,
                expected,
                len: payload.len(),
            })
        } else {
            Ok(())
        }
    };

    let packet = match kind {
        PacketType::Input => {
            need(3)?;
            Packet::Input {
                player_id: payload[0],
                key_code: payload[1],
                action: payload[2],
            }
        }
        PacketType::Join => Packet::Join {
            username: payload_text(kind, payload)?,
        },
        PacketType::Ping => Packet::Ping,
        PacketType::PlayerIdAssign => {
            need(1)?;
            Packet::PlayerIdAssign {
                player_id: payload[0],
            }
        }
        PacketType::Snapshot => {
            need(1)?;
            let count = payload[0] as usize;
            need(1 + count * SNAPSHOT_ENTITY_LEN)?;
            let mut entities = Vec::with_capacity(count);
            for i in 0..count {
                let at = 1 + i * SNAPSHOT_ENTITY_LEN;
                let mut reserved = [0u8; 16];
                reserved.copy_from_slice(&payload[at + 9..at + 25]);
                entities.push(SnapshotEntity {
                    id: payload[at],
                    x: read_f32(&payload[at + 1..at + 5]),
                    y: read_f32(&payload[at + 5..at + 9]),
                    reserved,
                });
            }
            Packet::Snapshot { entities }
        }
        PacketType::Timeout => Packet::Timeout {
            message: payload_text(kind, payload)?,
        },
        PacketType::Killed => {
            need(1)?;
            Packet::Killed {
                player_id: payload[0],
            }
        }
        PacketType::PingResponse => Packet::PingResponse,
    };

    Ok((header, packet))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(packet: Packet) -> (Header, Packet) {
        let bytes = encode(&packet, 0x1234, 0xDEADBEEF);
        decode(&bytes).expect("well-formed datagram must decode")
    }

    #[test]
    fn header_layout_is_big_endian() {
        let bytes = encode(&Packet::Ping, 0x0102, 0x03040506);
        assert_eq!(bytes, vec![0x04, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
    }

    #[test]
    fn input_roundtrip() {
        let (header, packet) = roundtrip(Packet::Input {
            player_id: 2,
            key_code: 4,
            action: 1,
        });
        assert_eq!(header.kind, PacketType::Input);
        assert_eq!(header.packet_id, 0x1234);
        assert_eq!(header.timestamp, 0xDEADBEEF);
        assert_eq!(
            packet,
            Packet::Input {
                player_id: 2,
                key_code: 4,
                action: 1
            }
        );
    }

    #[test]
    fn join_carries_the_whole_remainder_as_username() {
        let (_, packet) = roundtrip(Packet::Join {
            username: "Alice".to_owned(),
        });
        assert_eq!(
            packet,
            Packet::Join {
                username: "Alice".to_owned()
            }
        );

        // Empty usernames are wire-legal.
        let (_, packet) = roundtrip(Packet::Join {
            username: String::new(),
        });
        assert_eq!(
            packet,
            Packet::Join {
                username: String::new()
            }
        );
    }

    #[test]
    fn snapshot_roundtrip_preserves_positions_and_reserved() {
        let mut entity = SnapshotEntity::new(7, 123.5, -42.25);
        entity.reserved[0] = 0xAA;
        entity.reserved[15] = 0x55;
        let (_, packet) = roundtrip(Packet::Snapshot {
            entities: vec![entity, SnapshotEntity::new(8, 0.0, 1080.0)],
        });

        let Packet::Snapshot { entities } = packet else {
            panic!("expected snapshot");
        };
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].id, 7);
        assert_eq!(entities[0].x, 123.5);
        assert_eq!(entities[0].y, -42.25);
        assert_eq!(entities[0].reserved[0], 0xAA);
        assert_eq!(entities[0].reserved[15], 0x55);
        assert_eq!(entities[1].id, 8);
    }

    #[test]
    fn snapshot_entity_wire_size_is_fixed() {
        let bytes = encode(
            &Packet::Snapshot {
                entities: vec![SnapshotEntity::new(1, 0.0, 0.0)],
            },
            0,
            0,
        );
        assert_eq!(bytes.len(), HEADER_LEN + 1 + SNAPSHOT_ENTITY_LEN);
    }

    #[test]
    fn control_packets_roundtrip() {
        assert_eq!(roundtrip(Packet::Ping).1, Packet::Ping);
        assert_eq!(roundtrip(Packet::PingResponse).1, Packet::PingResponse);
        assert_eq!(
            roundtrip(Packet::PlayerIdAssign { player_id: 255 }).1,
            Packet::PlayerIdAssign { player_id: 255 }
        );
        assert_eq!(
            roundtrip(Packet::Killed { player_id: 3 }).1,
            Packet::Killed { player_id: 3 }
        );
        assert_eq!(
            roundtrip(Packet::Timeout {
                message: "Player 1 (Bob) timed out".to_owned()
            })
            .1,
            Packet::Timeout {
                message: "Player 1 (Bob) timed out".to_owned()
            }
        );
    }

    #[test]
    fn short_datagrams_are_rejected() {
        assert_eq!(decode(&[]), Err(ProtocolError::Truncated { len: 0 }));
        assert_eq!(
            decode(&[0x01, 0x00, 0x00, 0x00, 0x00, 0x00]),
            Err(ProtocolError::Truncated { len: 6 })
        );
    }

    #[test]
    fn unknown_type_codes_are_rejected() {
        let datagram = [0x03, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            decode(&datagram),
            Err(ProtocolError::UnknownType { code: 0x03 })
        );
    }

    #[test]
    fn truncated_payloads_are_rejected() {
        // INPUT with only two payload bytes.
        let datagram = [0x01, 0, 0, 0, 0, 0, 0, 1, 2];
        assert!(matches!(
            decode(&datagram),
            Err(ProtocolError::TruncatedPayload {
                kind: PacketType::Input,
                ..
            })
        ));

        // SNAPSHOT announcing two entities but carrying none.
        let datagram = [0x10, 0, 0, 0, 0, 0, 0, 2];
        assert!(matches!(
            decode(&datagram),
            Err(ProtocolError::TruncatedPayload {
                kind: PacketType::Snapshot,
                ..
            })
        ));
    }

    #[test]
    fn invalid_utf8_username_is_rejected() {
        let mut datagram = vec![0x02, 0, 0, 0, 0, 0, 0];
        datagram.extend_from_slice(&[0xFF, 0xFE]);
        assert_eq!(
            decode(&datagram),
            Err(ProtocolError::InvalidText {
                kind: PacketType::Join
            })
        );
    }

    #[test]
    fn type_codes_are_stable() {
        assert_eq!(PacketType::Input.code(), 0x01);
        assert_eq!(PacketType::Join.code(), 0x02);
        assert_eq!(PacketType::Ping.code(), 0x04);
        assert_eq!(PacketType::PlayerIdAssign.code(), 0x08);
        assert_eq!(PacketType::Snapshot.code(), 0x10);
        assert_eq!(PacketType::Timeout.code(), 0x20);
        assert_eq!(PacketType::Killed.code(), 0x40);
        assert_eq!(PacketType::PingResponse.code(), 0x80);
        for code in [0x01u8, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80] {
            assert_eq!(PacketType::from_code(code).unwrap().code(), code);
        }
    }
}

//! Bench packet framing for housekeeping frames
//!
//! The bench transmitter can wrap each raw frame in an 8-byte header before
//! sending it as a datagram:
//!
//! ```text
//! ┌──────┬──────┬──────┬──────┬──────┬──────┬──────┬──────┬─────────────┐
//! │ 0x02 │ 0x00 │ 0x01 │ 0x00 │ 0x01 │ type │ 0x00 │ 0x00 │ frame bytes │
//! └──────┴──────┴──────┴──────┴──────┴──────┴──────┴──────┴─────────────┘
//! type: 0x12 = RTD (42-byte frame), 0x11 = power (38-byte frame)
//! ```
//!
//! This module only builds and strips that header; it opens no sockets.

use serde::Serialize;
use thiserror::Error;

/// Header length in bytes
pub const HEADER_SIZE: usize = 8;

/// Leading marker byte of every bench packet
pub const HEADER_MARKER: u8 = 0x02;

/// Offset of the packet type byte within the header
pub const TYPE_OFFSET: usize = 5;

/// RTD frame size in bytes
pub const FRAMESIZE_RTD: usize = 42;

/// Power/ADC frame size in bytes
pub const FRAMESIZE_POW: usize = 38;

/// Packet framing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    #[error("packet too short: {len} bytes (header is 8)")]
    TooShort { len: usize },

    #[error("invalid header marker: 0x{0:02x} (expected 0x02)")]
    BadMarker(u8),

    #[error("unknown packet type: 0x{0:02x}")]
    UnknownType(u8),

    #[error("{kind} payload is {actual} bytes, expected {expected}")]
    PayloadSize {
        kind: PacketKind,
        expected: usize,
        actual: usize,
    },

    #[error("{kind} log length {len} is not a multiple of {frame_size}")]
    Misaligned {
        kind: PacketKind,
        len: usize,
        frame_size: usize,
    },
}

/// Housekeeping frame kind carried by a bench packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PacketKind {
    Rtd,
    Power,
}

impl PacketKind {
    pub fn type_byte(self) -> u8 {
        match self {
            PacketKind::Rtd => 0x12,
            PacketKind::Power => 0x11,
        }
    }

    pub fn frame_size(self) -> usize {
        match self {
            PacketKind::Rtd => FRAMESIZE_RTD,
            PacketKind::Power => FRAMESIZE_POW,
        }
    }

    pub fn from_type_byte(byte: u8) -> Option<Self> {
        match byte {
            0x12 => Some(PacketKind::Rtd),
            0x11 => Some(PacketKind::Power),
            _ => None,
        }
    }

    /// Packet length including header
    pub fn packet_size(self) -> usize {
        HEADER_SIZE + self.frame_size()
    }
}

impl std::fmt::Display for PacketKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PacketKind::Rtd => f.write_str("RTD"),
            PacketKind::Power => f.write_str("power"),
        }
    }
}

/// Build the 8-byte bench header for a frame kind
pub fn header(kind: PacketKind) -> [u8; HEADER_SIZE] {
    [
        HEADER_MARKER,
        0x00,
        0x01,
        0x00,
        0x01,
        kind.type_byte(),
        0x00,
        0x00,
    ]
}

/// Prefix a frame with the bench header
pub fn packetize(kind: PacketKind, frame: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + frame.len());
    buf.extend_from_slice(&header(kind));
    buf.extend_from_slice(frame);
    buf
}

/// Validate the bench header and return the frame it carries
pub fn strip_header(packet: &[u8]) -> Result<(PacketKind, &[u8]), PacketError> {
    if packet.len() < HEADER_SIZE {
        return Err(PacketError::TooShort { len: packet.len() });
    }
    if packet[0] != HEADER_MARKER {
        return Err(PacketError::BadMarker(packet[0]));
    }

    let type_byte = packet[TYPE_OFFSET];
    let kind = PacketKind::from_type_byte(type_byte).ok_or(PacketError::UnknownType(type_byte))?;

    let payload = &packet[HEADER_SIZE..];
    if payload.len() != kind.frame_size() {
        return Err(PacketError::PayloadSize {
            kind,
            expected: kind.frame_size(),
            actual: payload.len(),
        });
    }

    Ok((kind, payload))
}

/// Split a raw log into frames of the given kind
pub fn chunk_frames(kind: PacketKind, log: &[u8]) -> Result<Vec<&[u8]>, PacketError> {
    let frame_size = kind.frame_size();
    if log.len() % frame_size != 0 {
        return Err(PacketError::Misaligned {
            kind,
            len: log.len(),
            frame_size,
        });
    }
    Ok(log.chunks_exact(frame_size).collect())
}

/// Strip headers from a concatenation of RTD bench packets into a raw log
pub fn unwrap_rtd_packets(packets: &[u8]) -> Result<Vec<u8>, PacketError> {
    let packet_size = PacketKind::Rtd.packet_size();
    if packets.len() % packet_size != 0 {
        return Err(PacketError::Misaligned {
            kind: PacketKind::Rtd,
            len: packets.len(),
            frame_size: packet_size,
        });
    }

    let mut log = Vec::with_capacity(packets.len() / packet_size * FRAMESIZE_RTD);
    for packet in packets.chunks_exact(packet_size) {
        let (kind, frame) = strip_header(packet)?;
        if kind != PacketKind::Rtd {
            return Err(PacketError::UnknownType(kind.type_byte()));
        }
        log.extend_from_slice(frame);
    }
    Ok(log)
}

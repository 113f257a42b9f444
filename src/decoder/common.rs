//! Common types for decoder module

use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Number of sensors multiplexed by one RTD chip
pub const SENSORS_PER_CHIP: usize = 9;

/// RTD chip identifier on the housekeeping board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChipId {
    Chip1,
    Chip2,
}

impl ChipId {
    pub const ALL: [ChipId; 2] = [ChipId::Chip1, ChipId::Chip2];

    /// Raw id byte as it appears in the frame
    pub fn as_u8(self) -> u8 {
        match self {
            ChipId::Chip1 => 1,
            ChipId::Chip2 => 2,
        }
    }
}

impl TryFrom<u8> for ChipId {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ChipId::Chip1),
            2 => Ok(ChipId::Chip2),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for ChipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chip {}", self.as_u8())
    }
}

/// One sensor reading: raw status flag plus temperature in degrees Celsius
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Raw status flag (bit 0 set = valid)
    pub flag: u8,
    /// Temperature (ºC)
    pub temp: f64,
}

impl SensorReading {
    pub const FLAG_VALID: u8 = 0x01;

    /// True when the flag is exactly "valid" with no fault bits
    pub fn is_valid(&self) -> bool {
        self.flag == Self::FLAG_VALID
    }
}

/// One decoded frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedRecord {
    /// Raw 32-bit timestamp (seconds, source-specific epoch)
    pub timestamp: u32,
    /// Readings indexed by local sensor index 0..9
    pub sensors: [SensorReading; SENSORS_PER_CHIP],
}

impl DecodedRecord {
    /// Format record for display
    pub fn display(&self) -> String {
        let temps: Vec<String> = self
            .sensors
            .iter()
            .map(|s| format!("{:8.3}", s.temp))
            .collect();
        let flags: Vec<String> = self
            .sensors
            .iter()
            .map(|s| format!("{:02x}", s.flag))
            .collect();
        format!(
            "T:{:10} temps:[{}] flags:[{}]",
            self.timestamp,
            temps.join(" "),
            flags.join(" ")
        )
    }
}

impl std::fmt::Display for DecodedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Records of one chip, in the order the frames appear in the log
pub type ChipStream = Vec<DecodedRecord>;

/// Frame left out of the output under the skip policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFrame {
    pub frame_index: usize,
    pub value: u8,
}

/// Decode result: one stream per chip
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChipStreams {
    pub chip1: ChipStream,
    pub chip2: ChipStream,
    /// Frames dropped because of an unknown chip id (skip policy only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedFrame>,
}

impl ChipStreams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, chip: ChipId) -> &ChipStream {
        match chip {
            ChipId::Chip1 => &self.chip1,
            ChipId::Chip2 => &self.chip2,
        }
    }

    pub fn get_mut(&mut self, chip: ChipId) -> &mut ChipStream {
        match chip {
            ChipId::Chip1 => &mut self.chip1,
            ChipId::Chip2 => &mut self.chip2,
        }
    }

    /// Total decoded records across both chips
    pub fn total_records(&self) -> usize {
        self.chip1.len() + self.chip2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_records() == 0
    }
}

impl Index<ChipId> for ChipStreams {
    type Output = ChipStream;

    fn index(&self, chip: ChipId) -> &Self::Output {
        self.get(chip)
    }
}

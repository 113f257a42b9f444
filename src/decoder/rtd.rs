//! RTD Decoder for housekeeping temperature logs
//!
//! Decodes the 42-byte frame format written by the housekeeping board.
//! Each frame carries one chip's nine sensor readings:
//!
//! ```text
//! byte  0      chip id (1 or 2)
//! byte  1      unused
//! bytes 2..6   timestamp (u32, big endian)
//! bytes 6..42  9 x sub-record: [flag, temp_hi, temp_mid, temp_lo]
//! ```

use thiserror::Error;
use tracing::{debug, trace, warn};

use super::common::{
    ChipId, ChipStreams, DecodedRecord, SensorReading, SkippedFrame, SENSORS_PER_CHIP,
};

/// RTD frame layout constants (big endian)
mod constants {
    pub const FRAME_SIZE: usize = 42;

    pub const CHIP_ID_OFFSET: usize = 0;
    pub const TIMESTAMP_OFFSET: usize = 2;
    pub const SENSOR_OFFSET: usize = 6;
    pub const SUB_RECORD_SIZE: usize = 4;

    // Temperature code (24-bit, 10 fractional bits)
    pub const TEMP_SIGN_BIT: u32 = 1 << 23;
    pub const TEMP_CODE_MASK: u32 = 0xFF_FFFF;
    pub const TEMP_SCALE: f64 = 1024.0;
}

pub use constants::FRAME_SIZE;

/// Errors produced while decoding an RTD log
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer is not a whole number of frames
    #[error("invalid RTD log length {len}: not a multiple of the {frame_size}-byte frame size")]
    InvalidLength { len: usize, frame_size: usize },

    /// Frame carries a chip id other than 1 or 2
    #[error("unknown chip id {value:#04x} in frame {frame_index} (byte offset {offset})")]
    UnknownChipId {
        frame_index: usize,
        offset: usize,
        value: u8,
    },
}

impl DecodeError {
    fn invalid_length(len: usize) -> Self {
        Self::InvalidLength {
            len,
            frame_size: FRAME_SIZE,
        }
    }

    fn unknown_chip(frame_index: usize, value: u8) -> Self {
        Self::UnknownChipId {
            frame_index,
            offset: frame_index * FRAME_SIZE,
            value,
        }
    }
}

/// What to do with a frame whose chip id is not 1 or 2
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownChipPolicy {
    /// Fail the whole decode, discarding partial output
    #[default]
    Abort,
    /// Leave the frame out and record it in `ChipStreams::skipped`
    Skip,
}

/// RTD Decoder configuration
#[derive(Debug, Clone, Default)]
pub struct RtdConfig {
    pub on_unknown_chip: UnknownChipPolicy,
    /// Emit every decoded frame as a debug event
    pub dump_enabled: bool,
}

/// RTD Decoder for housekeeping logs
///
/// Holds only its configuration; `decode` borrows `self` immutably and can be
/// shared freely between callers.
#[derive(Debug, Clone, Default)]
pub struct RtdDecoder {
    config: RtdConfig,
}

impl RtdDecoder {
    /// Create a new RTD decoder with given configuration
    pub fn new(config: RtdConfig) -> Self {
        Self { config }
    }

    /// Create a decoder with default configuration (abort on unknown chip)
    pub fn with_defaults() -> Self {
        Self::new(RtdConfig::default())
    }

    pub fn config(&self) -> &RtdConfig {
        &self.config
    }

    /// Enable or disable dump output
    pub fn set_dump_enabled(&mut self, enabled: bool) {
        self.config.dump_enabled = enabled;
    }

    /// Decode a whole RTD log into per-chip streams
    pub fn decode(&self, raw: &[u8]) -> Result<ChipStreams, DecodeError> {
        if raw.len() % FRAME_SIZE != 0 {
            return Err(DecodeError::invalid_length(raw.len()));
        }

        let n_frames = raw.len() / FRAME_SIZE;
        let mut streams = ChipStreams::new();

        for (frame_index, frame) in raw.chunks_exact(FRAME_SIZE).enumerate() {
            let (chip_byte, record) = decode_frame(frame)?;

            let chip = match ChipId::try_from(chip_byte) {
                Ok(chip) => chip,
                Err(value) => match self.config.on_unknown_chip {
                    UnknownChipPolicy::Abort => {
                        return Err(DecodeError::unknown_chip(frame_index, value));
                    }
                    UnknownChipPolicy::Skip => {
                        warn!(frame_index, value, "Skipping frame with unknown chip id");
                        streams.skipped.push(SkippedFrame { frame_index, value });
                        continue;
                    }
                },
            };

            if self.config.dump_enabled {
                debug!(frame_index, chip = chip.as_u8(), "{}", record);
            }

            streams.get_mut(chip).push(record);
        }

        trace!(
            frames = n_frames,
            chip1 = streams.chip1.len(),
            chip2 = streams.chip2.len(),
            skipped = streams.skipped.len(),
            "Decoded RTD log"
        );

        Ok(streams)
    }
}

/// Decode a log with the default decoder (abort on unknown chip id)
pub fn decode(raw: &[u8]) -> Result<ChipStreams, DecodeError> {
    RtdDecoder::with_defaults().decode(raw)
}

/// Decode one 42-byte frame into its raw chip id byte and record
pub fn decode_frame(frame: &[u8]) -> Result<(u8, DecodedRecord), DecodeError> {
    if frame.len() != FRAME_SIZE {
        return Err(DecodeError::invalid_length(frame.len()));
    }

    let chip_byte = frame[constants::CHIP_ID_OFFSET];
    let ts = constants::TIMESTAMP_OFFSET;
    let timestamp = u32::from_be_bytes([frame[ts], frame[ts + 1], frame[ts + 2], frame[ts + 3]]);

    let mut sensors = [SensorReading::default(); SENSORS_PER_CHIP];
    for (local_index, sensor) in sensors.iter_mut().enumerate() {
        let this_index = constants::SENSOR_OFFSET + local_index * constants::SUB_RECORD_SIZE;
        sensor.flag = frame[this_index];
        sensor.temp = decode_temp([
            frame[this_index + 1],
            frame[this_index + 2],
            frame[this_index + 3],
        ]);
    }

    Ok((chip_byte, DecodedRecord { timestamp, sensors }))
}

/// Convert a 3-byte temperature code to degrees Celsius
///
/// Codes with bit 23 set are negated by complementing all 24 bits (sign bit
/// included) and adding one to the negated magnitude. `0xFFFFFF` therefore
/// decodes to `+1/1024`, not `-1/1024`.
pub fn decode_temp(code: [u8; 3]) -> f64 {
    let raw = u32::from_be_bytes([0, code[0], code[1], code[2]]);
    let signed = if raw & constants::TEMP_SIGN_BIT != 0 {
        let magnitude = (!raw & constants::TEMP_CODE_MASK) as i32;
        -magnitude + 1
    } else {
        raw as i32
    };
    signed as f64 / constants::TEMP_SCALE
}

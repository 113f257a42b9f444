//! Decoder module for housekeeping RTD logs
//!
//! Converts raw binary RTD frames into per-chip streams of decoded records.

pub mod common;
pub mod labels;
pub mod rtd;

pub use common::{
    ChipId, ChipStream, ChipStreams, DecodedRecord, SensorReading, SkippedFrame, SENSORS_PER_CHIP,
};
pub use labels::FlagBit;
pub use rtd::{
    decode, decode_frame, decode_temp, DecodeError, RtdConfig, RtdDecoder, UnknownChipPolicy,
    FRAME_SIZE,
};

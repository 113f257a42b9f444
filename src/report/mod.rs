//! Per-chip reports built from decoded RTD streams
//!
//! Produces the series the ground plots are drawn from: elapsed and absolute
//! record times, valid-only temperatures, per-sensor flag histograms and the
//! fault rate between consecutive records.

pub mod notes;

pub use notes::{parse_notes, Note, NoteError, DEFAULT_MAX_NOTE_LENGTH};

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::decoder::labels::display_range;
use crate::decoder::{ChipId, ChipStream, FlagBit, SensorReading, SENSORS_PER_CHIP};

/// Number of status flag bits per reading
pub const FLAG_BITS: usize = 8;

/// Flag bit counts: `[sensor][bit]`
pub type FlagHistogram = [[u64; FLAG_BITS]; SENSORS_PER_CHIP];

/// Derived series for one chip stream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChipReport {
    pub chip: ChipId,
    /// Nominal temperature axis range (ºC) for this chip
    pub display_range: (f64, f64),
    /// Seconds since the smallest timestamp in the stream
    pub elapsed_secs: Vec<u32>,
    /// Absolute record times, when the run start is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub times: Option<Vec<NaiveDateTime>>,
    /// Temperatures with non-valid readings masked out
    pub temps: Vec<[Option<f64>; SENSORS_PER_CHIP]>,
    /// `temp[i] - temp[i-1]` per sensor, raw (unmasked) temperatures
    pub deltas: Vec<[f64; SENSORS_PER_CHIP]>,
    pub flag_counts: FlagHistogram,
    /// Fault bits per second between record `i-1` and `i`
    pub error_rate: Vec<Option<f64>>,
}

impl ChipReport {
    /// Build the report for one chip stream
    pub fn build(chip: ChipId, stream: &ChipStream, start: Option<NaiveDateTime>) -> Self {
        let t0 = stream.iter().map(|r| r.timestamp).min().unwrap_or(0);
        let elapsed_secs: Vec<u32> = stream.iter().map(|r| r.timestamp - t0).collect();

        let times = start.map(|start| {
            elapsed_secs
                .iter()
                .map(|&s| start + Duration::seconds(i64::from(s)))
                .collect()
        });

        let temps = stream.iter().map(|r| r.sensors.map(masked_temp)).collect();

        let deltas = stream
            .windows(2)
            .map(|pair| {
                let mut d = [0.0; SENSORS_PER_CHIP];
                for (j, slot) in d.iter_mut().enumerate() {
                    *slot = pair[1].sensors[j].temp - pair[0].sensors[j].temp;
                }
                d
            })
            .collect();

        let mut flag_counts = [[0u64; FLAG_BITS]; SENSORS_PER_CHIP];
        for record in stream {
            for (j, sensor) in record.sensors.iter().enumerate() {
                for bit in FlagBit::set_in(sensor.flag) {
                    flag_counts[j][bit.bit() as usize] += 1;
                }
            }
        }

        let error_rate = stream
            .windows(2)
            .zip(elapsed_secs.windows(2))
            .map(|(pair, secs)| {
                let interval = i64::from(secs[1]) - i64::from(secs[0]);
                if interval <= 0 {
                    return None;
                }
                Some(fault_bits(&pair[1].sensors) as f64 / interval as f64)
            })
            .collect();

        Self {
            chip,
            display_range: display_range(chip),
            elapsed_secs,
            times,
            temps,
            deltas,
            flag_counts,
            error_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.elapsed_secs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elapsed_secs.is_empty()
    }

    /// Total count of one flag bit across all sensors
    pub fn flag_total(&self, bit: FlagBit) -> u64 {
        self.flag_counts.iter().map(|s| s[bit.bit() as usize]).sum()
    }
}

fn masked_temp(reading: SensorReading) -> Option<f64> {
    reading.is_valid().then_some(reading.temp)
}

/// Number of fault bits set across a record
fn fault_bits(sensors: &[SensorReading; SENSORS_PER_CHIP]) -> u32 {
    sensors
        .iter()
        .flat_map(|s| FlagBit::set_in(s.flag))
        .filter(|bit| bit.is_fault())
        .count() as u32
}

/// Compact overview of a chip stream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChipSummary {
    pub chip: ChipId,
    pub records: usize,
    pub first_timestamp: Option<u32>,
    pub last_timestamp: Option<u32>,
    /// Fraction of readings whose flag is exactly `valid`
    pub valid_fraction: f64,
    /// Min/max valid temperature per sensor
    pub temp_range: [Option<(f64, f64)>; SENSORS_PER_CHIP],
}

impl ChipSummary {
    pub fn of(chip: ChipId, stream: &ChipStream) -> Self {
        let readings = stream.len() * SENSORS_PER_CHIP;
        let valid = stream
            .iter()
            .flat_map(|r| r.sensors.iter())
            .filter(|s| s.is_valid())
            .count();

        let mut temp_range: [Option<(f64, f64)>; SENSORS_PER_CHIP] = [None; SENSORS_PER_CHIP];
        for record in stream {
            for (j, sensor) in record.sensors.iter().enumerate() {
                if !sensor.is_valid() {
                    continue;
                }
                temp_range[j] = Some(match temp_range[j] {
                    Some((lo, hi)) => (lo.min(sensor.temp), hi.max(sensor.temp)),
                    None => (sensor.temp, sensor.temp),
                });
            }
        }

        Self {
            chip,
            records: stream.len(),
            first_timestamp: stream.first().map(|r| r.timestamp),
            last_timestamp: stream.last().map(|r| r.timestamp),
            valid_fraction: if readings == 0 {
                0.0
            } else {
                valid as f64 / readings as f64
            },
            temp_range,
        }
    }
}

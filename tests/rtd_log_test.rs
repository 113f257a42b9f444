//! E2E tests for RTD log decoding (build log bytes → decode → verify)
//!
//! Frames are generated from seeded random numbers. Temperature codes are
//! drawn from a table of codes with hand-computed values, so decoded streams
//! are checked against what was written, in order, without reusing the
//! decoder's own arithmetic.

use hk_telemetry::decoder::{
    decode, ChipId, DecodeError, RtdConfig, RtdDecoder, SensorReading,
    UnknownChipPolicy, FRAME_SIZE, SENSORS_PER_CHIP,
};
use hk_telemetry::packet::{self, PacketKind};
use hk_telemetry::report::ChipReport;
use hk_telemetry::session::{self, RtdLog, RTD_LOG_NAME};
use rand::prelude::*;
use rand::rngs::StdRng;

/// 24-bit temperature codes and their values in ºC
const TEMP_CODES: [([u8; 3], f64); 8] = [
    ([0x00, 0x00, 0x00], 0.0),
    ([0x00, 0x04, 0x00], 1.0),
    ([0x00, 0x65, 0x00], 25.25),
    ([0x01, 0x00, 0x00], 64.0),
    ([0xFF, 0xFF, 0xFF], 1.0 / 1024.0),
    ([0xFF, 0xFC, 0x00], -1022.0 / 1024.0),
    ([0xFF, 0xF8, 0x00], -2046.0 / 1024.0),
    ([0x80, 0x00, 0x00], -8388606.0 / 1024.0),
];

/// One frame as written: chip byte, timestamp, raw sub-records and the
/// readings they stand for
struct WrittenFrame {
    chip: u8,
    timestamp: u32,
    sub_records: [[u8; 4]; SENSORS_PER_CHIP],
    readings: [SensorReading; SENSORS_PER_CHIP],
}

impl WrittenFrame {
    fn random(rng: &mut StdRng, chip: u8) -> Self {
        let mut sub_records = [[0u8; 4]; SENSORS_PER_CHIP];
        let mut readings = [SensorReading::default(); SENSORS_PER_CHIP];
        for (sub, reading) in sub_records.iter_mut().zip(readings.iter_mut()) {
            let flag: u8 = rng.gen();
            let (code, temp) = TEMP_CODES[rng.gen_range(0..TEMP_CODES.len())];
            *sub = [flag, code[0], code[1], code[2]];
            *reading = SensorReading { flag, temp };
        }
        Self {
            chip,
            timestamp: rng.gen(),
            sub_records,
            readings,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; FRAME_SIZE];
        buf[0] = self.chip;
        buf[2..6].copy_from_slice(&self.timestamp.to_be_bytes());
        for (i, sub) in self.sub_records.iter().enumerate() {
            let at = 6 + i * 4;
            buf[at..at + 4].copy_from_slice(sub);
        }
        buf
    }

}

/// Build a log of `n` random frames with chip ids drawn from 1 and 2
fn random_log(seed: u64, n: usize) -> (Vec<WrittenFrame>, Vec<u8>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let frames: Vec<WrittenFrame> = (0..n)
        .map(|_| {
            let chip = rng.gen_range(1..=2);
            WrittenFrame::random(&mut rng, chip)
        })
        .collect();
    let bytes = frames.iter().flat_map(|f| f.to_bytes()).collect();
    (frames, bytes)
}

#[test]
fn test_random_logs_partition_frames() {
    for seed in 0..20u64 {
        let n = (seed as usize) * 7;
        let (frames, bytes) = random_log(seed, n);

        let streams = decode(&bytes).expect("decode");
        assert_eq!(streams.total_records(), bytes.len() / FRAME_SIZE);
        assert!(streams.skipped.is_empty());

        for chip in ChipId::ALL {
            let written: Vec<&WrittenFrame> =
                frames.iter().filter(|f| f.chip == chip.as_u8()).collect();
            let decoded = &streams[chip];
            assert_eq!(decoded.len(), written.len(), "seed {} {}", seed, chip);

            for (record, frame) in decoded.iter().zip(written) {
                assert_eq!(record.timestamp, frame.timestamp);
                assert_eq!(record.sensors, frame.readings);
            }
        }
    }
}

#[test]
fn test_misaligned_logs_rejected() {
    let (_, bytes) = random_log(99, 5);
    for cut in [1usize, 20, 41] {
        let truncated = &bytes[..bytes.len() - cut];
        match decode(truncated) {
            Err(DecodeError::InvalidLength { len, frame_size }) => {
                assert_eq!(len, truncated.len());
                assert_eq!(frame_size, 42);
            }
            other => panic!("expected InvalidLength, got {:?}", other),
        }
    }
}

#[test]
fn test_unknown_chip_in_first_frame() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut bytes = WrittenFrame::random(&mut rng, 3).to_bytes();
    bytes.extend(WrittenFrame::random(&mut rng, 1).to_bytes());

    let err = decode(&bytes).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::UnknownChipId {
            frame_index: 0,
            value: 3,
            ..
        }
    ));
}

#[test]
fn test_skip_policy_accounts_for_every_frame() {
    let mut rng = StdRng::seed_from_u64(11);
    let chips = [1u8, 0, 2, 9, 1, 2, 200];
    let bytes: Vec<u8> = chips
        .iter()
        .flat_map(|&c| WrittenFrame::random(&mut rng, c).to_bytes())
        .collect();

    let decoder = RtdDecoder::new(RtdConfig {
        on_unknown_chip: UnknownChipPolicy::Skip,
        dump_enabled: false,
    });
    let streams = decoder.decode(&bytes).unwrap();

    assert_eq!(streams.chip1.len(), 2);
    assert_eq!(streams.chip2.len(), 2);
    let skipped: Vec<(usize, u8)> = streams
        .skipped
        .iter()
        .map(|s| (s.frame_index, s.value))
        .collect();
    assert_eq!(skipped, vec![(1, 0), (3, 9), (6, 200)]);
    assert_eq!(
        streams.total_records() + streams.skipped.len(),
        bytes.len() / FRAME_SIZE
    );
}

#[test]
fn test_decode_is_repeatable() {
    let (_, bytes) = random_log(3, 40);
    let decoder = RtdDecoder::with_defaults();
    let first = decoder.decode(&bytes).unwrap();
    let second = decoder.decode(&bytes).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_bench_packets_to_report() {
    let (frames, bytes) = random_log(5, 12);

    // wrap like the bench transmitter, then strip again
    let mut capture = Vec::new();
    for frame in packet::chunk_frames(PacketKind::Rtd, &bytes).unwrap() {
        capture.extend(packet::packetize(PacketKind::Rtd, frame));
    }
    let log = packet::unwrap_rtd_packets(&capture).unwrap();
    assert_eq!(log, bytes);

    let dir = tempfile::tempdir().unwrap();
    let run_dir = dir.path().join("05-04-2024_13-45-10");
    std::fs::create_dir_all(&run_dir).unwrap();
    std::fs::write(run_dir.join(RTD_LOG_NAME), &log).unwrap();

    let logs = session::load_all(dir.path(), RTD_LOG_NAME, &RtdDecoder::with_defaults()).unwrap();
    assert_eq!(logs.len(), 1);
    let loaded: &RtdLog = &logs[0];
    assert!(loaded.start.is_some());

    for chip in ChipId::ALL {
        let report = ChipReport::build(chip, &loaded.streams[chip], loaded.start);
        let expected = frames.iter().filter(|f| f.chip == chip.as_u8()).count();
        assert_eq!(report.len(), expected);
        assert_eq!(report.times.as_ref().map(Vec::len), Some(expected));
        if expected > 0 {
            assert_eq!(report.elapsed_secs.iter().min(), Some(&0));
        }
    }
}

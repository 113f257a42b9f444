//! Human-readable labels for RTD sensors and status flags
//!
//! Static lookup tables only. The decoder itself deals in numeric sensor
//! indices and raw flags; report and CLI code consult these tables.

use serde::Serialize;

use super::common::{ChipId, SENSORS_PER_CHIP};

const CHIP1_LABELS: [&str; SENSORS_PER_CHIP] = [
    "timepix",
    "saas camera",
    "formatter pi",
    "5.5 V regulator",
    "focal position 5",
    "focal position 4",
    "focal position 3",
    "focal position 2",
    "ln2 inlet",
];

const CHIP2_LABELS: [&str; SENSORS_PER_CHIP] = [
    "optic position 0 plate",
    "optic position 0 front",
    "optic position 0 collimator",
    "optic position 4 plate",
    "optic position 4 front",
    "optic position 2 plate",
    "optic position 6 plate",
    "optic position 6 front",
    "optic plate",
];

/// All nine sensor labels of a chip, by local sensor index
pub fn sensor_labels(chip: ChipId) -> &'static [&'static str; SENSORS_PER_CHIP] {
    match chip {
        ChipId::Chip1 => &CHIP1_LABELS,
        ChipId::Chip2 => &CHIP2_LABELS,
    }
}

/// Nominal temperature display range (ºC) per chip
pub fn display_range(chip: ChipId) -> (f64, f64) {
    match chip {
        ChipId::Chip1 => (-30.0, 60.0),
        ChipId::Chip2 => (21.0, 24.0),
    }
}

/// Status flag bits reported per sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FlagBit {
    Valid,
    AdcOutOfRange,
    UnderRange,
    OverRange,
    ColdJunctionSoftFault,
    ColdJunctionHardFault,
    AdcHardFault,
    SensorHardFault,
}

impl FlagBit {
    /// All bits, ordered from bit 0 to bit 7
    pub const ALL: [FlagBit; 8] = [
        FlagBit::Valid,
        FlagBit::AdcOutOfRange,
        FlagBit::UnderRange,
        FlagBit::OverRange,
        FlagBit::ColdJunctionSoftFault,
        FlagBit::ColdJunctionHardFault,
        FlagBit::AdcHardFault,
        FlagBit::SensorHardFault,
    ];

    pub fn bit(self) -> u32 {
        self as u32
    }

    pub fn mask(self) -> u8 {
        1 << self.bit()
    }

    pub fn name(self) -> &'static str {
        match self {
            FlagBit::Valid => "valid",
            FlagBit::AdcOutOfRange => "ADC out of range",
            FlagBit::UnderRange => "under range",
            FlagBit::OverRange => "over range",
            FlagBit::ColdJunctionSoftFault => "CJ soft fault",
            FlagBit::ColdJunctionHardFault => "CJ hard fault",
            FlagBit::AdcHardFault => "ADC hard fault",
            FlagBit::SensorHardFault => "sensor hard fault",
        }
    }

    /// Fault bits are every bit except `Valid`
    pub fn is_fault(self) -> bool {
        self != FlagBit::Valid
    }

    pub fn is_set_in(self, flag: u8) -> bool {
        flag & self.mask() != 0
    }

    /// Bits set in a raw flag, in bit order
    pub fn set_in(flag: u8) -> impl Iterator<Item = FlagBit> {
        Self::ALL.into_iter().filter(move |b| b.is_set_in(flag))
    }
}

impl std::fmt::Display for FlagBit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_labels() {
        assert_eq!(sensor_labels(ChipId::Chip1)[0], "timepix");
        assert_eq!(sensor_labels(ChipId::Chip1)[8], "ln2 inlet");
        assert_eq!(sensor_labels(ChipId::Chip2)[0], "optic position 0 plate");
        assert_eq!(sensor_labels(ChipId::Chip2)[8], "optic plate");
    }

    #[test]
    fn test_flag_bit_masks() {
        let masks: Vec<u8> = FlagBit::ALL.iter().map(|b| b.mask()).collect();
        assert_eq!(masks, vec![0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80]);
        assert!(!FlagBit::Valid.is_fault());
        assert!(FlagBit::SensorHardFault.is_fault());
    }

    #[test]
    fn test_flag_bits_set_in() {
        let bits: Vec<FlagBit> = FlagBit::set_in(0x85).collect();
        assert_eq!(
            bits,
            vec![FlagBit::Valid, FlagBit::UnderRange, FlagBit::SensorHardFault]
        );
        assert_eq!(FlagBit::set_in(0).count(), 0);
    }

    #[test]
    fn test_flag_bit_display() {
        assert_eq!(FlagBit::ColdJunctionSoftFault.to_string(), "CJ soft fault");
    }

    #[test]
    fn test_display_range() {
        assert_eq!(display_range(ChipId::Chip1), (-30.0, 60.0));
        assert_eq!(display_range(ChipId::Chip2), (21.0, 24.0));
    }
}

//! The published sensor value and the cell that carries it out of the
//! acquisition interrupt.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Most recent ambient-light value, in raw converter counts.
///
/// Zero until the first buffer completes.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LightReading(pub u16);

impl LightReading {
    /// Convert a raw signed converter sample.
    ///
    /// Single-ended inputs can read slightly below zero from noise; those
    /// clamp to 0.
    pub fn from_raw(sample: i16) -> Self {
        Self(sample.max(0) as u16)
    }

    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    pub const fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }
}

/// Single-slot cell between the acquisition interrupt (writer) and the
/// broadcast worker (reader). A newer reading replaces one not yet taken.
pub type ReadingSignal = Signal<CriticalSectionRawMutex, LightReading>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_noise_clamps_to_zero() {
        assert_eq!(LightReading::from_raw(-3), LightReading(0));
        assert_eq!(LightReading::from_raw(i16::MIN), LightReading(0));
    }

    #[test]
    fn full_scale_passes_through() {
        assert_eq!(LightReading::from_raw(4095), LightReading(4095));
    }

    #[test]
    fn big_endian_layout() {
        assert_eq!(LightReading(0x04D2).to_be_bytes(), [0x04, 0xD2]);
        assert_eq!(LightReading::from_be_bytes([0x00, 0x14]), LightReading(20));
    }

    #[test]
    fn signal_keeps_only_the_newest_reading() {
        let signal = ReadingSignal::new();
        signal.signal(LightReading(10));
        signal.signal(LightReading(20));
        assert_eq!(signal.try_take(), Some(LightReading(20)));
        assert_eq!(signal.try_take(), None);
    }
}

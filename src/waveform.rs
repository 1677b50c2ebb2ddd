//! Waveform parameters for the security-system OOK protocol
//!
//! Every bit is a single carrier pulse whose *width* encodes the value;
//! the line level alternates on every pulse. A transmission opens with a
//! long train of one-bit-width pulses (the sync train) and a pair of
//! double-width marker pulses, after which the frame data follows.
//!
//! All values here were calibrated against captures from production
//! hardware. They are deliberately hoisted into [`PulseTimings`] so that
//! tests (and receivers with out-of-spec crystals) can run the codec
//! against different calibrations without global state.

/// Nominal width of a zero bit, in microseconds
pub const BIT_ZERO_US: u32 = 500;

/// Nominal width of a one bit, in microseconds
pub const BIT_ONE_US: u32 = 1000;

/// Nominal width of each start-marker pulse, in microseconds
pub const MARKER_US: u32 = 2000;

/// Consecutive one-bit pulses required before a start marker
///
/// The sync train is tens of pulses long on the air, but the receiver
/// only needs a short run to arm the marker detector.
pub const SYNC_RUN_MIN: u32 = 4;

/// Sync-train length for sensor transmissions, in low/high pulse pairs
pub const SENSOR_SYNC_PAIRS: usize = 20;

/// Sync-train length for keypad transmissions, in low/high pulse pairs
pub const KEYPAD_SYNC_PAIRS: usize = 40;

/// Sync-train length for base-station transmissions, in low/high pulse pairs
pub const STATION_SYNC_PAIRS: usize = 150;

/// Resync-train length between base-station frame repeats, in pulse pairs
pub const STATION_RESYNC_PAIRS: usize = 18;

/// Frame repeats within one component (sensor or keypad) transmission
pub const COMPONENT_FRAME_REPEATS: usize = 2;

/// Frame repeats within one base-station transmission
pub const STATION_FRAME_REPEATS: usize = 3;

/// Width classification of a single received pulse
///
/// Produced by [`PulseTimings::classify`]. This is a *local* judgement
/// about one duration; turning widths into [`BitSymbol`](crate::BitSymbol)
/// values (including preamble recognition) is the
/// [`PulseDecoder`](crate::PulseDecoder)'s job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Width {
    /// In the zero-bit band
    Zero,

    /// In the one-bit band
    One,

    /// In the start-marker band
    Marker,

    /// Outside every band: a glitch, an inter-band duration, or an
    /// inter-frame gap
    OutOfBand,
}

/// Pulse-width tolerance bands
///
/// Each band is a closed interval of microseconds around the nominal
/// pulse width. A duration falling in no band classifies as
/// [`Width::OutOfBand`], which aborts the frame attempt in progress but
/// never the decoding stream.
///
/// The [`Default`] instance is calibrated for production hardware:
///
/// | band   | interval        |
/// |--------|-----------------|
/// | zero   | 400–600 µs      |
/// | one    | 900–1100 µs     |
/// | marker | 1901–2100 µs    |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PulseTimings {
    /// Shortest accepted zero bit, µs
    pub zero_min_us: u32,
    /// Longest accepted zero bit, µs
    pub zero_max_us: u32,
    /// Shortest accepted one bit, µs
    pub one_min_us: u32,
    /// Longest accepted one bit, µs
    pub one_max_us: u32,
    /// Shortest accepted marker pulse, µs
    pub marker_min_us: u32,
    /// Longest accepted marker pulse, µs
    pub marker_max_us: u32,
}

impl PulseTimings {
    /// Classify one pulse duration against the tolerance bands
    pub fn classify(&self, micros: u32) -> Width {
        if (self.zero_min_us..=self.zero_max_us).contains(&micros) {
            Width::Zero
        } else if (self.one_min_us..=self.one_max_us).contains(&micros) {
            Width::One
        } else if (self.marker_min_us..=self.marker_max_us).contains(&micros) {
            Width::Marker
        } else {
            Width::OutOfBand
        }
    }
}

impl Default for PulseTimings {
    fn default() -> Self {
        Self {
            zero_min_us: BIT_ZERO_US - 100,
            zero_max_us: BIT_ZERO_US + 100,
            one_min_us: BIT_ONE_US - 100,
            one_max_us: BIT_ONE_US + 100,
            marker_min_us: MARKER_US - 99,
            marker_max_us: MARKER_US + 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_bands() {
        let t = PulseTimings::default();

        assert_eq!(Width::Zero, t.classify(400));
        assert_eq!(Width::Zero, t.classify(BIT_ZERO_US));
        assert_eq!(Width::Zero, t.classify(600));
        assert_eq!(Width::One, t.classify(900));
        assert_eq!(Width::One, t.classify(BIT_ONE_US));
        assert_eq!(Width::One, t.classify(1100));
        assert_eq!(Width::Marker, t.classify(1901));
        assert_eq!(Width::Marker, t.classify(MARKER_US));
        assert_eq!(Width::Marker, t.classify(2100));
    }

    #[test]
    fn test_classify_out_of_band() {
        let t = PulseTimings::default();

        // glitches
        assert_eq!(Width::OutOfBand, t.classify(0));
        assert_eq!(Width::OutOfBand, t.classify(399));

        // between bands
        assert_eq!(Width::OutOfBand, t.classify(750));
        assert_eq!(Width::OutOfBand, t.classify(1500));

        // inter-frame gap
        assert_eq!(Width::OutOfBand, t.classify(2101));
        assert_eq!(Width::OutOfBand, t.classify(1_000_000));
    }
}

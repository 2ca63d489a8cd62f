//! Level and time conversions shared by the range resolver and signal operations.

/// Tolerance under which a scaled value is snapped to the nearest whole sample.
const SAMPLE_SNAP_EPSILON: f64 = 1e-6;

/// Converts linear amplitude to decibels.
///
/// Returns -Infinity for zero amplitude, mirroring `20 * log10(0)`.
///
/// ```rust
/// use audio_container::amplitude_to_db;
///
/// assert!((amplitude_to_db(0.1) + 20.0).abs() < 1e-9);
/// ```
pub fn amplitude_to_db(amplitude: f64) -> f64 {
    20.0 * amplitude.abs().log10()
}

/// Converts decibels to linear amplitude.
///
/// Uses the formula: `amplitude = 10^(dB / 20)` for amplitude ratios.
///
/// ```rust
/// use audio_container::db_to_amplitude;
///
/// let amp = db_to_amplitude(0.0); // 1.0
/// let amp_neg20 = db_to_amplitude(-20.0); // 0.1
/// assert!((amp - 1.0).abs() < 1e-12);
/// assert!((amp_neg20 - 0.1).abs() < 1e-12);
/// ```
pub fn db_to_amplitude(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

/// Floors a fractional sample position, snapping values within a tiny
/// tolerance of an integer to that integer first.
///
/// `0.3 * 44100.0` evaluates to `13229.999999999998`; a plain floor would lose
/// a whole sample.
pub fn floor_samples(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() < SAMPLE_SNAP_EPSILON {
        rounded
    } else {
        value.floor()
    }
}

/// Converts a duration in seconds to a whole number of samples (floored).
///
/// Negative durations yield zero.
pub fn seconds_to_samples(seconds: f64, sample_rate: u32) -> usize {
    let samples = floor_samples(seconds * sample_rate as f64);
    if samples.is_finite() && samples > 0.0 {
        samples as usize
    } else {
        0
    }
}

/// Converts a sample count to seconds.
pub fn samples_to_seconds(samples: usize, sample_rate: u32) -> f64 {
    samples as f64 / sample_rate as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_db_round_trip() {
        for db in [-40.0, -20.0, -6.0, 3.0, 12.0] {
            assert_approx_eq!(amplitude_to_db(db_to_amplitude(db)), db, 1e-9);
        }
    }

    #[test]
    fn test_minus_forty_db_level() {
        assert_approx_eq!(db_to_amplitude(-40.0), 0.01, 1e-9);
    }

    #[test]
    fn test_seconds_to_samples_snaps_float_noise() {
        assert_eq!(seconds_to_samples(0.3, 44100), 13230);
        assert_eq!(seconds_to_samples(0.01, 44100), 441);
        assert_eq!(seconds_to_samples(0.005, 44100), 220);
        assert_eq!(seconds_to_samples(-1.0, 44100), 0);
    }

    #[test]
    fn test_samples_to_seconds() {
        assert_approx_eq!(samples_to_seconds(22050, 44100), 0.5, 1e-12);
    }
}

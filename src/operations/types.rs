//! Supporting types and enums for audio operations.
//!
//! This module contains the configuration types used by the operation
//! traits. Every struct has a `Default` matching the conventional behaviour
//! and builder-style setters, so call sites only spell out what differs.

use ndarray::Array2;

use crate::utils::audio_math::{amplitude_to_db, db_to_amplitude};
use crate::{AudioError, AudioResult};

/// Default fade floor and trim threshold, in dB.
pub const DEFAULT_SILENCE_DB: f64 = -40.0;

/// Fade curve shapes for envelope operations.
///
/// The curve maps the fade position `t` in `[0, 1]` to an easing value in
/// `[0, 1]`; `0` is the fade floor and `1` is unity gain.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FadeCurve {
    /// Linear fade - constant rate of change in dB.
    #[default]
    Linear,
    /// Exponential fade - slower change at the beginning.
    Exponential,
    /// Logarithmic fade - faster change at the beginning.
    Logarithmic,
    /// Smooth step fade - S-curve with smooth transitions.
    SmoothStep,
    /// Custom fade curve defined by a function.
    Custom(fn(f64) -> f64),
}

impl FadeCurve {
    /// Evaluates the curve at `t`.
    pub fn ease(&self, t: f64) -> f64 {
        match self {
            FadeCurve::Linear => t,
            FadeCurve::Exponential => t * t,
            FadeCurve::Logarithmic => {
                if t <= 0.0 {
                    0.0
                } else {
                    (1.0 + t).ln() / 2.0_f64.ln()
                }
            }
            FadeCurve::SmoothStep => t * t * (3.0 - 2.0 * t),
            FadeCurve::Custom(func) => func(t),
        }
    }
}

/// Options for [`fade`](crate::AudioProcessing::fade).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeOptions {
    /// Easing curve.
    pub curve: FadeCurve,
    /// Gain at the silent end of the fade, in dB.
    pub gain_db: f64,
    /// Linear level at the silent end; overrides `gain_db` when set.
    pub level: Option<f64>,
}

impl Default for FadeOptions {
    fn default() -> Self {
        Self {
            curve: FadeCurve::Linear,
            gain_db: DEFAULT_SILENCE_DB,
            level: None,
        }
    }
}

impl FadeOptions {
    /// Sets the easing curve.
    pub fn curve(mut self, curve: FadeCurve) -> Self {
        self.curve = curve;
        self
    }

    /// Sets the floor gain in dB.
    pub fn gain_db(mut self, gain_db: f64) -> Self {
        self.gain_db = gain_db;
        self
    }

    /// Sets the floor as a linear level.
    pub fn level(mut self, level: f64) -> Self {
        self.level = Some(level);
        self
    }

    /// The floor gain in dB after applying `level`. A level of `0.0` gives
    /// `-inf`, a fade to true silence.
    ///
    /// # Errors
    /// Returns [`AudioError::InvalidArgument`] for a NaN or `+inf` gain, or a
    /// negative or non-finite level.
    pub fn floor_db(&self) -> AudioResult<f64> {
        let floor = match self.level {
            Some(level) if !level.is_finite() || level < 0.0 => {
                return Err(AudioError::invalid_argument(
                    "level",
                    format!("fade level must be a finite non-negative amplitude, got {}", level),
                ));
            }
            Some(level) => amplitude_to_db(level),
            None => self.gain_db,
        };
        if floor.is_nan() || floor == f64::INFINITY {
            return Err(AudioError::invalid_argument(
                "gain_db",
                format!("fade floor must be a number below +inf, got {}", floor),
            ));
        }
        Ok(floor)
    }

    /// Gain envelope mapping the fade position `t` to a linear factor.
    ///
    /// The curve is applied in dB above the floor, so it is `1.0` at `t = 1`.
    /// A `-inf` floor interpolates amplitude from silence instead.
    pub fn envelope(&self) -> AudioResult<impl Fn(f64) -> f64 + use<>> {
        let floor_db = self.floor_db()?;
        let curve = self.curve;
        Ok(move |t: f64| {
            let eased = curve.ease(t);
            if floor_db.is_finite() {
                db_to_amplitude(floor_db - eased * floor_db)
            } else {
                eased
            }
        })
    }
}

impl From<()> for FadeOptions {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl From<FadeCurve> for FadeOptions {
    fn from(curve: FadeCurve) -> Self {
        Self::default().curve(curve)
    }
}

/// Options for [`trim`](crate::AudioEditing::trim).
///
/// Sides default to both. Asking for only one side explicitly (`left` or
/// `right` set, the other left unset) disables the other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimOptions {
    /// Threshold in dB below which samples count as silence.
    pub threshold_db: f64,
    /// Linear threshold; overrides `threshold_db` when set.
    pub level: Option<f64>,
    /// Trim leading silence.
    pub left: Option<bool>,
    /// Trim trailing silence.
    pub right: Option<bool>,
}

impl Default for TrimOptions {
    fn default() -> Self {
        Self {
            threshold_db: DEFAULT_SILENCE_DB,
            level: None,
            left: None,
            right: None,
        }
    }
}

impl TrimOptions {
    /// Sets the threshold in dB.
    pub fn threshold_db(mut self, threshold_db: f64) -> Self {
        self.threshold_db = threshold_db;
        self
    }

    /// Sets the threshold as a linear level.
    pub fn level(mut self, level: f64) -> Self {
        self.level = Some(level);
        self
    }

    /// Enables or disables the leading side.
    pub fn left(mut self, left: bool) -> Self {
        self.left = Some(left);
        self
    }

    /// Enables or disables the trailing side.
    pub fn right(mut self, right: bool) -> Self {
        self.right = Some(right);
        self
    }

    /// Linear threshold.
    pub fn threshold_level(&self) -> f64 {
        self.level
            .unwrap_or_else(|| crate::utils::audio_math::db_to_amplitude(self.threshold_db))
    }

    /// Resolved `(left, right)` sides.
    pub fn sides(&self) -> (bool, bool) {
        match (self.left, self.right) {
            (Some(true), None) => (true, false),
            (None, Some(true)) => (false, true),
            (left, right) => (left.unwrap_or(true), right.unwrap_or(true)),
        }
    }
}

impl From<()> for TrimOptions {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

/// Options for [`pad`](crate::AudioEditing::pad).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PadOptions {
    /// Fill value for the new samples.
    pub value: f32,
    /// Prepend instead of append.
    pub left: bool,
}

impl PadOptions {
    /// Sets the fill value.
    pub fn value(mut self, value: f32) -> Self {
        self.value = value;
        self
    }

    /// Pads at the start.
    pub fn left(mut self) -> Self {
        self.left = true;
        self
    }

    /// Pads at the end.
    pub fn right(mut self) -> Self {
        self.left = false;
        self
    }
}

impl From<()> for PadOptions {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl From<f32> for PadOptions {
    fn from(value: f32) -> Self {
        Self::default().value(value)
    }
}

/// Options for [`shift`](crate::AudioEditing::shift).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShiftOptions {
    /// Wrap samples moved past one edge around to the other instead of
    /// dropping them and filling with silence.
    pub rotate: bool,
}

impl ShiftOptions {
    /// Rotating shift.
    pub fn rotate() -> Self {
        Self { rotate: true }
    }
}

impl From<()> for ShiftOptions {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

/// Methods for converting between arbitrary channel counts.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RemixMethod {
    /// Mono fans out to every output; many-to-mono averages; up-mixing keeps
    /// existing channels and adds silent ones; down-mixing averages input
    /// channels folded onto outputs by `index % outputs`.
    #[default]
    Smart,
    /// Like `Smart`, but folded sums are scaled by `1 / sqrt(count)` to keep
    /// power constant for uncorrelated channels.
    EqualPower,
    /// Repeat existing channels cyclically to reach the target count.
    Repeat,
    /// Custom mapping matrix where each row defines the weights for an output channel.
    /// Matrix dimensions should be [output_channels x input_channels].
    Custom(Vec<Vec<f32>>),
}

impl RemixMethod {
    /// Builds the `(to, from)` mixing matrix for this method.
    ///
    /// # Errors
    /// Returns an error if either channel count is zero, or a custom matrix
    /// does not have the `(to, from)` shape.
    pub fn matrix(&self, from: usize, to: usize) -> AudioResult<Array2<f32>> {
        if from == 0 || to == 0 {
            return Err(AudioError::invalid_argument(
                "channels",
                format!("cannot remix {} channels to {}", from, to),
            ));
        }
        let mut matrix = Array2::<f32>::zeros((to, from));
        match self {
            RemixMethod::Smart | RemixMethod::EqualPower if from == 1 => {
                matrix.fill(1.0);
            }
            RemixMethod::Smart | RemixMethod::EqualPower if from <= to => {
                for ch in 0..from {
                    matrix[[ch, ch]] = 1.0;
                }
            }
            RemixMethod::Smart | RemixMethod::EqualPower => {
                for out in 0..to {
                    let count = (out..from).step_by(to).count() as f32;
                    let weight = if matches!(self, RemixMethod::EqualPower) {
                        1.0 / count.sqrt()
                    } else {
                        1.0 / count
                    };
                    for input in (out..from).step_by(to) {
                        matrix[[out, input]] = weight;
                    }
                }
            }
            RemixMethod::Repeat => {
                for out in 0..to {
                    matrix[[out, out % from]] = 1.0;
                }
            }
            RemixMethod::Custom(rows) => {
                if rows.len() != to || rows.iter().any(|row| row.len() != from) {
                    return Err(AudioError::DimensionMismatch(format!(
                        "custom remix matrix must be {}x{}",
                        to, from
                    )));
                }
                for (out, row) in rows.iter().enumerate() {
                    for (input, &weight) in row.iter().enumerate() {
                        matrix[[out, input]] = weight;
                    }
                }
            }
        }
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_trim_sides() {
        assert_eq!(TrimOptions::default().sides(), (true, true));
        assert_eq!(TrimOptions::default().left(true).sides(), (true, false));
        assert_eq!(TrimOptions::default().right(true).sides(), (false, true));
        assert_eq!(
            TrimOptions::default().left(false).sides(),
            (false, true)
        );
        assert_eq!(
            TrimOptions::default().left(true).right(true).sides(),
            (true, true)
        );
    }

    #[test]
    fn test_fade_floor_from_level() {
        let opts = FadeOptions::default().level(0.01);
        assert!((opts.floor_db().unwrap() + 40.0).abs() < 1e-9);
        assert_eq!(FadeOptions::default().floor_db().unwrap(), -40.0);
        assert_eq!(
            FadeOptions::default().level(0.0).floor_db().unwrap(),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn test_fade_floor_rejects_bad_values() {
        assert!(FadeOptions::default().gain_db(f64::NAN).floor_db().is_err());
        assert!(FadeOptions::default().gain_db(f64::INFINITY).floor_db().is_err());
        assert!(FadeOptions::default().level(-0.5).floor_db().is_err());
        assert!(FadeOptions::default().level(f64::NAN).floor_db().is_err());
    }

    #[test]
    fn test_envelope_to_silence() {
        let env = FadeOptions::default().level(0.0).envelope().unwrap();
        assert_eq!(env(0.0), 0.0);
        assert_eq!(env(0.25), 0.25);
        assert_eq!(env(1.0), 1.0);

        let env = FadeOptions::default().envelope().unwrap();
        assert!((env(0.0) - 0.01).abs() < 1e-12);
        assert!((env(1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_smart_matrices() {
        assert_eq!(
            RemixMethod::Smart.matrix(1, 2).unwrap(),
            array![[1.0f32], [1.0]]
        );
        assert_eq!(
            RemixMethod::Smart.matrix(2, 1).unwrap(),
            array![[0.5f32, 0.5]]
        );
        assert_eq!(
            RemixMethod::Smart.matrix(2, 3).unwrap(),
            array![[1.0f32, 0.0], [0.0, 1.0], [0.0, 0.0]]
        );
        assert_eq!(
            RemixMethod::Smart.matrix(4, 2).unwrap(),
            array![[0.5f32, 0.0, 0.5, 0.0], [0.0, 0.5, 0.0, 0.5]]
        );
    }

    #[test]
    fn test_repeat_and_custom() {
        assert_eq!(
            RemixMethod::Repeat.matrix(2, 3).unwrap(),
            array![[1.0f32, 0.0], [0.0, 1.0], [1.0, 0.0]]
        );
        let custom = RemixMethod::Custom(vec![vec![0.25, 0.75]]);
        assert_eq!(custom.matrix(2, 1).unwrap(), array![[0.25f32, 0.75]]);
        assert!(custom.matrix(3, 1).is_err());
        assert!(RemixMethod::Smart.matrix(0, 1).is_err());
    }
}

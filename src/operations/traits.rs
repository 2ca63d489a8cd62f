//! Core trait definitions for audio operations.
//!
//! Each trait has a single responsibility. Mutating operations take
//! `&mut self`, validate their whole range before touching any sample, and
//! return `&mut Self` so calls chain:
//!
//! ```rust
//! use audio_container::{Audio, AudioEditing, AudioProcessing, RangeOptions};
//!
//! # fn example() -> audio_container::AudioResult<()> {
//! let mut audio = Audio::from_samples(vec![0.25; 100]);
//! audio.gain(6.0, ())?.invert(RangeOptions::new().start(50))?.reverse(())?;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use super::types::*;
use crate::{AudioResult, RangeOptions};

/// Level measurements over a range.
pub trait AudioStatistics {
    /// Returns `(min, max)` over the selected samples.
    ///
    /// An empty range yields `(0.0, 0.0)`.
    fn limits(&self, range: impl Into<RangeOptions>) -> AudioResult<(f32, f32)>;

    /// Returns the peak (maximum absolute value) over the selected samples.
    fn peak(&self, range: impl Into<RangeOptions>) -> AudioResult<f32>;

    /// Computes the Root Mean Square of each selected channel, in selection
    /// order.
    ///
    /// RMS is useful for measuring average signal power/energy and
    /// provides a perceptually relevant measure of loudness.
    fn rms(&self, range: impl Into<RangeOptions>) -> AudioResult<Vec<f64>>;
}

/// Sample-wise level processing.
pub trait AudioProcessing {
    /// Multiplies the selected samples by `10^(db / 20)`.
    ///
    /// A gain of `0` dB is a no-op.
    fn gain(&mut self, db: f64, range: impl Into<RangeOptions>) -> AudioResult<&mut Self>;

    /// Scales the selected samples so the peak reaches full scale, then clamps
    /// to `[-1, 1]`.
    ///
    /// The factor is `max(1 / peak, 1)`: quiet material is amplified, hot
    /// material is only clamped. Silence is left untouched.
    fn normalize(&mut self, range: impl Into<RangeOptions>) -> AudioResult<&mut Self>;

    /// Applies a fade envelope between the fade floor and unity.
    ///
    /// The direction follows the sign of the range's duration: a positive
    /// duration fades in from the range start, a negative one fades out
    /// towards the range end. Without a start time a negative duration is
    /// anchored at the end of the audio.
    fn fade(
        &mut self,
        range: impl Into<RangeOptions>,
        options: impl Into<FadeOptions>,
    ) -> AudioResult<&mut Self>;

    /// Negates the selected samples.
    fn invert(&mut self, range: impl Into<RangeOptions>) -> AudioResult<&mut Self>;
}

/// Structural edits that change sample order or length.
pub trait AudioEditing {
    /// Removes leading and/or trailing samples whose magnitude does not exceed
    /// the threshold on any channel.
    ///
    /// Audio with no sample above the threshold is left unchanged.
    fn trim(&mut self, options: impl Into<TrimOptions>) -> AudioResult<&mut Self>;

    /// Reverses sample order of the selected channels within the range.
    fn reverse(&mut self, range: impl Into<RangeOptions>) -> AudioResult<&mut Self>;

    /// Extends the audio to `duration` seconds with a constant value.
    ///
    /// Audio already at least that long is left unchanged.
    fn pad(&mut self, duration: f64, options: impl Into<PadOptions>) -> AudioResult<&mut Self>;

    /// Moves the signal by `amount` seconds; positive moves later.
    ///
    /// Vacated samples become silence, or with
    /// [`rotate`](ShiftOptions::rotate) receive the samples pushed past the
    /// opposite edge.
    fn shift(&mut self, amount: f64, options: impl Into<ShiftOptions>) -> AudioResult<&mut Self>;
}

/// Channel-count conversion.
pub trait AudioChannelOps {
    /// Converts to `channels` channels using `method`.
    fn remix(&mut self, channels: usize, method: RemixMethod) -> AudioResult<&mut Self>;
}

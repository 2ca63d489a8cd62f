//! Core sample block representation.
//!
//! A [`Segment`] is the leaf of the storage model: a fixed-length block of
//! planar `f32` samples backed by an `ndarray::Array2` with shape
//! `(channels, frames)`. Each row is one channel.
//!
//! Segments are created once and attached to a [`SampleStore`](crate::SampleStore);
//! afterwards only their sample values change (through the store's visitor),
//! never their length.
//!
//! ```rust
//! use audio_container::Segment;
//!
//! let seg = Segment::from_channels(vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]], 48000).unwrap();
//! assert_eq!(seg.num_channels(), 2);
//! assert_eq!(seg.len(), 3);
//! assert_eq!(seg.channel(1).to_vec(), vec![0.4, 0.5, 0.6]);
//! ```
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Axis, s};

use crate::{AudioError, AudioResult};

/// A block of planar multichannel samples at a fixed sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    data: Array2<f32>,
    sample_rate: u32,
}

impl Segment {
    /// Wraps a `(channels, frames)` array.
    ///
    /// # Errors
    /// Returns an error if the array has no channels or the sample rate is zero.
    pub fn new(data: Array2<f32>, sample_rate: u32) -> AudioResult<Self> {
        if data.nrows() == 0 {
            return Err(AudioError::invalid_argument(
                "data",
                "segment must have at least one channel",
            ));
        }
        if sample_rate == 0 {
            return Err(AudioError::invalid_argument(
                "sample_rate",
                "sample rate must be greater than zero",
            ));
        }
        Ok(Self { data, sample_rate })
    }

    /// Builds a segment from per-channel sample vectors.
    ///
    /// # Errors
    /// Returns an error if no channels are given or the channels differ in length.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> AudioResult<Self> {
        let num_channels = channels.len();
        let frames = channels.first().map_or(0, Vec::len);
        if let Some((idx, ch)) = channels.iter().enumerate().find(|(_, ch)| ch.len() != frames) {
            return Err(AudioError::DimensionMismatch(format!(
                "channel {} has {} samples, expected {}",
                idx,
                ch.len(),
                frames
            )));
        }
        let flat: Vec<f32> = channels.into_iter().flatten().collect();
        let data = Array2::from_shape_vec((num_channels, frames), flat)
            .map_err(|e| AudioError::DimensionMismatch(e.to_string()))?;
        Self::new(data, sample_rate)
    }

    /// Single-channel segment over `samples`. The caller guarantees a
    /// non-zero sample rate.
    pub(crate) fn from_mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            data: Array1::from(samples).insert_axis(Axis(0)),
            sample_rate,
        }
    }

    /// A segment of `length` frames with every sample set to `value`.
    pub fn filled(channels: usize, length: usize, sample_rate: u32, value: f32) -> AudioResult<Self> {
        Self::new(Array2::from_elem((channels, length), value), sample_rate)
    }

    /// A segment of `length` frames of silence.
    pub fn silence(channels: usize, length: usize, sample_rate: u32) -> AudioResult<Self> {
        Self::filled(channels, length, sample_rate, 0.0)
    }

    /// The zero-length sentinel segment.
    pub fn empty(channels: usize, sample_rate: u32) -> AudioResult<Self> {
        Self::silence(channels, 0, sample_rate)
    }

    /// Number of frames (samples per channel).
    pub fn len(&self) -> usize {
        self.data.ncols()
    }

    /// True for the zero-length sentinel.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.data.nrows()
    }

    /// Sample rate in Hz.
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// Read-only view of one channel.
    ///
    /// # Panics
    /// Panics if `channel` is out of bounds.
    pub fn channel(&self, channel: usize) -> ArrayView1<'_, f32> {
        self.data.index_axis(Axis(0), channel)
    }

    /// Mutable view of one channel.
    ///
    /// # Panics
    /// Panics if `channel` is out of bounds.
    pub fn channel_mut(&mut self, channel: usize) -> ArrayViewMut1<'_, f32> {
        self.data.index_axis_mut(Axis(0), channel)
    }

    /// The full `(channels, frames)` view.
    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// The full mutable `(channels, frames)` view.
    pub fn view_mut(&mut self) -> ArrayViewMut2<'_, f32> {
        self.data.view_mut()
    }

    /// Consumes the segment and returns its sample array.
    pub fn into_data(self) -> Array2<f32> {
        self.data
    }

    /// Applies `f` to every sample of the listed channels.
    pub fn apply_to_channels<F>(&mut self, channels: &[usize], mut f: F)
    where
        F: FnMut(f32) -> f32,
    {
        for &ch in channels {
            self.data
                .index_axis_mut(Axis(0), ch)
                .mapv_inplace(&mut f);
        }
    }

    /// Owned copy of frames `start..end` restricted to `channels`.
    pub(crate) fn copy_frames(&self, start: usize, end: usize, channels: &[usize]) -> Self {
        let sliced = self.data.slice(s![.., start..end]);
        let data = sliced.select(Axis(0), channels);
        Self {
            data,
            sample_rate: self.sample_rate,
        }
    }

    /// Splits into `[0, at)` and `[at, len)`. Each sample ends up in exactly
    /// one half.
    pub(crate) fn split_at(self, at: usize) -> (Self, Self) {
        let left = self.data.slice(s![.., ..at]).to_owned();
        let right = self.data.slice(s![.., at..]).to_owned();
        (
            Self {
                data: left,
                sample_rate: self.sample_rate,
            },
            Self {
                data: right,
                sample_rate: self.sample_rate,
            },
        )
    }

    /// Joins consecutive segments into one contiguous block.
    pub(crate) fn join(parts: &[Self]) -> AudioResult<Self> {
        let first = parts
            .first()
            .ok_or_else(|| AudioError::invalid_argument("parts", "nothing to join"))?;
        let views: Vec<ArrayView2<'_, f32>> = parts.iter().map(Segment::view).collect();
        let data = ndarray::concatenate(Axis(1), &views)
            .map_err(|e| AudioError::DimensionMismatch(format!("join failed: {e}")))?;
        Ok(Self {
            data,
            sample_rate: first.sample_rate,
        })
    }

    /// Applies a `(out_channels, in_channels)` mixing matrix.
    pub(crate) fn mix(&self, matrix: &Array2<f32>) -> Self {
        Self {
            data: matrix.dot(&self.data),
            sample_rate: self.sample_rate,
        }
    }
}

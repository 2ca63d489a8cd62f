//! # Sample Format Conversions
//!
//! The container stores planar `f32` samples. This module converts at the
//! edges: reading a range out as another sample type and memory layout, and
//! importing PCM data in any supported type and layout.
//!
//! Conversions are exposed through the [`AudioTypeConversion`] trait,
//! implemented for [`Audio`]:
//!
//! ```rust
//! use audio_container::{Audio, ChannelLayout, conversions::AudioTypeConversion};
//!
//! # fn example() -> audio_container::AudioResult<()> {
//! let audio = Audio::from_channels(vec![vec![0.5, -0.5], vec![1.0, 0.0]])?;
//!
//! // Interleaved 16-bit PCM: L0 R0 L1 R1
//! let pcm: Vec<i16> = audio.read_as(ChannelLayout::Interleaved, ())?;
//! assert_eq!(pcm, vec![16384, 32767, -16384, 0]);
//!
//! // And back again.
//! let back = Audio::from_pcm(&pcm, 2, ChannelLayout::Interleaved, 44100)?;
//! assert_eq!(back.channels(), 2);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Supported Conversions
//!
//! - `i16`
//! - `i32`
//! - `f32`
//! - `f64`
//!
//! Float to integer conversions clamp to `[-1.0, 1.0]` first, so hot samples
//! saturate instead of wrapping. Non-finite samples fail with
//! [`AudioError::Conversion`].

use ndarray::Array2;

use crate::repr::Segment;
use crate::{
    Audio, AudioError, AudioResult, AudioSample, ChannelLayout, ConvertTo, RangeOptions,
    SampleStore,
};

/// Reading and importing audio in external sample formats.
pub trait AudioTypeConversion {
    /// Reads the selected range as a flat buffer of `O` in `layout`.
    fn read_as<O>(&self, layout: ChannelLayout, range: impl Into<RangeOptions>) -> AudioResult<Vec<O>>
    where
        O: AudioSample,
        f32: ConvertTo<O>;

    /// Reads the selected range into `dest`, which must hold exactly
    /// `length * channels` samples. Returns the number of samples written.
    ///
    /// # Errors
    /// Returns [`AudioError::DimensionMismatch`] if `dest` has the wrong size.
    fn read_into<O>(
        &self,
        dest: &mut [O],
        layout: ChannelLayout,
        range: impl Into<RangeOptions>,
    ) -> AudioResult<usize>
    where
        O: AudioSample,
        f32: ConvertTo<O>;

    /// Reads the selected range as native-endian bytes of `O`.
    fn read_bytes<O>(&self, layout: ChannelLayout, range: impl Into<RangeOptions>) -> AudioResult<Vec<u8>>
    where
        O: AudioSample,
        f32: ConvertTo<O>;

    /// Imports `channels`-channel PCM data in `layout`.
    ///
    /// # Errors
    /// Returns an error if `data` doesn't divide into `channels`, or a
    /// sample can't be converted.
    fn from_pcm<O>(data: &[O], channels: usize, layout: ChannelLayout, sample_rate: u32) -> AudioResult<Self>
    where
        Self: Sized,
        O: AudioSample;
}

impl AudioTypeConversion for Audio {
    fn read_as<O>(&self, layout: ChannelLayout, range: impl Into<RangeOptions>) -> AudioResult<Vec<O>>
    where
        O: AudioSample,
        f32: ConvertTo<O>,
    {
        let range = self.resolve(range)?;
        let data = self
            .store()
            .to_array(range.start, range.end, &range.channels)?;
        match layout {
            ChannelLayout::NonInterleaved => data.iter().map(|s| s.convert_to()).collect(),
            ChannelLayout::Interleaved => data.t().iter().map(|s| s.convert_to()).collect(),
        }
    }

    fn read_into<O>(
        &self,
        dest: &mut [O],
        layout: ChannelLayout,
        range: impl Into<RangeOptions>,
    ) -> AudioResult<usize>
    where
        O: AudioSample,
        f32: ConvertTo<O>,
    {
        let converted: Vec<O> = self.read_as(layout, range)?;
        if converted.len() != dest.len() {
            return Err(AudioError::DimensionMismatch(format!(
                "destination holds {} samples, range has {}",
                dest.len(),
                converted.len()
            )));
        }
        dest.copy_from_slice(&converted);
        Ok(converted.len())
    }

    fn read_bytes<O>(&self, layout: ChannelLayout, range: impl Into<RangeOptions>) -> AudioResult<Vec<u8>>
    where
        O: AudioSample,
        f32: ConvertTo<O>,
    {
        let converted: Vec<O> = self.read_as(layout, range)?;
        Ok(bytemuck::cast_slice(&converted).to_vec())
    }

    fn from_pcm<O>(data: &[O], channels: usize, layout: ChannelLayout, sample_rate: u32) -> AudioResult<Self>
    where
        O: AudioSample,
    {
        if channels == 0 || data.len() % channels != 0 {
            return Err(AudioError::DimensionMismatch(format!(
                "{} samples cannot be split into {} channels",
                data.len(),
                channels
            )));
        }
        let frames = data.len() / channels;
        let samples = data
            .iter()
            .map(|s| s.convert_to())
            .collect::<AudioResult<Vec<f32>>>()?;

        let planar = match layout {
            ChannelLayout::NonInterleaved => Array2::from_shape_vec((channels, frames), samples),
            ChannelLayout::Interleaved => Array2::from_shape_vec((frames, channels), samples)
                .map(|arr| arr.reversed_axes().as_standard_layout().into_owned()),
        }
        .map_err(|e| AudioError::DimensionMismatch(e.to_string()))?;

        let store = SampleStore::from_segment(Segment::new(planar, sample_rate)?)?;
        Ok(Audio::from_store(store))
    }
}

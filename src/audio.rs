//! The [`Audio`] container.
//!
//! `Audio` binds a [`SampleStore`] to its sample rate and channel count and is
//! the public surface for creating, reading, writing and editing audio. Signal
//! operations live in [`operations`](crate::operations) as traits implemented
//! for `Audio`.
//!
//! ## Creating audio
//!
//! Every creation path goes through [`Source`], which captures the shapes a
//! caller can hand in:
//!
//! ```rust
//! use audio_container::{Audio, AudioOptions, Source};
//!
//! # fn example() -> audio_container::AudioResult<()> {
//! // One second of stereo silence at 48 kHz.
//! let silence = Audio::from_source(1.0, AudioOptions::default().channels(2).sample_rate(48000))?;
//! assert_eq!(silence.length(), 48000);
//!
//! // Flat data split planar across three channels.
//! let planar = Audio::from_source(vec![0.0f32, 0.1, 0.0, 0.2, 0.0, 0.3], 3usize)?;
//! assert_eq!(planar.read(())?, vec![vec![0.0, 0.1], vec![0.0, 0.2], vec![0.0, 0.3]]);
//!
//! // A list of sources is concatenated.
//! let joined = Audio::from_sources(vec![Source::from(&planar), Source::Duration(0.5)], ())?;
//! assert_eq!(joined.channels(), 3);
//! assert_eq!(joined.length(), 2 + 22050);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use std::fmt;
use std::io::Write;

use ndarray::s;

use crate::operations::RemixMethod;
use crate::range::{RangeOptions, SampleRange};
use crate::repr::Segment;
use crate::store::{SampleStore, StoreView, Visit};
use crate::utils::audio_math::seconds_to_samples;
use crate::{AudioError, AudioResult, DEFAULT_SAMPLE_RATE};

/// Lists with at least this many raw arrays are never read as a channel layout.
const MAX_LAYOUT_CHANNELS: usize = 32;

/// Creation options.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioOptions {
    /// Sample rate in Hz for sources that don't carry their own.
    pub sample_rate: u32,
    /// Channel count. Splits flat sample data planar, and remixes other
    /// sources to this count. Inferred from the source when absent.
    pub channels: Option<usize>,
    /// Final length in samples; the result is truncated or padded with
    /// silence. Takes precedence over `duration`.
    pub length: Option<usize>,
    /// Final duration in seconds, applied like `length`.
    pub duration: Option<f64>,
    /// Enables the metrics flag on the container.
    pub stats: bool,
    /// Allows the container to be served from a source cache.
    pub cache: bool,
}

impl Default for AudioOptions {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: None,
            length: None,
            duration: None,
            stats: false,
            cache: true,
        }
    }
}

impl AudioOptions {
    /// Sets the sample rate.
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Sets the channel count.
    pub fn channels(mut self, channels: usize) -> Self {
        self.channels = Some(channels);
        self
    }

    /// Sets the final length in samples.
    pub fn length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets the final duration in seconds.
    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Sets the metrics flag.
    pub fn stats(mut self, stats: bool) -> Self {
        self.stats = stats;
        self
    }

    /// Sets the cache flag.
    pub fn cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    fn target_length(&self) -> AudioResult<Option<usize>> {
        match (self.length, self.duration) {
            (Some(length), _) => Ok(Some(length)),
            (None, Some(duration)) => {
                check_duration(duration)?;
                Ok(Some(seconds_to_samples(duration, self.sample_rate)))
            }
            (None, None) => Ok(None),
        }
    }
}

impl From<()> for AudioOptions {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

/// A bare number stands for a channel count.
impl From<usize> for AudioOptions {
    fn from(channels: usize) -> Self {
        Self::default().channels(channels)
    }
}

/// Anything audio can be created from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// Silence of the given duration in seconds.
    Duration(f64),
    /// A loose sample value. A list starting with values is raw mono data;
    /// on its own, or among other sources, a value is a duration.
    Value(f32),
    /// Flat sample data, split planar when more than one channel is requested.
    Samples(Vec<f32>),
    /// One sample vector per channel.
    Channels(Vec<Vec<f32>>),
    /// Per-channel data with its own sample rate, as produced by a decoder.
    Buffer {
        /// One sample vector per channel.
        channels: Vec<Vec<f32>>,
        /// Sample rate in Hz.
        sample_rate: u32,
    },
    /// A single segment.
    Segment(Segment),
    /// Another container; the result owns a copy of its samples.
    Audio(Audio),
    /// Raw values, a channel layout, or several sources to concatenate,
    /// depending on the items.
    List(Vec<Source>),
}

impl From<f64> for Source {
    fn from(seconds: f64) -> Self {
        Self::Duration(seconds)
    }
}

impl From<f32> for Source {
    fn from(value: f32) -> Self {
        Self::Value(value)
    }
}

impl From<Vec<f32>> for Source {
    fn from(samples: Vec<f32>) -> Self {
        Self::Samples(samples)
    }
}

impl From<&[f32]> for Source {
    fn from(samples: &[f32]) -> Self {
        Self::Samples(samples.to_vec())
    }
}

impl From<Vec<Vec<f32>>> for Source {
    fn from(channels: Vec<Vec<f32>>) -> Self {
        Self::Channels(channels)
    }
}

impl From<Segment> for Source {
    fn from(segment: Segment) -> Self {
        Self::Segment(segment)
    }
}

impl From<Audio> for Source {
    fn from(audio: Audio) -> Self {
        Self::Audio(audio)
    }
}

impl From<&Audio> for Source {
    fn from(audio: &Audio) -> Self {
        Self::Audio(audio.clone())
    }
}

impl From<Vec<Source>> for Source {
    fn from(items: Vec<Source>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<Audio>> for Source {
    fn from(items: Vec<Audio>) -> Self {
        Self::List(items.into_iter().map(Source::Audio).collect())
    }
}

/// How a [`Source::List`] is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListShape {
    /// Loose values forming mono samples.
    Values,
    /// A short list of raw arrays, one per channel.
    Layout,
    /// Independent sources to concatenate.
    Concat,
}

fn classify(items: &[Source]) -> AudioResult<ListShape> {
    let is_value = |s: &Source| matches!(s, Source::Value(_));
    let is_raw = |s: &Source| matches!(s, Source::Samples(_));

    let starts_with_values = match items {
        [first] => is_value(first),
        [first, second, ..] => is_value(first) && is_value(second),
        [] => false,
    };
    if starts_with_values {
        if !items.iter().all(is_value) {
            return Err(mixed_list_error());
        }
        return Ok(ListShape::Values);
    }
    if items.len() < MAX_LAYOUT_CHANNELS && items.iter().all(is_raw) {
        return Ok(ListShape::Layout);
    }
    if items.iter().any(is_value) && items.iter().any(is_raw) {
        return Err(mixed_list_error());
    }
    Ok(ListShape::Concat)
}

fn mixed_list_error() -> AudioError {
    AudioError::invalid_argument(
        "source",
        "list mixes loose sample values with nested sample arrays",
    )
}

fn check_duration(seconds: f64) -> AudioResult<()> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(AudioError::invalid_argument(
            "duration",
            format!("duration should be a non-negative number, got {}", seconds),
        ));
    }
    Ok(())
}

/// Splits flat data into `channels` equal planar blocks.
fn split_planar(samples: Vec<f32>, channels: usize) -> AudioResult<Vec<Vec<f32>>> {
    if channels == 0 {
        return Err(AudioError::invalid_argument(
            "channels",
            "channel count must be greater than zero",
        ));
    }
    if samples.len() % channels != 0 {
        return Err(AudioError::DimensionMismatch(format!(
            "{} samples cannot be split into {} channels",
            samples.len(),
            channels
        )));
    }
    let frames = samples.len() / channels;
    if frames == 0 {
        return Ok(vec![Vec::new(); channels]);
    }
    Ok(samples.chunks(frames).map(<[f32]>::to_vec).collect())
}

/// Truncates or pads `store` with silence to exactly `target` frames.
fn resize(store: &mut SampleStore, target: usize) -> AudioResult<()> {
    let length = store.len();
    if target < length {
        store.remove(target, length)?;
    } else if target > length {
        store.append(Segment::silence(
            store.num_channels(),
            target - length,
            store.sample_rate(),
        )?)?;
    }
    Ok(())
}

fn remix_store(store: &mut SampleStore, channels: usize) -> AudioResult<()> {
    if store.num_channels() != channels {
        let matrix = RemixMethod::Smart.matrix(store.num_channels(), channels)?;
        store.mix(&matrix)?;
    }
    Ok(())
}

/// Builds a store for one source. Length options are applied by the caller.
fn build_store(source: Source, options: &AudioOptions) -> AudioResult<SampleStore> {
    let rate = options.sample_rate;
    let channels = options.channels.unwrap_or(1);
    let mut store = match source {
        Source::Duration(seconds) => {
            check_duration(seconds)?;
            SampleStore::silence(channels, seconds_to_samples(seconds, rate), rate)?
        }
        Source::Value(seconds) => return build_store(Source::Duration(seconds as f64), options),
        Source::Samples(samples) => {
            SampleStore::from_segment(Segment::from_channels(split_planar(samples, channels)?, rate)?)?
        }
        Source::Channels(data) if data.is_empty() => SampleStore::new(channels, rate)?,
        Source::Channels(data) => SampleStore::from_segment(Segment::from_channels(data, rate)?)?,
        Source::Buffer {
            channels: data,
            sample_rate,
        } => SampleStore::from_segment(Segment::from_channels(data, sample_rate)?)?,
        Source::Segment(segment) => SampleStore::from_segment(segment)?,
        Source::Audio(audio) => audio.store,
        Source::List(items) => match classify(&items)? {
            ListShape::Values => {
                let samples = items
                    .into_iter()
                    .filter_map(|item| match item {
                        Source::Value(v) => Some(v),
                        _ => None,
                    })
                    .collect();
                return build_store(Source::Samples(samples), options);
            }
            ListShape::Layout => {
                let data = items
                    .into_iter()
                    .filter_map(|item| match item {
                        Source::Samples(samples) => Some(samples),
                        _ => None,
                    })
                    .collect();
                return build_store(Source::Channels(data), options);
            }
            ListShape::Concat => concat_stores(items, options)?,
        },
    };
    if let Some(target) = options.channels {
        remix_store(&mut store, target)?;
    }
    Ok(store)
}

/// Concatenates sources. The result takes the widest channel count and the
/// first item's sample rate; narrower items are up-mixed.
fn concat_stores(items: Vec<Source>, options: &AudioOptions) -> AudioResult<SampleStore> {
    let stores = items
        .into_iter()
        .map(|item| build_store(item, options))
        .collect::<AudioResult<Vec<_>>>()?;

    let channels = stores
        .iter()
        .map(SampleStore::num_channels)
        .max()
        .unwrap_or(1);
    let sample_rate = stores
        .first()
        .map_or(options.sample_rate, SampleStore::sample_rate);

    let mut joined = SampleStore::new(channels, sample_rate)?;
    for (idx, mut store) in stores.into_iter().enumerate() {
        if store.sample_rate() != sample_rate {
            return Err(AudioError::invalid_argument(
                "source",
                format!(
                    "item {} has sample rate {}, expected {}",
                    idx,
                    store.sample_rate(),
                    sample_rate
                ),
            ));
        }
        remix_store(&mut store, channels)?;
        joined.append_store(store)?;
    }
    Ok(joined)
}

/// Produces encoded bytes (typically WAV) from planar sample data.
///
/// Encoding is left to an external implementation; [`Audio::save`] hands over
/// the full signal and writes whatever comes back.
pub trait Serializer {
    /// Encodes one vector per channel at `sample_rate`.
    fn serialize(&self, channels: &[Vec<f32>], sample_rate: u32) -> AudioResult<Vec<u8>>;
}

/// A value to write into a range.
pub enum WriteValue {
    /// Every selected sample becomes this value.
    Scalar(f32),
    /// Called as `f(current, global_index, channel)` for every selected sample.
    Func(Box<dyn FnMut(f32, usize, usize) -> f32 + Send>),
    /// Sample data copied channel by channel into the range, truncated to
    /// the shorter of source and range in both length and channel count.
    Source(Source),
}

impl fmt::Debug for WriteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteValue::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
            WriteValue::Func(_) => f.write_str("Func(..)"),
            WriteValue::Source(s) => f.debug_tuple("Source").field(s).finish(),
        }
    }
}

impl From<f32> for WriteValue {
    fn from(value: f32) -> Self {
        Self::Scalar(value)
    }
}

impl From<Source> for WriteValue {
    fn from(source: Source) -> Self {
        Self::Source(source)
    }
}

impl From<Vec<f32>> for WriteValue {
    fn from(samples: Vec<f32>) -> Self {
        Self::Source(Source::Samples(samples))
    }
}

impl From<Vec<Vec<f32>>> for WriteValue {
    fn from(channels: Vec<Vec<f32>>) -> Self {
        Self::Source(Source::Channels(channels))
    }
}

impl From<Audio> for WriteValue {
    fn from(audio: Audio) -> Self {
        Self::Source(Source::Audio(audio))
    }
}

impl From<&Audio> for WriteValue {
    fn from(audio: &Audio) -> Self {
        Self::Source(Source::from(audio))
    }
}

impl From<Segment> for WriteValue {
    fn from(segment: Segment) -> Self {
        Self::Source(Source::Segment(segment))
    }
}

/// A multichannel audio container.
///
/// Owns its samples exclusively: [`Clone`] produces a deep copy, so edits to
/// one instance are never visible through another.
#[derive(Debug, Clone)]
pub struct Audio {
    store: SampleStore,
    stats: bool,
    cache: bool,
}

impl Audio {
    /// Mono audio at the default sample rate.
    pub fn from_samples(samples: Vec<f32>) -> Self {
        Self::from_store(SampleStore::single(Segment::from_mono(
            samples,
            DEFAULT_SAMPLE_RATE,
        )))
    }

    /// Audio with one sample vector per channel at the default sample rate.
    ///
    /// # Errors
    /// Returns an error if no channels are given or they differ in length.
    pub fn from_channels(channels: Vec<Vec<f32>>) -> AudioResult<Self> {
        let segment = Segment::from_channels(channels, DEFAULT_SAMPLE_RATE)?;
        Ok(Self::from_store(SampleStore::single(segment)))
    }

    /// Mono silence of `seconds` at the default sample rate.
    pub fn with_duration(seconds: f64) -> AudioResult<Self> {
        Self::from_source(Source::Duration(seconds), AudioOptions::default())
    }

    /// Silence shaped entirely by `options` (`length` or `duration`,
    /// `channels`, `sample_rate`).
    pub fn with_options(options: AudioOptions) -> AudioResult<Self> {
        Self::from_source(Source::Duration(0.0), options)
    }

    /// Creates audio from any [`Source`].
    ///
    /// # Errors
    /// - [`AudioError::InvalidArgument`] for a negative duration or a list
    ///   mixing loose values with nested arrays.
    /// - [`AudioError::DimensionMismatch`] for ragged channel data or flat
    ///   data that doesn't divide into the requested channels.
    pub fn from_source(
        source: impl Into<Source>,
        options: impl Into<AudioOptions>,
    ) -> AudioResult<Self> {
        let options = options.into();
        let mut store = build_store(source.into(), &options)?;
        if let Some(target) = options.target_length()? {
            resize(&mut store, target)?;
        }
        Ok(Self {
            store,
            stats: options.stats,
            cache: options.cache,
        })
    }

    /// Concatenates several sources into one container.
    ///
    /// The result has the largest channel count among the items; narrower
    /// items are up-mixed. All items must share a sample rate.
    pub fn from_sources(sources: Vec<Source>, options: impl Into<AudioOptions>) -> AudioResult<Self> {
        let options = options.into();
        let mut store = concat_stores(sources, &options)?;
        if let Some(target) = options.channels {
            remix_store(&mut store, target)?;
        }
        if let Some(target) = options.target_length()? {
            resize(&mut store, target)?;
        }
        Ok(Self {
            store,
            stats: options.stats,
            cache: options.cache,
        })
    }

    /// Wraps an existing store.
    pub fn from_store(store: SampleStore) -> Self {
        Self {
            store,
            stats: false,
            cache: true,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut SampleStore {
        &mut self.store
    }

    /// Consumes the container and returns its store.
    pub fn into_store(self) -> SampleStore {
        self.store
    }

    fn derive(&self, store: SampleStore) -> Self {
        Self {
            store,
            stats: self.stats,
            cache: self.cache,
        }
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.store.num_channels()
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.store.sample_rate()
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.store.duration_seconds()
    }

    /// Length in samples per channel.
    pub fn length(&self) -> usize {
        self.store.len()
    }

    /// True when the container holds no samples.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Whether metrics were requested at creation.
    pub fn stats_enabled(&self) -> bool {
        self.stats
    }

    /// Whether this container may be served from a source cache.
    pub fn cache_enabled(&self) -> bool {
        self.cache
    }

    /// Remixes to `channels` channels.
    pub fn set_channels(&mut self, channels: usize) -> AudioResult<()> {
        remix_store(&mut self.store, channels)
    }

    /// Changing the sample rate is not supported.
    ///
    /// # Errors
    /// Always returns [`AudioError::Unimplemented`].
    pub fn set_sample_rate(&mut self, sample_rate: u32) -> AudioResult<()> {
        Err(AudioError::Unimplemented(format!(
            "resampling from {} Hz to {} Hz",
            self.sample_rate(),
            sample_rate
        )))
    }

    /// Truncates, or pads with silence, to `seconds`.
    pub fn set_duration(&mut self, seconds: f64) -> AudioResult<()> {
        check_duration(seconds)?;
        self.set_length(seconds_to_samples(seconds, self.sample_rate()))
    }

    /// Truncates, or pads with silence, to `length` samples.
    pub fn set_length(&mut self, length: usize) -> AudioResult<()> {
        resize(&mut self.store, length)
    }

    /// Resolves `range` against this container.
    pub fn resolve(&self, range: impl Into<RangeOptions>) -> AudioResult<SampleRange> {
        range
            .into()
            .resolve(self.length(), self.channels(), self.sample_rate())
    }

    /// Copies the selected range, one vector per selected channel.
    ///
    /// ```rust
    /// use audio_container::{Audio, RangeOptions};
    ///
    /// let audio = Audio::from_channels(vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]]).unwrap();
    /// let right = audio.read(RangeOptions::new().start(1).channel(1)).unwrap();
    /// assert_eq!(right, vec![vec![0.5, 0.6]]);
    /// ```
    pub fn read(&self, range: impl Into<RangeOptions>) -> AudioResult<Vec<Vec<f32>>> {
        let range = self.resolve(range)?;
        let data = self
            .store
            .to_array(range.start, range.end, &range.channels)?;
        Ok(data.outer_iter().map(|row| row.to_vec()).collect())
    }

    /// Copies one channel of the selected range.
    pub fn read_channel(&self, channel: usize, range: impl Into<RangeOptions>) -> AudioResult<Vec<f32>> {
        let range = range.into().channel(channel);
        Ok(self.read(range)?.into_iter().next().unwrap_or_default())
    }

    /// Borrowed, zero-copy view of the selected frames (all channels).
    pub fn view(&self, range: impl Into<RangeOptions>) -> AudioResult<StoreView<'_>> {
        let range = self.resolve(range)?;
        self.store.slice(range.start, range.end)
    }

    /// Owned copy of the selected range and channels.
    pub fn slice(&self, range: impl Into<RangeOptions>) -> AudioResult<Audio> {
        let range = self.resolve(range)?;
        let store = self
            .store
            .slice_copy(range.start, range.end, &range.channels)?;
        Ok(self.derive(store))
    }

    /// Writes `value` into the selected range.
    ///
    /// ```rust
    /// use audio_container::{Audio, RangeOptions, WriteValue};
    ///
    /// # fn example() -> audio_container::AudioResult<()> {
    /// let mut audio = Audio::from_samples(vec![0.0; 4]);
    /// audio.write(0.5f32, RangeOptions::new().start(2))?;
    /// audio.write(vec![0.1f32, 0.2, 0.3], RangeOptions::new().length(2))?;
    /// audio.write(WriteValue::Func(Box::new(|x, i, _| x + i as f32)), RangeOptions::new().start(3))?;
    /// assert_eq!(audio.read_channel(0, ())?, vec![0.1, 0.2, 0.5, 3.5]);
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    pub fn write(
        &mut self,
        value: impl Into<WriteValue>,
        range: impl Into<RangeOptions>,
    ) -> AudioResult<&mut Self> {
        match value.into() {
            WriteValue::Scalar(v) => self.write_with(|_, _, _| v, range),
            WriteValue::Func(mut f) => self.write_with(|x, i, c| f(x, i, c), range),
            WriteValue::Source(source) => self.write_source(source, range),
        }
    }

    /// Sets every selected sample to `value`.
    pub fn fill(&mut self, value: f32, range: impl Into<RangeOptions>) -> AudioResult<&mut Self> {
        self.write_with(|_, _, _| value, range)
    }

    /// Replaces each selected sample with `f(current, global_index, channel)`.
    pub fn write_with<F>(&mut self, mut f: F, range: impl Into<RangeOptions>) -> AudioResult<&mut Self>
    where
        F: FnMut(f32, usize, usize) -> f32,
    {
        let range = self.resolve(range)?;
        self.store.scan_mut(range.start, range.end, |mut part, offset| {
            for &ch in &range.channels {
                for (i, x) in part.row_mut(ch).iter_mut().enumerate() {
                    *x = f(*x, offset + i, ch);
                }
            }
        })?;
        Ok(self)
    }

    fn write_source(&mut self, source: Source, range: impl Into<RangeOptions>) -> AudioResult<&mut Self> {
        let range = self.resolve(range)?;
        let src = Audio::from_source(source, AudioOptions::default().sample_rate(self.sample_rate()))?;
        if src.sample_rate() != self.sample_rate() {
            return Err(AudioError::invalid_argument(
                "value",
                format!(
                    "source sample rate {} does not match {}",
                    src.sample_rate(),
                    self.sample_rate()
                ),
            ));
        }

        let frames = range.length.min(src.length());
        let channels = range.channels.len().min(src.channels());
        let src_channels: Vec<usize> = (0..channels).collect();
        let data = src.store.to_array(0, frames, &src_channels)?;

        let start = range.start;
        self.store.scan_mut(start, start + frames, |mut part, offset| {
            let at = offset - start;
            let width = part.ncols();
            for (k, &ch) in range.channels.iter().take(channels).enumerate() {
                part.row_mut(ch).assign(&data.slice(s![k, at..at + width]));
            }
        })?;
        Ok(self)
    }

    /// Inserts `source` at `time` seconds; `None` appends.
    ///
    /// Negative times count from the end. A time past the end first pads the
    /// container with silence up to that time. Sources with a different
    /// channel count are remixed to match; a different sample rate is an
    /// error.
    pub fn insert(&mut self, source: impl Into<Source>, time: Option<f64>) -> AudioResult<&mut Self> {
        let time = time.unwrap_or(-0.0);
        let other = Audio::from_source(source, AudioOptions::default().sample_rate(self.sample_rate()))?;
        if other.sample_rate() != self.sample_rate() {
            return Err(AudioError::invalid_argument(
                "source",
                format!(
                    "source sample rate {} does not match {}",
                    other.sample_rate(),
                    self.sample_rate()
                ),
            ));
        }
        let mut incoming = other.store;
        remix_store(&mut incoming, self.channels())?;

        if time > self.duration() {
            self.set_duration(time)?;
        }
        let offset = self.resolve(RangeOptions::at(time))?.start;
        self.store.insert_store(offset, incoming)?;
        Ok(self)
    }

    /// Removes the selected frames across all channels and returns them.
    ///
    /// # Errors
    /// Returns [`AudioError::InvalidArgument`] if the range selects only some
    /// channels.
    pub fn remove(&mut self, range: impl Into<RangeOptions>) -> AudioResult<Audio> {
        let range = self.resolve(range)?;
        if range.channels.len() != self.channels() {
            return Err(AudioError::invalid_argument(
                "channels",
                "remove operates on every channel",
            ));
        }
        let removed = self.store.remove(range.start, range.end)?;
        Ok(self.derive(removed))
    }

    /// Runs `f` over every segment in the range, after splitting at the
    /// range boundaries. Returning `Some(segment)` replaces the visited one.
    pub fn through<F>(&mut self, mut f: F, range: impl Into<RangeOptions>) -> AudioResult<&mut Self>
    where
        F: FnMut(&mut Segment) -> Option<Segment>,
    {
        let range = self.resolve(range)?;
        self.store
            .visit(range.start, range.end, |segment, _| Visit::Continue(f(segment)))?;
        Ok(self)
    }

    /// True when every container in `others` has the same length, channel
    /// count, sample rate and samples as `self`.
    pub fn equal(&self, others: &[&Audio]) -> bool {
        others.iter().all(|other| self.same_content(other))
    }

    fn same_content(&self, other: &Audio) -> bool {
        if self.length() != other.length()
            || self.channels() != other.channels()
            || self.sample_rate() != other.sample_rate()
        {
            return false;
        }
        let all: Vec<usize> = (0..self.channels()).collect();
        match (
            self.store.to_array(0, self.length(), &all),
            other.store.to_array(0, other.length(), &all),
        ) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Encodes the whole signal with `serializer` and writes it to `writer`.
    ///
    /// # Errors
    /// Propagates serializer failures; write failures become
    /// [`AudioError::Io`].
    pub fn save<S, W>(&self, serializer: &S, writer: &mut W) -> AudioResult<()>
    where
        S: Serializer + ?Sized,
        W: Write + ?Sized,
    {
        let data = self.read(())?;
        let bytes = serializer.serialize(&data, self.sample_rate())?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }
}

impl PartialEq for Audio {
    fn eq(&self, other: &Self) -> bool {
        self.same_content(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AudioStatistics, ConvertTo};

    #[test]
    fn test_defaults() {
        let audio = Audio::from_samples(vec![0.0; 10]);
        assert_eq!(audio.sample_rate(), 44100);
        assert_eq!(audio.channels(), 1);
        assert_eq!(audio.length(), 10);
        assert!(audio.cache_enabled());
        assert!(!audio.stats_enabled());
    }

    #[test]
    fn test_create_from_duration_and_options() {
        let audio = Audio::with_duration(0.5).unwrap();
        assert_eq!(audio.length(), 22050);

        let audio = Audio::with_options(
            AudioOptions::default()
                .length(100)
                .channels(3)
                .sample_rate(8000),
        )
        .unwrap();
        assert_eq!((audio.length(), audio.channels(), audio.sample_rate()), (100, 3, 8000));

        assert!(matches!(
            Audio::with_duration(-1.0),
            Err(AudioError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_flat_samples_split_planar() {
        let audio = Audio::from_source(vec![0.0f32, 0.1, 0.0, 0.2, 0.0, 0.3], 3usize).unwrap();
        assert_eq!(
            audio.read(()).unwrap(),
            vec![vec![0.0, 0.1], vec![0.0, 0.2], vec![0.0, 0.3]]
        );
        assert!(matches!(
            Audio::from_source(vec![0.0f32; 5], 2usize),
            Err(AudioError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_length_option_truncates_and_extends() {
        let audio = Audio::from_source(vec![0.1f32; 10], AudioOptions::default().length(4)).unwrap();
        assert_eq!(audio.read_channel(0, ()).unwrap(), vec![0.1; 4]);

        let audio = Audio::from_source(vec![0.1f32; 2], AudioOptions::default().length(4)).unwrap();
        assert_eq!(audio.read_channel(0, ()).unwrap(), vec![0.1, 0.1, 0.0, 0.0]);
    }

    #[test]
    fn test_list_of_values_is_mono() {
        let source = Source::List(vec![Source::Value(0.1), Source::Value(0.2)]);
        let audio = Audio::from_source(source, ()).unwrap();
        assert_eq!(audio.channels(), 1);
        assert_eq!(audio.read_channel(0, ()).unwrap(), vec![0.1, 0.2]);
    }

    #[test]
    fn test_short_list_of_arrays_is_layout() {
        let source = Source::List(vec![
            Source::Samples(vec![0.1, 0.2]),
            Source::Samples(vec![0.3, 0.4]),
        ]);
        let audio = Audio::from_source(source, ()).unwrap();
        assert_eq!(audio.channels(), 2);
        assert_eq!(audio.length(), 2);
    }

    #[test]
    fn test_long_list_of_arrays_concatenates() {
        let items = (0..MAX_LAYOUT_CHANNELS)
            .map(|_| Source::Samples(vec![0.5]))
            .collect();
        let audio = Audio::from_source(Source::List(items), ()).unwrap();
        assert_eq!(audio.channels(), 1);
        assert_eq!(audio.length(), MAX_LAYOUT_CHANNELS);
    }

    #[test]
    fn test_mixed_list_rejected() {
        let mixed = Source::List(vec![Source::Value(0.1), Source::Samples(vec![0.2])]);
        assert!(matches!(
            Audio::from_source(mixed, ()),
            Err(AudioError::InvalidArgument { .. })
        ));
        let mixed = Source::List(vec![
            Source::Value(0.1),
            Source::Value(0.2),
            Source::Samples(vec![0.2]),
        ]);
        assert!(Audio::from_source(mixed, ()).is_err());
    }

    #[test]
    fn test_concat_takes_widest_channels() {
        let mono = Audio::from_samples(vec![0.5, 0.5]);
        let stereo = Audio::from_channels(vec![vec![0.1], vec![0.2]]).unwrap();
        let joined = Audio::from_sources(vec![mono.into(), stereo.into()], ()).unwrap();
        assert_eq!(joined.channels(), 2);
        assert_eq!(
            joined.read(()).unwrap(),
            vec![vec![0.5, 0.5, 0.1], vec![0.5, 0.5, 0.2]]
        );
    }

    #[test]
    fn test_concat_rejects_rate_mismatch() {
        let a = Audio::from_samples(vec![0.1]);
        let b = Audio::from_source(vec![0.1f32], AudioOptions::default().sample_rate(8000)).unwrap();
        assert!(Audio::from_sources(vec![a.into(), b.into()], ()).is_err());
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Audio::from_samples(vec![0.1, 0.2, 0.3]);
        let mut copy = Audio::from_source(&original, ()).unwrap();
        copy.fill(0.0, ()).unwrap();
        assert_eq!(original.read_channel(0, ()).unwrap(), vec![0.1, 0.2, 0.3]);

        let mut clone = original.clone();
        clone.fill(1.0, ()).unwrap();
        assert_eq!(original.read_channel(0, ()).unwrap(), vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_read_validates_channels() {
        let audio = Audio::from_samples(vec![0.1]);
        assert!(matches!(
            audio.read(RangeOptions::new().channel(1)),
            Err(AudioError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_write_source_truncates() {
        let mut audio = Audio::from_channels(vec![vec![0.0; 4], vec![0.0; 4]]).unwrap();
        audio
            .write(vec![vec![0.1f32, 0.2, 0.3, 0.4, 0.5]], RangeOptions::new().start(2).channel(1))
            .unwrap();
        assert_eq!(
            audio.read(()).unwrap(),
            vec![vec![0.0; 4], vec![0.0, 0.0, 0.1, 0.2]]
        );
    }

    #[test]
    fn test_write_function_sees_indices() {
        let mut audio = Audio::from_channels(vec![vec![0.0; 3], vec![0.0; 3]]).unwrap();
        audio
            .write_with(|_, i, c| (i * 10 + c) as f32, ())
            .unwrap();
        assert_eq!(
            audio.read(()).unwrap(),
            vec![vec![0.0, 10.0, 20.0], vec![1.0, 11.0, 21.0]]
        );
    }

    #[test]
    fn test_insert_and_remove_restore() {
        let original = Audio::from_samples(vec![0.1, 0.2, 0.3, 0.4]);
        let mut audio = original.clone();
        audio
            .insert(vec![0.9f32, 0.8], Some(2.0 / 44100.0))
            .unwrap();
        assert_eq!(
            audio.read_channel(0, ()).unwrap(),
            vec![0.1, 0.2, 0.9, 0.8, 0.3, 0.4]
        );
        let removed = audio.remove(RangeOptions::new().start(2).length(2)).unwrap();
        assert_eq!(removed.read_channel(0, ()).unwrap(), vec![0.9, 0.8]);
        assert_eq!(audio, original);
    }

    #[test]
    fn test_insert_appends_by_default() {
        let mut audio = Audio::from_samples(vec![0.1]);
        audio.insert(vec![0.2f32], None).unwrap();
        assert_eq!(audio.read_channel(0, ()).unwrap(), vec![0.1, 0.2]);
    }

    #[test]
    fn test_insert_past_end_pads() {
        let mut audio = Audio::from_samples(vec![0.1]);
        audio.insert(vec![0.5f32], Some(3.0 / 44100.0)).unwrap();
        assert_eq!(
            audio.read_channel(0, ()).unwrap(),
            vec![0.1, 0.0, 0.0, 0.5]
        );
    }

    #[test]
    fn test_insert_remixes_channels() {
        let mut audio = Audio::from_channels(vec![vec![0.1], vec![0.2]]).unwrap();
        audio.insert(vec![0.5f32], None).unwrap();
        assert_eq!(audio.read(()).unwrap(), vec![vec![0.1, 0.5], vec![0.2, 0.5]]);
    }

    #[test]
    fn test_remove_rejects_partial_channels() {
        let mut audio = Audio::from_channels(vec![vec![0.1], vec![0.2]]).unwrap();
        assert!(audio.remove(RangeOptions::new().channel(0)).is_err());
        assert_eq!(audio.length(), 1);
    }

    #[test]
    fn test_slice_copies_channels() {
        let audio = Audio::from_channels(vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]]).unwrap();
        let slice = audio.slice(RangeOptions::new().start(1).channel(1)).unwrap();
        assert_eq!(slice.channels(), 1);
        assert_eq!(slice.read_channel(0, ()).unwrap(), vec![0.5, 0.6]);
    }

    #[test]
    fn test_view_borrows() {
        let audio = Audio::from_samples(vec![0.1, 0.2, 0.3]);
        let view = audio.view(RangeOptions::new().start(1)).unwrap();
        assert_eq!(view.channel_iter(0).collect::<Vec<_>>(), vec![0.2, 0.3]);
    }

    #[test]
    fn test_property_setters() {
        let mut audio = Audio::from_samples(vec![0.1; 10]);
        audio.set_length(4).unwrap();
        assert_eq!(audio.length(), 4);
        audio.set_duration(6.0 / 44100.0).unwrap();
        assert_eq!(audio.length(), 6);
        audio.set_channels(2).unwrap();
        assert_eq!(audio.channels(), 2);
        assert!(matches!(
            audio.set_sample_rate(48000),
            Err(AudioError::Unimplemented(_))
        ));
    }

    #[test]
    fn test_through_replaces_segments() {
        let mut audio = Audio::from_samples(vec![0.1, 0.2, 0.3, 0.4]);
        audio
            .through(
                |segment| {
                    segment.apply_to_channels(&[0], |x| x * 2.0);
                    None
                },
                RangeOptions::new().start(1).length(2),
            )
            .unwrap();
        assert_eq!(
            audio.read_channel(0, ()).unwrap(),
            vec![0.1, 0.4, 0.6, 0.4]
        );
    }

    #[test]
    fn test_equal_ignores_segmentation() {
        let a = Audio::from_samples(vec![0.1, 0.2, 0.3]);
        let mut b = Audio::from_samples(vec![0.1]);
        b.insert(vec![0.2f32, 0.3], None).unwrap();
        let c = Audio::from_samples(vec![0.1, 0.2, 0.4]);
        assert!(a.equal(&[&b]));
        assert!(!a.equal(&[&b, &c]));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    struct Pcm16;

    impl Serializer for Pcm16 {
        fn serialize(&self, channels: &[Vec<f32>], _sample_rate: u32) -> AudioResult<Vec<u8>> {
            let frames = channels.first().map_or(0, Vec::len);
            let mut out = Vec::new();
            for i in 0..frames {
                for channel in channels {
                    let sample: i16 = channel[i].convert_to()?;
                    out.extend_from_slice(&sample.to_le_bytes());
                }
            }
            Ok(out)
        }
    }

    #[test]
    fn test_save_writes_serialized_bytes() {
        let audio = Audio::from_channels(vec![vec![1.0, 0.0], vec![-1.0, 0.0]]).unwrap();
        let mut out = Vec::new();
        audio.save(&Pcm16, &mut out).unwrap();
        assert_eq!(out.len(), 8);
        assert_eq!(&out[..4], &[0xff, 0x7f, 0x00, 0x80]);
        assert_eq!(audio.peak(()).unwrap(), 1.0);
    }
}

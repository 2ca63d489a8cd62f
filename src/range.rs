//! Range resolution: turns a time/duration/channel description into a
//! canonical sample range.
//!
//! Every operation on [`Audio`](crate::Audio) accepts `impl Into<RangeOptions>`,
//! so the familiar call shapes all work:
//!
//! | Call shape | Meaning |
//! |---|---|
//! | `()` | whole signal, all channels |
//! | `1.5` | from 1.5 s to the end |
//! | `(1.5, 0.25)` | 0.25 s starting at 1.5 s |
//! | `RangeOptions::new().start(-100).channel(1)` | last 100 samples of channel 1 |
//!
//! Resolution rules:
//! - negative times and offsets count from the end;
//! - a negative duration counts backwards from its anchor, and when no start
//!   time is given (or it is zero) the anchor is the end of the signal;
//! - time-derived offsets are clamped into `[0, length]`, explicit sample
//!   offsets (`start`/`end`) are validated and rejected when out of bounds;
//! - a zero duration yields an empty range, which operations treat as a no-op.

use crate::utils::audio_math::floor_samples;
use crate::{AudioError, AudioResult};

/// Channel selection for a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSelector {
    /// A single channel.
    Single(usize),
    /// An ordered list of distinct channels.
    List(Vec<usize>),
}

impl From<usize> for ChannelSelector {
    fn from(channel: usize) -> Self {
        Self::Single(channel)
    }
}

impl From<Vec<usize>> for ChannelSelector {
    fn from(channels: Vec<usize>) -> Self {
        Self::List(channels)
    }
}

impl From<&[usize]> for ChannelSelector {
    fn from(channels: &[usize]) -> Self {
        Self::List(channels.to_vec())
    }
}

/// Caller-side description of a range, with every field optional.
///
/// Precedence when several length-like fields are given: `duration` wins over
/// `length`, which wins over `to`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeOptions {
    /// Start time in seconds (also known as `from` / `offset`). Negative
    /// counts from the end.
    pub time: Option<f64>,
    /// Duration in seconds. Negative counts backwards from the anchor.
    pub duration: Option<f64>,
    /// End time in seconds.
    pub to: Option<f64>,
    /// Explicit start offset in samples. Negative counts from the end.
    pub start: Option<i64>,
    /// Explicit end offset in samples. Negative counts from the end.
    pub end: Option<i64>,
    /// Length in samples. Negative counts backwards from the anchor.
    pub length: Option<i64>,
    /// Channel selection; all channels when absent.
    pub channels: Option<ChannelSelector>,
}

impl RangeOptions {
    /// The full range over all channels.
    pub fn new() -> Self {
        Self::default()
    }

    /// From `time` seconds to the end.
    pub fn at(time: f64) -> Self {
        Self::new().time(time)
    }

    /// `duration` seconds starting at `time`.
    pub fn span(time: f64, duration: f64) -> Self {
        Self::new().time(time).duration(duration)
    }

    /// Sets the start time in seconds.
    pub fn time(mut self, time: f64) -> Self {
        self.time = Some(time);
        self
    }

    /// Alias of [`time`](Self::time).
    pub fn from(self, time: f64) -> Self {
        self.time(time)
    }

    /// Sets the duration in seconds.
    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Sets the end time in seconds.
    pub fn to(mut self, to: f64) -> Self {
        self.to = Some(to);
        self
    }

    /// Sets the explicit start offset in samples.
    pub fn start(mut self, start: i64) -> Self {
        self.start = Some(start);
        self
    }

    /// Sets the explicit end offset in samples.
    pub fn end(mut self, end: i64) -> Self {
        self.end = Some(end);
        self
    }

    /// Sets the length in samples.
    pub fn length(mut self, length: i64) -> Self {
        self.length = Some(length);
        self
    }

    /// Selects a single channel.
    pub fn channel(mut self, channel: usize) -> Self {
        self.channels = Some(ChannelSelector::Single(channel));
        self
    }

    /// Selects a list of channels.
    pub fn channels(mut self, channels: impl Into<ChannelSelector>) -> Self {
        self.channels = Some(channels.into());
        self
    }

    /// Resolves against a signal of `total` samples, `num_channels` channels
    /// at `sample_rate`.
    ///
    /// # Errors
    /// - [`AudioError::InvalidArgument`] for a bad channel selection or a
    ///   non-finite time/duration.
    /// - [`AudioError::Range`] for explicit offsets outside `[0, total]` or an
    ///   explicit end before the start.
    pub fn resolve(
        &self,
        total: usize,
        num_channels: usize,
        sample_rate: u32,
    ) -> AudioResult<SampleRange> {
        resolve_range(self, total, num_channels, sample_rate)
    }
}

impl From<()> for RangeOptions {
    fn from(_: ()) -> Self {
        Self::new()
    }
}

impl From<f64> for RangeOptions {
    fn from(time: f64) -> Self {
        Self::at(time)
    }
}

impl From<(f64, f64)> for RangeOptions {
    fn from((time, duration): (f64, f64)) -> Self {
        Self::span(time, duration)
    }
}

impl From<(f64, RangeOptions)> for RangeOptions {
    fn from((time, options): (f64, RangeOptions)) -> Self {
        options.time(time)
    }
}

impl From<&RangeOptions> for RangeOptions {
    fn from(options: &RangeOptions) -> Self {
        options.clone()
    }
}

/// A resolved range, always in bounds with `start <= end`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRange {
    /// First sample offset (inclusive).
    pub start: usize,
    /// Last sample offset (exclusive).
    pub end: usize,
    /// `end - start`.
    pub length: usize,
    /// Distinct channel indices in caller order.
    pub channels: Vec<usize>,
    /// `start` in seconds.
    pub from: f64,
    /// `end` in seconds.
    pub to: f64,
    /// Signed duration in seconds; negative when the range was described
    /// backwards from its anchor.
    pub duration: f64,
}

impl SampleRange {
    /// True when the range covers no samples.
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// True when the range was described backwards (negative duration).
    pub fn is_reversed(&self) -> bool {
        self.duration < 0.0
    }
}

/// Resolves a possibly negative index against `length`.
///
/// Negative values count from the end (`-1` is the last sample). The result
/// must lie in `[0, length]`.
///
/// # Errors
/// Returns [`AudioError::Range`] when the normalized index is out of bounds.
///
/// ```rust
/// use audio_container::normalize_index;
///
/// assert_eq!(normalize_index(-1, 10).unwrap(), 9);
/// assert_eq!(normalize_index(10, 10).unwrap(), 10);
/// assert!(normalize_index(11, 10).is_err());
/// assert!(normalize_index(-11, 10).is_err());
/// ```
pub fn normalize_index(index: i64, length: usize) -> AudioResult<usize> {
    let len = length as i64;
    let normalized = if index < 0 { len + index } else { index };
    if normalized < 0 || normalized > len {
        return Err(AudioError::range(format!(
            "index {} out of bounds for length {}",
            index, length
        )));
    }
    Ok(normalized as usize)
}

/// Clamps a fractional offset into `[0, length]`.
fn clamp_offset(offset: f64, length: usize) -> usize {
    if offset <= 0.0 || offset.is_nan() {
        0
    } else if offset >= length as f64 {
        length
    } else {
        offset as usize
    }
}

/// Converts a time to a clamped offset. Sign-negative times (including
/// `-0.0`) count from the end.
fn offset_from_time(time: f64, sample_rate: f64, length: usize) -> usize {
    let raw = floor_samples(time * sample_rate);
    if time.is_sign_negative() {
        clamp_offset(length as f64 + raw, length)
    } else {
        clamp_offset(raw, length)
    }
}

fn resolve_channels(
    selector: Option<&ChannelSelector>,
    num_channels: usize,
) -> AudioResult<Vec<usize>> {
    let channels = match selector {
        None => return Ok((0..num_channels).collect()),
        Some(ChannelSelector::Single(ch)) => vec![*ch],
        Some(ChannelSelector::List(list)) => list.clone(),
    };

    if channels.is_empty() {
        return Err(AudioError::invalid_argument(
            "channels",
            "channel list must not be empty",
        ));
    }
    for (idx, &ch) in channels.iter().enumerate() {
        if ch >= num_channels {
            return Err(AudioError::invalid_argument(
                "channels",
                format!("channel {} out of range for {} channels", ch, num_channels),
            ));
        }
        if channels[..idx].contains(&ch) {
            return Err(AudioError::invalid_argument(
                "channels",
                format!("duplicate channel index {}", ch),
            ));
        }
    }
    Ok(channels)
}

fn check_finite(name: &str, value: Option<f64>) -> AudioResult<()> {
    match value {
        Some(v) if !v.is_finite() => Err(AudioError::invalid_argument(
            name,
            format!("expected a finite number, got {}", v),
        )),
        _ => Ok(()),
    }
}

/// Resolves `options` into a canonical [`SampleRange`].
///
/// See the [module documentation](self) for the rules.
pub fn resolve_range(
    options: &RangeOptions,
    total: usize,
    num_channels: usize,
    sample_rate: u32,
) -> AudioResult<SampleRange> {
    check_finite("time", options.time)?;
    check_finite("duration", options.duration)?;
    check_finite("to", options.to)?;

    let channels = resolve_channels(options.channels.as_ref(), num_channels)?;
    let rate = sample_rate as f64;
    let time = options.time.unwrap_or(0.0);

    // Signed span in samples.
    let mut span: Option<f64> = None;
    if let Some(to) = options.to {
        span = Some((to - time) * rate);
    }
    if let Some(length) = options.length {
        span = Some(length as f64);
    }
    if let Some(duration) = options.duration {
        span = Some(duration * rate);
    }
    let backwards = span.is_some_and(|s| s < 0.0);

    let anchor = match options.start {
        Some(start) => normalize_index(start, total)?,
        None => {
            // A backwards span with no (or zero) start time is anchored at the end.
            let time = if time == 0.0 && backwards { -0.0 } else { time };
            offset_from_time(time, rate, total)
        }
    };

    let (start, end) = match (options.end, span) {
        (Some(end), _) => {
            let end = normalize_index(end, total)?;
            if end < anchor {
                return Err(AudioError::range(format!(
                    "start {} is after end {}",
                    anchor, end
                )));
            }
            (anchor, end)
        }
        (None, None) => (anchor, total),
        (None, Some(s)) if s < 0.0 => {
            let other = clamp_offset(floor_samples(anchor as f64 + s), total);
            (other, anchor)
        }
        (None, Some(s)) => {
            let len = clamp_offset(floor_samples(s), total);
            (anchor, (anchor + len).min(total))
        }
    };

    let length = end - start;
    let duration = length as f64 / rate;
    Ok(SampleRange {
        start,
        end,
        length,
        channels,
        from: start as f64 / rate,
        to: end as f64 / rate,
        duration: if backwards { -duration } else { duration },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 10;

    fn resolve(opts: RangeOptions) -> AudioResult<SampleRange> {
        opts.resolve(100, 2, SR)
    }

    #[test]
    fn test_full_range_defaults() {
        let r = resolve(RangeOptions::new()).unwrap();
        assert_eq!((r.start, r.end, r.length), (0, 100, 100));
        assert_eq!(r.channels, vec![0, 1]);
        assert_eq!(r.to, 10.0);
    }

    #[test]
    fn test_length_invariant() {
        let cases = [
            RangeOptions::new(),
            RangeOptions::at(2.5),
            RangeOptions::span(1.0, 3.0),
            RangeOptions::span(-2.0, 1.0),
            RangeOptions::new().duration(-1.5),
            RangeOptions::new().start(-7).length(3),
            RangeOptions::span(9.0, 5.0),
            RangeOptions::new().time(4.0).to(6.0),
        ];
        for opts in cases {
            let r = resolve(opts).unwrap();
            assert_eq!(r.end - r.start, r.length);
            assert!(r.end <= 100);
        }
    }

    #[test]
    fn test_time_and_duration() {
        let r = resolve((1.0, 2.0).into()).unwrap();
        assert_eq!((r.start, r.end), (10, 30));
        assert_eq!(r.duration, 2.0);
    }

    #[test]
    fn test_negative_time_counts_from_end() {
        let r = resolve(RangeOptions::at(-1.0)).unwrap();
        assert_eq!((r.start, r.end), (90, 100));
    }

    #[test]
    fn test_negative_duration_without_time_anchors_at_end() {
        let r = resolve(RangeOptions::new().duration(-1.0)).unwrap();
        assert_eq!((r.start, r.end), (90, 100));
        assert!(r.is_reversed());

        let r = resolve(RangeOptions::span(0.0, -1.0)).unwrap();
        assert_eq!((r.start, r.end), (90, 100));
    }

    #[test]
    fn test_negative_duration_counts_back_from_time() {
        let r = resolve(RangeOptions::span(5.0, -2.0)).unwrap();
        assert_eq!((r.start, r.end), (30, 50));
        assert_eq!(r.duration, -2.0);
    }

    #[test]
    fn test_derived_offsets_clamp() {
        let r = resolve(RangeOptions::span(9.0, 5.0)).unwrap();
        assert_eq!((r.start, r.end), (90, 100));

        let r = resolve(RangeOptions::at(50.0)).unwrap();
        assert!(r.is_empty());
        assert_eq!(r.start, 100);
    }

    #[test]
    fn test_explicit_offsets_validated() {
        assert!(matches!(
            resolve(RangeOptions::new().start(101)),
            Err(AudioError::Range(_))
        ));
        assert!(matches!(
            resolve(RangeOptions::new().start(50).end(40)),
            Err(AudioError::Range(_))
        ));
        let r = resolve(RangeOptions::new().start(-10).end(-5)).unwrap();
        assert_eq!((r.start, r.end), (90, 95));
    }

    #[test]
    fn test_zero_duration_is_empty() {
        let r = resolve(RangeOptions::span(3.0, 0.0)).unwrap();
        assert!(r.is_empty());
        assert_eq!(r.start, 30);
    }

    #[test]
    fn test_channel_selection() {
        let r = resolve(RangeOptions::new().channel(1)).unwrap();
        assert_eq!(r.channels, vec![1]);

        let r = resolve(RangeOptions::new().channels(vec![1, 0])).unwrap();
        assert_eq!(r.channels, vec![1, 0]);

        for bad in [vec![0, 0], vec![2], vec![]] {
            let res = resolve(RangeOptions::new().channels(bad));
            assert!(matches!(res, Err(AudioError::InvalidArgument { .. })));
        }
    }

    #[test]
    fn test_non_finite_rejected() {
        let res = resolve(RangeOptions::at(f64::NAN));
        assert!(matches!(res, Err(AudioError::InvalidArgument { .. })));
    }

    #[test]
    fn test_precedence_duration_over_length_over_to() {
        let r = resolve(RangeOptions::new().to(5.0).length(20).duration(1.0)).unwrap();
        assert_eq!(r.length, 10);
        let r = resolve(RangeOptions::new().to(5.0).length(20)).unwrap();
        assert_eq!(r.length, 20);
        let r = resolve(RangeOptions::new().time(2.0).to(5.0)).unwrap();
        assert_eq!((r.start, r.end), (20, 50));
    }
}

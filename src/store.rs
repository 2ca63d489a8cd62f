//! Segmented sample storage.
//!
//! A [`SampleStore`] is an ordered list of [`Segment`]s that together form one
//! continuous multichannel signal. Edits never move samples between segments
//! unless they have to: inserting splits the segment under the cut in two,
//! removing splits at both cuts and unlinks whatever lies between, and the
//! visitor splits at the visited range's boundaries so each callback sees
//! whole segments.
//!
//! Invariants kept by every method:
//! - all segments share the store's channel count and sample rate;
//! - no stored segment is empty;
//! - `len()` equals the sum of segment lengths.

use std::ops::ControlFlow;

use ndarray::{Array2, ArrayView2, ArrayViewMut2, Axis, s};
use tracing::{debug, trace};

use crate::repr::Segment;
use crate::{AudioError, AudioResult};

/// What the [`SampleStore::visit`] callback wants done after seeing a segment.
#[derive(Debug, Clone, PartialEq)]
pub enum Visit {
    /// Keep going. `Some(segment)` replaces the visited segment.
    Continue(Option<Segment>),
    /// Stop visiting. Segments already replaced stay replaced.
    Stop,
}

impl Visit {
    /// Continue without replacing anything.
    pub const fn next() -> Self {
        Self::Continue(None)
    }

    /// Replace the visited segment and continue.
    pub const fn replace(segment: Segment) -> Self {
        Self::Continue(Some(segment))
    }
}

/// Ordered sequence of segments forming one signal.
///
/// `Clone` is a deep copy: the clone owns its own sample buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleStore {
    segments: Vec<Segment>,
    channels: usize,
    sample_rate: u32,
    length: usize,
}

impl SampleStore {
    /// An empty store with a fixed channel count and sample rate.
    ///
    /// # Errors
    /// Returns an error if `channels` or `sample_rate` is zero.
    pub fn new(channels: usize, sample_rate: u32) -> AudioResult<Self> {
        if channels == 0 {
            return Err(AudioError::invalid_argument(
                "channels",
                "store must have at least one channel",
            ));
        }
        if sample_rate == 0 {
            return Err(AudioError::invalid_argument(
                "sample_rate",
                "sample rate must be greater than zero",
            ));
        }
        Ok(Self {
            segments: Vec::new(),
            channels,
            sample_rate,
            length: 0,
        })
    }

    /// A store holding a single segment.
    pub fn from_segment(segment: Segment) -> AudioResult<Self> {
        let mut store = Self::new(segment.num_channels(), segment.sample_rate())?;
        store.append(segment)?;
        Ok(store)
    }

    /// Store over one segment whose shape the caller has already validated.
    pub(crate) fn single(segment: Segment) -> Self {
        let channels = segment.num_channels();
        let sample_rate = segment.sample_rate();
        let length = segment.len();
        let segments = if segment.is_empty() { Vec::new() } else { vec![segment] };
        Self {
            segments,
            channels,
            sample_rate,
            length,
        }
    }

    /// A store built from consecutive segments.
    ///
    /// # Errors
    /// Returns an error if `segments` is empty or the segments disagree on
    /// channel count or sample rate.
    pub fn from_segments(segments: Vec<Segment>) -> AudioResult<Self> {
        let first = segments.first().ok_or_else(|| {
            AudioError::invalid_argument("segments", "at least one segment is required")
        })?;
        let mut store = Self::new(first.num_channels(), first.sample_rate())?;
        for segment in segments {
            store.append(segment)?;
        }
        Ok(store)
    }

    /// `length` frames of silence.
    pub fn silence(channels: usize, length: usize, sample_rate: u32) -> AudioResult<Self> {
        let mut store = Self::new(channels, sample_rate)?;
        store.append(Segment::silence(channels, length, sample_rate)?)?;
        Ok(store)
    }

    /// Total number of frames.
    pub const fn len(&self) -> usize {
        self.length
    }

    /// True when the store holds no samples.
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Channel count shared by every segment.
    pub const fn num_channels(&self) -> usize {
        self.channels
    }

    /// Sample rate shared by every segment.
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.length as f64 / self.sample_rate as f64
    }

    /// Number of segments currently linked.
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// The linked segments in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Consumes the store and returns its segments.
    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    fn check_segment(&self, segment: &Segment) -> AudioResult<()> {
        if segment.num_channels() != self.channels {
            return Err(AudioError::DimensionMismatch(format!(
                "segment has {} channels, store has {}",
                segment.num_channels(),
                self.channels
            )));
        }
        if segment.sample_rate() != self.sample_rate {
            return Err(AudioError::invalid_argument(
                "sample_rate",
                format!(
                    "segment sample rate {} does not match store sample rate {}",
                    segment.sample_rate(),
                    self.sample_rate
                ),
            ));
        }
        Ok(())
    }

    fn check_range(&self, start: usize, end: usize) -> AudioResult<()> {
        if start > end {
            return Err(AudioError::range(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        if end > self.length {
            return Err(AudioError::range(format!(
                "end {} exceeds length {}",
                end, self.length
            )));
        }
        Ok(())
    }

    fn check_channels(&self, channels: &[usize]) -> AudioResult<()> {
        if channels.is_empty() {
            return Err(AudioError::invalid_argument(
                "channels",
                "channel list must not be empty",
            ));
        }
        match channels.iter().find(|&&ch| ch >= self.channels) {
            Some(ch) => Err(AudioError::invalid_argument(
                "channels",
                format!("channel {} out of range for {} channels", ch, self.channels),
            )),
            None => Ok(()),
        }
    }

    /// Global offset of the first frame of segment `index`.
    fn offset_of(&self, index: usize) -> usize {
        self.segments[..index].iter().map(Segment::len).sum()
    }

    /// Segments intersecting `[start, end)` as
    /// `(global offset, segment index, local start, local end)`.
    fn parts(&self, start: usize, end: usize) -> impl Iterator<Item = (usize, usize, usize, usize)> + '_ {
        let mut seg_end = 0;
        self.segments.iter().enumerate().filter_map(move |(idx, seg)| {
            let seg_start = seg_end;
            seg_end += seg.len();
            let lo = start.max(seg_start);
            let hi = end.min(seg_end);
            (lo < hi).then_some((lo, idx, lo - seg_start, hi - seg_start))
        })
    }

    /// Appends a segment at the tail. Empty segments are ignored.
    ///
    /// # Errors
    /// Returns an error if the segment's channel count or sample rate differ.
    pub fn append(&mut self, segment: Segment) -> AudioResult<()> {
        self.check_segment(&segment)?;
        if segment.is_empty() {
            return Ok(());
        }
        self.length += segment.len();
        self.segments.push(segment);
        Ok(())
    }

    /// Appends every segment of `other`.
    pub fn append_store(&mut self, other: SampleStore) -> AudioResult<()> {
        self.check_compatible(&other)?;
        self.length += other.length;
        self.segments.extend(other.segments);
        Ok(())
    }

    fn check_compatible(&self, other: &SampleStore) -> AudioResult<()> {
        match other.segments.first() {
            Some(first) => self.check_segment(first),
            None if other.channels != self.channels => Err(AudioError::DimensionMismatch(format!(
                "store has {} channels, expected {}",
                other.channels, self.channels
            ))),
            None => Ok(()),
        }
    }

    /// Ensures a segment boundary at `offset` and returns the index of the
    /// segment starting there (`num_segments()` when `offset == len()`).
    ///
    /// # Errors
    /// Returns [`AudioError::Range`] if `offset > len()`.
    pub fn split(&mut self, offset: usize) -> AudioResult<usize> {
        if offset > self.length {
            return Err(AudioError::range(format!(
                "split offset {} exceeds length {}",
                offset, self.length
            )));
        }
        let mut seg_start = 0;
        for idx in 0..self.segments.len() {
            if offset == seg_start {
                return Ok(idx);
            }
            let seg_len = self.segments[idx].len();
            if offset < seg_start + seg_len {
                let local = offset - seg_start;
                let segment = self.segments.remove(idx);
                let (left, right) = segment.split_at(local);
                self.segments.splice(idx..idx, [left, right]);
                trace!(offset, index = idx, local, "split segment");
                return Ok(idx + 1);
            }
            seg_start += seg_len;
        }
        Ok(self.segments.len())
    }

    /// Inserts `segment` so its first frame lands at `offset`.
    ///
    /// # Errors
    /// Returns [`AudioError::Range`] if `offset > len()`, or a shape error if
    /// the segment does not match the store.
    pub fn insert(&mut self, offset: usize, segment: Segment) -> AudioResult<()> {
        self.check_segment(&segment)?;
        let idx = self.split(offset)?;
        if segment.is_empty() {
            return Ok(());
        }
        self.length += segment.len();
        self.segments.insert(idx, segment);
        Ok(())
    }

    /// Inserts every segment of `other` at `offset`.
    pub fn insert_store(&mut self, offset: usize, other: SampleStore) -> AudioResult<()> {
        self.check_compatible(&other)?;
        let idx = self.split(offset)?;
        trace!(
            offset,
            index = idx,
            count = other.segments.len(),
            "splice segments"
        );
        self.length += other.length;
        self.segments.splice(idx..idx, other.segments);
        Ok(())
    }

    /// Unlinks frames `[start, end)` and returns them as a new store.
    ///
    /// # Errors
    /// Returns [`AudioError::Range`] if `start > end` or `end > len()`.
    pub fn remove(&mut self, start: usize, end: usize) -> AudioResult<SampleStore> {
        self.check_range(start, end)?;
        let first = self.split(start)?;
        let last = self.split(end)?;
        let removed: Vec<Segment> = self.segments.drain(first..last).collect();
        self.length -= end - start;
        trace!(start, end, count = removed.len(), "removed segments");
        Ok(SampleStore {
            segments: removed,
            channels: self.channels,
            sample_rate: self.sample_rate,
            length: end - start,
        })
    }

    /// Merges every segment covering `[start, end)` into one and returns its
    /// index.
    pub fn join(&mut self, start: usize, end: usize) -> AudioResult<usize> {
        self.check_range(start, end)?;
        let first = self.split(start)?;
        let last = self.split(end)?;
        if last - first > 1 {
            let joined = Segment::join(&self.segments[first..last])?;
            self.segments.splice(first..last, [joined]);
            trace!(start, end, merged = last - first, "joined segments");
        }
        Ok(first)
    }

    /// Reverses frame order of `channels` within `[start, end)`.
    pub fn reverse(&mut self, start: usize, end: usize, channels: &[usize]) -> AudioResult<()> {
        self.check_range(start, end)?;
        self.check_channels(channels)?;
        if start == end {
            return Ok(());
        }
        let idx = self.join(start, end)?;
        let segment = &mut self.segments[idx];
        for &ch in channels {
            let mut row = segment.channel_mut(ch);
            let reversed = row.slice(s![..;-1]).to_owned();
            row.assign(&reversed);
        }
        Ok(())
    }

    /// Borrowed view of frames `[start, end)` sharing this store's buffers.
    ///
    /// The view lives only as long as the borrow; mutate the store and it is
    /// gone.
    pub fn slice(&self, start: usize, end: usize) -> AudioResult<StoreView<'_>> {
        self.check_range(start, end)?;
        let parts = self
            .parts(start, end)
            .map(|(_, idx, lo, hi)| self.segments[idx].view().slice_move(s![.., lo..hi]))
            .collect();
        Ok(StoreView {
            parts,
            channels: self.channels,
            sample_rate: self.sample_rate,
            length: end - start,
        })
    }

    /// Owned copy of frames `[start, end)` restricted to `channels`.
    pub fn slice_copy(&self, start: usize, end: usize, channels: &[usize]) -> AudioResult<SampleStore> {
        self.check_range(start, end)?;
        self.check_channels(channels)?;
        let mut store = SampleStore::new(channels.len(), self.sample_rate)?;
        for (_, idx, lo, hi) in self.parts(start, end) {
            store.append(self.segments[idx].copy_frames(lo, hi, channels))?;
        }
        Ok(store)
    }

    /// Contiguous `(channels.len(), end - start)` copy of the selected frames.
    pub fn to_array(&self, start: usize, end: usize, channels: &[usize]) -> AudioResult<Array2<f32>> {
        self.check_range(start, end)?;
        self.check_channels(channels)?;
        let mut out = Array2::zeros((channels.len(), end - start));
        for (offset, idx, lo, hi) in self.parts(start, end) {
            let at = offset - start;
            let segment = &self.segments[idx];
            for (row, &ch) in channels.iter().enumerate() {
                out.slice_mut(s![row, at..at + hi - lo])
                    .assign(&segment.channel(ch).slice(s![lo..hi]));
            }
        }
        Ok(out)
    }

    /// Calls `f` with each segment's portion of `[start, end)` and its global
    /// offset, front to back. Returns `true` if `f` broke early.
    pub fn scan<F>(&self, start: usize, end: usize, mut f: F) -> AudioResult<bool>
    where
        F: FnMut(ArrayView2<'_, f32>, usize) -> ControlFlow<()>,
    {
        self.check_range(start, end)?;
        for (offset, idx, lo, hi) in self.parts(start, end) {
            if f(self.segments[idx].view().slice_move(s![.., lo..hi]), offset).is_break() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Like [`scan`](Self::scan), back to front.
    pub fn scan_rev<F>(&self, start: usize, end: usize, mut f: F) -> AudioResult<bool>
    where
        F: FnMut(ArrayView2<'_, f32>, usize) -> ControlFlow<()>,
    {
        self.check_range(start, end)?;
        let parts: Vec<_> = self.parts(start, end).collect();
        for (offset, idx, lo, hi) in parts.into_iter().rev() {
            if f(self.segments[idx].view().slice_move(s![.., lo..hi]), offset).is_break() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Mutable counterpart of [`scan`](Self::scan) that never splits: `f`
    /// receives each segment's portion of `[start, end)` in place.
    pub fn scan_mut<F>(&mut self, start: usize, end: usize, mut f: F) -> AudioResult<()>
    where
        F: FnMut(ArrayViewMut2<'_, f32>, usize),
    {
        self.check_range(start, end)?;
        let parts: Vec<_> = self.parts(start, end).collect();
        for (offset, idx, lo, hi) in parts {
            f(self.segments[idx].view_mut().slice_move(s![.., lo..hi]), offset);
        }
        Ok(())
    }

    /// Visits every segment covering `[start, end)` in order, after splitting
    /// at both boundaries so each visited segment lies wholly in range.
    ///
    /// `f` receives the segment and its global start offset, and returns a
    /// [`Visit`] to keep it, replace it, or stop.
    ///
    /// # Errors
    /// Returns [`AudioError::Range`] for an invalid range, or a shape error if
    /// a replacement segment does not match the store.
    pub fn visit<F>(&mut self, start: usize, end: usize, mut f: F) -> AudioResult<()>
    where
        F: FnMut(&mut Segment, usize) -> Visit,
    {
        self.check_range(start, end)?;
        let mut idx = self.split(start)?;
        let mut last = self.split(end)?;
        let mut offset = self.offset_of(idx);
        while idx < last {
            let seg_len = self.segments[idx].len();
            match f(&mut self.segments[idx], offset) {
                Visit::Stop => break,
                Visit::Continue(None) => {
                    offset += seg_len;
                    idx += 1;
                }
                Visit::Continue(Some(replacement)) => {
                    self.check_segment(&replacement)?;
                    self.length = self.length - seg_len + replacement.len();
                    offset += replacement.len();
                    if replacement.is_empty() {
                        self.segments.remove(idx);
                        last -= 1;
                    } else {
                        self.segments[idx] = replacement;
                        idx += 1;
                    }
                }
            }
        }
        Ok(())
    }

    /// Applies a `(out_channels, in_channels)` mixing matrix to every segment.
    ///
    /// # Errors
    /// Returns [`AudioError::DimensionMismatch`] if the matrix does not take
    /// this store's channel count as input, or produces no channels.
    pub fn mix(&mut self, matrix: &Array2<f32>) -> AudioResult<()> {
        if matrix.ncols() != self.channels || matrix.nrows() == 0 {
            return Err(AudioError::DimensionMismatch(format!(
                "mixing matrix is {}x{}, store has {} channels",
                matrix.nrows(),
                matrix.ncols(),
                self.channels
            )));
        }
        for segment in &mut self.segments {
            *segment = segment.mix(matrix);
        }
        debug!(
            from = self.channels,
            to = matrix.nrows(),
            segments = self.segments.len(),
            "mixed store channels"
        );
        self.channels = matrix.nrows();
        Ok(())
    }

    /// Copies all samples of one channel into a vector.
    pub fn channel_data(&self, channel: usize) -> AudioResult<Vec<f32>> {
        self.check_channels(&[channel])?;
        let mut out = Vec::with_capacity(self.length);
        for segment in &self.segments {
            out.extend(segment.channel(channel).iter().copied());
        }
        Ok(out)
    }
}

/// Borrowed, zero-copy view over a frame range of a [`SampleStore`].
#[derive(Debug, Clone)]
pub struct StoreView<'a> {
    parts: Vec<ArrayView2<'a, f32>>,
    channels: usize,
    sample_rate: u32,
    length: usize,
}

impl<'a> StoreView<'a> {
    /// Number of frames in the view.
    pub const fn len(&self) -> usize {
        self.length
    }

    /// True when the view covers no frames.
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Channel count.
    pub const fn num_channels(&self) -> usize {
        self.channels
    }

    /// Sample rate in Hz.
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The per-segment views in order.
    pub fn parts(&self) -> &[ArrayView2<'a, f32>] {
        &self.parts
    }

    /// Iterates the samples of one channel.
    pub fn channel_iter(&self, channel: usize) -> impl Iterator<Item = f32> + '_ {
        self.parts
            .iter()
            .flat_map(move |part| part.index_axis(Axis(0), channel).into_iter().copied())
    }

    /// Copies the view into an owned store.
    pub fn to_store(&self) -> AudioResult<SampleStore> {
        let mut store = SampleStore::new(self.channels, self.sample_rate)?;
        for part in &self.parts {
            store.append(Segment::new(part.to_owned(), self.sample_rate)?)?;
        }
        Ok(store)
    }
}

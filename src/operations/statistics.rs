//! Level measurements for [`Audio`].

use std::ops::ControlFlow;

use crate::{Audio, AudioResult, AudioStatistics, RangeOptions, SampleRange, SampleStore};

/// Single-pass `(min, max)` over the channels and frames of `range`.
///
/// Returns `None` for an empty range.
pub(crate) fn range_limits(
    store: &SampleStore,
    range: &SampleRange,
) -> AudioResult<Option<(f32, f32)>> {
    if range.is_empty() {
        return Ok(None);
    }
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    store.scan(range.start, range.end, |part, _| {
        for &ch in &range.channels {
            for &x in part.row(ch) {
                min = min.min(x);
                max = max.max(x);
            }
        }
        ControlFlow::Continue(())
    })?;
    Ok(Some((min, max)))
}

impl AudioStatistics for Audio {
    fn limits(&self, range: impl Into<RangeOptions>) -> AudioResult<(f32, f32)> {
        let range = self.resolve(range)?;
        Ok(range_limits(self.store(), &range)?.unwrap_or((0.0, 0.0)))
    }

    fn peak(&self, range: impl Into<RangeOptions>) -> AudioResult<f32> {
        let (min, max) = self.limits(range)?;
        Ok(min.abs().max(max.abs()))
    }

    fn rms(&self, range: impl Into<RangeOptions>) -> AudioResult<Vec<f64>> {
        let range = self.resolve(range)?;
        let mut sums = vec![0.0f64; range.channels.len()];
        self.store().scan(range.start, range.end, |part, _| {
            for (sum, &ch) in sums.iter_mut().zip(&range.channels) {
                *sum += part.row(ch).iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>();
            }
            ControlFlow::Continue(())
        })?;
        if range.is_empty() {
            return Ok(sums);
        }
        let n = range.length as f64;
        Ok(sums.into_iter().map(|sum| (sum / n).sqrt()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_limits() {
        let audio = Audio::from_samples(vec![0.2, -0.7, 0.5, 0.1]);
        assert_eq!(audio.limits(()).unwrap(), (-0.7, 0.5));
        assert_eq!(audio.peak(()).unwrap(), 0.7);
        assert_eq!(
            audio.limits(RangeOptions::new().start(2)).unwrap(),
            (0.1, 0.5)
        );
    }

    #[test]
    fn test_limits_empty_range() {
        let audio = Audio::from_samples(vec![0.2, -0.7]);
        let limits = audio.limits(RangeOptions::new().start(1).length(0)).unwrap();
        assert_eq!(limits, (0.0, 0.0));
    }

    #[test]
    fn test_limits_respects_channels() {
        let audio = Audio::from_channels(vec![vec![0.1, 0.2], vec![-0.9, 0.9]]).unwrap();
        assert_eq!(
            audio.limits(RangeOptions::new().channel(0)).unwrap(),
            (0.1, 0.2)
        );
        assert_eq!(audio.peak(()).unwrap(), 0.9);
    }

    #[test]
    fn test_rms_per_channel() {
        let audio = Audio::from_channels(vec![vec![0.5; 8], vec![-0.25; 8]]).unwrap();
        let rms = audio.rms(()).unwrap();
        assert_eq!(rms.len(), 2);
        assert_approx_eq!(rms[0], 0.5, 1e-9);
        assert_approx_eq!(rms[1], 0.25, 1e-9);
    }
}

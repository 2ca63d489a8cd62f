//! Sample-wise processing for [`Audio`].
//!
//! Every operation here resolves its range first and only then walks the
//! store in place, so a bad range leaves the samples untouched.

use tracing::debug;

use super::statistics::range_limits;
use super::types::FadeOptions;
use crate::utils::audio_math::db_to_amplitude;
use crate::{Audio, AudioError, AudioProcessing, AudioResult, RangeOptions, SampleRange, SampleStore};

/// Applies `f` to every selected sample of `range`.
fn map_range<F>(store: &mut SampleStore, range: &SampleRange, mut f: F) -> AudioResult<()>
where
    F: FnMut(f32) -> f32,
{
    if range.is_empty() {
        return Ok(());
    }
    store.scan_mut(range.start, range.end, |mut part, _| {
        for &ch in &range.channels {
            part.row_mut(ch).mapv_inplace(&mut f);
        }
    })
}

impl AudioProcessing for Audio {
    fn gain(&mut self, db: f64, range: impl Into<RangeOptions>) -> AudioResult<&mut Self> {
        if !db.is_finite() {
            return Err(AudioError::invalid_argument(
                "db",
                format!("gain must be finite, got {}", db),
            ));
        }
        let range = self.resolve(range)?;
        if db == 0.0 {
            return Ok(self);
        }
        let factor = db_to_amplitude(db) as f32;
        map_range(self.store_mut(), &range, |x| x * factor)?;
        Ok(self)
    }

    fn normalize(&mut self, range: impl Into<RangeOptions>) -> AudioResult<&mut Self> {
        let range = self.resolve(range)?;
        let Some((min, max)) = range_limits(self.store(), &range)? else {
            return Ok(self);
        };
        let peak = min.abs().max(max.abs());
        if peak == 0.0 {
            return Ok(self);
        }
        let factor = (1.0 / peak).max(1.0);
        debug!(peak, factor, "normalize");
        map_range(self.store_mut(), &range, |x| (x * factor).clamp(-1.0, 1.0))?;
        Ok(self)
    }

    fn fade(
        &mut self,
        range: impl Into<RangeOptions>,
        options: impl Into<FadeOptions>,
    ) -> AudioResult<&mut Self> {
        let options = options.into();
        let envelope = options.envelope()?;
        let range = self.resolve(range)?;
        if range.is_empty() {
            return Ok(self);
        }

        let len = range.length as f64;
        let reversed = range.is_reversed();
        let (start, end) = (range.start, range.end);

        self.store_mut().scan_mut(start, end, |mut part, offset| {
            for &ch in &range.channels {
                for (i, x) in part.row_mut(ch).iter_mut().enumerate() {
                    let global = offset + i;
                    // Distance from the silent edge of the fade.
                    let k = if reversed { end - 1 - global } else { global - start };
                    let t = (k as f64 + 0.5) / len;
                    *x *= envelope(t) as f32;
                }
            }
        })?;
        Ok(self)
    }

    fn invert(&mut self, range: impl Into<RangeOptions>) -> AudioResult<&mut Self> {
        let range = self.resolve(range)?;
        map_range(self.store_mut(), &range, |x| -x)?;
        Ok(self)
    }
}

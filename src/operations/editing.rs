//! Structural editing for [`Audio`]: trim, reverse, pad and shift.

use std::ops::ControlFlow;

use tracing::debug;

use super::types::{PadOptions, ShiftOptions, TrimOptions};
use crate::utils::audio_math::seconds_to_samples;
use crate::{Audio, AudioEditing, AudioError, AudioResult, RangeOptions, SampleStore, Segment};

fn check_seconds(parameter: &str, seconds: f64) -> AudioResult<()> {
    if seconds.is_finite() {
        Ok(())
    } else {
        Err(AudioError::invalid_argument(
            parameter,
            format!("expected a finite number of seconds, got {}", seconds),
        ))
    }
}

impl AudioEditing for Audio {
    fn trim(&mut self, options: impl Into<TrimOptions>) -> AudioResult<&mut Self> {
        let options = options.into();
        let level = options.threshold_level() as f32;
        let (left, right) = options.sides();
        let length = self.length();
        let store = self.store();

        let loud = |column: ndarray::ArrayView1<'_, f32>| column.iter().any(|x| x.abs() > level);

        let mut first = None;
        if left {
            store.scan(0, length, |part, offset| {
                match (0..part.ncols()).find(|&j| loud(part.column(j))) {
                    Some(i) => {
                        first = Some(offset + i);
                        ControlFlow::Break(())
                    }
                    None => ControlFlow::Continue(()),
                }
            })?;
        }

        let mut last = None;
        if right {
            store.scan_rev(0, length, |part, offset| {
                match (0..part.ncols()).rev().find(|&j| loud(part.column(j))) {
                    Some(i) => {
                        last = Some(offset + i + 1);
                        ControlFlow::Break(())
                    }
                    None => ControlFlow::Continue(()),
                }
            })?;
        }

        let first = first.unwrap_or(0);
        let last = last.unwrap_or(length);
        if first >= last {
            return Ok(self);
        }
        debug!(first, last, length, "trim");

        let store = self.store_mut();
        store.remove(last, length)?;
        store.remove(0, first)?;
        Ok(self)
    }

    fn reverse(&mut self, range: impl Into<RangeOptions>) -> AudioResult<&mut Self> {
        let range = self.resolve(range)?;
        self.store_mut()
            .reverse(range.start, range.end, &range.channels)?;
        Ok(self)
    }

    fn pad(&mut self, duration: f64, options: impl Into<PadOptions>) -> AudioResult<&mut Self> {
        check_seconds("duration", duration)?;
        let options = options.into();
        let target = seconds_to_samples(duration, self.sample_rate());
        let length = self.length();
        if target <= length {
            return Ok(self);
        }

        let fill = Segment::filled(
            self.channels(),
            target - length,
            self.sample_rate(),
            options.value,
        )?;
        if options.left {
            self.store_mut().insert(0, fill)?;
        } else {
            self.store_mut().append(fill)?;
        }
        Ok(self)
    }

    fn shift(&mut self, amount: f64, options: impl Into<ShiftOptions>) -> AudioResult<&mut Self> {
        check_seconds("amount", amount)?;
        let options = options.into();
        let length = self.length();
        let n = seconds_to_samples(amount.abs(), self.sample_rate()).min(length);
        if n == 0 {
            return Ok(self);
        }

        let (channels, sample_rate) = (self.channels(), self.sample_rate());
        let store = self.store_mut();
        if amount > 0.0 {
            let moved = store.remove(length - n, length)?;
            let head = if options.rotate {
                moved
            } else {
                SampleStore::silence(channels, n, sample_rate)?
            };
            store.insert_store(0, head)?;
        } else {
            let moved = store.remove(0, n)?;
            let tail = if options.rotate {
                moved
            } else {
                SampleStore::silence(channels, n, sample_rate)?
            };
            store.append_store(tail)?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(audio: &Audio) -> Vec<f32> {
        audio.read_channel(0, ()).unwrap()
    }

    #[test]
    fn test_trim_default_threshold() {
        let mut audio = Audio::from_samples(vec![0.0, 0.0, 0.0, 0.1, 0.2, -0.1, -0.2, 0.0, 0.0]);
        audio.trim(()).unwrap();
        assert_eq!(samples(&audio), vec![0.1, 0.2, -0.1, -0.2]);
    }

    #[test]
    fn test_trim_is_idempotent() {
        let mut audio = Audio::from_samples(vec![0.001, 0.5, 0.0, -0.3, 0.005, 0.0]);
        audio.trim(()).unwrap();
        let once = samples(&audio);
        audio.trim(()).unwrap();
        assert_eq!(samples(&audio), once);
        assert_eq!(once, vec![0.5, 0.0, -0.3]);
    }

    #[test]
    fn test_trim_silence_is_unchanged() {
        let mut audio = Audio::from_samples(vec![0.0, 0.001, -0.002, 0.0]);
        audio.trim(()).unwrap();
        assert_eq!(audio.length(), 4);
    }

    #[test]
    fn test_trim_single_side() {
        let mut audio = Audio::from_samples(vec![0.0, 0.5, 0.0]);
        audio.trim(TrimOptions::default().left(true)).unwrap();
        assert_eq!(samples(&audio), vec![0.5, 0.0]);

        let mut audio = Audio::from_samples(vec![0.0, 0.5, 0.0]);
        audio.trim(TrimOptions::default().right(true)).unwrap();
        assert_eq!(samples(&audio), vec![0.0, 0.5]);
    }

    #[test]
    fn test_trim_any_channel_counts() {
        let mut audio = Audio::from_channels(vec![
            vec![0.0, 0.0, 0.3, 0.0],
            vec![0.0, 0.4, 0.0, 0.0],
        ])
        .unwrap();
        audio.trim(TrimOptions::default().level(0.1)).unwrap();
        assert_eq!(
            audio.read(()).unwrap(),
            vec![vec![0.0, 0.3], vec![0.4, 0.0]]
        );
    }

    #[test]
    fn test_trim_across_segments() {
        let mut audio = Audio::from_samples(vec![0.0, 0.0]);
        audio.insert(vec![0.0f32, 0.6], None).unwrap();
        audio.insert(vec![0.7f32, 0.0, 0.0], None).unwrap();
        audio.trim(()).unwrap();
        assert_eq!(samples(&audio), vec![0.6, 0.7]);
    }

    #[test]
    fn test_reverse_twice() {
        let original: Vec<f32> = (0..10).map(|i| i as f32 / 10.0).collect();
        let mut audio = Audio::from_samples(original.clone());
        audio.reverse(RangeOptions::new().start(2).end(8)).unwrap();
        assert_eq!(
            samples(&audio),
            vec![0.0, 0.1, 0.7, 0.6, 0.5, 0.4, 0.3, 0.2, 0.8, 0.9]
        );
        audio.reverse(RangeOptions::new().start(2).end(8)).unwrap();
        assert_eq!(samples(&audio), original);
    }

    #[test]
    fn test_pad_appends_value() {
        let mut audio = Audio::with_duration(0.005).unwrap();
        assert_eq!(audio.length(), 220);
        audio.pad(0.01, PadOptions::default().value(0.5)).unwrap();
        assert_eq!(audio.length(), 441);
        let out = samples(&audio);
        assert!(out[..220].iter().all(|&x| x == 0.0));
        assert!(out[220..].iter().all(|&x| x == 0.5));
    }

    #[test]
    fn test_pad_left_and_noop() {
        let mut audio = Audio::from_samples(vec![0.1, 0.2]);
        audio
            .pad(4.0 / 44100.0, PadOptions::default().left())
            .unwrap();
        assert_eq!(samples(&audio), vec![0.0, 0.0, 0.1, 0.2]);

        audio.pad(1.0 / 44100.0, ()).unwrap();
        assert_eq!(audio.length(), 4);
    }

    #[test]
    fn test_shift_without_rotation() {
        let step = 1.0 / 44100.0;
        let mut audio = Audio::from_samples(vec![0.1, 0.2, 0.3, 0.4]);
        audio.shift(2.0 * step, ()).unwrap();
        assert_eq!(samples(&audio), vec![0.0, 0.0, 0.1, 0.2]);

        let mut audio = Audio::from_samples(vec![0.1, 0.2, 0.3, 0.4]);
        audio.shift(-1.0 * step, ()).unwrap();
        assert_eq!(samples(&audio), vec![0.2, 0.3, 0.4, 0.0]);
    }

    #[test]
    fn test_shift_with_rotation() {
        let step = 1.0 / 44100.0;
        let mut audio = Audio::from_samples(vec![0.1, 0.2, 0.3, 0.4]);
        audio.shift(step, ShiftOptions::rotate()).unwrap();
        assert_eq!(samples(&audio), vec![0.4, 0.1, 0.2, 0.3]);

        audio.shift(-3.0 * step, ShiftOptions::rotate()).unwrap();
        assert_eq!(samples(&audio), vec![0.3, 0.4, 0.1, 0.2]);
    }

    #[test]
    fn test_shift_beyond_length_silences() {
        let mut audio = Audio::from_samples(vec![0.1, 0.2]);
        audio.shift(1.0, ()).unwrap();
        assert_eq!(samples(&audio), vec![0.0, 0.0]);
    }
}

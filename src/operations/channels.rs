//! Channel-count conversion for [`Audio`].

use super::types::RemixMethod;
use crate::{Audio, AudioChannelOps, AudioResult};

impl AudioChannelOps for Audio {
    fn remix(&mut self, channels: usize, method: RemixMethod) -> AudioResult<&mut Self> {
        let current = self.channels();
        if channels == current && !matches!(method, RemixMethod::Custom(_)) {
            return Ok(self);
        }
        let matrix = method.matrix(current, channels)?;
        self.store_mut().mix(&matrix)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AudioError, RangeOptions};
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_mono_to_stereo_duplicates() {
        let mut audio = Audio::from_samples(vec![0.1, 0.2]);
        audio.remix(2, RemixMethod::Smart).unwrap();
        assert_eq!(audio.channels(), 2);
        assert_eq!(audio.read(()).unwrap(), vec![vec![0.1, 0.2], vec![0.1, 0.2]]);
    }

    #[test]
    fn test_stereo_to_mono_averages() {
        let mut audio = Audio::from_channels(vec![vec![0.2, 0.4], vec![0.4, 0.0]]).unwrap();
        audio.remix(1, RemixMethod::default()).unwrap();
        let out = audio.read_channel(0, ()).unwrap();
        assert_approx_eq!(out[0] as f64, 0.3, 1e-6);
        assert_approx_eq!(out[1] as f64, 0.2, 1e-6);
    }

    #[test]
    fn test_equal_power_downmix() {
        let mut audio = Audio::from_channels(vec![vec![1.0], vec![1.0]]).unwrap();
        audio.remix(1, RemixMethod::EqualPower).unwrap();
        let out = audio.read_channel(0, ()).unwrap();
        assert_approx_eq!(out[0] as f64, 2.0f64.sqrt(), 1e-6);
    }

    #[test]
    fn test_upmix_keeps_existing_channels() {
        let mut audio = Audio::from_channels(vec![vec![0.1], vec![0.2]]).unwrap();
        audio.remix(4, RemixMethod::Smart).unwrap();
        assert_eq!(
            audio.read(()).unwrap(),
            vec![vec![0.1], vec![0.2], vec![0.0], vec![0.0]]
        );
    }

    #[test]
    fn test_custom_matrix_swaps_channels() {
        let mut audio = Audio::from_channels(vec![vec![0.1], vec![0.2]]).unwrap();
        audio
            .remix(2, RemixMethod::Custom(vec![vec![0.0, 1.0], vec![1.0, 0.0]]))
            .unwrap();
        assert_eq!(audio.read(()).unwrap(), vec![vec![0.2], vec![0.1]]);
    }

    #[test]
    fn test_remix_to_zero_channels_fails() {
        let mut audio = Audio::from_samples(vec![0.1]);
        let res = audio.remix(0, RemixMethod::Smart);
        assert!(matches!(res, Err(AudioError::InvalidArgument { .. })));
        assert!(audio.read(RangeOptions::new().channel(0)).is_ok());
    }
}

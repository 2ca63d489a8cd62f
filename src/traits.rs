use bytemuck::NoUninit;
use num_traits::{NumCast, Zero};

use crate::{AudioError, AudioResult};
use std::fmt::Debug;

/// Core trait for the numeric formats audio can be read out as or imported from.
///
/// The container itself always stores `f32` samples in `[-1.0, 1.0]`; this
/// trait describes the external formats at the edges:
/// - `i16`: 16-bit signed integer PCM
/// - `i32`: 32-bit signed integer PCM
/// - `f32`: 32-bit floating point (identity)
/// - `f64`: 64-bit floating point
pub trait AudioSample:
    Copy
    + Sized
    + Default
    + Debug
    + Sync
    + Send
    + PartialEq
    + PartialOrd
    + NoUninit // bytemuck trait to ensure no uninitialized bytes
    + NumCast
    + Zero
    + ConvertTo<f32>
    + 'static
{
    /// Short format name used in error messages.
    const NAME: &'static str;
}

/// Scaled conversion between audio sample formats.
///
/// Float to integer conversions clamp to `[-1.0, 1.0]` before scaling, so
/// out-of-range float samples saturate instead of wrapping.
///
/// ```rust
/// use audio_container::ConvertTo;
///
/// let s: i16 = 0.5f32.convert_to().unwrap();
/// assert_eq!(s, 16384);
/// let back: f32 = s.convert_to().unwrap();
/// assert!((back - 0.5).abs() < 1e-4);
/// ```
pub trait ConvertTo<T> {
    /// Convert this sample to another audio sample type.
    fn convert_to(&self) -> AudioResult<T>;
}

/// Generates identity conversions (same type to same type)
macro_rules! impl_identity_conversion {
    ($type:ty) => {
        impl ConvertTo<$type> for $type {
            #[inline(always)]
            fn convert_to(&self) -> AudioResult<$type> {
                Ok(*self)
            }
        }
    };
}

/// Generates integer-to-float conversions with consistent scaling
macro_rules! impl_int_to_float_conversion {
    ($from:ty, $to:ty) => {
        impl ConvertTo<$to> for $from {
            #[inline(always)]
            fn convert_to(&self) -> AudioResult<$to> {
                if *self < 0 {
                    Ok((*self as $to) / (-(<$from>::MIN as $to)))
                } else {
                    Ok((*self as $to) / (<$from>::MAX as $to))
                }
            }
        }
    };
}

/// Generates float-to-integer conversions with clamping and consistent scaling
macro_rules! impl_float_to_int_conversion {
    ($from:ty, $to:ty) => {
        impl ConvertTo<$to> for $from {
            #[inline(always)]
            fn convert_to(&self) -> AudioResult<$to> {
                if !self.is_finite() {
                    return Err(AudioError::Conversion {
                        value: format!("{:?}", self),
                        target: <$to as AudioSample>::NAME.to_string(),
                    });
                }
                let clamped = self.clamp(-1.0, 1.0);
                if clamped < 0.0 {
                    Ok((clamped * (-(<$to>::MIN as $from))).round() as $to)
                } else {
                    Ok((clamped * (<$to>::MAX as $from)).round() as $to)
                }
            }
        }
    };
}

/// Generates float-to-float conversions
macro_rules! impl_float_to_float_conversion {
    ($from:ty, $to:ty) => {
        impl ConvertTo<$to> for $from {
            #[inline(always)]
            fn convert_to(&self) -> AudioResult<$to> {
                Ok(*self as $to)
            }
        }
    };
}

impl_identity_conversion!(f32);
impl_float_to_float_conversion!(f32, f64);
impl_float_to_float_conversion!(f64, f32);
impl_float_to_int_conversion!(f32, i16);
impl_float_to_int_conversion!(f32, i32);
impl_int_to_float_conversion!(i16, f32);
impl_int_to_float_conversion!(i32, f32);

impl AudioSample for i16 {
    const NAME: &'static str = "i16";
}

impl AudioSample for i32 {
    const NAME: &'static str = "i32";
}

impl AudioSample for f32 {
    const NAME: &'static str = "f32";
}

impl AudioSample for f64 {
    const NAME: &'static str = "f64";
}

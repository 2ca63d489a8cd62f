//! Audio operations on [`Audio`](crate::Audio).
//!
//! Operations are organized into focused traits. Each trait handles one
//! aspect of working with a container, and every operation addresses its
//! samples through a [`RangeOptions`](crate::RangeOptions) resolved against
//! the current length, channel count and sample rate.
//!
//! ## Module Organization
//!
//! - [`traits`] - Core trait definitions
//! - [`statistics`] - Level measurements (limits, peak, rms)
//! - [`processing`] - Sample-wise processing (gain, normalize, fade, invert)
//! - [`editing`] - Structural edits (trim, reverse, pad, shift)
//! - [`channels`] - Channel-count conversion (remix)
//! - [`types`] - Supporting types and enums
//!
//! ## Quick Start
//!
//! ```rust
//! use audio_container::{Audio, FadeOptions, RangeOptions, operations::*};
//!
//! # fn example() -> audio_container::AudioResult<()> {
//! let mut audio = Audio::from_samples(vec![0.5; 4410]);
//!
//! let (min, max) = audio.limits(())?;
//! assert_eq!((min, max), (0.5, 0.5));
//!
//! audio
//!     .normalize(())?
//!     .fade(RangeOptions::new().duration(0.05), FadeOptions::default())?
//!     .fade(RangeOptions::new().duration(-0.05), FadeCurve::SmoothStep)?;
//!
//! assert!(audio.peak(())? <= 1.0);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod traits;
pub mod types;

pub mod channels;
pub mod editing;
pub mod processing;
pub mod statistics;

pub use traits::{AudioChannelOps, AudioEditing, AudioProcessing, AudioStatistics};

pub use types::{
    DEFAULT_SILENCE_DB, FadeCurve, FadeOptions, PadOptions, RemixMethod, ShiftOptions, TrimOptions,
};

// Correctness and logic
#![warn(clippy::unit_cmp)] // Detects comparing unit types
#![warn(clippy::match_same_arms)]
// Duplicate match arms

// Performance-focused
#![warn(clippy::inefficient_to_string)] // `format!("{}", x)` vs `x.to_string()`
#![warn(clippy::map_clone)] // Cloning inside `map()` unnecessarily
#![warn(clippy::unnecessary_to_owned)] // Detects redundant `.to_owned()` or `.clone()`
#![warn(clippy::large_stack_arrays)] // Helps avoid stack overflows
#![warn(clippy::box_collection)] // Warns on boxed `Vec`, `String`, etc.
#![warn(clippy::vec_box)] // Avoids using `Vec<Box<T>>` when unnecessary
#![warn(clippy::needless_collect)] // Avoids `.collect().iter()` chains

// Style and idiomatic Rust
#![warn(clippy::redundant_clone)] // Detects unnecessary `.clone()`
#![warn(clippy::identity_op)] // e.g., `x + 0`, `x * 1`
#![warn(clippy::needless_return)] // Avoids `return` at the end of functions
#![warn(clippy::let_unit_value)] // Avoids binding `()` to variables
#![warn(clippy::manual_map)] // Use `.map()` instead of manual `match`
#![warn(clippy::unwrap_used)] // Avoids using `unwrap()`

// Maintainability
#![warn(clippy::missing_panics_doc)] // Docs for functions that might panic
#![warn(clippy::missing_safety_doc)] // Docs for `unsafe` functions
#![deny(missing_docs)] // Documentation is a must for release

//! # AudioContainer
//!
//! A sample-accurate, multichannel audio container. Decoded PCM is stored as an
//! ordered list of fixed-channel-count segments, addressed by time or sample
//! offset, and edited in place by a family of signal operations (gain,
//! normalize, fade, trim, reverse, invert, pad, shift, remix).
//!
//! ## Installation
//!
//! ```toml
//! [dependencies]
//! audio_container = "0.1"
//! ```
//!
//! The `cache` feature (enabled by default) adds the asynchronous
//! [`SourceCache`](crate::cache::SourceCache), which deduplicates concurrent
//! loads of the same source. Disable default features for a synchronous-only
//! build.
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`AudioResult`]:
//!
//! ```rust
//! use audio_container::{Audio, AudioError, RangeOptions};
//!
//! let audio = Audio::from_samples(vec![0.0, 0.5, -0.5, 0.25]);
//! match audio.read(RangeOptions::new().channel(3)) {
//!     Ok(_) => unreachable!(),
//!     Err(AudioError::InvalidArgument { parameter, .. }) => assert_eq!(parameter, "channels"),
//!     Err(other) => panic!("unexpected: {other}"),
//! }
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use audio_container::{Audio, AudioEditing, AudioProcessing, RangeOptions, TrimOptions};
//!
//! # fn example() -> audio_container::AudioResult<()> {
//! let mut audio = Audio::from_samples(vec![0.0, 0.0, 0.1, 0.2, -0.1, -0.2, 0.0]);
//!
//! audio
//!     .trim(TrimOptions::default())?
//!     .normalize(())?
//!     .gain(-6.0, RangeOptions::at(0.0))?;
//!
//! assert_eq!(audio.length(), 4);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Addressing
//!
//! Ranges are described with [`RangeOptions`] and resolved against the current
//! length, channel count and sample rate into a [`SampleRange`]. Negative times
//! and offsets count from the end; a negative duration counts backwards from
//! its anchor.
//!
//! ```rust
//! use audio_container::{Audio, RangeOptions};
//!
//! let audio = Audio::from_samples(vec![0.0, 1.0, 2.0, 3.0, 4.0]);
//! let tail = audio.read(RangeOptions::new().start(-2)).unwrap();
//! assert_eq!(tail, vec![vec![3.0, 4.0]]);
//! ```
//!
//! ## License
//!
//! MIT License

mod error;

pub mod audio;
#[cfg(feature = "cache")]
pub mod cache;
pub mod conversions;
pub mod operations;
pub mod range;
mod repr;
pub mod store;
/// Sample format traits.
pub mod traits;
pub mod utils;

pub use crate::audio::{Audio, AudioOptions, Serializer, Source, WriteValue};
pub use crate::conversions::AudioTypeConversion;
pub use crate::error::{AudioError, AudioResult};
pub use crate::operations::{
    AudioChannelOps, AudioEditing, AudioProcessing, AudioStatistics, FadeCurve, FadeOptions,
    PadOptions, RemixMethod, ShiftOptions, TrimOptions,
};
pub use crate::range::{ChannelSelector, RangeOptions, SampleRange, normalize_index};
pub use crate::repr::Segment;
pub use crate::store::{SampleStore, StoreView, Visit};
pub use crate::traits::{AudioSample, ConvertTo};
pub use crate::utils::audio_math::{
    amplitude_to_db, db_to_amplitude, samples_to_seconds, seconds_to_samples,
};

#[cfg(feature = "cache")]
pub use crate::cache::{CacheConfig, DecodedAudio, Decoder, LoadRequest, Loader, SourceCache};

/// Sample rate used when none is given.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Describes how multi-channel audio data is organized in memory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChannelLayout {
    /// Samples from different channels are stored sequentially (LRLRLR...)
    /// This is the most common format for audio files and streaming
    Interleaved,
    /// Samples from each channel are stored in separate contiguous blocks (LLL...RRR...)
    /// This is how the container stores audio internally
    #[default]
    NonInterleaved,
}

impl ChannelLayout {
    /// Returns true if the layout is interleaved
    pub const fn is_interleaved(&self) -> bool {
        matches!(self, ChannelLayout::Interleaved)
    }

    /// Returns true if the layout is non-interleaved
    pub const fn is_non_interleaved(&self) -> bool {
        matches!(self, ChannelLayout::NonInterleaved)
    }
}

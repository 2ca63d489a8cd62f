//! Utility functions for audio processing.
//!
//! # Modules
//!
//! - [`audio_math`] - Decibel and sample/time conversions

pub mod audio_math;

pub use audio_math::*;

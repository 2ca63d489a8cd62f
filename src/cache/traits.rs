//! Collaborator traits for the source cache.

use std::future::Future;

use super::DecodedAudio;
use crate::AudioResult;

/// Fetches the encoded bytes of a source.
///
/// Implementations report failures as [`AudioError::Load`](crate::AudioError::Load).
pub trait Loader: Send + Sync + 'static {
    /// Fetches the bytes behind a normalized source key.
    fn load(&self, key: &str) -> impl Future<Output = AudioResult<Vec<u8>>> + Send;
}

/// Decodes encoded audio into planar float samples.
///
/// Implementations report failures as [`AudioError::Decode`](crate::AudioError::Decode).
pub trait Decoder: Send + Sync + 'static {
    /// Decodes `bytes` into per-channel samples and a sample rate.
    fn decode(&self, bytes: &[u8]) -> impl Future<Output = AudioResult<DecodedAudio>> + Send;
}

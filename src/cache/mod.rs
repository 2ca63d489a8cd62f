//! Asynchronous source loading with per-key deduplication.
//!
//! A [`SourceCache`] sits between callers and two external collaborators: a
//! [`Loader`] that fetches raw bytes for a source identifier (file path, URL)
//! and a [`Decoder`] that turns those bytes into per-channel float samples.
//!
//! - Concurrent loads of the same key share a single fetch and decode.
//! - Every caller receives its own [`Audio`](crate::Audio) clone, so editing a
//!   loaded container never affects the cached copy or other callers.
//! - A failed load is delivered to every waiting caller and the key is evicted.
//!
//! # Example
//!
//! ```rust,ignore
//! use audio_container::cache::*;
//!
//! async fn load_stems(cache: &SourceCache<FsLoader, WavDecoder>) -> AudioResult<()> {
//!     let (drums, bass) = tokio::join!(cache.load("drums.wav"), cache.load("bass.wav"));
//!     let mut drums = drums?;
//!     drums.normalize(())?;
//!     Ok(())
//! }
//! ```

pub mod source_cache;
pub mod traits;

use std::path::{Path, PathBuf};

pub use source_cache::SourceCache;
pub use traits::{Decoder, Loader};

use crate::{Audio, Source};

/// Samples produced by a [`Decoder`].
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// One sample vector per channel.
    pub channel_data: Vec<Vec<f32>>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Creates decoded audio from planar channel data.
    pub fn new(channel_data: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        Self {
            channel_data,
            sample_rate,
        }
    }
}

impl From<DecodedAudio> for Source {
    fn from(decoded: DecodedAudio) -> Self {
        Source::Buffer {
            channels: decoded.channel_data,
            sample_rate: decoded.sample_rate,
        }
    }
}

/// Configuration for a [`SourceCache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Directory relative source identifiers are resolved against.
    pub base_dir: Option<PathBuf>,
    /// When false, every load goes to the loader and nothing is stored.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            enabled: true,
        }
    }
}

impl CacheConfig {
    /// Sets the base directory.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Enables or disables caching.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Normalizes a source identifier into a cache key.
    ///
    /// URLs and absolute paths are kept as given; relative paths are joined
    /// onto `base_dir` when one is configured.
    pub fn resolve_key(&self, source_id: &str) -> String {
        let is_url = source_id.contains("://");
        match &self.base_dir {
            Some(base) if !is_url && Path::new(source_id).is_relative() => {
                base.join(source_id).to_string_lossy().into_owned()
            }
            _ => source_id.to_string(),
        }
    }
}

/// One item of a [`SourceCache::load_many`] batch.
#[derive(Debug, Clone)]
pub enum LoadRequest {
    /// A source identifier, served through the cache.
    Path(String),
    /// An already loaded container, passed through unchanged.
    Audio(Audio),
    /// Encoded bytes, decoded without touching the cache.
    Bytes(Vec<u8>),
}

impl From<&str> for LoadRequest {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for LoadRequest {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<Audio> for LoadRequest {
    fn from(audio: Audio) -> Self {
        Self::Audio(audio)
    }
}

impl From<Vec<u8>> for LoadRequest {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_key() {
        let config = CacheConfig::default().base_dir("/data/audio");
        assert_eq!(config.resolve_key("kick.wav"), "/data/audio/kick.wav");
        assert_eq!(config.resolve_key("/tmp/snare.wav"), "/tmp/snare.wav");
        assert_eq!(
            config.resolve_key("https://example.com/a.mp3"),
            "https://example.com/a.mp3"
        );
        assert_eq!(CacheConfig::default().resolve_key("kick.wav"), "kick.wav");
    }

    #[test]
    fn test_decoded_audio_into_source() {
        let decoded = DecodedAudio::new(vec![vec![0.1, 0.2], vec![0.3, 0.4]], 8000);
        let audio = Audio::from_source(decoded, ()).unwrap();
        assert_eq!(audio.channels(), 2);
        assert_eq!(audio.sample_rate(), 8000);
        assert_eq!(audio.read_channel(1, ()).unwrap(), vec![0.3, 0.4]);
    }
}

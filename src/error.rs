//! Error types and result utilities for audio container operations.

use thiserror::Error;

/// Convenience type alias for results that may contain an [`AudioError`].
pub type AudioResult<T> = Result<T, AudioError>;

/// Error types that can occur while building, editing or loading audio.
///
/// Every payload is an owned string so that one failure can be handed to
/// several waiting callers (see the source cache), which requires `Clone`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    /// A malformed or ambiguous argument was supplied.
    ///
    /// This covers ambiguous source shapes, out-of-range channel selectors
    /// and missing or non-numeric required fields.
    #[error("Invalid argument `{parameter}`: {reason}")]
    InvalidArgument {
        /// Name of the offending parameter.
        parameter: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An offset or length fell outside `[0, length]` after normalization,
    /// or the resolved start lies after the resolved end.
    #[error("Range error: {0}")]
    Range(String),

    /// The requested operation is not supported.
    #[error("Unimplemented: {0}")]
    Unimplemented(String),

    /// Array or buffer dimensions don't match what the operation expects.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A sample value could not be converted into the requested format.
    #[error("Conversion error: failed to convert {value} to {target}")]
    Conversion {
        /// Rendered source value.
        value: String,
        /// Target sample type.
        target: String,
    },

    /// The external decoder failed (unsupported format, corrupt data).
    #[error("Decode error for `{source_id}`: {reason}")]
    Decode {
        /// Source identifier that failed to decode.
        source_id: String,
        /// Decoder-provided reason.
        reason: String,
    },

    /// The external loader failed to fetch a source (missing file, network).
    #[error("Load error for `{source_id}`: {reason}")]
    Load {
        /// Source identifier that failed to load.
        source_id: String,
        /// Loader-provided reason.
        reason: String,
    },

    /// I/O failure while writing serialized audio.
    #[error("I/O error: {0}")]
    Io(String),
}

impl AudioError {
    /// Create an invalid argument error.
    pub fn invalid_argument(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Create a range error.
    pub fn range(details: impl Into<String>) -> Self {
        Self::Range(details.into())
    }

    /// Create a decode error.
    pub fn decode(source_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            source_id: source_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a load error.
    pub fn load(source_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Load {
            source_id: source_id.into(),
            reason: reason.into(),
        }
    }

    /// True for errors raised by the external loader or decoder.
    pub const fn is_source_error(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::Load { .. })
    }
}

impl From<std::io::Error> for AudioError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AudioError::invalid_argument("channels", "duplicate channel index 1");
        assert_eq!(
            err.to_string(),
            "Invalid argument `channels`: duplicate channel index 1"
        );

        let err = AudioError::range("offset 12 exceeds length 10");
        assert_eq!(err.to_string(), "Range error: offset 12 exceeds length 10");
    }

    #[test]
    fn test_source_error_classification() {
        assert!(AudioError::decode("x.wav", "bad header").is_source_error());
        assert!(AudioError::load("x.wav", "not found").is_source_error());
        assert!(!AudioError::Unimplemented("sample rate".into()).is_source_error());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: AudioError = io.into();
        assert!(matches!(err, AudioError::Io(ref msg) if msg.contains("pipe closed")));
    }
}

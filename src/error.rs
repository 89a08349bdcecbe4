//! Error handling for pcmtool
//!
//! Every error carries a stable code and recovery suggestions so the
//! editing front-end can surface something actionable.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for pcmtool operations
pub type Result<T> = std::result::Result<T, PcmError>;

/// Main error type for pcmtool operations
#[derive(Error, Debug)]
pub enum PcmError {
    // Selection Errors
    #[error("Invalid selection range: [{start}, {end}) in buffer of {len} samples")]
    InvalidSelection { start: usize, end: usize, len: usize },

    #[error("Invalid number of slices: {count} (allowed 1..={max})")]
    InvalidSliceCount { count: usize, max: usize },

    // Load Errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to decode audio: {reason}")]
    DecodeFailure {
        reason: String,
        #[source]
        source: Option<hound::Error>,
    },

    #[error("Unsupported source format: {format}")]
    UnsupportedSourceFormat { format: String },

    #[error("Audio has no channels")]
    NoChannels,

    #[error("Channel mismatch: {reason}")]
    ChannelMismatch { reason: String },

    #[error("Invalid sample rate: {rate} Hz")]
    InvalidSampleRate { rate: u32 },

    #[error("Audio contains no samples")]
    EmptyAudio,

    #[error("No audio loaded")]
    NoAudioLoaded,

    // Output Errors
    #[error("Failed to write {path}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Container payload too large: {bytes} bytes")]
    ContainerTooLarge { bytes: u64 },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PcmError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            PcmError::InvalidSelection { .. } => "INVALID_SELECTION",
            PcmError::InvalidSliceCount { .. } => "INVALID_SLICE_COUNT",
            PcmError::FileNotFound { .. } => "FILE_NOT_FOUND",
            PcmError::DecodeFailure { .. } => "DECODE_FAILURE",
            PcmError::UnsupportedSourceFormat { .. } => "UNSUPPORTED_SOURCE_FORMAT",
            PcmError::NoChannels => "NO_CHANNELS",
            PcmError::ChannelMismatch { .. } => "CHANNEL_MISMATCH",
            PcmError::InvalidSampleRate { .. } => "INVALID_SAMPLE_RATE",
            PcmError::EmptyAudio => "EMPTY_AUDIO",
            PcmError::NoAudioLoaded => "NO_AUDIO_LOADED",
            PcmError::WriteFailure { .. } => "WRITE_FAILURE",
            PcmError::ContainerTooLarge { .. } => "CONTAINER_TOO_LARGE",
            PcmError::Io(_) => "IO_ERROR",
            PcmError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the user can fix this and try again
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PcmError::InvalidSelection { .. }
                | PcmError::InvalidSliceCount { .. }
                | PcmError::FileNotFound { .. }
                | PcmError::DecodeFailure { .. }
                | PcmError::UnsupportedSourceFormat { .. }
                | PcmError::NoAudioLoaded
                | PcmError::WriteFailure { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            PcmError::InvalidSelection { .. } => vec![
                "Move the end marker after the start marker",
                "Select at least one sample before exporting",
            ],
            PcmError::InvalidSliceCount { .. } => vec!["Choose between 1 and 100 slices"],
            PcmError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            PcmError::DecodeFailure { .. } => vec![
                "Check if the file plays in another application",
                "Re-export the file as uncompressed PCM WAV",
            ],
            PcmError::UnsupportedSourceFormat { .. } => vec![
                "Convert to WAV first",
                "Supported: 8, 16, 24, 32-bit integer PCM and 32-bit float WAV",
            ],
            PcmError::NoAudioLoaded => vec!["Load a WAV file before previewing or exporting"],
            PcmError::WriteFailure { .. } => vec![
                "Check the destination directory exists and is writable",
                "Free up disk space",
                "Export to a different location",
            ],
            PcmError::ContainerTooLarge { .. } => vec!["Export a shorter selection or use slices"],
            _ => vec![],
        }
    }
}

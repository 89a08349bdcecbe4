//! Editor configuration
//!
//! Preview and export preferences persisted as JSON.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::engine::export::ExportSettings;
use crate::engine::slice::MAX_SLICES;
use crate::engine::view::{DEFAULT_ZOOM_WINDOW, MAX_ZOOM_WINDOW, MIN_ZOOM_WINDOW};
use crate::error::{PcmError, Result};

/// Output rate assumed for preview when the mixer does not say otherwise
pub const DEFAULT_PREVIEW_RATE: u32 = 44100;

/// Highest accepted preview output rate
pub const MAX_PREVIEW_RATE: u32 = 768_000;

/// Persisted editor preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Loop the preview until stopped
    pub preview_loop: bool,
    /// Drop every other sample on export
    pub double_speed: bool,
    /// Number of slices written on export
    pub slice_count: usize,
    /// Mixer rate used when rendering previews offline
    pub preview_output_rate: u32,
    /// Initial zoom window width in samples
    pub zoom_window_samples: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            preview_loop: false,
            double_speed: false,
            slice_count: 1,
            preview_output_rate: DEFAULT_PREVIEW_RATE,
            zoom_window_samples: DEFAULT_ZOOM_WINDOW,
        }
    }
}

impl EditorConfig {
    /// Load from `path`, falling back to defaults when the file is missing
    ///
    /// # Errors
    /// `Io` on read errors, `Serialization` on malformed JSON, and the
    /// errors of [`EditorConfig::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: EditorConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| PcmError::WriteFailure {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// # Errors
    /// `InvalidSliceCount`, or `InvalidSampleRate` for a preview rate outside
    /// `1..=MAX_PREVIEW_RATE`.
    pub fn validate(&self) -> Result<()> {
        if self.slice_count == 0 || self.slice_count > MAX_SLICES {
            return Err(PcmError::InvalidSliceCount {
                count: self.slice_count,
                max: MAX_SLICES,
            });
        }
        if self.preview_output_rate == 0 || self.preview_output_rate > MAX_PREVIEW_RATE {
            return Err(PcmError::InvalidSampleRate {
                rate: self.preview_output_rate,
            });
        }
        Ok(())
    }

    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            speed_double: self.double_speed,
            slice_count: self.slice_count,
        }
    }

    /// Zoom window clamped into the supported widths
    pub fn zoom_window(&self) -> usize {
        self.zoom_window_samples.clamp(MIN_ZOOM_WINDOW, MAX_ZOOM_WINDOW)
    }
}

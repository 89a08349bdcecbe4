//! Export Jobs
//!
//! Turns a selection into the fixed-rate output: resample, optional speed
//! doubling, optional slicing, then encoding to one or more files or to a
//! new in-memory buffer.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::engine::buffer::{Selection, WaveformBuffer};
use crate::engine::io::write_wav;
use crate::engine::resample::{resample, speed_double, TARGET_SAMPLE_RATE};
use crate::engine::slice::{slice_path, slice_ranges, MAX_SLICES};
use crate::error::{PcmError, Result};

/// User-facing export options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Drop every other sample after resampling
    pub speed_double: bool,
    /// Number of slice files; 1 writes a single file
    pub slice_count: usize,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            speed_double: false,
            slice_count: 1,
        }
    }
}

impl ExportSettings {
    /// # Errors
    /// `InvalidSliceCount` unless `1 <= slice_count <= MAX_SLICES`.
    pub fn validate(&self) -> Result<()> {
        if self.slice_count == 0 || self.slice_count > MAX_SLICES {
            return Err(PcmError::InvalidSliceCount {
                count: self.slice_count,
                max: MAX_SLICES,
            });
        }
        Ok(())
    }
}

/// Rendered export audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAudio {
    pub samples: Vec<i16>,
    pub rate: u32,
}

/// One file written by an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub samples: usize,
    /// SHA-256 of the written bytes
    pub sha256: String,
}

/// A file that could not be written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of an export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    pub exported_at: DateTime<Utc>,
    pub rate: u32,
    pub speed_double: bool,
    /// Number of files the export attempted
    pub requested: usize,
    pub files: Vec<ExportedFile>,
    pub failures: Vec<ExportFailure>,
}

impl ExportReport {
    fn new(rate: u32, speed_double: bool, requested: usize) -> Self {
        Self {
            exported_at: Utc::now(),
            rate,
            speed_double,
            requested,
            files: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Number of files successfully written
    pub fn written(&self) -> usize {
        self.files.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.files.len() == self.requested
    }

    /// Total samples across written files
    pub fn total_samples(&self) -> usize {
        self.files.iter().map(|f| f.samples).sum()
    }

    /// Human-readable outcome, e.g. "Exported 3 of 4 slices"
    pub fn summary(&self) -> String {
        match (self.requested, self.files.first()) {
            (1, Some(file)) => format!(
                "Exported {} samples to {}",
                file.samples,
                file.path.display()
            ),
            (1, None) => "Failed to write output file".to_string(),
            (n, _) if self.is_complete() => format!("Exported {} slices", n),
            (n, _) => format!("Exported {} of {} slices", self.written(), n),
        }
    }

    /// Write the report as pretty JSON
    ///
    /// # Errors
    /// `Serialization` or `WriteFailure`.
    pub fn save_manifest(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| PcmError::WriteFailure {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// A selection captured for export
///
/// Owns its copy of the selected samples, so the live buffer may change
/// while the job runs.
#[derive(Debug, Clone)]
pub struct ExportJob {
    selection: Vec<i16>,
    source_rate: u32,
    settings: ExportSettings,
}

impl ExportJob {
    /// Capture `selection` of `buffer`
    ///
    /// # Errors
    /// * `InvalidSelection` - empty or out-of-range selection
    /// * `InvalidSliceCount` - slice count outside `1..=MAX_SLICES`
    pub fn from_buffer(
        buffer: &WaveformBuffer,
        selection: Selection,
        settings: ExportSettings,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            selection: buffer.selected_samples(selection)?,
            source_rate: buffer.source_rate(),
            settings,
        })
    }

    pub fn settings(&self) -> ExportSettings {
        self.settings
    }

    /// Resample to the target rate and apply speed doubling
    pub fn render(&self) -> Result<RenderedAudio> {
        let resampled = resample(&self.selection, self.source_rate, TARGET_SAMPLE_RATE)?;
        let samples = if self.settings.speed_double {
            speed_double(&resampled)
        } else {
            resampled
        };
        Ok(RenderedAudio {
            samples,
            rate: TARGET_SAMPLE_RATE,
        })
    }

    /// Rendered audio as a new buffer, ready to seed another editing session
    pub fn export_to_buffer(&self) -> Result<WaveformBuffer> {
        let rendered = self.render()?;
        WaveformBuffer::from_mono(rendered.samples, rendered.rate)
    }

    /// Paths this job would write to for `path`
    pub fn output_paths(&self, path: &Path) -> Vec<PathBuf> {
        if self.settings.slice_count > 1 {
            (1..=self.settings.slice_count)
                .map(|n| slice_path(path, n))
                .collect()
        } else {
            vec![path.to_path_buf()]
        }
    }

    /// Outputs that already exist and would be overwritten
    pub fn existing_outputs(&self, path: &Path) -> Vec<PathBuf> {
        self.output_paths(path)
            .into_iter()
            .filter(|p| p.exists())
            .collect()
    }

    /// Export using the job's slice setting
    ///
    /// # Errors
    /// A single-file export fails with `WriteFailure`; slice exports record
    /// per-file failures in the report instead.
    pub fn export(&self, path: &Path) -> Result<ExportReport> {
        if self.settings.slice_count > 1 {
            self.export_slices(path)
        } else {
            self.export_file(path)
        }
    }

    /// Write the whole rendered selection to `path`
    ///
    /// # Errors
    /// `WriteFailure` if the file could not be written.
    pub fn export_file(&self, path: &Path) -> Result<ExportReport> {
        let rendered = self.render()?;
        let mut report = ExportReport::new(rendered.rate, self.settings.speed_double, 1);
        let bytes = write_wav(path, &rendered.samples, rendered.rate)?;
        report.files.push(ExportedFile {
            path: path.to_path_buf(),
            samples: rendered.samples.len(),
            sha256: format!("{:x}", Sha256::digest(&bytes)),
        });
        info!("{}", report.summary());
        Ok(report)
    }

    /// Write `base-1.wav` … `base-N.wav`
    ///
    /// A failing slice does not stop the others, and slices already written
    /// are left in place.
    pub fn export_slices(&self, base: &Path) -> Result<ExportReport> {
        let rendered = self.render()?;
        let ranges = slice_ranges(rendered.samples.len(), self.settings.slice_count)?;
        let mut report =
            ExportReport::new(rendered.rate, self.settings.speed_double, ranges.len());

        for (i, range) in ranges.into_iter().enumerate() {
            let path = slice_path(base, i + 1);
            let samples = &rendered.samples[range];
            match write_wav(&path, samples, rendered.rate) {
                Ok(bytes) => report.files.push(ExportedFile {
                    path,
                    samples: samples.len(),
                    sha256: format!("{:x}", Sha256::digest(&bytes)),
                }),
                Err(e) => {
                    warn!("Slice {} not written: {}", i + 1, e);
                    report.failures.push(ExportFailure {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!("{}", report.summary());
        Ok(report)
    }
}

// ============================================================================
// Tests
// ============================================================================

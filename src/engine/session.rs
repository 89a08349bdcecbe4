//! Editor Session
//!
//! The editing-context owner of one waveform: buffer, selection, preview
//! and export settings. Previews are handed to the mixer as snapshots and
//! observed through a [`PreviewHandle`]; nothing here is touched by the
//! real-time side.

use std::ops::Range;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::EditorConfig;
use crate::engine::buffer::{self, DecodedAudio, Selection, WaveformBuffer};
use crate::engine::export::{ExportJob, ExportReport};
use crate::engine::io::import_wav;
use crate::engine::preview::{Mixer, PreviewSession};
use crate::engine::transport::PreviewHandle;
use crate::engine::view::ZoomView;
use crate::error::{PcmError, Result};

/// Name given to buffers seeded from an export with no source name
pub const EXPORTED_SELECTION_NAME: &str = "Exported Selection";

const READY: &str = "Ready";

/// One waveform being edited, previewed and exported
pub struct EditorSession<M: Mixer> {
    mixer: M,
    config: EditorConfig,
    buffer: Option<WaveformBuffer>,
    selection: Selection,
    name: String,
    zoom: ZoomView,
    preview: Option<PreviewHandle>,
    status: String,
}

impl<M: Mixer> EditorSession<M> {
    /// Create an empty session that registers previews with `mixer`
    pub fn new(mixer: M, config: EditorConfig) -> Self {
        let zoom = ZoomView::with_window(config.zoom_window());
        Self {
            mixer,
            config,
            buffer: None,
            selection: Selection::default(),
            name: String::new(),
            zoom,
            preview: None,
            status: READY.to_string(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn mixer(&self) -> &M {
        &self.mixer
    }

    pub fn mixer_mut(&mut self) -> &mut M {
        &mut self.mixer
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Preview and export preferences; takes effect on the next preview/export
    pub fn config_mut(&mut self) -> &mut EditorConfig {
        &mut self.config
    }

    pub fn buffer(&self) -> Option<&WaveformBuffer> {
        self.buffer.as_ref()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Outcome of the last operation, for display
    pub fn status_message(&self) -> &str {
        &self.status
    }

    pub fn zoom(&self) -> &ZoomView {
        &self.zoom
    }

    pub fn zoom_mut(&mut self) -> &mut ZoomView {
        &mut self.zoom
    }

    /// Sample range currently visible in the waveform view
    pub fn visible_range(&self) -> Range<usize> {
        let len = self.buffer.as_ref().map_or(0, WaveformBuffer::len);
        self.zoom.visible_range(len, self.selection)
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Down-mix and load decoded audio
    ///
    /// On failure the previous buffer, selection and preview are untouched.
    pub fn load_decoded(&mut self, decoded: &DecodedAudio, name: &str) -> Result<()> {
        let loaded = WaveformBuffer::from_decoded(decoded);
        let buffer = self.record(loaded)?;
        self.replace_buffer(buffer, name);
        Ok(())
    }

    /// Decode a WAV file and load it
    ///
    /// On failure the previous buffer, selection and preview are untouched.
    pub fn load_wav(&mut self, path: &Path) -> Result<()> {
        let decoded = import_wav(path);
        let decoded = self.record(decoded)?;
        self.load_decoded(&decoded, &path.display().to_string())
    }

    /// Load a buffer produced elsewhere, e.g. by [`EditorSession::export_to_buffer`]
    pub fn load_buffer(&mut self, buffer: WaveformBuffer, name: &str) {
        let name = if name.is_empty() {
            EXPORTED_SELECTION_NAME
        } else {
            name
        };
        self.replace_buffer(buffer, name);
    }

    /// Seed the session with mono samples, e.g. an in-memory export
    ///
    /// # Errors
    /// `InvalidSampleRate` for a zero rate; the session is left untouched.
    pub fn load_pcm_data(&mut self, samples: Vec<i16>, rate: u32, name: &str) -> Result<()> {
        let buffer = WaveformBuffer::from_mono(samples, rate);
        let buffer = self.record(buffer)?;
        self.load_buffer(buffer, name);
        Ok(())
    }

    fn replace_buffer(&mut self, buffer: WaveformBuffer, name: &str) {
        self.stop_preview();
        self.selection = Selection::full(buffer.len());
        info!(
            "Loaded {}: {} samples at {} Hz",
            name,
            buffer.len(),
            buffer.source_rate()
        );
        self.buffer = Some(buffer);
        self.name = name.to_string();
        self.status = format!("Loaded {}", name);
    }

    /// Drop the buffer and reset to an empty session
    pub fn clear(&mut self) {
        self.stop_preview();
        self.buffer = None;
        self.selection = Selection::default();
        self.name.clear();
        self.status = READY.to_string();
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Move the start marker; a playing preview restarts on the new selection
    pub fn set_start(&mut self, value: usize) {
        let before = self.selection;
        let len = self.len();
        buffer::set_start(&mut self.selection, value, len);
        self.on_selection_edited(before);
    }

    /// Move the end marker; a playing preview restarts on the new selection
    pub fn set_end(&mut self, value: usize) {
        let before = self.selection;
        let len = self.len();
        buffer::set_end(&mut self.selection, value, len);
        self.on_selection_edited(before);
    }

    fn len(&self) -> usize {
        self.buffer.as_ref().map_or(0, WaveformBuffer::len)
    }

    fn on_selection_edited(&mut self, before: Selection) {
        if self.selection == before || !self.is_playing() {
            return;
        }
        debug!(
            "Selection moved to [{}, {}) while playing, restarting preview",
            self.selection.start, self.selection.end
        );
        if let Err(e) = self.start_preview() {
            warn!("Preview restart failed: {}", e);
        }
    }

    // ========================================================================
    // Preview
    // ========================================================================

    /// Snapshot the selection and hand a new preview to the mixer
    ///
    /// Any running preview is stopped first.
    ///
    /// # Errors
    /// `NoAudioLoaded`, or `InvalidSelection` for an empty selection.
    pub fn start_preview(&mut self) -> Result<PreviewHandle> {
        self.stop_preview();
        let session = match self.buffer.as_ref() {
            Some(buffer) => PreviewSession::new(buffer, self.selection, self.config.preview_loop),
            None => Err(PcmError::NoAudioLoaded),
        };
        let session = self.record(session)?;

        let handle = session.handle();
        self.mixer.add_stream(Box::new(session));
        debug!("[PREVIEW {}] Registered with mixer", handle.id());
        self.preview = Some(handle.clone());
        Ok(handle)
    }

    /// Stop the running preview, if any
    pub fn stop_preview(&mut self) {
        if let Some(handle) = self.preview.take() {
            handle.stop();
        }
    }

    /// Start when idle, stop when playing
    pub fn toggle_preview(&mut self) -> Result<()> {
        if self.is_playing() {
            self.stop_preview();
        } else {
            self.start_preview()?;
        }
        Ok(())
    }

    /// True while a preview has not finished or been stopped
    pub fn is_playing(&self) -> bool {
        self.preview.as_ref().map_or(false, PreviewHandle::is_playing)
    }

    /// Absolute sample index of the playhead, for the position marker
    pub fn playback_position(&self) -> Option<usize> {
        self.preview.as_ref().and_then(PreviewHandle::position)
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Capture the current selection with the configured export settings
    pub fn export_job(&self) -> Result<ExportJob> {
        let buffer = self.buffer.as_ref().ok_or(PcmError::NoAudioLoaded)?;
        ExportJob::from_buffer(buffer, self.selection, self.config.export_settings())
    }

    /// Files an export to `path` would overwrite
    pub fn existing_outputs(&self, path: &Path) -> Result<Vec<PathBuf>> {
        Ok(self.export_job()?.existing_outputs(path))
    }

    /// Export to one file, or to numbered slices when configured
    ///
    /// Stops any running preview first.
    pub fn export(&mut self, path: &Path) -> Result<ExportReport> {
        self.run_export(|job| job.export(path))
    }

    /// Export the whole selection to `path`, ignoring the slice setting
    pub fn export_file(&mut self, path: &Path) -> Result<ExportReport> {
        self.run_export(|job| job.export_file(path))
    }

    /// Export `<base>-1.wav` … `<base>-N.wav` using the configured slice count
    pub fn export_slices(&mut self, base: &Path) -> Result<ExportReport> {
        self.run_export(|job| job.export_slices(base))
    }

    fn run_export<F>(&mut self, write: F) -> Result<ExportReport>
    where
        F: FnOnce(&ExportJob) -> Result<ExportReport>,
    {
        self.stop_preview();
        let report = self.export_job().and_then(|job| write(&job));
        let report = self.record(report)?;
        self.status = report.summary();
        Ok(report)
    }

    /// Render the selection into a new buffer plus a name for it
    pub fn export_to_buffer(&mut self) -> Result<(WaveformBuffer, String)> {
        self.stop_preview();
        let exported = self.export_job().and_then(|job| job.export_to_buffer());
        let exported = self.record(exported)?;
        let name = if self.name.is_empty() {
            EXPORTED_SELECTION_NAME.to_string()
        } else {
            format!("{} (exported)", self.name)
        };
        self.status = format!("Exported {} samples to new buffer", exported.len());
        Ok((exported, name))
    }

    /// Keep the error as the status message and pass the result through
    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.status = e.to_string();
        }
        result
    }
}

impl<M: Mixer> Drop for EditorSession<M> {
    fn drop(&mut self) {
        self.stop_preview();
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Waveform Buffer Management
//!
//! Provides the mono 16-bit waveform type, the decoded-input type handed over
//! by the decode collaborator, and the selection model edited by the user.

use crate::error::{PcmError, Result};

// ============================================================================
// Decoded Input
// ============================================================================

/// Per-channel 16-bit samples as delivered by a decoder
///
/// Channels are non-interleaved: `channels[c][i]` is frame `i` of channel `c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAudio {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Declared channel count
    pub channel_count: u16,
    /// Sample data: outer Vec is channels, inner Vec is frames
    pub channels: Vec<Vec<i16>>,
}

impl DecodedAudio {
    /// Create decoded audio from per-channel arrays
    ///
    /// More than `u16::MAX` arrays are declared as `u16::MAX` channels, which
    /// [`WaveformBuffer::from_decoded`] rejects as a channel mismatch.
    pub fn new(sample_rate: u32, channels: Vec<Vec<i16>>) -> Self {
        Self {
            sample_rate,
            channel_count: u16::try_from(channels.len()).unwrap_or(u16::MAX),
            channels,
        }
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }
}

// ============================================================================
// Selection
// ============================================================================

/// Half-open sample range `[start, end)` into a waveform
///
/// For a non-empty buffer the editor keeps `start < end <= len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Create a selection without validation
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Selection covering a whole buffer of `len` samples
    pub fn full(len: usize) -> Self {
        Self { start: 0, end: len }
    }

    /// Number of selected samples (0 when inverted)
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if nothing is selected
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check the selection against a buffer length
    ///
    /// # Errors
    /// `InvalidSelection` when `start >= end` or `end > len`.
    pub fn validate(&self, len: usize) -> Result<()> {
        if self.start >= self.end || self.end > len {
            return Err(PcmError::InvalidSelection {
                start: self.start,
                end: self.end,
                len,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Waveform Buffer
// ============================================================================

/// Mono 16-bit waveform with its source rate
///
/// # Example
/// ```
/// use pcmtool::engine::buffer::WaveformBuffer;
///
/// let buffer = WaveformBuffer::from_mono(vec![0, 100, 200], 8000).unwrap();
/// assert_eq!(buffer.len(), 3);
/// assert_eq!(buffer.source_rate(), 8000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveformBuffer {
    samples: Vec<i16>,
    source_rate: u32,
    channel_count: u16,
}

impl WaveformBuffer {
    /// Down-mix decoded audio to mono
    ///
    /// `mono[i] = (sum of channel[c][i]) / channel_count`, truncating toward zero.
    ///
    /// # Errors
    /// * `NoChannels` - channel count of zero
    /// * `ChannelMismatch` - array count differs from the declared count, or arrays differ in length
    /// * `InvalidSampleRate` - rate of zero
    pub fn from_decoded(decoded: &DecodedAudio) -> Result<Self> {
        if decoded.channel_count == 0 || decoded.channels.is_empty() {
            return Err(PcmError::NoChannels);
        }
        if decoded.channels.len() != decoded.channel_count as usize {
            return Err(PcmError::ChannelMismatch {
                reason: format!(
                    "declared {} channels but received {}",
                    decoded.channel_count,
                    decoded.channels.len()
                ),
            });
        }
        if decoded.sample_rate == 0 {
            return Err(PcmError::InvalidSampleRate { rate: 0 });
        }

        let frames = decoded.frames();
        if let Some((ch, data)) = decoded
            .channels
            .iter()
            .enumerate()
            .find(|(_, data)| data.len() != frames)
        {
            return Err(PcmError::ChannelMismatch {
                reason: format!(
                    "channel {} has {} samples, expected {}",
                    ch,
                    data.len(),
                    frames
                ),
            });
        }

        let count = decoded.channels.len() as i32;
        let samples = (0..frames)
            .map(|i| {
                let sum: i32 = decoded.channels.iter().map(|ch| ch[i] as i32).sum();
                (sum / count) as i16
            })
            .collect();

        Ok(Self {
            samples,
            source_rate: decoded.sample_rate,
            channel_count: decoded.channel_count,
        })
    }

    /// Wrap samples that are already mono
    ///
    /// # Errors
    /// `InvalidSampleRate` if `source_rate` is zero.
    pub fn from_mono(samples: Vec<i16>, source_rate: u32) -> Result<Self> {
        if source_rate == 0 {
            return Err(PcmError::InvalidSampleRate { rate: 0 });
        }
        Ok(Self {
            samples,
            source_rate,
            channel_count: 1,
        })
    }

    /// Get the samples
    #[inline]
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Get the number of samples
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample rate of the decoded source in Hz
    #[inline]
    pub fn source_rate(&self) -> u32 {
        self.source_rate
    }

    /// Channel count of the source before down-mixing
    #[inline]
    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.source_rate as f64
    }

    /// Sample scaled to `[-1.0, 1.0)` for waveform display, 0.0 when out of range
    pub fn normalized(&self, idx: usize) -> f32 {
        self.samples
            .get(idx)
            .map_or(0.0, |&s| s as f32 / 32768.0)
    }

    /// Copy of the samples inside `selection`
    ///
    /// # Errors
    /// `InvalidSelection` if the selection is empty or exceeds the buffer.
    pub fn selected_samples(&self, selection: Selection) -> Result<Vec<i16>> {
        selection.validate(self.len())?;
        Ok(self.samples[selection.start..selection.end].to_vec())
    }

    /// Clamp a selection into this buffer, repairing it rather than emptying it
    pub fn clamp_selection(&self, selection: Selection) -> Selection {
        let len = self.len();
        if len == 0 {
            return Selection::default();
        }
        let end = selection.end.min(len).max(1);
        let start = selection.start.min(end - 1);
        Selection { start, end }
    }
}

// ============================================================================
// Selection Editing
// ============================================================================

/// Move the start marker, nudging the end marker when the two would cross
///
/// Never fails: values are clamped into `[0, len]` and the selection is repaired.
pub fn set_start(selection: &mut Selection, value: usize, len: usize) {
    if len == 0 {
        *selection = Selection::default();
        return;
    }
    let start = value.min(len - 1);
    selection.start = start;
    if selection.end <= start {
        selection.end = start + 1;
    }
    selection.end = selection.end.min(len);
}

/// Move the end marker, nudging the start marker when the two would cross
///
/// Never fails: values are clamped into `[0, len]` and the selection is repaired.
pub fn set_end(selection: &mut Selection, value: usize, len: usize) {
    if len == 0 {
        *selection = Selection::default();
        return;
    }
    let end = value.clamp(1, len);
    selection.end = end;
    if selection.start >= end {
        selection.start = end - 1;
    }
}

// ============================================================================
// Tests
// ============================================================================

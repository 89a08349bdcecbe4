//! Deterministic Resampling
//!
//! Converts a selection to the fixed export rate with linear interpolation.
//! Source positions are derived with integer arithmetic so identical inputs
//! always produce bit-identical output.

use crate::engine::buffer::{Selection, WaveformBuffer};
use crate::error::{PcmError, Result};

/// Rate required by the downstream playback hardware
pub const TARGET_SAMPLE_RATE: u32 = 17500;

/// Resample `samples` from `source_rate` to `target_rate`
///
/// Output length is `floor(len * target_rate / source_rate)`. Output index `i`
/// reads source position `i * source_rate / target_rate`, interpolating between
/// the two neighbouring samples (the right one clamped to the last sample).
/// Matching rates return the input unchanged.
///
/// # Errors
/// `InvalidSelection` when `samples` is empty or `source_rate` is zero.
pub fn resample(samples: &[i16], source_rate: u32, target_rate: u32) -> Result<Vec<i16>> {
    if samples.is_empty() || source_rate == 0 {
        return Err(PcmError::InvalidSelection {
            start: 0,
            end: samples.len(),
            len: samples.len(),
        });
    }
    if source_rate == target_rate {
        return Ok(samples.to_vec());
    }

    let source = source_rate as u64;
    let target = target_rate as u64;
    let last = samples.len() - 1;
    let output_len = (samples.len() as u64 * target / source) as usize;

    let output = (0..output_len as u64)
        .map(|i| {
            let pos = i * source;
            let idx0 = ((pos / target) as usize).min(last);
            let idx1 = (idx0 + 1).min(last);
            let frac = (pos % target) as f64 / target as f64;

            let s0 = samples[idx0] as f64;
            let s1 = samples[idx1] as f64;
            (s0 + (s1 - s0) * frac) as i16
        })
        .collect();

    Ok(output)
}

/// Resample the selected region of `buffer` to [`TARGET_SAMPLE_RATE`]
///
/// # Errors
/// `InvalidSelection` if `start >= end` or the selection exceeds the buffer.
pub fn resample_selection(buffer: &WaveformBuffer, selection: Selection) -> Result<Vec<i16>> {
    let selected = buffer.selected_samples(selection)?;
    resample(&selected, buffer.source_rate(), TARGET_SAMPLE_RATE)
}

/// Keep every other sample, starting with the first
///
/// The result has `ceil(len / 2)` samples.
pub fn speed_double(samples: &[i16]) -> Vec<i16> {
    samples.iter().step_by(2).copied().collect()
}

// ============================================================================
// Tests
// ============================================================================

//! Slicing
//!
//! Splits an export buffer into contiguous, gap-free segments. All slices
//! but the last share the same length; the last absorbs the remainder.

use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::{PcmError, Result};

/// Upper bound on the number of slices per export
pub const MAX_SLICES: usize = 100;

/// Extension written for every exported container
pub const OUTPUT_EXTENSION: &str = "wav";

/// Compute the sample ranges of `num_slices` slices over `len` samples
///
/// Slice `i < num_slices - 1` covers `[i * q, (i + 1) * q)` with
/// `q = len / num_slices`; the final slice runs to `len`.
///
/// # Errors
/// `InvalidSliceCount` unless `1 <= num_slices <= MAX_SLICES`.
pub fn slice_ranges(len: usize, num_slices: usize) -> Result<Vec<Range<usize>>> {
    if num_slices == 0 || num_slices > MAX_SLICES {
        return Err(PcmError::InvalidSliceCount {
            count: num_slices,
            max: MAX_SLICES,
        });
    }

    let per_slice = len / num_slices;
    Ok((0..num_slices)
        .map(|i| {
            let start = i * per_slice;
            let end = if i == num_slices - 1 {
                len
            } else {
                (i + 1) * per_slice
            };
            start..end
        })
        .collect())
}

/// Split `samples` into `num_slices` borrowed segments
///
/// # Errors
/// `InvalidSliceCount` unless `1 <= num_slices <= MAX_SLICES`.
pub fn slice(samples: &[i16], num_slices: usize) -> Result<Vec<&[i16]>> {
    Ok(slice_ranges(samples.len(), num_slices)?
        .into_iter()
        .map(|range| &samples[range])
        .collect())
}

/// Base path for slice files: `path` with a trailing `.wav` removed
pub fn slice_base(path: &Path) -> PathBuf {
    let is_wav = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case(OUTPUT_EXTENSION));
    if is_wav {
        path.with_extension("")
    } else {
        path.to_path_buf()
    }
}

/// File name of the 1-indexed slice `number`: `<base>-<number>.wav`
pub fn slice_path(base: &Path, number: usize) -> PathBuf {
    let base = slice_base(base);
    let mut name = base.file_name().unwrap_or_default().to_os_string();
    name.push(format!("-{}.{}", number, OUTPUT_EXTENSION));
    base.with_file_name(name)
}

// ============================================================================
// Tests
// ============================================================================

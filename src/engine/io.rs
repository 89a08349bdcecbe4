//! Audio file I/O for pcmtool
//!
//! Export writes a minimal canonical 44-byte-header WAV container (mono,
//! 16-bit PCM). Import reads WAV files through `hound` and hands back
//! per-channel 16-bit samples for the buffer model to down-mix.

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use hound::{SampleFormat, WavReader};
use log::info;

use crate::engine::buffer::DecodedAudio;
use crate::error::{PcmError, Result};

/// Size of the RIFF/fmt/data header written by [`encode_wav`]
pub const WAV_HEADER_LEN: usize = 44;

const FMT_CHUNK_LEN: u32 = 16;
const FORMAT_PCM: u16 = 1;
const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = CHANNELS * BITS_PER_SAMPLE / 8;

// ============================================================================
// Export
// ============================================================================

/// Serialize mono 16-bit samples into a WAV container
///
/// # Errors
/// * `ContainerTooLarge` - the payload does not fit the 32-bit size fields
/// * `InvalidSampleRate` - the byte rate does not fit its 32-bit field
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let byte_rate = sample_rate
        .checked_mul(BLOCK_ALIGN as u32)
        .ok_or(PcmError::InvalidSampleRate { rate: sample_rate })?;
    let data_bytes = samples.len() as u64 * BLOCK_ALIGN as u64;
    if data_bytes > (u32::MAX - 36) as u64 {
        return Err(PcmError::ContainerTooLarge { bytes: data_bytes });
    }
    let data_len = data_bytes as u32;
    let riff_len = 36 + data_len;

    let mut wav = Vec::with_capacity(WAV_HEADER_LEN + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&riff_len.to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    wav.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    wav.extend_from_slice(&CHANNELS.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&BLOCK_ALIGN.to_le_bytes());
    wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    for sample in samples {
        wav.extend_from_slice(&sample.to_le_bytes());
    }

    Ok(wav)
}

/// Encode and write one container to `path`
///
/// # Errors
/// * `ContainerTooLarge` - payload exceeds the format limits
/// * `WriteFailure` - the destination could not be written
pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let bytes = encode_wav(samples, sample_rate)?;
    fs::write(path, &bytes).map_err(|e| PcmError::WriteFailure {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(bytes)
}

// ============================================================================
// Import
// ============================================================================

/// Decode a WAV file into per-channel 16-bit samples
///
/// # Errors
/// * `FileNotFound` - the file does not exist
/// * `DecodeFailure` - not a readable WAV file
/// * `UnsupportedSourceFormat` - a sample format with no 16-bit mapping
pub fn import_wav(path: &Path) -> Result<DecodedAudio> {
    if !path.exists() {
        return Err(PcmError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let reader = WavReader::open(path).map_err(|e| PcmError::DecodeFailure {
        reason: format!("Failed to open WAV file {}: {}", path.display(), e),
        source: Some(e),
    })?;

    let decoded = decode_reader(reader)?;
    info!(
        "Imported {}: {} Hz, {} channel(s), {} frames",
        path.display(),
        decoded.sample_rate,
        decoded.channel_count,
        decoded.frames()
    );
    Ok(decoded)
}

/// Decode an in-memory WAV container
///
/// # Errors
/// Same as [`import_wav`], minus `FileNotFound`.
pub fn decode_wav_bytes(bytes: &[u8]) -> Result<DecodedAudio> {
    let reader = WavReader::new(Cursor::new(bytes)).map_err(|e| PcmError::DecodeFailure {
        reason: format!("Failed to parse WAV data: {}", e),
        source: Some(e),
    })?;
    decode_reader(reader)
}

fn decode_reader<R: Read>(reader: WavReader<R>) -> Result<DecodedAudio> {
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(PcmError::NoChannels);
    }
    if spec.sample_rate == 0 {
        return Err(PcmError::InvalidSampleRate { rate: 0 });
    }

    let interleaved = read_samples_as_i16(reader, spec.bits_per_sample, spec.sample_format)?;
    if interleaved.is_empty() {
        return Err(PcmError::EmptyAudio);
    }

    Ok(DecodedAudio::new(
        spec.sample_rate,
        deinterleave(&interleaved, spec.channels as usize),
    ))
}

/// Read samples from a WAV reader and convert to 16-bit
fn read_samples_as_i16<R: Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<i16>> {
    fn decode_err(bits: u16) -> impl Fn(hound::Error) -> PcmError {
        move |e| PcmError::DecodeFailure {
            reason: format!("Failed to read {}-bit samples: {}", bits, e),
            source: Some(e),
        }
    }

    match (sample_format, bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v * 32767.0).clamp(-32768.0, 32767.0) as i16))
            .collect::<std::result::Result<Vec<i16>, _>>()
            .map_err(decode_err(32)),
        // hound hands 8-bit PCM back already re-centred around zero
        (SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| (v as i16) << 8))
            .collect::<std::result::Result<Vec<i16>, _>>()
            .map_err(decode_err(8)),
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<i16>, _>>()
            .map_err(decode_err(16)),
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| (v >> 8) as i16))
            .collect::<std::result::Result<Vec<i16>, _>>()
            .map_err(decode_err(24)),
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| (v >> 16) as i16))
            .collect::<std::result::Result<Vec<i16>, _>>()
            .map_err(decode_err(32)),
        (format, bits) => Err(PcmError::UnsupportedSourceFormat {
            format: format!("{}-bit {:?} audio", bits, format),
        }),
    }
}

/// De-interleave samples from [L,R,L,R,...] to [[L,L,...], [R,R,...]]
///
/// A trailing partial frame is dropped.
fn deinterleave(samples: &[i16], channels: usize) -> Vec<Vec<i16>> {
    let frames = samples.len() / channels;
    let mut result = vec![Vec::with_capacity(frames); channels];

    for frame in samples.chunks_exact(channels) {
        for (ch, &sample) in frame.iter().enumerate() {
            result[ch].push(sample);
        }
    }

    result
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};
    use tempfile::tempdir;

    #[test]
    fn test_header_layout() {
        let bytes = encode_wav(&[1, -2], 17500).unwrap();
        assert_eq!(bytes.len(), WAV_HEADER_LEN + 4);

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 40);
        assert_eq!(&bytes[8..16], b"WAVEfmt ");
        assert_eq!(u32::from_le_bytes(bytes[16..20].try_into().unwrap()), 16);
        assert_eq!(u16::from_le_bytes(bytes[20..22].try_into().unwrap()), 1);
        assert_eq!(u16::from_le_bytes(bytes[22..24].try_into().unwrap()), 1);
        assert_eq!(u32::from_le_bytes(bytes[24..28].try_into().unwrap()), 17500);
        assert_eq!(u32::from_le_bytes(bytes[28..32].try_into().unwrap()), 35000);
        assert_eq!(u16::from_le_bytes(bytes[32..34].try_into().unwrap()), 2);
        assert_eq!(u16::from_le_bytes(bytes[34..36].try_into().unwrap()), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32::from_le_bytes(bytes[40..44].try_into().unwrap()), 4);
        assert_eq!(&bytes[44..], &[0x01, 0x00, 0xFE, 0xFF]);
    }

    #[test]
    fn test_rejects_rate_overflowing_byte_rate() {
        assert!(matches!(
            encode_wav(&[1, 2], 3_000_000_000),
            Err(PcmError::InvalidSampleRate { rate: 3_000_000_000 })
        ));

        let max = u32::MAX / 2;
        let bytes = encode_wav(&[1, 2], max).unwrap();
        assert_eq!(u32::from_le_bytes(bytes[28..32].try_into().unwrap()), max * 2);
    }

    #[test]
    fn test_empty_payload() {
        let bytes = encode_wav(&[], 17500).unwrap();
        assert_eq!(bytes.len(), WAV_HEADER_LEN);
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 36);
    }

    #[test]
    fn test_hound_parses_encoded_container() {
        let samples: Vec<i16> = (0..500).map(|i| (i * 61 % 4000 - 2000) as i16).collect();
        let bytes = encode_wav(&samples, 17500).unwrap();

        let mut reader = WavReader::new(Cursor::new(&bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 17500);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        let parsed: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(parsed, samples);
    }

    #[test]
    fn test_decode_bytes_roundtrip() {
        let bytes = encode_wav(&[10, 20, 30], 22050).unwrap();
        let decoded = decode_wav_bytes(&bytes).unwrap();
        assert_eq!(decoded.sample_rate, 22050);
        assert_eq!(decoded.channel_count, 1);
        assert_eq!(decoded.channels, vec![vec![10, 20, 30]]);
    }

    #[test]
    fn test_import_stereo_24bit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo24.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 24,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for (l, r) in [(256, -256), (8_388_607, -8_388_608)] {
            writer.write_sample(l).unwrap();
            writer.write_sample(r).unwrap();
        }
        writer.finalize().unwrap();

        let decoded = import_wav(&path).unwrap();
        assert_eq!(decoded.channel_count, 2);
        assert_eq!(decoded.channels[0], vec![1, 32767]);
        assert_eq!(decoded.channels[1], vec![-1, -32768]);
    }

    #[test]
    fn test_import_float() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("float.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for v in [0.0f32, 0.5, -2.0] {
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();

        let decoded = import_wav(&path).unwrap();
        assert_eq!(decoded.channels[0], vec![0, 16383, -32768]);
    }

    #[test]
    fn test_import_nonexistent_file() {
        match import_wav(Path::new("/nonexistent/path/audio.wav")) {
            Err(PcmError::FileNotFound { path }) => {
                assert!(path.display().to_string().contains("nonexistent"));
            }
            other => panic!("Expected FileNotFound error, got: {:?}", other),
        }
    }

    #[test]
    fn test_import_garbage_is_decode_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        fs::write(&path, b"definitely not a riff file").unwrap();
        assert!(matches!(
            import_wav(&path),
            Err(PcmError::DecodeFailure { .. })
        ));
    }

    #[test]
    fn test_write_failure_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.wav");
        match write_wav(&path, &[1, 2, 3], 17500) {
            Err(PcmError::WriteFailure { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("Expected WriteFailure, got: {:?}", other),
        }
    }
}

//! Audio Engine Module
//!
//! Core waveform editing engine including:
//! - Waveform buffer and selection model
//! - Real-time preview stream and its transport state
//! - Fixed-rate resampling, slicing and export
//! - WAV container encoding and decoding

pub mod buffer;
pub mod export;
pub mod io;
pub mod preview;
pub mod resample;
pub mod session;
pub mod slice;
pub mod transport;
pub mod view;

pub use buffer::{DecodedAudio, Selection, WaveformBuffer};
pub use export::{ExportJob, ExportReport, ExportSettings};
pub use io::{decode_wav_bytes, encode_wav, import_wav, write_wav};
pub use preview::{AudioProducer, Mixer, OfflineMixer, PreviewSession, StreamStatus};
pub use resample::{resample, speed_double, TARGET_SAMPLE_RATE};
pub use session::EditorSession;
pub use slice::{slice, slice_ranges, MAX_SLICES};
pub use transport::{PreviewHandle, PreviewState};
pub use view::{ZoomAnchor, ZoomView};

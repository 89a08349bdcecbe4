//! pcmtool - Waveform Preview and Export Engine
//!
//! pcmtool edits one mono 16-bit waveform at a time:
//! 1. Selection - a half-open range chosen with start and end markers
//! 2. Preview - the selection streamed to a real-time mixer, optionally looped
//! 3. Export - the selection resampled to 17500 Hz and written as WAV files
//!
//! # Architecture
//!
//! The editing context owns the buffer and hands value snapshots to the
//! real-time side. The two share nothing but a pair of atomics:
//! - `engine::preview`: the lock-free producer pulled by the mixer
//! - `engine::transport`: its state machine and playhead position
//! - `engine::session`: the editor that owns buffer, selection and previews

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;

pub use error::{PcmError, Result};

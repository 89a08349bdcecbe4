//! Preview Playback Stream
//!
//! A pull-based producer that plays a value snapshot of the selection at an
//! arbitrary output rate using linear interpolation, optionally looping.
//!
//! `produce` never allocates, locks, or logs. The only state it shares with
//! the editing context is the [`TransportShared`] atomics.

use std::sync::Arc;

use log::debug;
use uuid::Uuid;

use crate::engine::buffer::{Selection, WaveformBuffer};
use crate::engine::transport::{PreviewHandle, TransportShared};
use crate::error::Result;

/// Result of one `produce` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// More audio will follow
    Playing,
    /// The stream is done; the block was padded with silence
    Finished,
}

/// Real-time audio producer pulled by a mixer
///
/// The mixer calls `setup` once with its output rate, then `produce` once
/// per block until the status is `Finished`.
pub trait AudioProducer: Send {
    /// Prepare for pulling at `output_rate`
    fn setup(&mut self, output_rate: u32);

    /// Fill `out` completely
    fn produce(&mut self, out: &mut [i16]) -> StreamStatus;

    /// Check whether the producer has reached a terminal state
    fn is_finished(&self) -> bool;
}

/// The external real-time mixer a preview registers with
pub trait Mixer {
    /// Take ownership of a producer; the mixer calls `setup` before pulling
    fn add_stream(&mut self, stream: Box<dyn AudioProducer>);
}

/// A preview of one selection
///
/// Holds its own copy of the selected samples so nothing the editor does
/// afterwards can be observed by the producer.
#[derive(Debug)]
pub struct PreviewSession {
    id: Uuid,
    snapshot: Box<[i16]>,
    /// Absolute index of `snapshot[0]` in the source buffer
    origin: usize,
    source_rate: u32,
    looping: bool,
    cursor: f64,
    step: f64,
    shared: Arc<TransportShared>,
}

impl PreviewSession {
    /// Snapshot `selection` of `buffer` into a new session
    ///
    /// # Errors
    /// `InvalidSelection` if the selection is empty or exceeds the buffer.
    pub fn new(buffer: &WaveformBuffer, selection: Selection, looping: bool) -> Result<Self> {
        let samples = buffer.selected_samples(selection)?;
        Ok(Self::from_samples(
            samples,
            selection.start,
            buffer.source_rate(),
            looping,
        ))
    }

    /// Build a session over already-copied samples
    ///
    /// `origin` is the absolute index of the first sample, used only for
    /// position reporting. An empty snapshot plays silence and finishes.
    pub fn from_samples(samples: Vec<i16>, origin: usize, source_rate: u32, looping: bool) -> Self {
        let snapshot = samples.into_boxed_slice();
        let id = Uuid::new_v4();
        debug!(
            "[PREVIEW {}] Created: {} samples at {} Hz from {}, loop={}",
            id,
            snapshot.len(),
            source_rate,
            origin,
            looping
        );
        Self {
            id,
            snapshot,
            origin,
            source_rate,
            looping,
            cursor: 0.0,
            step: 1.0,
            shared: Arc::new(TransportShared::new()),
        }
    }

    /// Editing-context handle observing this session
    pub fn handle(&self) -> PreviewHandle {
        PreviewHandle::new(self.id, Arc::clone(&self.shared))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Fractional read position in source samples, relative to the snapshot
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// Source samples consumed per output sample
    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Number of samples in the snapshot
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Absolute source index of the next output sample
    fn current_index(&self) -> usize {
        let span = self.snapshot.len();
        let mut offset = self.cursor as usize;
        if self.looping && span > 0 {
            offset %= span;
        }
        self.origin + offset.min(span)
    }

    fn finish_block(&mut self, out: &mut [i16]) -> StreamStatus {
        out.fill(0);
        self.shared.finish();
        self.shared.clear_position();
        StreamStatus::Finished
    }
}

impl AudioProducer for PreviewSession {
    fn setup(&mut self, output_rate: u32) {
        self.step = if output_rate > 0 && self.source_rate > 0 {
            self.source_rate as f64 / output_rate as f64
        } else {
            1.0
        };
        self.cursor = 0.0;
    }

    fn produce(&mut self, out: &mut [i16]) -> StreamStatus {
        if self.shared.is_finished() {
            out.fill(0);
            return StreamStatus::Finished;
        }
        self.shared.begin();

        if self.snapshot.is_empty() {
            return self.finish_block(out);
        }

        // The snapshot is the selection, so it starts at 0 and ends at its length
        let end = self.snapshot.len();
        let span = end as f64;
        let last = end - 1;

        for i in 0..out.len() {
            let mut idx0 = self.cursor as usize;
            if idx0 >= end {
                if self.looping {
                    // One subtraction of `span` unless the step outran a whole loop
                    self.cursor %= span;
                    idx0 = self.cursor as usize;
                } else {
                    return self.finish_block(&mut out[i..]);
                }
            }

            let mut idx1 = idx0 + 1;
            if idx1 >= end {
                idx1 = if self.looping { 0 } else { last };
            }

            let s0 = self.snapshot[idx0.min(last)] as f64;
            let s1 = self.snapshot[idx1.min(last)] as f64;
            let frac = self.cursor - self.cursor.floor();
            out[i] = (s0 + (s1 - s0) * frac) as i16;

            self.cursor += self.step;
        }

        self.shared.publish_position(self.current_index());
        StreamStatus::Playing
    }

    fn is_finished(&self) -> bool {
        self.shared.is_finished()
    }
}

// ============================================================================
// Offline Mixer
// ============================================================================

/// Synchronous mixer that pulls producers into a buffer
///
/// Stands in for the device callback when rendering a preview to a file.
/// Streams are summed with saturation and dropped once finished.
pub struct OfflineMixer {
    output_rate: u32,
    block_size: usize,
    streams: Vec<Box<dyn AudioProducer>>,
    scratch: Vec<i16>,
}

impl OfflineMixer {
    /// Create a mixer pulling `block_size` samples per stream per block
    pub fn new(output_rate: u32, block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            output_rate,
            block_size,
            streams: Vec::new(),
            scratch: vec![0; block_size],
        }
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Number of streams still registered
    pub fn active_streams(&self) -> usize {
        self.streams.len()
    }

    /// Mix one block into `out` (at most `block_size` samples are used)
    pub fn render_block(&mut self, out: &mut [i16]) {
        let n = out.len().min(self.block_size);
        out.fill(0);
        let scratch = &mut self.scratch[..n];
        for stream in self.streams.iter_mut() {
            stream.produce(scratch);
            for (dst, &src) in out[..n].iter_mut().zip(scratch.iter()) {
                *dst = dst.saturating_add(src);
            }
        }
        self.streams.retain(|s| !s.is_finished());
    }

    /// Render `frames` samples block by block
    pub fn render(&mut self, frames: usize) -> Vec<i16> {
        let mut output = vec![0; frames];
        for chunk in output.chunks_mut(self.block_size) {
            self.render_block(chunk);
        }
        output
    }
}

impl Mixer for OfflineMixer {
    fn add_stream(&mut self, mut stream: Box<dyn AudioProducer>) {
        stream.setup(self.output_rate);
        self.streams.push(stream);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::transport::PreviewState;

    fn session(samples: Vec<i16>, looping: bool, source_rate: u32, output_rate: u32) -> PreviewSession {
        let mut session = PreviewSession::from_samples(samples, 0, source_rate, looping);
        session.setup(output_rate);
        session
    }

    #[test]
    fn test_setup_step() {
        let s = session(vec![0; 4], false, 44100, 22050);
        assert_eq!(s.step(), 2.0);
        assert_eq!(s.cursor(), 0.0);

        let s = session(vec![0; 4], false, 44100, 0);
        assert_eq!(s.step(), 1.0);
    }

    #[test]
    fn test_unit_step_plays_samples_verbatim() {
        let mut s = session(vec![10, 20, 30], false, 8000, 8000);
        let mut out = [0i16; 3];
        assert_eq!(s.produce(&mut out), StreamStatus::Playing);
        assert_eq!(out, [10, 20, 30]);
    }

    #[test]
    fn test_half_step_interpolates() {
        let mut s = session(vec![0, 1000, 2000], false, 4000, 8000);
        let mut out = [0i16; 6];
        s.produce(&mut out);
        // Last sample interpolates toward the clamped end, i.e. holds it
        assert_eq!(out, [0, 500, 1000, 1500, 2000, 2000]);
    }

    #[test]
    fn test_last_sample_emitted_before_silence() {
        let mut s = session(vec![1234], false, 8000, 8000);
        let mut out = [7i16; 4];
        assert_eq!(s.produce(&mut out), StreamStatus::Finished);
        assert_eq!(out, [1234, 0, 0, 0]);
        assert!(s.is_finished());
        assert_eq!(s.handle().state(), PreviewState::Finished);
    }

    #[test]
    fn test_finished_stays_silent() {
        let mut s = session(vec![5, 6], false, 8000, 8000);
        let mut out = [0i16; 8];
        s.produce(&mut out);
        assert!(s.is_finished());

        let mut out = [9i16; 8];
        assert_eq!(s.produce(&mut out), StreamStatus::Finished);
        assert_eq!(out, [0; 8]);
        assert_eq!(s.handle().state(), PreviewState::Finished);
    }

    #[test]
    fn test_empty_snapshot_is_silent() {
        let mut s = session(vec![], true, 8000, 8000);
        let mut out = [3i16; 4];
        assert_eq!(s.produce(&mut out), StreamStatus::Finished);
        assert_eq!(out, [0; 4]);
        assert!(s.is_finished());
    }

    #[test]
    fn test_loop_wraps_and_interpolates_to_start() {
        let mut s = session(vec![0, 100], true, 4000, 8000);
        let mut out = [0i16; 8];
        assert_eq!(s.produce(&mut out), StreamStatus::Playing);
        assert_eq!(out, [0, 50, 100, 50, 0, 50, 100, 50]);
    }

    #[test]
    fn test_loop_with_step_larger_than_selection() {
        let mut s = session(vec![-300, 300], true, 48000, 8000);
        let mut out = [0i16; 256];
        for _ in 0..100 {
            assert_eq!(s.produce(&mut out), StreamStatus::Playing);
            assert!(out.iter().all(|&v| (-300..=300).contains(&v)));
            assert!(s.cursor() < 2.0 + s.step());
        }
    }

    #[test]
    fn test_stop_yields_silence() {
        let mut s = session(vec![100; 64], true, 8000, 8000);
        let handle = s.handle();
        let mut out = [0i16; 16];
        s.produce(&mut out);
        assert_eq!(handle.state(), PreviewState::Playing);

        handle.stop();
        let mut out = [1i16; 16];
        assert_eq!(s.produce(&mut out), StreamStatus::Finished);
        assert_eq!(out, [0; 16]);
        assert_eq!(handle.state(), PreviewState::Stopped);
    }

    #[test]
    fn test_stop_from_other_thread() {
        let mut s = session(vec![100; 64], true, 8000, 8000);
        let handle = s.handle();

        let producer = std::thread::spawn(move || {
            let mut out = [0i16; 32];
            let mut blocks = 0usize;
            while s.produce(&mut out) == StreamStatus::Playing {
                blocks += 1;
                std::thread::yield_now();
            }
            (blocks, out)
        });

        while handle.state() == PreviewState::Created {
            std::thread::yield_now();
        }
        handle.stop();

        let (blocks, out) = producer.join().unwrap();
        assert!(blocks >= 1);
        assert_eq!(out, [0; 32]);
        assert_eq!(handle.state(), PreviewState::Stopped);
        assert_eq!(handle.position(), None);
    }

    #[test]
    fn test_position_is_absolute() {
        let buffer = WaveformBuffer::from_mono((0..100).collect(), 8000).unwrap();
        let mut s = PreviewSession::new(&buffer, Selection::new(40, 60), true).unwrap();
        s.setup(8000);
        let handle = s.handle();
        assert_eq!(handle.position(), None);

        let mut out = [0i16; 5];
        s.produce(&mut out);
        assert_eq!(out, [40, 41, 42, 43, 44]);
        assert_eq!(handle.position(), Some(45));

        let mut out = [0i16; 20];
        s.produce(&mut out);
        assert_eq!(handle.position(), Some(45));
    }

    #[test]
    fn test_offline_mixer_drops_finished_streams() {
        let mut mixer = OfflineMixer::new(8000, 4);
        mixer.add_stream(Box::new(PreviewSession::from_samples(
            vec![1, 2, 3, 4, 5, 6],
            0,
            8000,
            false,
        )));
        assert_eq!(mixer.active_streams(), 1);

        let rendered = mixer.render(12);
        assert_eq!(rendered, vec![1, 2, 3, 4, 5, 6, 0, 0, 0, 0, 0, 0]);
        assert_eq!(mixer.active_streams(), 0);
    }

    #[test]
    fn test_offline_mixer_saturates() {
        let mut mixer = OfflineMixer::new(8000, 8);
        for _ in 0..2 {
            mixer.add_stream(Box::new(PreviewSession::from_samples(
                vec![30000; 4],
                0,
                8000,
                true,
            )));
        }
        let rendered = mixer.render(4);
        assert_eq!(rendered, vec![i16::MAX; 4]);
    }
}

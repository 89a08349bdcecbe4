//! Preview Transport State Machine
//!
//! Tracks the lifecycle of one preview session and the last playback
//! position, shared between the editing context and the real-time producer.
//!
//! ```text
//! CREATED -> PLAYING -> FINISHED   (non-looping end reached)
//!    |          |
//!    +----------+-----> STOPPED    (external stop)
//! ```
//!
//! Both values live in single-word atomics. Transitions use compare-and-swap,
//! so a terminal state can never be left no matter which side races.

use std::fmt;
use std::sync::atomic::{AtomicI64, AtomicU8, Ordering};
use std::sync::Arc;

use log::debug;
use uuid::Uuid;

/// Lifecycle of a preview session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PreviewState {
    /// Session built, producer not yet pulled
    #[default]
    Created = 0,
    /// Producer is being pulled
    Playing = 1,
    /// Non-looping playback ran past the selection end
    Finished = 2,
    /// Stopped from the editing context
    Stopped = 3,
}

impl PreviewState {
    /// Finished and Stopped are terminal
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, PreviewState::Finished | PreviewState::Stopped)
    }
}

impl From<u8> for PreviewState {
    fn from(value: u8) -> Self {
        match value {
            1 => PreviewState::Playing,
            2 => PreviewState::Finished,
            3 => PreviewState::Stopped,
            _ => PreviewState::Created,
        }
    }
}

impl fmt::Display for PreviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewState::Created => write!(f, "Created"),
            PreviewState::Playing => write!(f, "Playing"),
            PreviewState::Finished => write!(f, "Finished"),
            PreviewState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Sentinel stored in the position word when nothing has been published
const NO_POSITION: i64 = -1;

/// Atomic state shared by a session and its handles
#[derive(Debug)]
pub struct TransportShared {
    state: AtomicU8,
    position: AtomicI64,
}

impl Default for TransportShared {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportShared {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(PreviewState::Created as u8),
            position: AtomicI64::new(NO_POSITION),
        }
    }

    /// Current lifecycle state
    #[inline]
    pub fn state(&self) -> PreviewState {
        PreviewState::from(self.state.load(Ordering::Acquire))
    }

    /// True once the session reached Finished or Stopped
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// CREATED -> PLAYING. Returns false if the session was not in CREATED.
    #[inline]
    pub(crate) fn begin(&self) -> bool {
        self.state
            .compare_exchange(
                PreviewState::Created as u8,
                PreviewState::Playing as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Move to a terminal state unless already in one
    ///
    /// Returns true only for the call that performed the transition.
    #[inline]
    fn terminate(&self, target: PreviewState) -> bool {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if PreviewState::from(current).is_terminal() {
                    None
                } else {
                    Some(target as u8)
                }
            })
            .is_ok()
    }

    /// Producer side: the non-looping end was reached
    #[inline]
    pub(crate) fn finish(&self) -> bool {
        self.terminate(PreviewState::Finished)
    }

    /// Editing side: stop the session
    pub fn stop(&self) -> bool {
        self.terminate(PreviewState::Stopped)
    }

    /// Last published absolute playback index
    #[inline]
    pub fn position(&self) -> Option<usize> {
        let pos = self.position.load(Ordering::Relaxed);
        (pos >= 0).then_some(pos as usize)
    }

    #[inline]
    pub(crate) fn publish_position(&self, pos: usize) {
        self.position.store(pos as i64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn clear_position(&self) {
        self.position.store(NO_POSITION, Ordering::Relaxed);
    }
}

/// Editing-context view of a running preview
///
/// Cloning is cheap; all clones observe the same session.
#[derive(Debug, Clone)]
pub struct PreviewHandle {
    id: Uuid,
    shared: Arc<TransportShared>,
}

impl PreviewHandle {
    pub(crate) fn new(id: Uuid, shared: Arc<TransportShared>) -> Self {
        Self { id, shared }
    }

    /// Session identifier, used in logs
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> PreviewState {
        self.shared.state()
    }

    /// True while the session has not reached a terminal state
    pub fn is_playing(&self) -> bool {
        !self.shared.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.shared.is_finished()
    }

    /// Best-effort playback index, up to one block stale
    pub fn position(&self) -> Option<usize> {
        if self.shared.is_finished() {
            None
        } else {
            self.shared.position()
        }
    }

    /// Stop the session; the producer yields silence from its next pull
    pub fn stop(&self) {
        if self.shared.stop() {
            debug!("[PREVIEW {}] Stopped", self.id);
        } else {
            debug!("[PREVIEW {}] Already {}", self.id, self.shared.state());
        }
        self.shared.clear_position();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let shared = TransportShared::new();
        assert_eq!(shared.state(), PreviewState::Created);
        assert!(!shared.is_finished());
        assert_eq!(shared.position(), None);
    }

    #[test]
    fn test_begin_then_finish() {
        let shared = TransportShared::new();
        assert!(shared.begin());
        assert!(!shared.begin());
        assert_eq!(shared.state(), PreviewState::Playing);

        assert!(shared.finish());
        assert!(!shared.finish());
        assert_eq!(shared.state(), PreviewState::Finished);
    }

    #[test]
    fn test_terminal_states_are_sticky() {
        let shared = TransportShared::new();
        shared.begin();
        shared.finish();
        assert!(!shared.stop());
        assert_eq!(shared.state(), PreviewState::Finished);

        let shared = TransportShared::new();
        assert!(shared.stop());
        assert!(!shared.begin());
        assert!(!shared.finish());
        assert_eq!(shared.state(), PreviewState::Stopped);
    }

    #[test]
    fn test_position_publish_and_clear() {
        let shared = TransportShared::new();
        shared.publish_position(1234);
        assert_eq!(shared.position(), Some(1234));
        shared.clear_position();
        assert_eq!(shared.position(), None);
    }

    #[test]
    fn test_handle_stop_hides_position() {
        let shared = Arc::new(TransportShared::new());
        let handle = PreviewHandle::new(Uuid::new_v4(), Arc::clone(&shared));
        shared.begin();
        shared.publish_position(42);
        assert!(handle.is_playing());
        assert_eq!(handle.position(), Some(42));

        handle.stop();
        assert!(handle.is_finished());
        assert_eq!(handle.state(), PreviewState::Stopped);
        assert_eq!(handle.position(), None);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PreviewState::Playing.to_string(), "Playing");
        assert_eq!(PreviewState::from(3), PreviewState::Stopped);
        assert_eq!(PreviewState::from(200), PreviewState::Created);
    }
}

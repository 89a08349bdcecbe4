//! Zoom View
//!
//! Computes which part of the waveform is visible when zoomed in on one of
//! the selection markers.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::engine::buffer::Selection;

/// Window width used when zoom is reset
pub const DEFAULT_ZOOM_WINDOW: usize = 1000;

/// Narrowest zoom window
pub const MIN_ZOOM_WINDOW: usize = 10;

/// Widest zoom window; no container holds more samples
pub const MAX_ZOOM_WINDOW: usize = u32::MAX as usize;

/// Marker the zoom window is centred on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ZoomAnchor {
    #[default]
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomView {
    pub enabled: bool,
    pub anchor: ZoomAnchor,
    window_samples: usize,
}

impl Default for ZoomView {
    fn default() -> Self {
        Self {
            enabled: false,
            anchor: ZoomAnchor::Start,
            window_samples: DEFAULT_ZOOM_WINDOW,
        }
    }
}

impl ZoomView {
    pub fn with_window(window_samples: usize) -> Self {
        Self {
            window_samples: window_samples.clamp(MIN_ZOOM_WINDOW, MAX_ZOOM_WINDOW),
            ..Self::default()
        }
    }

    pub fn window_samples(&self) -> usize {
        self.window_samples
    }

    /// Halve the window, never below [`MIN_ZOOM_WINDOW`]
    pub fn zoom_in(&mut self) {
        self.window_samples = (self.window_samples / 2).max(MIN_ZOOM_WINDOW);
    }

    /// Double the window, never beyond the buffer
    pub fn zoom_out(&mut self, buffer_len: usize) {
        let limit = buffer_len.clamp(MIN_ZOOM_WINDOW, MAX_ZOOM_WINDOW);
        self.window_samples = self.window_samples.saturating_mul(2).min(limit);
    }

    pub fn reset(&mut self) {
        self.window_samples = DEFAULT_ZOOM_WINDOW;
    }

    /// Visible sample range for a buffer of `len` samples
    ///
    /// Centred on the anchored marker and shifted back inside the buffer
    /// when it would overflow either edge. The whole buffer when disabled.
    pub fn visible_range(&self, len: usize, selection: Selection) -> Range<usize> {
        if !self.enabled || len == 0 {
            return 0..len;
        }

        let center = match self.anchor {
            ZoomAnchor::Start => selection.start,
            ZoomAnchor::End => selection.end,
        } as i64;
        let half = (self.window_samples / 2) as i64;
        let len = len as i64;

        let mut start = center - half;
        let mut end = center + half;
        if start < 0 {
            end -= start;
            start = 0;
        }
        if end > len {
            start = (start - (end - len)).max(0);
            end = len;
        }

        start as usize..end as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(anchor: ZoomAnchor) -> ZoomView {
        ZoomView {
            enabled: true,
            anchor,
            ..ZoomView::default()
        }
    }

    #[test]
    fn test_disabled_shows_everything() {
        let view = ZoomView::default();
        assert_eq!(view.visible_range(5000, Selection::new(100, 200)), 0..5000);
    }

    #[test]
    fn test_centred_on_anchor() {
        let view = enabled(ZoomAnchor::Start);
        assert_eq!(view.visible_range(10_000, Selection::new(4000, 9000)), 3500..4500);

        let view = enabled(ZoomAnchor::End);
        assert_eq!(view.visible_range(10_000, Selection::new(4000, 9000)), 8500..9500);
    }

    #[test]
    fn test_shifted_inside_edges() {
        let view = enabled(ZoomAnchor::Start);
        assert_eq!(view.visible_range(10_000, Selection::new(100, 200)), 0..1000);

        let view = enabled(ZoomAnchor::End);
        assert_eq!(view.visible_range(10_000, Selection::new(100, 9900)), 9000..10_000);
    }

    #[test]
    fn test_window_larger_than_buffer() {
        let view = enabled(ZoomAnchor::Start);
        assert_eq!(view.visible_range(300, Selection::new(150, 300)), 0..300);
    }

    #[test]
    fn test_oversized_window_is_clamped() {
        let mut view = ZoomView::with_window(usize::MAX);
        assert_eq!(view.window_samples(), MAX_ZOOM_WINDOW);

        view.zoom_out(100);
        assert_eq!(view.window_samples(), 100);

        let mut view = ZoomView::with_window(MAX_ZOOM_WINDOW);
        view.zoom_out(usize::MAX);
        assert_eq!(view.window_samples(), MAX_ZOOM_WINDOW);
    }

    #[test]
    fn test_zoom_steps() {
        let mut view = ZoomView::default();
        for _ in 0..10 {
            view.zoom_in();
        }
        assert_eq!(view.window_samples(), MIN_ZOOM_WINDOW);

        view.zoom_out(15);
        assert_eq!(view.window_samples(), 15);

        view.reset();
        assert_eq!(view.window_samples(), DEFAULT_ZOOM_WINDOW);
        view.zoom_out(1_000_000);
        assert_eq!(view.window_samples(), 2000);
    }
}

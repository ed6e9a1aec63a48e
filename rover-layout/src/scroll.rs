//! Scroll State
//!
//! Vertical scroll position over a laid-out screen. The visible window is
//! `[offset, offset + viewport_height]` and never leaves
//! `[0, max(0, bottom_limit - viewport_height)]`.

use std::cell::Cell;

use tracing::trace;

use crate::engine::ScreenLayout;

/// An action on the scroll position, produced by gesture handling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollAction {
    /// Move the window by a delta (positive = further down the content).
    ScrollBy(f32),
    /// Jump the window top to an absolute offset.
    ScrollTo(f32),
}

/// Scroll position for one screen.
///
/// `max` and `viewport_height` are refreshed from each new layout through
/// [`ScrollState::sync`], which takes `&self`.
#[derive(Debug)]
pub struct ScrollState {
    /// Current window top (0 = top of content).
    offset: f32,
    /// Maximum offset (set from the layout).
    max: Cell<f32>,
    viewport_height: Cell<f32>,
}

impl ScrollState {
    pub fn new() -> Self {
        Self {
            offset: 0.0,
            max: Cell::new(0.0),
            viewport_height: Cell::new(0.0),
        }
    }

    pub fn for_layout(layout: &ScreenLayout) -> Self {
        let state = Self::new();
        state.sync(layout);
        state
    }

    pub fn offset(&self) -> f32 {
        self.offset.clamp(0.0, self.max.get())
    }

    pub fn max(&self) -> f32 {
        self.max.get()
    }

    /// The visible window as `(top, bottom)`.
    pub fn window(&self) -> (f32, f32) {
        let top = self.offset();
        (top, top + self.viewport_height.get())
    }

    /// Sync limits from a fresh layout.
    pub fn sync(&self, layout: &ScreenLayout) {
        self.max.set(layout.max_scroll());
        self.viewport_height.set(layout.viewport.height);
    }

    /// Apply a scroll action. Returns the distance actually traveled.
    pub fn apply(&mut self, action: ScrollAction) -> f32 {
        match action {
            ScrollAction::ScrollBy(dy) => self.scroll_by(dy),
            ScrollAction::ScrollTo(y) => self.scroll_to(y),
        }
    }

    /// Move the window by `dy`, clamped to the content.
    ///
    /// Returns the signed distance traveled, which is smaller in magnitude
    /// than `dy` when the move hits either end.
    pub fn scroll_by(&mut self, dy: f32) -> f32 {
        let before = self.offset();
        let after = (before + dy).clamp(0.0, self.max.get());
        self.offset = after;
        let traveled = after - before;
        if traveled != dy {
            trace!(requested = dy, traveled, "scroll clamped");
        }
        traveled
    }

    pub fn scroll_to(&mut self, y: f32) -> f32 {
        let before = self.offset();
        self.scroll_by(y - before)
    }
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Size;

    fn layout(bottom_limit: f32, viewport_height: f32) -> ScreenLayout {
        ScreenLayout {
            viewport: Size::new(100.0, viewport_height),
            rows: Vec::new(),
            frames: Vec::new(),
            bottom_limit,
        }
    }

    #[test]
    fn scroll_by_clamps_and_reports_travel() {
        let mut state = ScrollState::for_layout(&layout(300.0, 200.0));

        assert_eq!(state.scroll_by(50.0), 50.0);
        assert_eq!(state.offset(), 50.0);

        // over-scroll past the end
        assert_eq!(state.scroll_by(200.0), 50.0);
        assert_eq!(state.offset(), 100.0);

        // back past the top
        assert_eq!(state.scroll_by(-300.0), -100.0);
        assert_eq!(state.offset(), 0.0);
    }

    #[test]
    fn short_content_never_scrolls() {
        let mut state = ScrollState::for_layout(&layout(150.0, 200.0));
        assert_eq!(state.max(), 0.0);
        assert_eq!(state.scroll_by(40.0), 0.0);
        assert_eq!(state.window(), (0.0, 200.0));
    }

    #[test]
    fn arbitrary_deltas_stay_in_bounds() {
        let mut state = ScrollState::for_layout(&layout(1000.0, 250.0));
        let deltas = [120.0, -30.0, 900.0, 5.0, -2000.0, 333.3, 400.0, -0.5];
        let mut requested = 0.0f32;
        let mut traveled = 0.0f32;
        for dy in deltas {
            let moved = state.apply(ScrollAction::ScrollBy(dy));
            assert!(moved.abs() <= dy.abs() + 1e-3);
            requested += dy.abs();
            traveled += moved.abs();
            assert!((0.0..=750.0).contains(&state.offset()));
        }
        assert!(traveled <= requested + 1e-2);
    }

    #[test]
    fn shrinking_content_reclamps() {
        let mut state = ScrollState::for_layout(&layout(1000.0, 100.0));
        state.scroll_to(800.0);
        state.sync(&layout(300.0, 100.0));
        assert_eq!(state.offset(), 200.0);
        assert_eq!(state.scroll_by(-50.0), -50.0);
    }
}

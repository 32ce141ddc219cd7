use crate::crop::{compute_selection, Point, Rect};

/// Selections narrower or shorter than this many display pixels are
/// treated as a click rather than a crop.
pub const DEFAULT_MIN_SELECTION_SIZE: f64 = 2.0;

/// Where the drag gesture currently stands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionState {
    /// No gesture yet on the current image.
    Idle,
    /// Pointer is down; `rect` follows the pointer.
    Selecting {
        /// Where the pointer went down.
        start: Point,
        /// Rectangle from `start` to the last pointer position.
        rect: Rect,
    },
    /// Pointer was released; `rect` is the final selection.
    Committed {
        /// Final selection, possibly too small to crop.
        rect: Rect,
    },
}

/// Result of finishing a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionOutcome {
    /// The selection is large enough to crop.
    Crop(Rect),
    /// The selection was below the minimum size; any cropped output should
    /// be cleared.
    Empty,
}

/// Drag-to-select state machine over the displayed image.
///
/// All points are in display space and are clamped to the displayed image
/// before use.
#[derive(Debug, Clone)]
pub struct SelectionSession {
    display_width: f64,
    display_height: f64,
    min_size: f64,
    state: SelectionState,
}

impl SelectionSession {
    /// Start an idle session for an image laid out at the given size.
    pub fn new(display_width: f64, display_height: f64) -> Self {
        Self {
            display_width,
            display_height,
            min_size: DEFAULT_MIN_SELECTION_SIZE,
            state: SelectionState::Idle,
        }
    }

    /// Override the minimum committed selection size (default: 2px).
    pub fn with_min_size(mut self, min_size: f64) -> Self {
        self.min_size = min_size;
        self
    }

    /// Update the displayed size, e.g. after a layout change.
    pub fn set_display_size(&mut self, width: f64, height: f64) {
        self.display_width = width;
        self.display_height = height;
    }

    /// Displayed width and height.
    pub fn display_size(&self) -> (f64, f64) {
        (self.display_width, self.display_height)
    }

    /// Current state.
    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// `true` while the pointer is down.
    pub fn is_selecting(&self) -> bool {
        matches!(self.state, SelectionState::Selecting { .. })
    }

    /// Rectangle to draw as the overlay, if any.
    pub fn selection(&self) -> Option<Rect> {
        match self.state {
            SelectionState::Idle => None,
            SelectionState::Selecting { rect, .. } | SelectionState::Committed { rect } => Some(rect),
        }
    }

    fn has_display(&self) -> bool {
        self.display_width > 0.0 && self.display_height > 0.0
    }

    fn clamp(&self, point: Point) -> Point {
        point.clamped(self.display_width, self.display_height)
    }

    /// Begin a new selection. Returns `false` when the image is not laid
    /// out (zero display size) and the press is ignored.
    pub fn pointer_down(&mut self, point: Point) -> bool {
        if !self.has_display() {
            return false;
        }
        let start = self.clamp(point);
        self.state = SelectionState::Selecting {
            start,
            rect: Rect::new(start.x, start.y, 0.0, 0.0),
        };
        true
    }

    /// Follow the pointer. Returns the updated rectangle, or `None` when no
    /// drag is in progress.
    pub fn pointer_move(&mut self, point: Point) -> Option<Rect> {
        let SelectionState::Selecting { start, .. } = self.state else {
            return None;
        };
        let rect = compute_selection(start, self.clamp(point));
        self.state = SelectionState::Selecting { start, rect };
        Some(rect)
    }

    /// Finish the drag on pointer up, cancel, or leave.
    ///
    /// `point` is `None` when the end event carried no usable position; the
    /// selection then collapses onto the start point. Returns `None` when no
    /// drag was in progress.
    pub fn pointer_up(&mut self, point: Option<Point>) -> Option<SelectionOutcome> {
        let SelectionState::Selecting { start, .. } = self.state else {
            return None;
        };
        let end = point.map(|p| self.clamp(p)).unwrap_or(start);
        let rect = compute_selection(start, end);
        self.state = SelectionState::Committed { rect };

        if rect.width < self.min_size || rect.height < self.min_size {
            log::debug!("selection {rect:?} below {}px, no crop", self.min_size);
            return Some(SelectionOutcome::Empty);
        }
        Some(SelectionOutcome::Crop(rect))
    }

    /// Drop any selection, e.g. when a new image is chosen.
    pub fn reset(&mut self) {
        self.state = SelectionState::Idle;
    }
}

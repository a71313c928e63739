//! Board DragDrop Utilities
//!
//! Framework-free drag-and-drop pieces for the kanban board.
//! Uses a movement threshold to distinguish click from drag, and the
//! vertical midpoint of the hovered card to pick before/after.

use serde::{Deserialize, Serialize};

/// Movement threshold in pixels to start dragging
pub const DRAG_THRESHOLD_PX: f64 = 5.0;

/// Drop target types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum DropTarget {
    /// Pointer is over a column body
    Container(u32),
    /// Pointer is over a card (its column is found by containment)
    Item(u32),
}

/// Screen rectangle of a card or column
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self { top, left, width, height }
    }

    /// Vertical midpoint
    pub fn mid_y(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Which side of the hovered card the dragged card should land on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropSide {
    Before,
    After,
}

/// Midpoint rule: once the dragged card's top edge has passed the hovered
/// card's vertical midpoint it goes after it, otherwise before.
///
/// Without both rectangles there is nothing to compare, so `Before`.
pub fn drop_side(dragged: Option<&Rect>, hovered: Option<&Rect>) -> DropSide {
    match (dragged, hovered) {
        (Some(dragged), Some(hovered)) if dragged.top > hovered.mid_y() => DropSide::After,
        _ => DropSide::Before,
    }
}

/// What a pointer release meant
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Release {
    /// Pointer went down and up without crossing the threshold
    Click(u32),
    /// An activated drag ended
    Drop(u32),
    /// Nothing was pending
    Idle,
}

/// Pending/active drag bookkeeping for one pointer
#[derive(Clone, Debug, Default)]
pub struct ActivationTracker {
    /// Pending item id (pointer down but not yet dragging)
    pending: Option<u32>,
    /// Item currently being dragged
    dragging: Option<u32>,
    /// Start position for movement detection
    start_x: f64,
    start_y: f64,
}

impl ActivationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pending drag with its start position
    pub fn pointer_down(&mut self, item_id: u32, x: f64, y: f64) {
        self.pending = Some(item_id);
        self.dragging = None;
        self.start_x = x;
        self.start_y = y;
    }

    /// Returns the item id exactly once, on the move that crosses the threshold
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<u32> {
        let pending = self.pending?;
        if self.dragging.is_some() {
            return None;
        }
        let dx = (x - self.start_x).abs();
        let dy = (y - self.start_y).abs();
        if dx > DRAG_THRESHOLD_PX || dy > DRAG_THRESHOLD_PX {
            self.dragging = Some(pending);
            return Some(pending);
        }
        None
    }

    /// End any pending or active drag
    pub fn pointer_up(&mut self) -> Release {
        let pending = self.pending.take();
        match (self.dragging.take(), pending) {
            (Some(id), _) => Release::Drop(id),
            (None, Some(id)) => Release::Click(id),
            (None, None) => Release::Idle,
        }
    }

    pub fn dragging(&self) -> Option<u32> {
        self.dragging
    }
}

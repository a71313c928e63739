//! Optimistic Client Mirror
//!
//! Predicts drag results on the local board without talking to the server.
//! A gesture freezes the dragged card's origin at pick-up; previews splice
//! the card around locally as the pointer moves; the drop turns the final
//! placement into at most one `MoveItemRequest`.
//!
//! Placement goes through `dense_order`, the same code the server commits
//! with, so a successful call leaves the server exactly where the preview
//! already is.

use board_dnd::{drop_side, DropSide, DropTarget, Rect};

use crate::commands::{MoveContainerRequest, MoveItemRequest};
use crate::error::ClientError;
use crate::store::BoardState;

/// Where the pointer is, with the geometry needed for the midpoint rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hover {
    pub target: DropTarget,
    pub dragged_rect: Option<Rect>,
    pub target_rect: Option<Rect>,
}

impl Hover {
    /// Over a column body: the card goes to the end
    pub fn container(container_id: u32) -> Self {
        Self {
            target: DropTarget::Container(container_id),
            dragged_rect: None,
            target_rect: None,
        }
    }

    pub fn item(item_id: u32, dragged_rect: Rect, target_rect: Rect) -> Self {
        Self {
            target: DropTarget::Item(item_id),
            dragged_rect: Some(dragged_rect),
            target_rect: Some(target_rect),
        }
    }
}

/// How a gesture ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// No valid drop target; the board is back to its pre-gesture state
    Cancelled,
    /// Dropped where it started; nothing to persist
    Unchanged,
    /// Persist this
    Move(MoveItemRequest),
}

#[derive(Debug, Clone)]
struct Gesture {
    item_id: u32,
    /// Frozen at pick-up, never recomputed
    origin_container: u32,
    origin_index: usize,
    snapshot: BoardState,
}

#[derive(Debug, Clone, Default)]
pub struct BoardMirror {
    board: BoardState,
    gesture: Option<Gesture>,
}

impl BoardMirror {
    pub fn new(board: BoardState) -> Self {
        Self { board, gesture: None }
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    /// Dragged item, if a gesture is active
    pub fn dragging(&self) -> Option<u32> {
        self.gesture.as_ref().map(|g| g.item_id)
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    /// Replace local state with the server's. An active gesture keeps its
    /// frozen origin; cancelling it now restores the new board.
    pub fn replace(&mut self, board: BoardState) {
        if let Some(gesture) = self.gesture.as_mut() {
            gesture.snapshot = board.clone();
        }
        self.board = board;
    }

    /// Pick up `item_id`
    pub fn begin(&mut self, item_id: u32) -> Result<(), ClientError> {
        if self.gesture.is_some() {
            return Err(ClientError::GestureInProgress);
        }
        let (origin_container, origin_index) = self
            .board
            .locate(item_id)
            .ok_or(ClientError::UnknownItem(item_id))?;

        log::debug!("drag start: item {} from container {}", item_id, origin_container);
        self.gesture = Some(Gesture {
            item_id,
            origin_container,
            origin_index,
            snapshot: self.board.clone(),
        });
        Ok(())
    }

    /// Apply a hover locally. Returns the `(container, index)` the card now
    /// sits at, or `None` when the hover is not a valid target.
    pub fn preview(&mut self, hover: &Hover) -> Result<Option<(u32, usize)>, ClientError> {
        let item_id = self.dragging().ok_or(ClientError::NoActiveGesture)?;
        let Some((container_id, index)) = self.resolve(item_id, hover) else {
            return Ok(None);
        };
        let landed = self.board.place_item(item_id, container_id, index)?;
        Ok(Some((container_id, landed)))
    }

    /// End the gesture against its final hover (`None`: released over
    /// nothing).
    pub fn finish(&mut self, hover: Option<&Hover>) -> Result<DropOutcome, ClientError> {
        let gesture = self.gesture.take().ok_or(ClientError::NoActiveGesture)?;

        let target = hover.and_then(|h| self.resolve(gesture.item_id, h));
        let Some((container_id, index)) = target else {
            log::debug!("drag of item {} cancelled", gesture.item_id);
            self.board = gesture.snapshot;
            return Ok(DropOutcome::Cancelled);
        };

        let landed = match self.board.place_item(gesture.item_id, container_id, index) {
            Ok(landed) => landed,
            Err(e) => {
                self.board = gesture.snapshot;
                return Err(e);
            }
        };

        if container_id == gesture.origin_container && landed == gesture.origin_index {
            self.board = gesture.snapshot;
            return Ok(DropOutcome::Unchanged);
        }

        Ok(DropOutcome::Move(MoveItemRequest {
            item_id: gesture.item_id,
            source_container_id: Some(gesture.origin_container),
            target_container_id: container_id,
            target_index: landed as i64,
        }))
    }

    /// Abort the gesture and restore the pre-gesture board
    pub fn cancel(&mut self) -> Result<(), ClientError> {
        let gesture = self.gesture.take().ok_or(ClientError::NoActiveGesture)?;
        self.board = gesture.snapshot;
        Ok(())
    }

    /// Reorder a column locally. `None` when it is already there.
    pub fn move_container(&mut self, container_id: u32, index: i64) -> Result<Option<MoveContainerRequest>, ClientError> {
        if self.gesture.is_some() {
            return Err(ClientError::GestureInProgress);
        }
        let before = self
            .board
            .columns()
            .iter()
            .position(|c| c.id() == container_id)
            .ok_or(ClientError::UnknownContainer(container_id))?;

        let landed = self.board.place_column(container_id, index)?;
        if landed == before {
            return Ok(None);
        }
        Ok(Some(MoveContainerRequest {
            container_id,
            target_index: landed as i64,
        }))
    }

    /// Target container and insertion index for a hover, computed as if
    /// the dragged card were already out of the way
    fn resolve(&self, item_id: u32, hover: &Hover) -> Option<(u32, i64)> {
        let (current_container, current_index) = self.board.locate(item_id)?;

        match hover.target {
            DropTarget::Container(container_id) => {
                let column = self.board.column(container_id)?;
                let others = column.items.iter().filter(|i| i.id != item_id).count();
                Some((container_id, others as i64))
            }
            DropTarget::Item(hovered) if hovered == item_id => {
                Some((current_container, current_index as i64))
            }
            DropTarget::Item(hovered) => {
                let (container_id, mut index) = self.board.locate(hovered)?;
                if container_id == current_container && current_index < index {
                    index -= 1;
                }
                if drop_side(hover.dragged_rect.as_ref(), hover.target_rect.as_ref()) == DropSide::After {
                    index += 1;
                }
                Some((container_id, index as i64))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{board, ids};

    /// Dragged card's top edge `dy` pixels into a 40px card
    fn over(item_id: u32, dy: f64) -> Hover {
        Hover::item(item_id, Rect::new(dy, 0.0, 200.0, 40.0), Rect::new(0.0, 0.0, 200.0, 40.0))
    }

    #[test]
    fn test_cross_container_drop() {
        let mut mirror = BoardMirror::new(board(&[(1, &[10, 11, 12]), (2, &[20])]));
        mirror.begin(11).unwrap();

        // Past b0's midpoint: after it
        assert_eq!(mirror.preview(&over(20, 30.0)).unwrap(), Some((2, 1)));
        let outcome = mirror.finish(Some(&over(20, 30.0))).unwrap();

        assert_eq!(
            outcome,
            DropOutcome::Move(MoveItemRequest {
                item_id: 11,
                source_container_id: Some(1),
                target_container_id: 2,
                target_index: 1,
            })
        );
        assert_eq!(ids(mirror.board(), 1), vec![10, 12]);
        assert_eq!(ids(mirror.board(), 2), vec![20, 11]);
        assert!(mirror.board().is_dense());
    }

    #[test]
    fn test_origin_stays_frozen() {
        let mut mirror = BoardMirror::new(board(&[(1, &[10, 11]), (2, &[20])]));
        mirror.begin(10).unwrap();

        // Preview into column 2, then back home past 11
        mirror.preview(&Hover::container(2)).unwrap();
        mirror.preview(&over(11, 30.0)).unwrap();
        let outcome = mirror.finish(Some(&over(11, 30.0))).unwrap();

        match outcome {
            DropOutcome::Move(req) => {
                assert_eq!(req.source_container_id, Some(1));
                assert_eq!(req.target_container_id, 1);
                assert_eq!(req.target_index, 1);
            }
            other => panic!("expected a move, got {:?}", other),
        }
        assert_eq!(ids(mirror.board(), 1), vec![11, 10]);
    }

    #[test]
    fn test_same_container_before_and_after() {
        let mut mirror = BoardMirror::new(board(&[(1, &[10, 11, 12, 13])]));
        mirror.begin(10).unwrap();

        assert_eq!(mirror.preview(&over(12, 5.0)).unwrap(), Some((1, 1)));
        assert_eq!(ids(mirror.board(), 1), vec![11, 10, 12, 13]);

        assert_eq!(mirror.preview(&over(12, 25.0)).unwrap(), Some((1, 2)));
        assert_eq!(ids(mirror.board(), 1), vec![11, 12, 10, 13]);
    }

    #[test]
    fn test_cancel_after_previews_restores_snapshot() {
        let start = board(&[(1, &[10, 11, 12]), (2, &[20]), (3, &[])]);
        let mut mirror = BoardMirror::new(start.clone());
        mirror.begin(11).unwrap();

        for hover in [over(20, 30.0), Hover::container(3), over(10, 0.0), over(12, 35.0), Hover::container(2)] {
            mirror.preview(&hover).unwrap();
        }
        assert_ne!(mirror.board(), &start);

        assert_eq!(mirror.finish(None).unwrap(), DropOutcome::Cancelled);
        assert_eq!(mirror.board(), &start);
        assert!(!mirror.is_dragging());
    }

    #[test]
    fn test_drop_on_unknown_target_cancels() {
        let start = board(&[(1, &[10, 11])]);
        let mut mirror = BoardMirror::new(start.clone());
        mirror.begin(10).unwrap();
        mirror.preview(&over(11, 30.0)).unwrap();

        assert_eq!(mirror.preview(&Hover::container(9)).unwrap(), None);
        assert_eq!(mirror.finish(Some(&Hover::container(9))).unwrap(), DropOutcome::Cancelled);
        assert_eq!(mirror.board(), &start);
    }

    #[test]
    fn test_drop_in_place_is_unchanged() {
        let start = board(&[(1, &[10, 11, 12]), (2, &[])]);
        let mut mirror = BoardMirror::new(start.clone());
        mirror.begin(11).unwrap();
        mirror.preview(&Hover::container(2)).unwrap();

        // Back between 10 and 12
        assert_eq!(mirror.finish(Some(&over(12, 0.0))).unwrap(), DropOutcome::Unchanged);
        assert_eq!(mirror.board(), &start);
    }

    #[test]
    fn test_hovering_self_keeps_placement() {
        let mut mirror = BoardMirror::new(board(&[(1, &[10, 11]), (2, &[20])]));
        mirror.begin(10).unwrap();
        mirror.preview(&Hover::container(2)).unwrap();

        assert_eq!(mirror.preview(&over(10, 30.0)).unwrap(), Some((2, 1)));
        assert_eq!(ids(mirror.board(), 2), vec![20, 10]);
    }

    #[test]
    fn test_container_body_appends() {
        let mut mirror = BoardMirror::new(board(&[(1, &[10, 11, 12])]));
        mirror.begin(10).unwrap();
        assert_eq!(mirror.preview(&Hover::container(1)).unwrap(), Some((1, 2)));
        assert_eq!(ids(mirror.board(), 1), vec![11, 12, 10]);
    }

    #[test]
    fn test_gesture_errors() {
        let mut mirror = BoardMirror::new(board(&[(1, &[10])]));
        assert_eq!(mirror.preview(&Hover::container(1)), Err(ClientError::NoActiveGesture));
        assert_eq!(mirror.finish(None), Err(ClientError::NoActiveGesture));
        assert_eq!(mirror.begin(99), Err(ClientError::UnknownItem(99)));

        mirror.begin(10).unwrap();
        assert_eq!(mirror.begin(10), Err(ClientError::GestureInProgress));
        assert_eq!(mirror.move_container(1, 0), Err(ClientError::GestureInProgress));
    }

    #[test]
    fn test_replace_mid_gesture_resets_snapshot() {
        let mut mirror = BoardMirror::new(board(&[(1, &[10, 11]), (2, &[])]));
        mirror.begin(10).unwrap();
        mirror.preview(&Hover::container(2)).unwrap();

        let fresh = board(&[(1, &[11, 10]), (2, &[])]);
        mirror.replace(fresh.clone());
        mirror.cancel().unwrap();
        assert_eq!(mirror.board(), &fresh);
    }

    #[test]
    fn test_move_container() {
        let mut mirror = BoardMirror::new(board(&[(1, &[]), (2, &[]), (3, &[])]));
        assert_eq!(mirror.move_container(1, 0).unwrap(), None);
        assert_eq!(
            mirror.move_container(1, 10).unwrap(),
            Some(MoveContainerRequest {
                container_id: 1,
                target_index: 2
            })
        );
        assert_eq!(mirror.move_container(8, 0), Err(ClientError::UnknownContainer(8)));
    }
}

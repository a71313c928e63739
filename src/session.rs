//! Board Session
//!
//! One user's board: the mirror, the guard and the backend api, driven by
//! pointer events. The lifecycle of a gesture is
//!
//! ```text
//! Idle -> Dragging -> (preview)* -> Persisting -> Idle
//!                                              \-> resync -> Idle
//! ```
//!
//! Sessions are independent values; nothing here is global.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use board_dnd::{ActivationTracker, Release};

use crate::commands::{BoardApi, MoveContainerRequest, MoveItemRequest};
use crate::config::{MirrorConfig, ResyncPolicy};
use crate::error::ClientError;
use crate::guard::{Admission, MoveKey, ReconciliationGuard, Suppression};
use crate::mirror::{BoardMirror, DropOutcome, Hover};
use crate::store::BoardState;

/// An admitted persistence call. Independent of the session, so the event
/// loop can keep handling gestures while it runs; feed its result to
/// [`BoardSession::settle`].
pub type PendingCall = Pin<Box<dyn Future<Output = Result<(), ClientError>> + Send + 'static>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistCall {
    Item(MoveItemRequest),
    Container(MoveContainerRequest),
}

impl PersistCall {
    fn key(&self) -> MoveKey {
        match self {
            PersistCall::Item(req) => MoveKey::for_item(req),
            PersistCall::Container(req) => MoveKey::for_container(req),
        }
    }
}

pub enum Dispatch {
    Sent(PendingCall),
    Suppressed(Suppression),
}

/// What happened to the board after a gesture or column move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Cancelled, or dropped where it started
    NoCall,
    /// The guard dropped the call; the board was reloaded from the server
    Suppressed(Suppression),
    /// The server accepted the move
    Committed { resynced: bool },
    /// The call failed and the board was reloaded from the server
    Recovered(ClientError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Dragging,
    Persisting,
}

/// Result of releasing the pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerUp {
    /// Down and up without crossing the drag threshold
    Click(u32),
    Drop(SyncOutcome),
    Idle,
}

pub struct BoardSession {
    mirror: BoardMirror,
    guard: ReconciliationGuard,
    api: Arc<dyn BoardApi>,
    config: MirrorConfig,
    pointer: ActivationTracker,
}

impl BoardSession {
    /// Load the board and start a session on it
    pub async fn open(api: Arc<dyn BoardApi>, config: MirrorConfig) -> Result<Self, ClientError> {
        let columns = api.load_board().await?;
        log::info!("board loaded: {} columns", columns.len());
        Ok(Self {
            mirror: BoardMirror::new(BoardState::new(columns)),
            guard: ReconciliationGuard::new(config.guard_cooldown),
            api,
            config,
            pointer: ActivationTracker::new(),
        })
    }

    pub fn board(&self) -> &BoardState {
        self.mirror.board()
    }

    pub fn phase(&self) -> Phase {
        if self.mirror.is_dragging() {
            Phase::Dragging
        } else if self.guard.is_busy() {
            Phase::Persisting
        } else {
            Phase::Idle
        }
    }

    // ========================
    // Gesture
    // ========================

    pub fn begin_drag(&mut self, item_id: u32) -> Result<(), ClientError> {
        self.mirror.begin(item_id)
    }

    pub fn drag_over(&mut self, hover: &Hover) -> Result<Option<(u32, usize)>, ClientError> {
        self.mirror.preview(hover)
    }

    /// Finish the gesture locally; a `Move` outcome still has to be dispatched
    pub fn end_drag(&mut self, hover: Option<&Hover>) -> Result<DropOutcome, ClientError> {
        self.mirror.finish(hover)
    }

    pub fn cancel_drag(&mut self) -> Result<(), ClientError> {
        self.pointer.pointer_up();
        self.mirror.cancel()
    }

    // ========================
    // Pointer
    // ========================

    pub fn pointer_down(&mut self, item_id: u32, x: f64, y: f64) {
        self.pointer.pointer_down(item_id, x, y);
    }

    /// Starts the gesture once the pointer travels past the threshold, then
    /// previews `hover` on every move
    pub fn pointer_move(&mut self, x: f64, y: f64, hover: Option<&Hover>) -> Result<(), ClientError> {
        if let Some(item_id) = self.pointer.pointer_move(x, y) {
            self.mirror.begin(item_id)?;
        }
        if let (true, Some(hover)) = (self.mirror.is_dragging(), hover) {
            self.mirror.preview(hover)?;
        }
        Ok(())
    }

    /// Ends a drag the same way `drop_and_persist` does
    pub async fn pointer_up(&mut self, hover: Option<&Hover>) -> Result<PointerUp, ClientError> {
        match self.pointer.pointer_up() {
            Release::Click(item_id) => Ok(PointerUp::Click(item_id)),
            Release::Drop(_) => Ok(PointerUp::Drop(self.drop_and_persist(hover).await?)),
            Release::Idle => Ok(PointerUp::Idle),
        }
    }

    // ========================
    // Persistence
    // ========================

    /// Pass a call through the guard. Suppressed calls never reach the api.
    pub fn dispatch(&self, call: PersistCall) -> Dispatch {
        let permit = match self.guard.try_admit(call.key()) {
            Admission::Granted(permit) => permit,
            Admission::Suppressed(why) => return Dispatch::Suppressed(why),
        };

        let api = self.api.clone();
        Dispatch::Sent(Box::pin(async move {
            let _permit = permit;
            match call {
                PersistCall::Item(req) => {
                    log::debug!(
                        "persisting item {} -> container {} @ {}",
                        req.item_id,
                        req.target_container_id,
                        req.target_index
                    );
                    api.move_item(&req).await.map(|_| ())
                }
                PersistCall::Container(req) => {
                    log::debug!("persisting container {} @ {}", req.container_id, req.target_index);
                    api.move_container(&req).await.map(|_| ())
                }
            }
        }))
    }

    /// Reconcile after a call settled. Failed calls always reload the board;
    /// successes reload it under `ResyncPolicy::Always`. Errors that say
    /// nothing about the server's state are returned as is.
    pub async fn settle(&mut self, result: Result<(), ClientError>) -> Result<SyncOutcome, ClientError> {
        match result {
            Ok(()) if self.config.resync == ResyncPolicy::OnFailure => Ok(SyncOutcome::Committed { resynced: false }),
            Ok(()) => {
                self.reload().await?;
                Ok(SyncOutcome::Committed { resynced: true })
            }
            Err(e) if e.needs_resync() => {
                log::warn!("persistence failed, resyncing board: {}", e);
                self.reload().await?;
                Ok(SyncOutcome::Recovered(e))
            }
            Err(e) => Err(e),
        }
    }

    /// Discard local state and load the server's
    pub async fn reload(&mut self) -> Result<(), ClientError> {
        let columns = self.api.load_board().await?;
        self.mirror.replace(BoardState::new(columns));
        log::debug!("board resynced");
        Ok(())
    }

    async fn persist(&mut self, call: PersistCall) -> Result<SyncOutcome, ClientError> {
        match self.dispatch(call) {
            Dispatch::Sent(pending) => {
                let result = pending.await;
                self.settle(result).await
            }
            Dispatch::Suppressed(why) => {
                // The optimistic placement was never sent
                log::debug!("move suppressed ({:?}), resyncing board", why);
                self.reload().await?;
                Ok(SyncOutcome::Suppressed(why))
            }
        }
    }

    /// End the gesture and persist it in one step
    pub async fn drop_and_persist(&mut self, hover: Option<&Hover>) -> Result<SyncOutcome, ClientError> {
        match self.end_drag(hover)? {
            DropOutcome::Move(req) => self.persist(PersistCall::Item(req)).await,
            DropOutcome::Cancelled | DropOutcome::Unchanged => Ok(SyncOutcome::NoCall),
        }
    }

    /// Reorder a column locally and persist it
    pub async fn move_container(&mut self, container_id: u32, index: i64) -> Result<SyncOutcome, ClientError> {
        match self.mirror.move_container(container_id, index)? {
            Some(req) => self.persist(PersistCall::Container(req)).await,
            None => Ok(SyncOutcome::NoCall),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::JsonApi;
    use crate::test_support::LocalServer;
    use board_dnd::Rect;
    use std::time::Duration;

    fn over(item_id: u32, dy: f64) -> Hover {
        Hover::item(item_id, Rect::new(dy, 0.0, 200.0, 40.0), Rect::new(0.0, 0.0, 200.0, 40.0))
    }

    fn config(resync: ResyncPolicy) -> MirrorConfig {
        MirrorConfig {
            guard_cooldown: Duration::from_millis(400),
            resync,
        }
    }

    async fn open(server: &Arc<LocalServer>, resync: ResyncPolicy) -> BoardSession {
        let api = Arc::new(JsonApi::new(server.clone()));
        BoardSession::open(api, config(resync)).await.unwrap()
    }

    async fn server_board(server: &Arc<LocalServer>) -> BoardState {
        let api = JsonApi::new(server.clone());
        BoardState::new(api.load_board().await.unwrap())
    }

    #[tokio::test]
    async fn test_prediction_matches_server() {
        let server = LocalServer::with_board(&[("A", &["a0", "a1", "a2"]), ("B", &["b0"])]).await;
        let mut session = open(&server, ResyncPolicy::OnFailure).await;
        let a1 = server.item_id("a1");
        let b0 = server.item_id("b0");

        session.begin_drag(a1).unwrap();
        session.drag_over(&over(b0, 30.0)).unwrap();
        let outcome = session.drop_and_persist(Some(&over(b0, 30.0))).await.unwrap();

        assert_eq!(outcome, SyncOutcome::Committed { resynced: false });
        assert_eq!(server.move_calls(), 1);
        assert_eq!(session.board(), &server_board(&server).await);
        assert_eq!(server.titles("A").await, vec!["a0", "a2"]);
        assert_eq!(server.titles("B").await, vec!["b0", "a1"]);
    }

    #[tokio::test]
    async fn test_cancel_after_previews_issues_no_call() {
        let server = LocalServer::with_board(&[("A", &["a0", "a1"]), ("B", &["b0"]), ("C", &[])]).await;
        let mut session = open(&server, ResyncPolicy::Always).await;
        let before = session.board().clone();
        let a0 = server.item_id("a0");
        let b0 = server.item_id("b0");

        session.begin_drag(a0).unwrap();
        for _ in 0..20 {
            session.drag_over(&over(b0, 30.0)).unwrap();
            session.drag_over(&Hover::container(server.container_id("C"))).unwrap();
        }
        let outcome = session.drop_and_persist(None).await.unwrap();

        assert_eq!(outcome, SyncOutcome::NoCall);
        assert_eq!(session.board(), &before);
        assert_eq!(server.move_calls(), 0);
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_failure_resyncs_from_server() {
        let server = LocalServer::with_board(&[("A", &["a0", "a1"]), ("B", &[])]).await;
        let mut session = open(&server, ResyncPolicy::OnFailure).await;
        let before = session.board().clone();

        server.fail_next_moves(1);
        session.begin_drag(server.item_id("a0")).unwrap();
        let outcome = session
            .drop_and_persist(Some(&Hover::container(server.container_id("B"))))
            .await
            .unwrap();

        assert!(matches!(outcome, SyncOutcome::Recovered(ClientError::Network(_))));
        assert_eq!(session.board(), &before);
        assert_eq!(server.titles("A").await, vec!["a0", "a1"]);
    }

    #[tokio::test]
    async fn test_server_rejection_resyncs() {
        let server = LocalServer::with_board(&[("A", &["a0"]), ("B", &[])]).await;
        let mut session = open(&server, ResyncPolicy::OnFailure).await;
        let a0 = server.item_id("a0");

        // Someone else deletes the column we are about to drop into
        server.delete_container("B").await;
        session.begin_drag(a0).unwrap();
        let b = session.board().columns()[1].id();
        let outcome = session.drop_and_persist(Some(&Hover::container(b))).await.unwrap();

        match outcome {
            SyncOutcome::Recovered(ClientError::Server { kind, .. }) => assert_eq!(kind, "notFound"),
            other => panic!("expected recovery, got {:?}", other),
        }
        assert_eq!(session.board().columns().len(), 1);
        assert_eq!(session.board(), &server_board(&server).await);
    }

    #[tokio::test]
    async fn test_settle_reloads_only_for_call_failures() {
        let server = LocalServer::with_board(&[("A", &[]), ("B", &[])]).await;
        let mut session = open(&server, ResyncPolicy::OnFailure).await;
        let before = session.board().clone();
        server.move_container("A", 1).await;

        let err = session.settle(Err(ClientError::UnknownItem(9))).await.unwrap_err();
        assert_eq!(err, ClientError::UnknownItem(9));
        assert_eq!(session.board(), &before);

        let outcome = session.settle(Err(ClientError::Decode("garbled".into()))).await.unwrap();
        assert!(matches!(outcome, SyncOutcome::Recovered(ClientError::Decode(_))));
        assert_eq!(session.board(), &server_board(&server).await);
    }

    #[tokio::test]
    async fn test_in_flight_call_suppresses_next_gesture() {
        let server = LocalServer::with_board(&[("A", &["a0", "a1", "a2"]), ("B", &[])]).await;
        let mut session = open(&server, ResyncPolicy::Always).await;
        let b = server.container_id("B");
        server.hold_moves();

        session.begin_drag(server.item_id("a0")).unwrap();
        let first = match session.end_drag(Some(&Hover::container(b))).unwrap() {
            DropOutcome::Move(req) => req,
            other => panic!("expected a move, got {:?}", other),
        };
        let pending = match session.dispatch(PersistCall::Item(first)) {
            Dispatch::Sent(pending) => tokio::spawn(pending),
            Dispatch::Suppressed(why) => panic!("suppressed: {:?}", why),
        };
        tokio::task::yield_now().await;
        assert_eq!(session.phase(), Phase::Persisting);

        // A second gesture finishes while the first call is still out
        session.begin_drag(server.item_id("a1")).unwrap();
        let second = session.drop_and_persist(Some(&Hover::container(b))).await.unwrap();
        assert_eq!(second, SyncOutcome::Suppressed(Suppression::InFlight));
        assert_eq!(session.board(), &server_board(&server).await);
        assert_eq!(session.board().column(b).unwrap().items.len(), 0);

        server.release_moves();
        let result = pending.await.unwrap();
        let settled = session.settle(result).await.unwrap();

        // The late reply is reconciled by a full reload
        assert_eq!(settled, SyncOutcome::Committed { resynced: true });
        assert_eq!(server.move_calls(), 1);
        assert_eq!(session.board(), &server_board(&server).await);
        assert_eq!(server.titles("B").await, vec!["a0"]);
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_late_reply_during_new_gesture() {
        let server = LocalServer::with_board(&[("A", &["a0", "a1"]), ("B", &[])]).await;
        let mut session = open(&server, ResyncPolicy::Always).await;
        let b = server.container_id("B");
        server.hold_moves();

        session.begin_drag(server.item_id("a0")).unwrap();
        let DropOutcome::Move(req) = session.end_drag(Some(&Hover::container(b))).unwrap() else {
            panic!("expected a move");
        };
        let Dispatch::Sent(pending) = session.dispatch(PersistCall::Item(req)) else {
            panic!("suppressed");
        };
        let pending = tokio::spawn(pending);

        let a1 = server.item_id("a1");
        session.begin_drag(a1).unwrap();
        session.drag_over(&Hover::container(b)).unwrap();

        server.release_moves();
        let result = pending.await.unwrap();
        session.settle(result).await.unwrap();

        // Authoritative board underneath; the new gesture is still live
        assert_eq!(session.phase(), Phase::Dragging);
        session.cancel_drag().unwrap();
        assert_eq!(session.board(), &server_board(&server).await);
        assert_eq!(server.titles("A").await, vec!["a1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeat_column_move_waits_for_cooldown() {
        let server = LocalServer::with_board(&[("A", &[]), ("B", &[]), ("C", &[])]).await;
        let mut session = open(&server, ResyncPolicy::OnFailure).await;
        let a = server.container_id("A");

        let first = session.move_container(a, 2).await.unwrap();
        assert_eq!(first, SyncOutcome::Committed { resynced: false });

        // Put it back behind the session's back, then repeat the same move
        server.move_container("A", 0).await;
        session.reload().await.unwrap();
        let repeat = session.move_container(a, 2).await.unwrap();
        assert_eq!(repeat, SyncOutcome::Suppressed(Suppression::Duplicate));
        assert_eq!(session.board(), &server_board(&server).await);
        assert_eq!(session.board().columns()[0].id(), a);
        tokio::time::advance(Duration::from_millis(400)).await;
        let later = session.move_container(a, 2).await.unwrap();
        assert_eq!(later, SyncOutcome::Committed { resynced: false });
        assert_eq!(server.move_calls(), 2);
        assert_eq!(server.container_names().await, vec!["B", "C", "A"]);
    }

    #[tokio::test]
    async fn test_pointer_threshold() {
        let server = LocalServer::with_board(&[("A", &["a0", "a1"])]).await;
        let mut session = open(&server, ResyncPolicy::Always).await;
        let a0 = server.item_id("a0");
        let a1 = server.item_id("a1");

        session.pointer_down(a0, 10.0, 10.0);
        session.pointer_move(12.0, 13.0, Some(&over(a1, 30.0))).unwrap();
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.pointer_up(None).await.unwrap(), PointerUp::Click(a0));
        assert_eq!(server.move_calls(), 0);

        session.pointer_down(a0, 10.0, 10.0);
        session.pointer_move(10.0, 40.0, Some(&over(a1, 30.0))).unwrap();
        assert_eq!(session.phase(), Phase::Dragging);
        let up = session.pointer_up(Some(&over(a1, 30.0))).await.unwrap();

        assert_eq!(up, PointerUp::Drop(SyncOutcome::Committed { resynced: true }));
        assert_eq!(server.move_calls(), 1);
        assert_eq!(server.titles("A").await, vec!["a1", "a0"]);
        assert_eq!(session.board(), &server_board(&server).await);
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_pointer_drop_into_other_column_persists() {
        let server = LocalServer::with_board(&[("A", &["a0", "a1"]), ("B", &[])]).await;
        let mut session = open(&server, ResyncPolicy::OnFailure).await;
        let b = Hover::container(server.container_id("B"));

        session.pointer_down(server.item_id("a0"), 0.0, 0.0);
        session.pointer_move(50.0, 0.0, Some(&b)).unwrap();
        let up = session.pointer_up(Some(&b)).await.unwrap();

        assert_eq!(up, PointerUp::Drop(SyncOutcome::Committed { resynced: false }));
        assert_eq!(server.move_calls(), 1);
        assert_eq!(server.titles("B").await, vec!["a0"]);
        assert_eq!(session.board(), &server_board(&server).await);
    }

    #[tokio::test]
    async fn test_pointer_drop_in_place_issues_no_call() {
        let server = LocalServer::with_board(&[("A", &["a0", "a1"])]).await;
        let mut session = open(&server, ResyncPolicy::Always).await;
        let a0 = server.item_id("a0");
        let before = session.board().clone();

        session.pointer_down(a0, 0.0, 0.0);
        session.pointer_move(0.0, 20.0, None).unwrap();
        let up = session.pointer_up(None).await.unwrap();

        assert_eq!(up, PointerUp::Drop(SyncOutcome::NoCall));
        assert_eq!(server.move_calls(), 0);
        assert_eq!(session.board(), &before);
    }
}

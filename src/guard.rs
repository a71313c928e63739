//! Reconciliation Guard
//!
//! Traffic reduction for persistence calls. At most one call is in flight;
//! anything arriving meanwhile is dropped, not queued. A move identical to
//! the last dispatched one is dropped too, until `cooldown` has passed since
//! that call settled. Correctness never depends on this: the server's
//! transaction does.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::commands::{MoveContainerRequest, MoveItemRequest};

/// Structural hash of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveKey([u8; 32]);

impl MoveKey {
    pub fn for_item(req: &MoveItemRequest) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"item");
        hasher.update(&req.item_id.to_le_bytes());
        hasher.update(&req.source_container_id.unwrap_or(0).to_le_bytes());
        hasher.update(&req.target_container_id.to_le_bytes());
        hasher.update(&req.target_index.to_le_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    pub fn for_container(req: &MoveContainerRequest) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"container");
        hasher.update(&req.container_id.to_le_bytes());
        hasher.update(&req.target_index.to_le_bytes());
        Self(*hasher.finalize().as_bytes())
    }
}

/// Why a move was not dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
    /// Same key as the last dispatched move, still within its cooldown
    Duplicate,
    /// Another call has not settled yet
    InFlight,
}

#[derive(Debug)]
pub enum Admission {
    Granted(GuardPermit),
    Suppressed(Suppression),
}

#[derive(Debug, Default)]
struct GuardState {
    busy: bool,
    last_key: Option<MoveKey>,
    settled_at: Option<Instant>,
}

#[derive(Debug, Clone)]
pub struct ReconciliationGuard {
    state: Arc<Mutex<GuardState>>,
    cooldown: Duration,
}

impl ReconciliationGuard {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(GuardState::default())),
            cooldown,
        }
    }

    /// Admit a call for `key`. The returned permit marks the guard busy
    /// until it is dropped.
    pub fn try_admit(&self, key: MoveKey) -> Admission {
        let mut state = self.state.lock();
        if state.busy {
            log::debug!("persistence call in flight, dropping move");
            return Admission::Suppressed(Suppression::InFlight);
        }

        if let Some(settled) = state.settled_at {
            if settled.elapsed() >= self.cooldown {
                state.last_key = None;
                state.settled_at = None;
            }
        }
        if state.last_key == Some(key) {
            log::debug!("duplicate move within cooldown, dropping");
            return Admission::Suppressed(Suppression::Duplicate);
        }

        state.busy = true;
        state.last_key = Some(key);
        state.settled_at = None;
        Admission::Granted(GuardPermit {
            state: self.state.clone(),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.state.lock().busy
    }
}

/// Held for the lifetime of one call; dropping it settles the call
#[derive(Debug)]
pub struct GuardPermit {
    state: Arc<Mutex<GuardState>>,
}

impl Drop for GuardPermit {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.busy = false;
        state.settled_at = Some(Instant::now());
    }
}

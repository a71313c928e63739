//! In-process backend for session tests: the real reorder server behind a
//! `JsonChannel`, with knobs to fail or hold move calls.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kanban_reorder_lib::commands::dispatch;
use kanban_reorder_lib::repository::init_db;
use kanban_reorder_lib::AppState;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::Semaphore;

use crate::commands::JsonChannel;
use crate::error::ClientError;

pub(crate) struct LocalServer {
    state: AppState,
    /// Container names and item titles to ids
    ids: Mutex<HashMap<String, u32>>,
    move_calls: AtomicUsize,
    fail_moves: AtomicUsize,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl LocalServer {
    pub(crate) async fn with_board(layout: &[(&str, &[&str])]) -> Arc<Self> {
        let db = init_db(Path::new(":memory:"), Duration::from_millis(50))
            .await
            .unwrap();
        let server = Self {
            state: AppState::new(db, ":memory:".into()),
            ids: Mutex::new(HashMap::new()),
            move_calls: AtomicUsize::new(0),
            fail_moves: AtomicUsize::new(0),
            gate: Mutex::new(None),
        };

        for (name, titles) in layout {
            let reply = dispatch(&server.state, "container.create", json!({ "name": name })).await;
            let container_id = reply["container"]["id"].as_u64().unwrap() as u32;
            server.ids.lock().insert(name.to_string(), container_id);

            for title in titles.iter() {
                let reply = dispatch(
                    &server.state,
                    "item.create",
                    json!({ "containerId": container_id, "title": title }),
                )
                .await;
                let item_id = reply["item"]["id"].as_u64().unwrap() as u32;
                server.ids.lock().insert(title.to_string(), item_id);
            }
        }
        Arc::new(server)
    }

    pub(crate) fn item_id(&self, title: &str) -> u32 {
        self.ids.lock()[title]
    }

    pub(crate) fn container_id(&self, name: &str) -> u32 {
        self.ids.lock()[name]
    }

    /// Move calls that reached the channel
    pub(crate) fn move_calls(&self) -> usize {
        self.move_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_next_moves(&self, n: usize) {
        self.fail_moves.store(n, Ordering::SeqCst);
    }

    /// Park move calls until `release_moves`
    pub(crate) fn hold_moves(&self) {
        *self.gate.lock() = Some(Arc::new(Semaphore::new(0)));
    }

    pub(crate) fn release_moves(&self) {
        if let Some(gate) = self.gate.lock().take() {
            gate.close();
        }
    }

    async fn board(&self) -> Value {
        let mut reply = dispatch(&self.state, "board.load", Value::Null).await;
        reply["board"].take()
    }

    pub(crate) async fn titles(&self, container: &str) -> Vec<String> {
        let id = self.container_id(container);
        let board = self.board().await;
        board
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["id"] == id)
            .map(|c| {
                c["items"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|i| i["title"].as_str().unwrap().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) async fn container_names(&self) -> Vec<String> {
        let board = self.board().await;
        board
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap().to_string())
            .collect()
    }

    /// Edits made by "another client", not counted as calls
    pub(crate) async fn delete_container(&self, name: &str) {
        let reply = dispatch(&self.state, "container.delete", json!({ "id": self.container_id(name) })).await;
        assert_eq!(reply["ok"], true);
    }

    pub(crate) async fn move_container(&self, name: &str, index: i64) {
        let reply = dispatch(
            &self.state,
            "container.move",
            json!({ "containerId": self.container_id(name), "targetIndex": index }),
        )
        .await;
        assert_eq!(reply["ok"], true);
    }
}

#[async_trait]
impl JsonChannel for LocalServer {
    async fn call(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        if method.ends_with(".move") {
            self.move_calls.fetch_add(1, Ordering::SeqCst);
            if self
                .fail_moves
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(ClientError::Network("connection reset".into()));
            }
            let gate = self.gate.lock().clone();
            if let Some(gate) = gate {
                let _ = gate.acquire().await;
            }
        }
        Ok(dispatch(&self.state, method, params).await)
    }
}

//! Backend Command Wrappers
//!
//! `BoardApi` is what the session talks to. `JsonApi` implements it over
//! any channel that carries a method name and JSON params to the backend
//! and brings back the reply envelope.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ClientError;
use crate::models::{Column, Container, Item};

// ========================
// Command Argument Structs
// ========================

/// One persistence call per finished gesture
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveItemRequest {
    pub item_id: u32,
    pub source_container_id: Option<u32>,
    pub target_container_id: u32,
    pub target_index: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveContainerRequest {
    pub container_id: u32,
    pub target_index: i64,
}

// ========================
// Api
// ========================

#[async_trait]
pub trait BoardApi: Send + Sync {
    async fn load_board(&self) -> Result<Vec<Column>, ClientError>;
    async fn move_item(&self, req: &MoveItemRequest) -> Result<Item, ClientError>;
    async fn move_container(&self, req: &MoveContainerRequest) -> Result<Container, ClientError>;
}

/// Carries one call to the backend and returns its reply envelope.
/// Transport failures are `ClientError::Network`.
#[async_trait]
pub trait JsonChannel: Send + Sync {
    async fn call(&self, method: &str, params: Value) -> Result<Value, ClientError>;
}

#[async_trait]
impl<T: JsonChannel + ?Sized> JsonChannel for Arc<T> {
    async fn call(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        (**self).call(method, params).await
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    kind: String,
    #[serde(default)]
    message: String,
}

pub struct JsonApi<C> {
    channel: C,
}

impl<C: JsonChannel> JsonApi<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Call `method` and decode `reply[key]` on success
    async fn invoke<T: DeserializeOwned>(&self, method: &str, params: Value, key: &str) -> Result<T, ClientError> {
        let decode_err = |e: String| ClientError::Decode(format!("{}: {}", method, e));

        let mut reply = match self.channel.call(method, params).await? {
            Value::Object(reply) => reply,
            other => return Err(decode_err(format!("expected an envelope, got {}", other))),
        };

        if reply.get("ok").and_then(Value::as_bool) != Some(true) {
            let error = reply.remove("error").unwrap_or(Value::Null);
            let body: ErrorBody = serde_json::from_value(error).map_err(|e| decode_err(e.to_string()))?;
            return Err(ClientError::Server {
                kind: body.kind,
                message: body.message,
            });
        }

        let value = reply.remove(key).unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| decode_err(e.to_string()))
    }
}

#[async_trait]
impl<C: JsonChannel> BoardApi for JsonApi<C> {
    async fn load_board(&self) -> Result<Vec<Column>, ClientError> {
        self.invoke("board.load", json!({}), "board").await
    }

    async fn move_item(&self, req: &MoveItemRequest) -> Result<Item, ClientError> {
        let params = serde_json::to_value(req).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.invoke("item.move", params, "item").await
    }

    async fn move_container(&self, req: &MoveContainerRequest) -> Result<Container, ClientError> {
        let params = serde_json::to_value(req).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.invoke("container.move", params, "container").await
    }
}

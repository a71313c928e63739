//! Commands Layer
//!
//! Handlers that bridge the transport to repositories and the reorder
//! service, plus the method router. Every reply is an envelope:
//! `{"ok": true, ...}` on success, `{"ok": false, "error": {...}}` otherwise.

mod container_cmd;
mod item_cmd;
pub mod request;

pub use container_cmd::*;
pub use item_cmd::*;
pub use request::{MoveContainerRequest, MoveItemRequest};

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::domain::{DomainError, DomainResult};
use crate::AppState;
use request::{parse, CreateItemArgs, IdArgs, RenameContainerArgs, UpdateItemArgs};

/// Route a method call and wrap the outcome in the reply envelope
pub async fn dispatch(state: &AppState, method: &str, params: Value) -> Value {
    match route(state, method, params).await {
        Ok(reply) => reply,
        Err(err) => {
            if !matches!(err, DomainError::Validation(_) | DomainError::NotFound(_)) {
                log::warn!("{} failed: {}", method, err);
            }
            error_envelope(&err)
        }
    }
}

/// `{"ok": false, "error": {"kind": ..., "message": ...}}`
pub fn error_envelope(err: &DomainError) -> Value {
    json!({ "ok": false, "error": err })
}

fn ok_with<T: Serialize>(key: &str, value: T) -> DomainResult<Value> {
    let value = serde_json::to_value(value).map_err(|e| DomainError::Internal(e.to_string()))?;
    let mut reply = Map::new();
    reply.insert("ok".to_string(), Value::Bool(true));
    reply.insert(key.to_string(), value);
    Ok(Value::Object(reply))
}

fn ok_empty() -> DomainResult<Value> {
    Ok(json!({ "ok": true }))
}

async fn route(state: &AppState, method: &str, params: Value) -> DomainResult<Value> {
    match method {
        "board.load" => ok_with("board", load_board(state).await?),

        "container.create" => ok_with("container", create_container(state, parse(params)?).await?),
        "container.get" => {
            let id = parse::<IdArgs>(params)?.validate()?;
            ok_with("container", get_container(state, id).await?)
        }
        "container.rename" => {
            let args: RenameContainerArgs = parse(params)?;
            ok_with("container", rename_container(state, args).await?)
        }
        "container.delete" => {
            let id = parse::<IdArgs>(params)?.validate()?;
            delete_container(state, id).await?;
            ok_empty()
        }
        "container.move" => ok_with("container", move_container(state, parse(params)?).await?),

        "item.create" => {
            let args: CreateItemArgs = parse(params)?;
            ok_with("item", create_item(state, args).await?)
        }
        "item.get" => {
            let id = parse::<IdArgs>(params)?.validate()?;
            ok_with("item", get_item(state, id).await?)
        }
        "item.update" => {
            let args: UpdateItemArgs = parse(params)?;
            ok_with("item", update_item(state, args).await?)
        }
        "item.delete" => {
            let id = parse::<IdArgs>(params)?.validate()?;
            delete_item(state, id).await?;
            ok_empty()
        }
        "item.move" => ok_with("item", move_item(state, parse(params)?).await?),

        other => Err(DomainError::Validation(format!("unknown method: {}", other))),
    }
}

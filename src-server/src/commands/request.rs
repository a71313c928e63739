//! Command Arguments
//!
//! Typed request bodies. Everything is checked here, before the store is
//! touched: malformed bodies, missing fields, non-integer values and zero
//! ids all become `DomainError::Validation`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{DomainError, DomainResult};
use crate::service::{MoveContainer, MoveItem};

/// Decode a request body into `T`
pub fn parse<T: DeserializeOwned>(params: Value) -> DomainResult<T> {
    serde_json::from_value(params).map_err(|e| DomainError::Validation(e.to_string()))
}

fn require_id(field: &str, id: u32) -> DomainResult<u32> {
    if id == 0 {
        return Err(DomainError::Validation(format!("{} must be a positive integer", field)));
    }
    Ok(id)
}

fn require_text(field: &str, text: String) -> DomainResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

/// `item.move`; also accepts the older card/column field names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveItemRequest {
    #[serde(alias = "cardId")]
    pub item_id: u32,
    #[serde(default, alias = "fromColumnId")]
    pub source_container_id: Option<u32>,
    #[serde(alias = "toColumnId")]
    pub target_container_id: u32,
    #[serde(alias = "toOrder")]
    pub target_index: i64,
}

impl MoveItemRequest {
    pub fn validate(self) -> DomainResult<MoveItem> {
        Ok(MoveItem {
            item_id: require_id("itemId", self.item_id)?,
            source_container_id: self
                .source_container_id
                .map(|id| require_id("sourceContainerId", id))
                .transpose()?,
            target_container_id: require_id("targetContainerId", self.target_container_id)?,
            target_index: self.target_index,
        })
    }
}

/// `container.move`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveContainerRequest {
    #[serde(alias = "columnId")]
    pub container_id: u32,
    #[serde(alias = "toOrder")]
    pub target_index: i64,
}

impl MoveContainerRequest {
    pub fn validate(self) -> DomainResult<MoveContainer> {
        Ok(MoveContainer {
            container_id: require_id("containerId", self.container_id)?,
            target_index: self.target_index,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdArgs {
    pub id: u32,
}

impl IdArgs {
    pub fn validate(self) -> DomainResult<u32> {
        require_id("id", self.id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateContainerArgs {
    pub name: String,
}

impl CreateContainerArgs {
    pub fn validate(self) -> DomainResult<String> {
        require_text("name", self.name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameContainerArgs {
    pub id: u32,
    pub name: String,
}

impl RenameContainerArgs {
    pub fn validate(self) -> DomainResult<(u32, String)> {
        Ok((require_id("id", self.id)?, require_text("name", self.name)?))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemArgs {
    #[serde(alias = "columnId")]
    pub container_id: u32,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl CreateItemArgs {
    pub fn validate(self) -> DomainResult<CreateItemArgs> {
        Ok(CreateItemArgs {
            container_id: require_id("containerId", self.container_id)?,
            title: require_text("title", self.title)?,
            content: self.content,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateItemArgs {
    pub id: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl UpdateItemArgs {
    pub fn validate(self) -> DomainResult<UpdateItemArgs> {
        Ok(UpdateItemArgs {
            id: require_id("id", self.id)?,
            title: self.title.map(|t| require_text("title", t)).transpose()?,
            content: self.content,
        })
    }
}
